// Application Layer - Use Cases and Business Logic

pub mod assignor;
pub mod ingestion;
pub mod payable;
pub mod recovery;
pub mod retry;
pub mod worker;

// Re-exports
pub use assignor::AssignorService;
pub use ingestion::IngestionPipeline;
pub use payable::PayableService;
pub use recovery::RecoveryService;
pub use retry::{RetryDecision, RetryPolicy};
pub use worker::{shutdown_channel, BatchCreateHandler, ShutdownSender, ShutdownToken, Worker};
