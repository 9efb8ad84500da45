// Port Layer - Interfaces for external dependencies

pub mod assignor_lookup;
pub mod batch_queue;
pub mod id_provider; // For deterministic testing
pub mod job_handler;
pub mod job_repository;
pub mod payable_store;
pub mod time_provider;

// Re-exports
pub use assignor_lookup::{AssignorLookup, AssignorRepository};
pub use batch_queue::BatchQueue;
pub use id_provider::IdProvider;
pub use job_handler::JobHandler;
pub use job_repository::JobRepository;
pub use payable_store::PayableStore;
pub use time_provider::TimeProvider;
