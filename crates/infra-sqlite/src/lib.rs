// Payables Infrastructure - SQLite Adapters
// Implements: PayableStore, AssignorRepository, BatchQueue + JobRepository

mod assignor_repository;
mod connection;
mod error;
mod job_queue;
mod migration;
mod payable_store;

pub use assignor_repository::SqliteAssignorRepository;
pub use connection::create_pool;
pub use job_queue::SqliteJobQueue;
pub use migration::run_migrations;
pub use payable_store::SqlitePayableStore;

// Note: sqlx::Error conversion is handled by a helper function
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
