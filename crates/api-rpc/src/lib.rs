//! JSON-RPC API Layer
//!
//! JSON-RPC 2.0 surface over the payables use cases: batch ingestion,
//! single-record payable CRUD, the assignor registry and queue stats.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use handler::RpcHandler;
pub use server::{RpcServer, RpcServerConfig};
