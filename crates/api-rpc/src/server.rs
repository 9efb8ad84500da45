//! JSON-RPC Server
//!
//! JSON-RPC 2.0 over HTTP, bound to localhost by default.

use crate::handler::RpcHandler;
use crate::types::{BatchCreateRequest, FindAllRequest, IdRequest, UpdatePayableRequest};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use payables_core::domain::{NewAssignor, PayableDraft};
use std::net::SocketAddr;
use tracing::info;

pub const DEFAULT_RPC_HOST: &str = "127.0.0.1";
pub const DEFAULT_RPC_PORT: u16 = 9630;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: RpcHandler,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, handler: RpcHandler) -> Self {
        Self { config, handler }
    }

    /// Method table, usable without a listening socket
    pub fn into_module(self) -> Result<RpcModule<RpcHandler>, String> {
        build_module(self.handler)
    }

    /// Start the JSON-RPC server
    ///
    /// Returns the bound address (useful with port 0) and the server handle.
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Starting JSON-RPC server"
        );

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;
        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let module = build_module(self.handler)?;

        info!(addr = %local_addr, "JSON-RPC server started successfully");

        let handle = server.start(module);
        Ok((local_addr, handle))
    }
}

fn build_module(handler: RpcHandler) -> Result<RpcModule<RpcHandler>, String> {
    let mut module = RpcModule::new(handler);

    module
        .register_async_method("payable.batch_create.v1", |params, handler, _| async move {
            let req: BatchCreateRequest = params.parse()?;
            handler.batch_create(req).await
        })
        .map_err(|e| e.to_string())?;

    module
        .register_async_method("payable.create.v1", |params, handler, _| async move {
            let draft: PayableDraft = params.parse()?;
            handler.create_payable(draft).await
        })
        .map_err(|e| e.to_string())?;

    module
        .register_async_method("payable.find_one.v1", |params, handler, _| async move {
            let req: IdRequest = params.parse()?;
            handler.find_payable(req).await
        })
        .map_err(|e| e.to_string())?;

    module
        .register_async_method("payable.find_all.v1", |params, handler, _| async move {
            // Absent params mean "first page, no filter"
            let req: FindAllRequest = if params.is_object() {
                params.parse()?
            } else {
                FindAllRequest::default()
            };
            handler.find_all_payables(req).await
        })
        .map_err(|e| e.to_string())?;

    module
        .register_async_method("payable.update.v1", |params, handler, _| async move {
            let req: UpdatePayableRequest = params.parse()?;
            handler.update_payable(req).await
        })
        .map_err(|e| e.to_string())?;

    module
        .register_async_method("payable.remove.v1", |params, handler, _| async move {
            let req: IdRequest = params.parse()?;
            handler.remove_payable(req).await
        })
        .map_err(|e| e.to_string())?;

    module
        .register_async_method("assignor.create.v1", |params, handler, _| async move {
            let req: NewAssignor = params.parse()?;
            handler.create_assignor(req).await
        })
        .map_err(|e| e.to_string())?;

    module
        .register_async_method("assignor.find_one.v1", |params, handler, _| async move {
            let req: IdRequest = params.parse()?;
            handler.find_assignor(req).await
        })
        .map_err(|e| e.to_string())?;

    module
        .register_async_method("assignor.remove.v1", |params, handler, _| async move {
            let req: IdRequest = params.parse()?;
            handler.remove_assignor(req).await
        })
        .map_err(|e| e.to_string())?;

    module
        .register_async_method("admin.queue_stats.v1", |_, handler, _| async move {
            handler.queue_stats().await
        })
        .map_err(|e| e.to_string())?;

    Ok(module)
}
