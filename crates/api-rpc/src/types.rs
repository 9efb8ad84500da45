//! RPC Request/Response Types
//!
//! JSON-RPC method parameters and results. Field names are camelCase on
//! the wire.

use payables_core::domain::{PayableDraft, PayablePatch};
use serde::{Deserialize, Serialize};

/// payable.batch_create.v1
#[derive(Debug, Deserialize)]
pub struct BatchCreateRequest {
    pub payables: Vec<PayableDraft>,
}

/// payable.find_one.v1, payable.remove.v1, assignor.find_one.v1, assignor.remove.v1
#[derive(Debug, Deserialize)]
pub struct IdRequest {
    pub id: String,
}

/// payable.find_all.v1
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FindAllRequest {
    pub assignor_id: Option<String>,
    pub page: Option<u32>,
    pub items_per_page: Option<u32>,
}

/// payable.update.v1
#[derive(Debug, Deserialize)]
pub struct UpdatePayableRequest {
    pub id: String,
    #[serde(default)]
    pub data: PayablePatch,
}

/// Confirmation for removals
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// admin.queue_stats.v1
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatsResponse {
    pub queue: String,
    pub queued: i64,
    pub running: i64,
    pub done: i64,
    pub failed: i64,
}
