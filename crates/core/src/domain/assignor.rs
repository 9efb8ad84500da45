// Assignor Domain Model
//
// Payables only ever consult an assignor's existence; the remaining fields
// exist so the registry can be populated.

use serde::{Deserialize, Serialize};

/// Registration request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssignor {
    pub document: String,
    pub email: String,
    pub phone: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignor {
    pub id: String,
    pub document: String,
    pub email: String,
    pub phone: String,
    pub name: String,
    pub created_at: i64, // epoch ms
    pub deleted_at: Option<i64>,
}

impl Assignor {
    pub fn register(id: impl Into<String>, req: NewAssignor, now_millis: i64) -> Self {
        Self {
            id: id.into(),
            document: req.document,
            email: req.email,
            phone: req.phone,
            name: req.name,
            created_at: now_millis,
            deleted_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}
