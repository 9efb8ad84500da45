// Payable Domain Model

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Payable ID (UUID v4)
pub type PayableId = String;

/// Assignor identifier as referenced by payables
pub type AssignorId = String;

/// Largest amount the store can hold (signed 64-bit column)
pub const MAX_VALUE_IN_CENTS: u64 = i64::MAX as u64;

fn check_value(value_in_cents: u64) -> Result<()> {
    if value_in_cents > MAX_VALUE_IN_CENTS {
        return Err(DomainError::ValueOutOfRange(value_in_cents));
    }
    Ok(())
}

/// A payable submitted for ingestion, not yet persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayableDraft {
    pub assignor_id: AssignorId,
    /// Date-like token, stored verbatim
    pub emission_date: String,
    pub value_in_cents: u64,
}

impl PayableDraft {
    pub fn new(
        assignor_id: impl Into<String>,
        emission_date: impl Into<String>,
        value_in_cents: u64,
    ) -> Self {
        Self {
            assignor_id: assignor_id.into(),
            emission_date: emission_date.into(),
            value_in_cents,
        }
    }

    /// Storable as-is; pure, no I/O
    pub fn validate(&self) -> Result<()> {
        check_value(self.value_in_cents)
    }
}

/// Persisted payable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payable {
    pub id: PayableId,
    pub assignor_id: AssignorId,
    pub emission_date: String,
    pub value_in_cents: u64,

    pub created_at: i64, // epoch ms
    pub updated_at: i64,
    pub deleted_at: Option<i64>,

    pub created_by: String,
    pub updated_by: String,
}

impl Payable {
    /// Materialize a draft with an injected id, timestamp and author
    pub fn from_draft(
        id: impl Into<String>,
        draft: PayableDraft,
        actor: &str,
        now_millis: i64,
    ) -> Self {
        Self {
            id: id.into(),
            assignor_id: draft.assignor_id,
            emission_date: draft.emission_date,
            value_in_cents: draft.value_in_cents,
            created_at: now_millis,
            updated_at: now_millis,
            deleted_at: None,
            created_by: actor.to_string(),
            updated_by: actor.to_string(),
        }
    }

    /// Active = not soft-deleted
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Apply a partial update. Absent fields are left untouched.
    pub fn apply(&mut self, patch: PayablePatch, actor: &str, now_millis: i64) {
        if let Some(assignor_id) = patch.assignor_id {
            self.assignor_id = assignor_id;
        }
        if let Some(emission_date) = patch.emission_date {
            self.emission_date = emission_date;
        }
        if let Some(value) = patch.value_in_cents {
            self.value_in_cents = value;
        }
        self.updated_at = now_millis;
        self.updated_by = actor.to_string();
    }

    pub fn soft_delete(&mut self, actor: &str, now_millis: i64) -> Result<()> {
        if !self.is_active() {
            return Err(DomainError::AlreadyDeleted(self.id.clone()));
        }
        self.deleted_at = Some(now_millis);
        self.updated_at = now_millis;
        self.updated_by = actor.to_string();
        Ok(())
    }
}

/// Partial update for a payable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PayablePatch {
    pub assignor_id: Option<AssignorId>,
    pub emission_date: Option<String>,
    pub value_in_cents: Option<u64>,
}

impl PayablePatch {
    pub fn validate(&self) -> Result<()> {
        self.value_in_cents.map_or(Ok(()), check_value)
    }
}

/// Equality filters for listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PayableFilter {
    pub assignor_id: Option<AssignorId>,
}

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 10;

/// 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    page: u32,
    items_per_page: u32,
}

impl Page {
    pub fn new(page: u32, items_per_page: u32) -> Result<Self> {
        if page == 0 {
            return Err(DomainError::InvalidPage("page starts at 1".to_string()));
        }
        if items_per_page == 0 {
            return Err(DomainError::InvalidPage(
                "itemsPerPage must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            page,
            items_per_page,
        })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn items_per_page(&self) -> u32 {
        self.items_per_page
    }

    /// Rows to skip: (page - 1) * itemsPerPage
    pub fn skip(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.items_per_page)
    }

    /// Rows to take: itemsPerPage
    pub fn take(&self) -> u64 {
        u64::from(self.items_per_page)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offsets() {
        let page = Page::new(3, 10).unwrap();
        assert_eq!(page.skip(), 20);
        assert_eq!(page.take(), 10);

        let first = Page::default();
        assert_eq!(first.skip(), 0);
        assert_eq!(first.take(), 10);
    }

    #[test]
    fn test_page_rejects_zero() {
        assert!(Page::new(0, 10).is_err());
        assert!(Page::new(1, 0).is_err());
    }

    #[test]
    fn test_patch_leaves_missing_fields() {
        let draft = PayableDraft::new("assignor-1", "2024-01-10", 10_000);
        let mut payable = Payable::from_draft("p-1", draft, "api", 1000);

        payable.apply(
            PayablePatch {
                value_in_cents: Some(25_000),
                ..Default::default()
            },
            "ops",
            2000,
        );

        assert_eq!(payable.value_in_cents, 25_000);
        assert_eq!(payable.emission_date, "2024-01-10");
        assert_eq!(payable.assignor_id, "assignor-1");
        assert_eq!(payable.created_by, "api");
        assert_eq!(payable.updated_by, "ops");
        assert_eq!(payable.updated_at, 2000);
    }

    #[test]
    fn test_soft_delete_once() {
        let draft = PayableDraft::new("assignor-1", "2024-01-10", 1);
        let mut payable = Payable::from_draft("p-1", draft, "api", 1000);

        assert!(payable.soft_delete("api", 3000).is_ok());
        assert!(!payable.is_active());
        assert_eq!(payable.deleted_at, Some(3000));
        assert_eq!(
            payable.soft_delete("api", 4000),
            Err(DomainError::AlreadyDeleted("p-1".to_string()))
        );
    }

    #[test]
    fn test_draft_wire_format_is_camel_case() {
        let draft: PayableDraft = serde_json::from_value(serde_json::json!({
            "assignorId": "A",
            "emissionDate": "2024-02-01",
            "valueInCents": 10000
        }))
        .unwrap();
        assert_eq!(draft, PayableDraft::new("A", "2024-02-01", 10_000));
    }

    #[test]
    fn test_negative_value_is_rejected_by_the_wire_type() {
        let result: std::result::Result<PayableDraft, _> =
            serde_json::from_value(serde_json::json!({
                "assignorId": "A",
                "emissionDate": "2024-02-01",
                "valueInCents": -5
            }));
        assert!(result.is_err());
    }
}
