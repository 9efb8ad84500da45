// Payable Service - synchronous single-record use cases
//
// Straight pass-throughs over the store with the active-record convention.
// Unlike the batch path, `create` checks the assignor and writes per item.

use crate::domain::{Page, Payable, PayableDraft, PayableFilter, PayablePatch};
use crate::error::{AppError, Result};
use crate::port::{AssignorLookup, IdProvider, PayableStore, TimeProvider};
use std::sync::Arc;
use tracing::{debug, info};

pub const PAYABLE_NOT_FOUND: &str = "payable not found";
pub const ASSIGNOR_DOES_NOT_EXIST: &str = "assignor does not exist";

pub struct PayableService {
    store: Arc<dyn PayableStore>,
    assignors: Arc<dyn AssignorLookup>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    /// Recorded as created_by / updated_by
    actor: String,
}

impl PayableService {
    pub fn new(
        store: Arc<dyn PayableStore>,
        assignors: Arc<dyn AssignorLookup>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            store,
            assignors,
            id_provider,
            time_provider,
            actor: actor.into(),
        }
    }

    pub async fn create(&self, draft: PayableDraft) -> Result<Payable> {
        draft.validate()?;
        self.ensure_assignor(&draft.assignor_id).await?;

        let payable = Payable::from_draft(
            self.id_provider.generate_id(),
            draft,
            &self.actor,
            self.time_provider.now_millis(),
        );
        self.store.insert(&payable).await?;

        info!(payable_id = %payable.id, assignor_id = %payable.assignor_id, "Payable created");
        Ok(payable)
    }

    pub async fn find_one(&self, id: &str) -> Result<Option<Payable>> {
        self.store.find_active(id).await
    }

    pub async fn find_all(&self, filter: PayableFilter, page: Page) -> Result<Vec<Payable>> {
        debug!(
            assignor_id = ?filter.assignor_id,
            skip = page.skip(),
            take = page.take(),
            "Listing payables"
        );
        self.store
            .find_all_active(&filter, page.skip(), page.take())
            .await
    }

    pub async fn update(&self, id: &str, patch: PayablePatch) -> Result<Payable> {
        patch.validate()?;
        let mut payable = self
            .store
            .find_active(id)
            .await?
            .ok_or_else(|| AppError::NotFound(PAYABLE_NOT_FOUND.to_string()))?;

        if let Some(assignor_id) = &patch.assignor_id {
            if assignor_id != &payable.assignor_id {
                self.ensure_assignor(assignor_id).await?;
            }
        }

        payable.apply(patch, &self.actor, self.time_provider.now_millis());

        // Deleted between read and write
        if !self.store.update(&payable).await? {
            return Err(AppError::NotFound(PAYABLE_NOT_FOUND.to_string()));
        }

        info!(payable_id = %payable.id, "Payable updated");
        Ok(payable)
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        let now = self.time_provider.now_millis();
        if !self.store.soft_delete(id, &self.actor, now).await? {
            return Err(AppError::NotFound(PAYABLE_NOT_FOUND.to_string()));
        }
        info!(payable_id = %id, "Payable removed");
        Ok(())
    }

    async fn ensure_assignor(&self, assignor_id: &str) -> Result<()> {
        if self.assignors.exists(assignor_id).await? {
            Ok(())
        } else {
            Err(AppError::Unauthorized(ASSIGNOR_DOES_NOT_EXIST.to_string()))
        }
    }
}
