// Payable Store Port (Interface)

use crate::domain::{Payable, PayableFilter};
use crate::error::Result;
use async_trait::async_trait;

/// Persistence for payables.
///
/// Every read applies the active predicate (`deleted_at IS NULL`) as part of
/// the query; soft-deleted rows are never returned.
#[async_trait]
pub trait PayableStore: Send + Sync {
    /// Insert a single payable
    async fn insert(&self, payable: &Payable) -> Result<()>;

    /// Insert all payables atomically: either every row lands or none does
    async fn insert_many(&self, payables: &[Payable]) -> Result<()>;

    /// Find an active payable by ID
    async fn find_active(&self, id: &str) -> Result<Option<Payable>>;

    /// List active payables matching `filter`, ordered by creation
    async fn find_all_active(
        &self,
        filter: &PayableFilter,
        skip: u64,
        take: u64,
    ) -> Result<Vec<Payable>>;

    /// Overwrite mutable fields of an active payable; false if none matched
    async fn update(&self, payable: &Payable) -> Result<bool>;

    /// Set `deleted_at` on an active payable; false if none matched
    async fn soft_delete(&self, id: &str, actor: &str, now_millis: i64) -> Result<bool>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::Mutex;

    /// Arguments of one `find_all_active` call
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ListCall {
        pub filter: PayableFilter,
        pub skip: u64,
        pub take: u64,
    }

    /// In-memory store. `fail_next_writes(n)` makes the next n writes fail.
    #[derive(Default)]
    pub struct InMemoryPayableStore {
        rows: Mutex<Vec<Payable>>,
        list_calls: Mutex<Vec<ListCall>>,
        failing_writes: Mutex<usize>,
        write_calls: Mutex<usize>,
    }

    impl InMemoryPayableStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn fail_next_writes(&self, n: usize) {
            *self.failing_writes.lock().unwrap() = n;
        }

        /// All rows, deleted ones included
        pub fn rows(&self) -> Vec<Payable> {
            self.rows.lock().unwrap().clone()
        }

        pub fn list_calls(&self) -> Vec<ListCall> {
            self.list_calls.lock().unwrap().clone()
        }

        pub fn write_calls(&self) -> usize {
            *self.write_calls.lock().unwrap()
        }

        fn begin_write(&self) -> Result<()> {
            *self.write_calls.lock().unwrap() += 1;
            let mut failing = self.failing_writes.lock().unwrap();
            if *failing > 0 {
                *failing -= 1;
                return Err(AppError::Database("store unreachable".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PayableStore for InMemoryPayableStore {
        async fn insert(&self, payable: &Payable) -> Result<()> {
            self.begin_write()?;
            self.rows.lock().unwrap().push(payable.clone());
            Ok(())
        }

        async fn insert_many(&self, payables: &[Payable]) -> Result<()> {
            self.begin_write()?;
            self.rows.lock().unwrap().extend_from_slice(payables);
            Ok(())
        }

        async fn find_active(&self, id: &str) -> Result<Option<Payable>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id == id && p.is_active())
                .cloned())
        }

        async fn find_all_active(
            &self,
            filter: &PayableFilter,
            skip: u64,
            take: u64,
        ) -> Result<Vec<Payable>> {
            self.list_calls.lock().unwrap().push(ListCall {
                filter: filter.clone(),
                skip,
                take,
            });
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.is_active())
                .filter(|p| {
                    filter
                        .assignor_id
                        .as_ref()
                        .map_or(true, |a| &p.assignor_id == a)
                })
                .skip(skip as usize)
                .take(take as usize)
                .cloned()
                .collect())
        }

        async fn update(&self, payable: &Payable) -> Result<bool> {
            self.begin_write()?;
            let mut rows = self.rows.lock().unwrap();
            match rows
                .iter_mut()
                .find(|p| p.id == payable.id && p.is_active())
            {
                Some(row) => {
                    *row = payable.clone();
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn soft_delete(&self, id: &str, actor: &str, now_millis: i64) -> Result<bool> {
            self.begin_write()?;
            let mut rows = self.rows.lock().unwrap();
            match rows.iter_mut().find(|p| p.id == id && p.is_active()) {
                Some(row) => {
                    row.deleted_at = Some(now_millis);
                    row.updated_at = now_millis;
                    row.updated_by = actor.to_string();
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }
}
