// Assignor Lookup Port (Interface)

use crate::domain::Assignor;
use crate::error::Result;
use async_trait::async_trait;

/// Existence check consulted once per batch and once per single create.
///
/// Missing and soft-deleted assignors are both reported as absent.
/// Implementations must be side-effect free.
#[async_trait]
pub trait AssignorLookup: Send + Sync {
    async fn exists(&self, id: &str) -> Result<bool>;
}

/// Full registry behind the lookup
#[async_trait]
pub trait AssignorRepository: AssignorLookup {
    async fn insert(&self, assignor: &Assignor) -> Result<()>;

    /// Find an active assignor
    async fn find_active(&self, id: &str) -> Result<Option<Assignor>>;

    /// Soft delete; returns false when no active row matched
    async fn soft_delete(&self, id: &str, now_millis: i64) -> Result<bool>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory registry that records every `exists` call
    #[derive(Default)]
    pub struct InMemoryAssignors {
        records: Mutex<HashMap<String, Assignor>>,
        lookups: Mutex<Vec<String>>,
        unavailable: Mutex<bool>,
    }

    impl InMemoryAssignors {
        pub fn new() -> Self {
            Self::default()
        }

        /// Registry with active assignors already present
        pub fn with_active(ids: &[&str]) -> Self {
            let registry = Self::new();
            for id in ids {
                registry.put(Assignor {
                    id: id.to_string(),
                    document: format!("doc-{}", id),
                    email: format!("{}@example.com", id),
                    phone: "5511999999999".to_string(),
                    name: format!("Assignor {}", id),
                    created_at: 0,
                    deleted_at: None,
                });
            }
            registry
        }

        pub fn put(&self, assignor: Assignor) {
            self.records
                .lock()
                .unwrap()
                .insert(assignor.id.clone(), assignor);
        }

        /// Make every call fail as if the store were unreachable
        pub fn set_unavailable(&self, unavailable: bool) {
            *self.unavailable.lock().unwrap() = unavailable;
        }

        pub fn lookups(&self) -> Vec<String> {
            self.lookups.lock().unwrap().clone()
        }

        fn check_available(&self) -> Result<()> {
            if *self.unavailable.lock().unwrap() {
                return Err(AppError::Database("assignor store unreachable".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl AssignorLookup for InMemoryAssignors {
        async fn exists(&self, id: &str) -> Result<bool> {
            self.lookups.lock().unwrap().push(id.to_string());
            self.check_available()?;
            Ok(self
                .records
                .lock()
                .unwrap()
                .get(id)
                .map(|a| a.is_active())
                .unwrap_or(false))
        }
    }

    #[async_trait]
    impl AssignorRepository for InMemoryAssignors {
        async fn insert(&self, assignor: &Assignor) -> Result<()> {
            self.check_available()?;
            self.put(assignor.clone());
            Ok(())
        }

        async fn find_active(&self, id: &str) -> Result<Option<Assignor>> {
            self.check_available()?;
            Ok(self
                .records
                .lock()
                .unwrap()
                .get(id)
                .filter(|a| a.is_active())
                .cloned())
        }

        async fn soft_delete(&self, id: &str, now_millis: i64) -> Result<bool> {
            self.check_available()?;
            let mut records = self.records.lock().unwrap();
            match records.get_mut(id) {
                Some(a) if a.is_active() => {
                    a.deleted_at = Some(now_millis);
                    Ok(true)
                }
                _ => Ok(false),
            }
        }
    }
}
