// Assignor Service - registry maintenance

use crate::domain::{Assignor, NewAssignor};
use crate::error::{AppError, Result};
use crate::port::{AssignorRepository, IdProvider, TimeProvider};
use std::sync::Arc;
use tracing::info;

pub const ASSIGNOR_NOT_REGISTERED: &str = "assignor not found";

pub struct AssignorService {
    repo: Arc<dyn AssignorRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl AssignorService {
    pub fn new(
        repo: Arc<dyn AssignorRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            repo,
            id_provider,
            time_provider,
        }
    }

    pub async fn register(&self, req: NewAssignor) -> Result<Assignor> {
        let assignor = Assignor::register(
            self.id_provider.generate_id(),
            req,
            self.time_provider.now_millis(),
        );
        self.repo.insert(&assignor).await?;
        info!(assignor_id = %assignor.id, "Assignor registered");
        Ok(assignor)
    }

    pub async fn find_one(&self, id: &str) -> Result<Option<Assignor>> {
        self.repo.find_active(id).await
    }

    /// Soft delete. Pending batches already enqueued are not affected.
    pub async fn remove(&self, id: &str) -> Result<()> {
        if !self
            .repo
            .soft_delete(id, self.time_provider.now_millis())
            .await?
        {
            return Err(AppError::NotFound(ASSIGNOR_NOT_REGISTERED.to_string()));
        }
        info!(assignor_id = %id, "Assignor removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::assignor_lookup::mocks::InMemoryAssignors;
    use crate::port::id_provider::mocks::SequentialIdProvider;
    use crate::port::time_provider::mocks::FixedTimeProvider;
    use crate::port::AssignorLookup;

    fn service(repo: Arc<InMemoryAssignors>) -> AssignorService {
        AssignorService::new(
            repo,
            Arc::new(SequentialIdProvider::new("assignor")),
            Arc::new(FixedTimeProvider::new(7_000)),
        )
    }

    fn request() -> NewAssignor {
        NewAssignor {
            document: "12345678900".to_string(),
            email: "finance@acme.test".to_string(),
            phone: "5511999990000".to_string(),
            name: "Acme Ltda".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_exists() {
        let repo = Arc::new(InMemoryAssignors::new());
        let service = service(repo.clone());

        let assignor = service.register(request()).await.unwrap();

        assert_eq!(assignor.id, "assignor-1");
        assert_eq!(assignor.created_at, 7_000);
        assert!(repo.exists("assignor-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_hides_assignor() {
        let repo = Arc::new(InMemoryAssignors::new());
        let service = service(repo.clone());
        let assignor = service.register(request()).await.unwrap();

        service.remove(&assignor.id).await.unwrap();

        assert!(!repo.exists(&assignor.id).await.unwrap());
        assert!(service.find_one(&assignor.id).await.unwrap().is_none());
        assert!(matches!(
            service.remove(&assignor.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
