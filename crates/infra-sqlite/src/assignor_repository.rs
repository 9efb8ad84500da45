// SQLite AssignorRepository Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use payables_core::domain::Assignor;
use payables_core::error::Result;
use payables_core::port::{AssignorLookup, AssignorRepository};
use sqlx::SqlitePool;

pub struct SqliteAssignorRepository {
    pool: SqlitePool,
}

impl SqliteAssignorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssignorLookup for SqliteAssignorRepository {
    async fn exists(&self, id: &str) -> Result<bool> {
        let found: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM assignors WHERE id = ? AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(found != 0)
    }
}

#[async_trait]
impl AssignorRepository for SqliteAssignorRepository {
    async fn insert(&self, assignor: &Assignor) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO assignors (id, document, email, phone, name, created_at, deleted_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&assignor.id)
        .bind(&assignor.document)
        .bind(&assignor.email)
        .bind(&assignor.phone)
        .bind(&assignor.name)
        .bind(assignor.created_at)
        .bind(assignor.deleted_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_active(&self, id: &str) -> Result<Option<Assignor>> {
        let row = sqlx::query_as::<_, AssignorRow>(
            "SELECT * FROM assignors WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(AssignorRow::into_assignor))
    }

    async fn soft_delete(&self, id: &str, now_millis: i64) -> Result<bool> {
        let result =
            sqlx::query("UPDATE assignors SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL")
                .bind(now_millis)
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AssignorRow {
    id: String,
    document: String,
    email: String,
    phone: String,
    name: String,
    created_at: i64,
    deleted_at: Option<i64>,
}

impl AssignorRow {
    fn into_assignor(self) -> Assignor {
        Assignor {
            id: self.id,
            document: self.document,
            email: self.email,
            phone: self.phone,
            name: self.name,
            created_at: self.created_at,
            deleted_at: self.deleted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};
    use payables_core::domain::NewAssignor;

    async fn setup() -> SqliteAssignorRepository {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteAssignorRepository::new(pool)
    }

    fn assignor(id: &str) -> Assignor {
        Assignor::register(
            id,
            NewAssignor {
                document: "12345678900".to_string(),
                email: "ops@acme.test".to_string(),
                phone: "5511988887777".to_string(),
                name: "Acme".to_string(),
            },
            1_000,
        )
    }

    #[tokio::test]
    async fn test_exists_for_active_only() {
        let repo = setup().await;
        repo.insert(&assignor("A")).await.unwrap();

        assert!(repo.exists("A").await.unwrap());
        assert!(!repo.exists("missing").await.unwrap());

        assert!(repo.soft_delete("A", 2_000).await.unwrap());
        assert!(!repo.exists("A").await.unwrap());
        assert!(repo.find_active("A").await.unwrap().is_none());
        assert!(!repo.soft_delete("A", 3_000).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_active_round_trip() {
        let repo = setup().await;
        let a = assignor("A");
        repo.insert(&a).await.unwrap();

        assert_eq!(repo.find_active("A").await.unwrap(), Some(a));
    }
}
