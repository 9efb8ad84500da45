// SQLite PayableStore Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use payables_core::domain::{Payable, PayableFilter};
use payables_core::error::{AppError, Result};
use payables_core::port::PayableStore;
use sqlx::{Sqlite, SqlitePool};

const INSERT_PAYABLE: &str = r#"
    INSERT INTO payables (
        id, assignor_id, emission_date, value_in_cents,
        created_at, updated_at, deleted_at, created_by, updated_by
    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

pub struct SqlitePayableStore {
    pool: SqlitePool,
}

impl SqlitePayableStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn cents_to_db(value: u64) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| AppError::Validation(format!("valueInCents out of range: {}", value)))
}

async fn insert_one<'e, E>(executor: E, payable: &Payable) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(INSERT_PAYABLE)
        .bind(&payable.id)
        .bind(&payable.assignor_id)
        .bind(&payable.emission_date)
        .bind(cents_to_db(payable.value_in_cents)?)
        .bind(payable.created_at)
        .bind(payable.updated_at)
        .bind(payable.deleted_at)
        .bind(&payable.created_by)
        .bind(&payable.updated_by)
        .execute(executor)
        .await
        .map_err(map_sqlx_error)?;
    Ok(())
}

#[async_trait]
impl PayableStore for SqlitePayableStore {
    async fn insert(&self, payable: &Payable) -> Result<()> {
        insert_one(&self.pool, payable).await
    }

    async fn insert_many(&self, payables: &[Payable]) -> Result<()> {
        // Dropping the transaction on error rolls it back
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        for payable in payables {
            insert_one(&mut *tx, payable).await?;
        }
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn find_active(&self, id: &str) -> Result<Option<Payable>> {
        let row = sqlx::query_as::<_, PayableRow>(
            "SELECT * FROM payables WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(PayableRow::into_payable).transpose()
    }

    async fn find_all_active(
        &self,
        filter: &PayableFilter,
        skip: u64,
        take: u64,
    ) -> Result<Vec<Payable>> {
        // rowid keeps batch members (same created_at) in submission order
        let rows: Vec<PayableRow> = sqlx::query_as(
            r#"
            SELECT * FROM payables
            WHERE deleted_at IS NULL
              AND (? IS NULL OR assignor_id = ?)
            ORDER BY created_at ASC, rowid ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(&filter.assignor_id)
        .bind(&filter.assignor_id)
        .bind(i64::try_from(take).unwrap_or(i64::MAX))
        .bind(i64::try_from(skip).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(PayableRow::into_payable).collect()
    }

    async fn update(&self, payable: &Payable) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE payables
            SET assignor_id = ?, emission_date = ?, value_in_cents = ?,
                updated_at = ?, updated_by = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(&payable.assignor_id)
        .bind(&payable.emission_date)
        .bind(cents_to_db(payable.value_in_cents)?)
        .bind(payable.updated_at)
        .bind(&payable.updated_by)
        .bind(&payable.id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete(&self, id: &str, actor: &str, now_millis: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE payables
            SET deleted_at = ?, updated_at = ?, updated_by = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(now_millis)
        .bind(now_millis)
        .bind(actor)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct PayableRow {
    id: String,
    assignor_id: String,
    emission_date: String,
    value_in_cents: i64,
    created_at: i64,
    updated_at: i64,
    deleted_at: Option<i64>,
    created_by: String,
    updated_by: String,
}

impl PayableRow {
    fn into_payable(self) -> Result<Payable> {
        let value_in_cents = u64::try_from(self.value_in_cents).map_err(|_| {
            AppError::Database(format!(
                "payable {} has negative value_in_cents {}",
                self.id, self.value_in_cents
            ))
        })?;

        Ok(Payable {
            id: self.id,
            assignor_id: self.assignor_id,
            emission_date: self.emission_date,
            value_in_cents,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
            created_by: self.created_by,
            updated_by: self.updated_by,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations, SqliteAssignorRepository};
    use payables_core::domain::{Assignor, PayableDraft};
    use payables_core::port::AssignorRepository;

    async fn setup() -> SqlitePayableStore {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();

        let assignors = SqliteAssignorRepository::new(pool.clone());
        for id in ["A", "B"] {
            assignors
                .insert(&Assignor {
                    id: id.to_string(),
                    document: "doc".to_string(),
                    email: "a@b.test".to_string(),
                    phone: "1".to_string(),
                    name: id.to_string(),
                    created_at: 0,
                    deleted_at: None,
                })
                .await
                .unwrap();
        }

        SqlitePayableStore::new(pool)
    }

    fn payable(id: &str, assignor: &str, value: u64, at: i64) -> Payable {
        Payable::from_draft(
            id,
            PayableDraft::new(assignor, "2024-07-01", value),
            "api",
            at,
        )
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = setup().await;
        let p = payable("p-1", "A", 10_000, 1_000);

        store.insert(&p).await.unwrap();

        assert_eq!(store.find_active("p-1").await.unwrap(), Some(p));
        assert_eq!(store.find_active("p-2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_insert_many_is_all_or_nothing() {
        let store = setup().await;
        let batch = vec![
            payable("p-1", "A", 1, 1_000),
            payable("p-2", "A", 2, 1_000),
            // duplicate primary key aborts the whole transaction
            payable("p-1", "A", 3, 1_000),
        ];

        assert!(store.insert_many(&batch).await.is_err());
        assert!(store.find_active("p-2").await.unwrap().is_none());

        store.insert_many(&batch[..2]).await.unwrap();
        assert!(store.find_active("p-2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_find_all_pages_filters_and_hides_deleted() {
        let store = setup().await;
        let rows: Vec<Payable> = (0..5)
            .map(|i| payable(&format!("a-{}", i), "A", i, 1_000))
            .collect();
        store.insert_many(&rows).await.unwrap();
        store.insert(&payable("b-0", "B", 99, 500)).await.unwrap();
        store.soft_delete("a-1", "api", 2_000).await.unwrap();

        let filter = PayableFilter {
            assignor_id: Some("A".to_string()),
        };
        let first = store.find_all_active(&filter, 0, 2).await.unwrap();
        let second = store.find_all_active(&filter, 2, 2).await.unwrap();

        let ids = |v: &[Payable]| v.iter().map(|p| p.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&first), vec!["a-0", "a-2"]);
        assert_eq!(ids(&second), vec!["a-3", "a-4"]);

        let all = store
            .find_all_active(&PayableFilter::default(), 0, 10)
            .await
            .unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(all[0].id, "b-0");
    }

    #[tokio::test]
    async fn test_update_and_soft_delete_only_touch_active_rows() {
        let store = setup().await;
        let mut p = payable("p-1", "A", 1, 1_000);
        store.insert(&p).await.unwrap();

        p.value_in_cents = 77;
        p.updated_at = 2_000;
        assert!(store.update(&p).await.unwrap());
        assert_eq!(
            store.find_active("p-1").await.unwrap().unwrap().value_in_cents,
            77
        );

        assert!(store.soft_delete("p-1", "ops", 3_000).await.unwrap());
        assert!(!store.soft_delete("p-1", "ops", 4_000).await.unwrap());
        assert!(!store.update(&p).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_assignor_violates_foreign_key() {
        let store = setup().await;
        let err = store
            .insert(&payable("p-1", "ghost", 1, 1_000))
            .await
            .unwrap_err();
        assert!(err.is_infrastructure());
        assert!(err.to_string().contains("Foreign key"));
    }
}
