//! Postgres store adapter (sqlx).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use crate::domain::transaction::{Transaction, TransactionDraft, TransactionType};
use crate::store::{StoreError, StoreResult, TransactionStore};

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
}

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionStore for PostgresStore {
    async fn insert(
        &self,
        draft: TransactionDraft,
        timestamp: DateTime<Utc>,
    ) -> StoreResult<Transaction> {
        let record = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (
                id, account_number, security_code, trans_type, units,
                price, amount, trans_date, "timestamp", currency, description
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&draft.account_number)
        .bind(&draft.security_code)
        .bind(draft.trans_type)
        .bind(draft.units)
        .bind(draft.price)
        .bind(draft.amount)
        .bind(draft.trans_date)
        .bind(timestamp)
        .bind(&draft.currency)
        .bind(&draft.description)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from)?;

        Ok(record)
    }

    async fn update(&self, record: &Transaction) -> StoreResult<Transaction> {
        let updated = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions SET
                account_number = $2, security_code = $3, trans_type = $4,
                units = $5, price = $6, amount = $7, trans_date = $8,
                currency = $9, description = $10
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(record.id)
        .bind(&record.account_number)
        .bind(&record.security_code)
        .bind(record.trans_type)
        .bind(record.units)
        .bind(record.price)
        .bind(record.amount)
        .bind(record.trans_date)
        .bind(&record.currency)
        .bind(&record.description)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from)?;

        Ok(updated)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Transaction>> {
        let record = sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from)?;

        Ok(record)
    }

    async fn find_all(&self) -> StoreResult<Vec<Transaction>> {
        let records = sqlx::query_as::<_, Transaction>(
            r#"SELECT * FROM transactions ORDER BY "timestamp" DESC"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)?;

        Ok(records)
    }

    async fn find_all_paged(&self, page: i64, size: i64) -> StoreResult<Vec<Transaction>> {
        let records = sqlx::query_as::<_, Transaction>(
            r#"SELECT * FROM transactions ORDER BY "timestamp" DESC LIMIT $1 OFFSET $2"#,
        )
        .bind(size)
        .bind(page * size)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)?;

        Ok(records)
    }

    async fn find_by_account(&self, account_number: &str) -> StoreResult<Vec<Transaction>> {
        let records = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT * FROM transactions
            WHERE account_number = $1
            ORDER BY "timestamp" DESC
            "#,
        )
        .bind(account_number)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)?;

        Ok(records)
    }

    async fn find_by_type(&self, trans_type: TransactionType) -> StoreResult<Vec<Transaction>> {
        let records = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT * FROM transactions
            WHERE trans_type = $1
            ORDER BY "timestamp" DESC
            "#,
        )
        .bind(trans_type)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)?;

        Ok(records)
    }

    async fn exists_by_id(&self, id: Uuid) -> StoreResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM transactions WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(StoreError::from)?;

        Ok(exists)
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from)?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from)?;

        Ok(count as u64)
    }
}
