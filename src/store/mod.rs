//! Record Store port.
//!
//! The ledger engine talks to durable storage through [`TransactionStore`];
//! adapters own id assignment and per-key write serialization. Failures are
//! surfaced to the originating request, never retried.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::transaction::{Transaction, TransactionDraft, TransactionType};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage contract consumed by the ledger engine. Listings come back ordered
/// by `timestamp` descending.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Persists a new record, assigning its id.
    async fn insert(
        &self,
        draft: TransactionDraft,
        timestamp: DateTime<Utc>,
    ) -> StoreResult<Transaction>;

    /// Replaces the stored record with the same id.
    async fn update(&self, record: &Transaction) -> StoreResult<Transaction>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Transaction>>;

    async fn find_all(&self) -> StoreResult<Vec<Transaction>>;

    async fn find_all_paged(&self, page: i64, size: i64) -> StoreResult<Vec<Transaction>>;

    async fn find_by_account(&self, account_number: &str) -> StoreResult<Vec<Transaction>>;

    async fn find_by_type(&self, trans_type: TransactionType) -> StoreResult<Vec<Transaction>>;

    async fn exists_by_id(&self, id: Uuid) -> StoreResult<bool>;

    /// Returns whether a record was actually removed.
    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool>;

    async fn count(&self) -> StoreResult<u64>;
}
