//! In-memory store adapter.
//!
//! Backs the test suite and serves as an ephemeral storage backend. Writes
//! serialize through a single `RwLock`, matching the per-key linearizability
//! the engine assumes of the durable store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::transaction::{Transaction, TransactionDraft, TransactionType};
use crate::store::{StoreResult, TransactionStore};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<Uuid, Transaction>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_desc(mut records: Vec<Transaction>) -> Vec<Transaction> {
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records
    }
}

#[async_trait]
impl TransactionStore for InMemoryStore {
    async fn insert(
        &self,
        draft: TransactionDraft,
        timestamp: DateTime<Utc>,
    ) -> StoreResult<Transaction> {
        let record = Transaction::from_draft(Uuid::new_v4(), timestamp, draft);
        let mut records = self.records.write().await;
        records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, record: &Transaction) -> StoreResult<Transaction> {
        let mut records = self.records.write().await;
        records.insert(record.id, record.clone());
        Ok(record.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Transaction>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn find_all(&self) -> StoreResult<Vec<Transaction>> {
        let records = self.records.read().await.values().cloned().collect();
        Ok(Self::sorted_desc(records))
    }

    async fn find_all_paged(&self, page: i64, size: i64) -> StoreResult<Vec<Transaction>> {
        let all = self.find_all().await?;
        let start = (page * size) as usize;
        Ok(all.into_iter().skip(start).take(size as usize).collect())
    }

    async fn find_by_account(&self, account_number: &str) -> StoreResult<Vec<Transaction>> {
        let records = self
            .records
            .read()
            .await
            .values()
            .filter(|t| t.account_number == account_number)
            .cloned()
            .collect();
        Ok(Self::sorted_desc(records))
    }

    async fn find_by_type(&self, trans_type: TransactionType) -> StoreResult<Vec<Transaction>> {
        let records = self
            .records
            .read()
            .await
            .values()
            .filter(|t| t.trans_type == trans_type)
            .cloned()
            .collect();
        Ok(Self::sorted_desc(records))
    }

    async fn exists_by_id(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.records.read().await.contains_key(&id))
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.records.write().await.remove(&id).is_some())
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.records.read().await.len() as u64)
    }
}
