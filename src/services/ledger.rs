//! Ledger engine.
//!
//! Orchestrates validation, persistence and cache invalidation for
//! mutations, and serves reads through the cache. Every mutation flushes the
//! whole cache: listings and statistics are derived from the full record
//! set, so a single new or deleted record can stale every cached aggregate,
//! and tracking per-entry dependencies is not worth it at this cache size.
//! The flush happens strictly after the store acknowledges the write and
//! before the call returns.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::cache::{CachePolicy, TtlCache};
use crate::domain::statistics::{self, SecurityStatistics};
use crate::domain::transaction::{Transaction, TransactionDraft, TransactionType};
use crate::error::AppError;
use crate::store::TransactionStore;
use crate::validation;

/// Values the engine parks in the cache.
#[derive(Debug, Clone)]
pub enum CachedValue {
    Record(Transaction),
    Listing(Vec<Transaction>),
    Statistics(SecurityStatistics),
}

const LISTING_KEY: &str = "listing:all";

fn record_key(id: Uuid) -> String {
    format!("record:{}", id)
}

fn statistics_key(security_code: &str, account_number: &str) -> String {
    format!("statistics:{}:{}", security_code, account_number)
}

#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn TransactionStore>,
    cache: Arc<TtlCache<CachedValue>>,
}

impl LedgerService {
    pub fn new(store: Arc<dyn TransactionStore>, policy: CachePolicy) -> Self {
        Self {
            store,
            cache: Arc::new(TtlCache::new(policy)),
        }
    }

    /// Validates and persists a new record. The store assigns the id; the
    /// engine stamps the recording timestamp.
    pub async fn create(&self, draft: TransactionDraft) -> Result<Transaction, AppError> {
        validation::validate_draft(&draft)?;

        let record = self.store.insert(draft, Utc::now()).await?;
        self.cache.invalidate_all();
        tracing::info!(
            id = %record.id,
            account_number = %record.account_number,
            security_code = %record.security_code,
            trans_type = %record.trans_type,
            "transaction created, cache flushed"
        );

        Ok(record)
    }

    /// Replaces every mutable field of an existing record, preserving its id
    /// and original recording timestamp.
    pub async fn update(&self, id: Uuid, draft: TransactionDraft) -> Result<Transaction, AppError> {
        let existing = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))?;

        validation::validate_draft(&draft)?;

        let merged = Transaction::from_draft(existing.id, existing.timestamp, draft);
        let updated = self.store.update(&merged).await?;
        self.cache.invalidate_all();
        tracing::info!(id = %id, "transaction updated, cache flushed");

        Ok(updated)
    }

    /// Removes a record. A missing id fails before any write, leaving the
    /// cache warm.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.store.exists_by_id(id).await? {
            return Err(not_found(id));
        }

        self.store.delete_by_id(id).await?;
        self.cache.invalidate_all();
        tracing::info!(id = %id, "transaction deleted, cache flushed");

        Ok(())
    }

    /// Read-through lookup keyed by id. Misses are not negatively cached.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Transaction, AppError> {
        let key = record_key(id);
        if let Some(CachedValue::Record(record)) = self.cache.get(&key) {
            return Ok(record);
        }

        let record = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))?;
        self.cache.insert(key, CachedValue::Record(record.clone()));

        Ok(record)
    }

    /// Read-through full listing, ordered by timestamp descending.
    pub async fn list_all(&self) -> Result<Vec<Transaction>, AppError> {
        if let Some(CachedValue::Listing(records)) = self.cache.get(LISTING_KEY) {
            return Ok(records);
        }

        let records = self.store.find_all().await?;
        self.cache
            .insert(LISTING_KEY, CachedValue::Listing(records.clone()));

        Ok(records)
    }

    /// A pure slice over the cached (or freshly fetched) full listing.
    pub async fn list_page(&self, page: i64, size: i64) -> Result<Vec<Transaction>, AppError> {
        if page < 0 || size <= 0 {
            return Err(AppError::InvalidArgument(
                "page must be non-negative and size must be positive".to_string(),
            ));
        }

        let all = self.list_all().await?;
        let start = usize::try_from(page.saturating_mul(size)).unwrap_or(usize::MAX);
        Ok(all.into_iter().skip(start).take(size as usize).collect())
    }

    /// Store-level filtered query; not cached.
    pub async fn list_by_account(&self, account_number: &str) -> Result<Vec<Transaction>, AppError> {
        if account_number.trim().is_empty() {
            return Err(AppError::InvalidArgument(
                "account number must not be blank".to_string(),
            ));
        }

        Ok(self.store.find_by_account(account_number).await?)
    }

    /// Store-level filtered query; not cached.
    pub async fn list_by_type(&self, trans_type: TransactionType) -> Result<Vec<Transaction>, AppError> {
        Ok(self.store.find_by_type(trans_type).await?)
    }

    /// Today's buy/sell/net position for a security and account, computed by
    /// scanning the current record set and cached until the next mutation or
    /// TTL expiry.
    pub async fn security_statistics(
        &self,
        security_code: &str,
        account_number: &str,
    ) -> Result<SecurityStatistics, AppError> {
        if security_code.trim().is_empty() {
            return Err(AppError::InvalidArgument(
                "security code must not be blank".to_string(),
            ));
        }
        if account_number.trim().is_empty() {
            return Err(AppError::InvalidArgument(
                "account number must not be blank".to_string(),
            ));
        }

        let key = statistics_key(security_code, account_number);
        if let Some(CachedValue::Statistics(stats)) = self.cache.get(&key) {
            return Ok(stats);
        }

        let records = self.store.find_all().await?;
        let stats = statistics::compute(
            &records,
            security_code,
            account_number,
            Utc::now().date_naive(),
        );
        self.cache.insert(key, CachedValue::Statistics(stats.clone()));

        Ok(stats)
    }

    pub async fn count(&self) -> Result<u64, AppError> {
        Ok(self.store.count().await?)
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("transaction {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn service() -> (Arc<InMemoryStore>, LedgerService) {
        let store = Arc::new(InMemoryStore::new());
        let ledger = LedgerService::new(store.clone(), CachePolicy::default());
        (store, ledger)
    }

    fn buy_draft(units: i64, price: Decimal) -> TransactionDraft {
        TransactionDraft {
            account_number: "ACCT1".to_string(),
            security_code: "000001".to_string(),
            trans_type: TransactionType::Buy,
            units,
            price,
            amount: price * Decimal::from(units),
            trans_date: Utc::now().date_naive(),
            currency: "CNY".to_string(),
            description: None,
        }
    }

    fn sell_draft(units: i64, price: Decimal) -> TransactionDraft {
        TransactionDraft {
            trans_type: TransactionType::Sell,
            ..buy_draft(units, price)
        }
    }

    #[tokio::test]
    async fn create_persists_a_valid_record() {
        let (store, ledger) = service();

        let record = ledger.create(buy_draft(1000, dec!(10.00))).await.unwrap();

        assert_eq!(record.amount, dec!(10000.00));
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(
            store.find_by_id(record.id).await.unwrap().unwrap().timestamp,
            record.timestamp
        );
    }

    #[tokio::test]
    async fn create_rejects_amount_mismatch_before_persisting() {
        let (store, ledger) = service();

        let mut draft = buy_draft(10, dec!(5.00));
        draft.amount = dec!(100.00); // 50.00 expected

        let err = ledger.create(draft).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn get_by_id_returns_not_found_for_unknown_id() {
        let (_store, ledger) = service();

        let err = ledger.get_by_id(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn get_by_id_serves_repeated_reads_from_cache() {
        let (store, ledger) = service();
        let record = ledger.create(buy_draft(100, dec!(10.00))).await.unwrap();

        assert_eq!(ledger.get_by_id(record.id).await.unwrap(), record);

        // Remove behind the engine's back; the cached copy must keep serving
        // until a mutation through the engine flushes it.
        store.delete_by_id(record.id).await.unwrap();
        assert_eq!(ledger.get_by_id(record.id).await.unwrap(), record);
    }

    #[tokio::test]
    async fn update_preserves_id_and_timestamp() {
        let (_store, ledger) = service();
        let created = ledger.create(buy_draft(100, dec!(10.00))).await.unwrap();

        let updated = ledger
            .update(created.id, sell_draft(200, dec!(11.00)))
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.timestamp, created.timestamp);
        assert_eq!(updated.trans_type, TransactionType::Sell);
        assert_eq!(updated.units, 200);
        assert_eq!(updated.amount, dec!(2200.00));
    }

    #[tokio::test]
    async fn update_unknown_id_fails_with_not_found() {
        let (_store, ledger) = service();

        let err = ledger
            .update(Uuid::new_v4(), buy_draft(100, dec!(10.00)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_revalidates_the_merged_record() {
        let (store, ledger) = service();
        let created = ledger.create(buy_draft(100, dec!(10.00))).await.unwrap();

        let mut draft = buy_draft(100, dec!(10.00));
        draft.amount = dec!(999.00);

        let err = ledger.update(created.id, draft).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let stored = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.amount, dec!(1000.00));
    }

    #[tokio::test]
    async fn mutations_flush_the_listing_cache() {
        let (_store, ledger) = service();
        ledger.create(buy_draft(100, dec!(10.00))).await.unwrap();

        assert_eq!(ledger.list_all().await.unwrap().len(), 1);

        ledger.create(buy_draft(200, dec!(10.00))).await.unwrap();
        assert_eq!(ledger.list_all().await.unwrap().len(), 2);

        let id = ledger.list_all().await.unwrap()[0].id;
        ledger.delete(id).await.unwrap();
        assert_eq!(ledger.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn listing_is_served_from_cache_between_mutations() {
        let (store, ledger) = service();
        ledger.create(buy_draft(100, dec!(10.00))).await.unwrap();
        assert_eq!(ledger.list_all().await.unwrap().len(), 1);

        // A write that bypasses the engine is invisible until the cache is
        // flushed by an engine-driven mutation.
        store
            .insert(buy_draft(300, dec!(10.00)), Utc::now())
            .await
            .unwrap();
        assert_eq!(ledger.list_all().await.unwrap().len(), 1);

        ledger.create(buy_draft(200, dec!(10.00))).await.unwrap();
        assert_eq!(ledger.list_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn delete_unknown_id_leaves_the_cache_warm() {
        let (store, ledger) = service();
        ledger.create(buy_draft(100, dec!(10.00))).await.unwrap();
        assert_eq!(ledger.list_all().await.unwrap().len(), 1);

        let err = ledger.delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(store.count().await.unwrap(), 1);

        // Still the cached listing: the failed delete must not have flushed.
        store
            .insert(buy_draft(300, dec!(10.00)), Utc::now())
            .await
            .unwrap();
        assert_eq!(ledger.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_page_validates_arguments() {
        let (_store, ledger) = service();

        assert!(matches!(
            ledger.list_page(-1, 10).await.unwrap_err(),
            AppError::InvalidArgument(_)
        ));
        assert!(matches!(
            ledger.list_page(0, 0).await.unwrap_err(),
            AppError::InvalidArgument(_)
        ));
    }

    #[tokio::test]
    async fn list_page_slices_newest_first() {
        let (_store, ledger) = service();
        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(ledger.create(buy_draft(100, dec!(10.00))).await.unwrap().id);
            tokio::time::sleep(Duration::from_millis(2)).await;
        }

        let page0 = ledger.list_page(0, 2).await.unwrap();
        assert_eq!(page0.len(), 2);
        assert_eq!(page0[0].id, ids[2]);
        assert_eq!(page0[1].id, ids[1]);

        let page1 = ledger.list_page(1, 2).await.unwrap();
        assert_eq!(page1.len(), 1);
        assert_eq!(page1[0].id, ids[0]);

        assert!(ledger.list_page(5, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_by_account_rejects_blank_account() {
        let (_store, ledger) = service();

        assert!(matches!(
            ledger.list_by_account("  ").await.unwrap_err(),
            AppError::InvalidArgument(_)
        ));
    }

    #[tokio::test]
    async fn statistics_match_the_daily_trades() {
        let (_store, ledger) = service();
        ledger.create(buy_draft(1000, dec!(10.00))).await.unwrap();
        ledger.create(sell_draft(500, dec!(10.00))).await.unwrap();

        let stats = ledger.security_statistics("000001", "ACCT1").await.unwrap();

        assert_eq!(stats.buy.total_units, 1000);
        assert_eq!(stats.buy.total_amount, dec!(10000.00));
        assert_eq!(stats.sell.total_units, 500);
        assert_eq!(stats.sell.total_amount, dec!(5000.00));
        assert_eq!(stats.net.net_units, 500);
        assert_eq!(stats.net.net_amount, dec!(5000.00));
        assert_eq!(stats.net.total_transactions, 2);
    }

    #[tokio::test]
    async fn statistics_with_no_matching_records_are_all_zero() {
        let (_store, ledger) = service();

        let stats = ledger.security_statistics("600519", "ACCT9").await.unwrap();

        assert_eq!(stats.buy.total_units, 0);
        assert_eq!(stats.sell.total_units, 0);
        assert_eq!(stats.net.net_units, 0);
        assert_eq!(stats.net.total_transactions, 0);
    }

    #[tokio::test]
    async fn statistics_reject_blank_identifiers() {
        let (_store, ledger) = service();

        assert!(matches!(
            ledger.security_statistics("", "ACCT1").await.unwrap_err(),
            AppError::InvalidArgument(_)
        ));
        assert!(matches!(
            ledger.security_statistics("000001", " ").await.unwrap_err(),
            AppError::InvalidArgument(_)
        ));
    }

    #[tokio::test]
    async fn statistics_are_cached_until_the_next_mutation() {
        let (store, ledger) = service();
        ledger.create(buy_draft(1000, dec!(10.00))).await.unwrap();

        let before = ledger.security_statistics("000001", "ACCT1").await.unwrap();
        assert_eq!(before.buy.total_units, 1000);

        // Invisible to the cached aggregate until a mutation flushes it.
        store
            .insert(buy_draft(500, dec!(10.00)), Utc::now())
            .await
            .unwrap();
        let cached = ledger.security_statistics("000001", "ACCT1").await.unwrap();
        assert_eq!(cached.buy.total_units, 1000);

        ledger.create(sell_draft(100, dec!(10.00))).await.unwrap();
        let after = ledger.security_statistics("000001", "ACCT1").await.unwrap();
        assert_eq!(after.buy.total_units, 1500);
        assert_eq!(after.sell.total_units, 100);
    }

    #[tokio::test]
    async fn count_reflects_the_store() {
        let (_store, ledger) = service();
        assert_eq!(ledger.count().await.unwrap(), 0);

        ledger.create(buy_draft(100, dec!(10.00))).await.unwrap();
        assert_eq!(ledger.count().await.unwrap(), 1);
    }
}
