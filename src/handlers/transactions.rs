//! HTTP handlers for the transaction API. Thin: requests are normalized into
//! drafts here, everything else is delegated to the ledger engine.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::AppState;
use crate::domain::transaction::{TransactionDraft, TransactionType};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct TransactionRequest {
    pub account_number: String,
    pub security_code: String,
    pub trans_type: TransactionType,
    pub units: i64,
    pub price: Decimal,
    pub amount: Decimal,
    pub trans_date: Option<NaiveDate>,
    pub currency: Option<String>,
    pub description: Option<String>,
}

impl TransactionRequest {
    /// Request-time normalization: a blank or missing currency falls back to
    /// the configured default, a missing trade date to today. The validator
    /// downstream still rejects blanks, so the fallback never masks a
    /// blank-currency record that reached the store.
    fn into_draft(self, default_currency: &str) -> TransactionDraft {
        let currency = match self.currency {
            Some(currency) if !currency.trim().is_empty() => currency,
            _ => default_currency.to_string(),
        };

        TransactionDraft {
            account_number: self.account_number,
            security_code: self.security_code,
            trans_type: self.trans_type,
            units: self.units,
            price: self.price,
            amount: self.amount,
            trans_date: self.trans_date.unwrap_or_else(|| Utc::now().date_naive()),
            currency,
            description: self.description,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<TransactionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let draft = request.into_draft(&state.default_currency);
    let record = state.ledger.create(draft).await?;

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let record = state.ledger.get_by_id(id).await?;

    Ok(Json(record))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<TransactionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let draft = request.into_draft(&state.default_currency);
    let record = state.ledger.update(id, draft).await?;

    Ok(Json(record))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.ledger.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = params.page.unwrap_or(0);
    let size = params.size.unwrap_or(10);
    let records = state.ledger.list_page(page, size).await?;

    Ok(Json(records))
}

pub async fn list_by_account(
    State(state): State<AppState>,
    Path(account_number): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let records = state.ledger.list_by_account(&account_number).await?;

    Ok(Json(records))
}

pub async fn list_by_type(
    State(state): State<AppState>,
    Path(trans_type): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let trans_type: TransactionType = trans_type
        .parse()
        .map_err(|e: crate::domain::transaction::UnknownTransactionType| {
            AppError::InvalidArgument(e.to_string())
        })?;
    let records = state.ledger.list_by_type(trans_type).await?;

    Ok(Json(records))
}

pub async fn security_statistics(
    State(state): State<AppState>,
    Path((security_code, account_number)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let stats = state
        .ledger
        .security_statistics(&security_code, &account_number)
        .await?;

    Ok(Json(stats))
}

pub async fn count(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let count = state.ledger.count().await?;

    Ok(Json(json!({ "count": count })))
}
