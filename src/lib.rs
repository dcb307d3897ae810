pub mod cache;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod store;
pub mod validation;

use axum::{
    Router,
    routing::get,
};
use tower_http::cors::CorsLayer;

use crate::services::LedgerService;

#[derive(Clone)]
pub struct AppState {
    pub ledger: LedgerService,
    pub default_currency: String,
}

pub fn create_app(state: AppState) -> Router {
    use crate::handlers::transactions;

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/api/transactions/count", get(transactions::count))
        .route(
            "/api/transactions/:id",
            get(transactions::get_by_id)
                .put(transactions::update)
                .delete(transactions::delete),
        )
        .route(
            "/api/transactions/account/:account_number",
            get(transactions::list_by_account),
        )
        .route(
            "/api/transactions/type/:trans_type",
            get(transactions::list_by_type),
        )
        .route(
            "/api/transactions/security/:security_code/account/:account_number/statistics",
            get(transactions::security_statistics),
        )
        .layer(axum::middleware::from_fn(middleware::request_logger))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
