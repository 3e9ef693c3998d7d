//! Axum REST API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::error;

use crate::db;
use crate::errors::IndexerError;
use crate::events::{sum_amounts, EventRecord};

#[derive(Clone)]
pub struct ApiState {
    pub pool: SqlitePool,
}

// ─────────────────────────────────────────────────────────
// Response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct AccountEventsResponse {
    pub account: String,
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct AllEventsResponse {
    pub count: usize,
    pub events: Vec<EventRecord>,
}

#[derive(Serialize)]
pub struct AmountFundedResponse {
    pub account: String,
    /// Smallest currency units, as a decimal string.
    pub amount_funded: String,
    pub contributions: usize,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn internal_error(e: IndexerError) -> Response {
    error!("API query failed: {e}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events", get(get_all_events))
        .route("/accounts/:address/events", get(get_account_events))
        .route("/accounts/:address/funded", get(get_amount_funded))
        .with_state(state)
}

// ─────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /events`
pub async fn get_all_events(State(state): State<Arc<ApiState>>) -> Response {
    match db::get_all_events(&state.pool).await {
        Ok(events) => {
            let count = events.len();
            (StatusCode::OK, Json(AllEventsResponse { count, events })).into_response()
        }
        Err(e) => internal_error(e),
    }
}

/// `GET /accounts/:address/events`
///
/// Every `funded` and `withdrawn` event naming the account.
pub async fn get_account_events(
    State(state): State<Arc<ApiState>>,
    Path(account): Path<String>,
) -> Response {
    match db::get_events_for_account(&state.pool, &account).await {
        Ok(events) => {
            let count = events.len();
            (
                StatusCode::OK,
                Json(AccountEventsResponse {
                    account,
                    count,
                    events,
                }),
            )
                .into_response()
        }
        Err(e) => internal_error(e),
    }
}

/// `GET /accounts/:address/funded`
///
/// Off-chain view of `get_address_to_amount_funded`: the account's
/// contributions since the latest withdrawal.
pub async fn get_amount_funded(
    State(state): State<Arc<ApiState>>,
    Path(account): Path<String>,
) -> Response {
    match db::get_current_cycle_contributions(&state.pool, &account).await {
        Ok(events) => (
            StatusCode::OK,
            Json(AmountFundedResponse {
                account,
                amount_funded: sum_amounts(&events).to_string(),
                contributions: events.len(),
            }),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}
