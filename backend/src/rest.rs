//! REST surface of the finance dashboard: account balances, transactions,
//! analytics, the category catalog and the chat assistant.
//!
//! Handlers stay thin: they validate query parameters, pull records from
//! the injected store and delegate to the domain services.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{Days, NaiveDate};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use shared::{
    AccountResponse, AlertsResponse, BalanceSummary, ChatRequest, ChatResponse, ChatSession,
    EnrichedTransaction, TransactionCategory, TransactionResponse, TrendStatistics,
};

use crate::domain::analytics::{
    calculate_balance_summary, calculate_transaction_trends, detect_low_balance_alerts,
};
use crate::domain::chatbot::{process_chat_message, ChatContext, ChatError, ChatSessionStore};
use crate::domain::enrichment::{
    category_catalog, enrich_transaction, filter_transactions, FilterCriteria,
};
use crate::error::ApiError;
use crate::llm::ModelClient;
use crate::store::MockDataStore;

const DEFAULT_ALERT_THRESHOLD: f64 = 0.1;

/// Application state shared across handlers: the mock data snapshot, the
/// chat session store and the assistant model client.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MockDataStore>,
    pub sessions: Arc<ChatSessionStore>,
    pub model: Arc<ModelClient>,
}

impl AppState {
    pub fn new(
        store: Arc<MockDataStore>,
        sessions: Arc<ChatSessionStore>,
        model: Arc<ModelClient>,
    ) -> Self {
        Self {
            store,
            sessions,
            model,
        }
    }
}

/// Build the full application router.
pub fn api_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/bank-account-balances", get(get_account_balances))
        .route("/bank-transactions", get(get_transactions))
        .route("/balance-summary", get(get_balance_summary))
        .route("/alerts", get(get_alerts))
        .route("/transactions/enriched", get(get_enriched_transactions))
        .route("/transactions/trends", get(get_transaction_trends))
        .route("/categories", get(get_categories))
        .route("/chat", post(send_chat_message))
        .route("/chat/history/:session_id", get(get_chat_history))
        .route("/chat/sessions", get(list_chat_sessions))
        .route("/chat/:session_id", delete(delete_chat_session));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", api)
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Finance Dashboard API", "version": "1.0.0" }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

fn parse_date(value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest("Invalid date format. Use YYYY-MM-DD".to_string()))
}

/// Query parameters selecting account balance snapshots: a single date, or
/// an inclusive start/end range.
#[derive(Debug, Deserialize)]
struct BalanceQuery {
    date: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

impl BalanceQuery {
    /// Resolve the selected snapshots. Single-date mode equality-matches
    /// without validating the format (an unparseable date simply matches
    /// nothing); range mode validates both bounds.
    fn select(&self, store: &MockDataStore) -> Result<Vec<AccountResponse>, ApiError> {
        if let Some(date) = &self.date {
            return Ok(store.accounts_on(date));
        }
        if let (Some(start), Some(end)) = (&self.start_date, &self.end_date) {
            parse_date(start)?;
            parse_date(end)?;
            return Ok(store.accounts_between(start, end));
        }
        Err(ApiError::BadRequest(
            "Either 'date' or both 'start_date' and 'end_date' must be provided".to_string(),
        ))
    }
}

async fn get_account_balances(
    State(state): State<AppState>,
    Query(query): Query<BalanceQuery>,
) -> Result<Json<Vec<AccountResponse>>, ApiError> {
    info!("GET /api/v1/bank-account-balances - query: {:?}", query);
    Ok(Json(query.select(&state.store)?))
}

#[derive(Debug, Deserialize)]
struct TransactionWindowQuery {
    from_date: Option<String>,
    to_date: Option<String>,
}

impl TransactionWindowQuery {
    fn window(&self) -> Result<(&str, &str), ApiError> {
        let (from, to) = match (&self.from_date, &self.to_date) {
            (Some(from), Some(to)) => (from.as_str(), to.as_str()),
            _ => {
                return Err(ApiError::BadRequest(
                    "Both 'from_date' and 'to_date' must be provided".to_string(),
                ))
            }
        };
        let start = parse_date(from)?;
        let end = parse_date(to)?;
        if start > end {
            return Err(ApiError::BadRequest(
                "from_date must be before or equal to to_date".to_string(),
            ));
        }
        Ok((from, to))
    }
}

async fn get_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionWindowQuery>,
) -> Result<Json<Vec<TransactionResponse>>, ApiError> {
    info!("GET /api/v1/bank-transactions - query: {:?}", query);
    let (from, to) = query.window()?;
    Ok(Json(state.store.transactions_between(from, to)))
}

async fn get_balance_summary(
    State(state): State<AppState>,
    Query(query): Query<BalanceQuery>,
) -> Result<Json<BalanceSummary>, ApiError> {
    info!("GET /api/v1/balance-summary - query: {:?}", query);
    let accounts = query.select(&state.store)?;
    let as_of = query.date.clone().or_else(|| query.start_date.clone());
    Ok(Json(calculate_balance_summary(accounts, as_of)))
}

#[derive(Debug, Deserialize)]
struct AlertQuery {
    threshold: Option<f64>,
}

async fn get_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertQuery>,
) -> Result<Json<AlertsResponse>, ApiError> {
    info!("GET /api/v1/alerts - query: {:?}", query);
    let threshold = query.threshold.unwrap_or(DEFAULT_ALERT_THRESHOLD);

    // Alerts are evaluated against the most recent snapshot in the store.
    let accounts = match state.store.latest_snapshot_date() {
        Some(date) => state.store.accounts_on(&date),
        None => Vec::new(),
    };
    let alerts = detect_low_balance_alerts(&accounts, threshold);
    let count = alerts.len();

    Ok(Json(AlertsResponse { alerts, count }))
}

#[derive(Debug, Deserialize)]
struct EnrichedQuery {
    from_date: Option<String>,
    to_date: Option<String>,
    category: Option<String>,
    min_amount: Option<f64>,
    max_amount: Option<f64>,
    is_debit: Option<bool>,
}

async fn get_enriched_transactions(
    State(state): State<AppState>,
    Query(query): Query<EnrichedQuery>,
) -> Result<Json<Vec<EnrichedTransaction>>, ApiError> {
    info!("GET /api/v1/transactions/enriched - query: {:?}", query);
    let window = TransactionWindowQuery {
        from_date: query.from_date.clone(),
        to_date: query.to_date.clone(),
    };
    let (from, to) = window.window()?;

    let enriched: Vec<EnrichedTransaction> = state
        .store
        .transactions_between(from, to)
        .iter()
        .map(enrich_transaction)
        .collect();

    let criteria = FilterCriteria {
        category_ids: query.category.clone().map(|category| vec![category]),
        min_amount: query.min_amount,
        max_amount: query.max_amount,
        is_debit: query.is_debit,
    };
    Ok(Json(filter_transactions(enriched, &criteria)))
}

async fn get_transaction_trends(
    State(state): State<AppState>,
    Query(query): Query<TransactionWindowQuery>,
) -> Result<Json<TrendStatistics>, ApiError> {
    info!("GET /api/v1/transactions/trends - query: {:?}", query);
    let (from, to) = query.window()?;

    let enriched: Vec<EnrichedTransaction> = state
        .store
        .transactions_between(from, to)
        .iter()
        .map(enrich_transaction)
        .collect();

    Ok(Json(calculate_transaction_trends(&enriched)))
}

async fn get_categories() -> Json<Vec<TransactionCategory>> {
    Json(category_catalog().to_vec())
}

/// Financial context for the assistant: balance summary over the latest
/// snapshot plus the transaction count of the trailing 30 days.
fn build_chat_context(store: &MockDataStore) -> ChatContext {
    let latest = match store.latest_snapshot_date() {
        Some(date) => date,
        None => return ChatContext::default(),
    };

    let summary = calculate_balance_summary(store.accounts_on(&latest), Some(latest.clone()));
    let window_start = NaiveDate::parse_from_str(&latest, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.checked_sub_days(Days::new(30)))
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| latest.clone());
    let recent = store.transactions_between(&window_start, &latest);

    ChatContext {
        total_balance: Some(summary.total_balance),
        currency: Some(summary.currency),
        account_count: Some(summary.account_count),
        recent_transaction_count: Some(recent.len()),
    }
}

async fn send_chat_message(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    info!("POST /api/v1/chat - session: {:?}", request.session_id);
    let context = build_chat_context(&state.store);

    match process_chat_message(&state.sessions, &state.model, request, &context).await {
        Ok(response) => Ok(Json(response)),
        Err(ChatError::SessionNotFound(id)) => {
            Err(ApiError::NotFound(format!("Session {id} introuvable")))
        }
    }
}

async fn get_chat_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ChatSession>, ApiError> {
    info!("GET /api/v1/chat/history/{session_id}");
    match state.sessions.get(&session_id).await {
        Some(session) => Ok(Json(session)),
        None => Err(ApiError::NotFound(format!(
            "Session {session_id} introuvable"
        ))),
    }
}

async fn delete_chat_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    info!("DELETE /api/v1/chat/{session_id}");
    if state.sessions.remove(&session_id).await {
        Ok(Json(json!({
            "message": format!("Session {session_id} supprimée avec succès")
        })))
    } else {
        Err(ApiError::NotFound(format!(
            "Session {session_id} introuvable"
        )))
    }
}

async fn list_chat_sessions(State(state): State<AppState>) -> Json<Vec<ChatSession>> {
    Json(state.sessions.active_sessions().await)
}
