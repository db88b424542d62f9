//! HTTP surface: status endpoints and the two authenticated flow triggers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tokio::task::JoinError;
use tracing::{error, info, warn};
use treasury::{FlowResult, LiquidityOutcome, LiquidityStrategy, WithdrawStrategy};

const SECRET_HEADER: &str = "x-secret-key";

/// Shared handler state.
///
/// Each flow runs on its own task holding its lock, so a caller that hangs up
/// does not cut a flow short between two transactions.
pub struct AppState {
    secret: String,
    withdraw: WithdrawStrategy,
    liquidity: LiquidityStrategy,
    withdraw_lock: Arc<Mutex<()>>,
    liquidity_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(secret: String, withdraw: WithdrawStrategy, liquidity: LiquidityStrategy) -> Self {
        Self {
            secret,
            withdraw,
            liquidity,
            withdraw_lock: Arc::new(Mutex::new(())),
            liquidity_lock: Arc::new(Mutex::new(())),
        }
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        headers
            .get(SECRET_HEADER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value == self.secret)
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/status", get(status))
        .route("/withdraw", post(withdraw))
        .route("/addLiquidity", post(add_liquidity))
        .with_state(state)
}

async fn index() -> &'static str {
    "QS Token Manager API is running!"
}

async fn status() -> Json<Value> {
    Json(json!({
        "message": "QS Token Manager is running!",
        "scheduledWithdraw": "Daily at 11:00 PM UTC",
        "scheduledAddLiquidity": "Daily at 11:30 PM UTC",
    }))
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"error": "Unauthorized"}))).into_response()
}

fn busy(flow: &str) -> Response {
    (
        StatusCode::CONFLICT,
        Json(FlowResult::failure(format!("{flow} already in progress"))),
    )
        .into_response()
}

fn aborted(flow: &str, e: JoinError) -> Response {
    error!(error = %e, "{flow} task aborted");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(FlowResult::failure(format!("{flow} task aborted"))),
    )
        .into_response()
}

async fn withdraw(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        warn!(route = "/withdraw", "rejected request with bad secret");
        return unauthorized();
    }
    let Ok(guard) = state.withdraw_lock.clone().try_lock_owned() else {
        warn!("withdrawal already running");
        return busy("Withdrawal");
    };

    info!("withdrawal triggered");
    let task = tokio::spawn(async move {
        let _guard = guard;
        state.withdraw.execute().await
    });
    match task.await {
        Ok(Ok(outcome)) => (StatusCode::OK, Json(FlowResult::from(&outcome))).into_response(),
        Ok(Err(e)) => {
            error!(error = %format!("{e:#}"), "withdrawal failed");
            let body = FlowResult {
                message: Some(format!("{e:#}")),
                ..FlowResult::default()
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
        Err(e) => aborted("Withdrawal", e),
    }
}

async fn add_liquidity(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        warn!(route = "/addLiquidity", "rejected request with bad secret");
        return unauthorized();
    }
    let Ok(guard) = state.liquidity_lock.clone().try_lock_owned() else {
        warn!("liquidity addition already running");
        return busy("Liquidity addition");
    };

    info!("liquidity addition triggered");
    let task = tokio::spawn(async move {
        let _guard = guard;
        state.liquidity.execute().await
    });
    let outcome = match task.await {
        Ok(outcome) => outcome,
        Err(e) => return aborted("Liquidity addition", e),
    };
    let code = match outcome {
        LiquidityOutcome::Added(_) => StatusCode::OK,
        LiquidityOutcome::Declined { .. } | LiquidityOutcome::Failed { .. } => {
            StatusCode::BAD_REQUEST
        }
    };
    (code, Json(FlowResult::from(&outcome))).into_response()
}
