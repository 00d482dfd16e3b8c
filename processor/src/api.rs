use crate::config::Listener as ListenerConfig;
use crate::errors::ProcessorError;
use crate::upsert;
use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
};
use gateway::GatewayClient;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

const SECRET_HEADER: &str = "x-processor-secret";

/// Immutable per-process state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    gateway: GatewayClient,
    space_id: String,
    category: String,
    processor_secret: Option<String>,
}

impl AppState {
    pub fn new(
        gateway: GatewayClient,
        space_id: String,
        category: String,
        processor_secret: Option<String>,
    ) -> Self {
        AppState {
            gateway,
            space_id,
            category,
            processor_secret,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/process", post(process))
        .with_state(state)
}

pub async fn serve(listener: ListenerConfig, state: AppState) -> Result<(), ApiError> {
    let app = router(state);

    let addr = format!("{}:{}", listener.host, listener.port);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
}

/// Static liveness probe; never touches the gateway.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

fn default_lot_id() -> String {
    "1".to_string()
}

#[derive(Deserialize, Debug)]
struct ProcessRequest {
    /// Upload key, accepted but not used yet.
    #[serde(default)]
    #[allow(dead_code)]
    key: Option<String>,
    #[serde(default = "default_lot_id")]
    lot_id: String,
}

#[derive(Serialize)]
struct ProcessResponse {
    success: bool,
    space_id: String,
    lot_id: String,
    update_result: serde_json::Value,
}

async fn process(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ProcessRequest>,
) -> Result<Json<ProcessResponse>, ProcessorError> {
    // Guard clause: when a secret is configured it must match before any
    // gateway interaction happens.
    if let Some(secret) = &state.processor_secret {
        let header = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        if header != Some(secret.as_str()) {
            tracing::warn!("rejected request: missing/invalid processor secret");
            return Err(ProcessorError::InvalidSecret);
        }
    }

    let update_result = upsert::ensure_occupied(
        &state.gateway,
        &state.space_id,
        &state.category,
        &request.lot_id,
    )
    .await?;

    Ok(Json(ProcessResponse {
        success: true,
        space_id: state.space_id.clone(),
        lot_id: request.lot_id,
        update_result,
    }))
}
