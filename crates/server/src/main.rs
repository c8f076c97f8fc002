use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use server_api::{add_token, delete_token, list_tokens, update_token, ApiContext};
use shared::{
    domain::{TokenId, TokenRecord},
    error::{ApiError, ErrorCode},
    protocol::{AddTokenRequest, AddTokenResponse, UpdateTokenRequest},
};
use storage::Storage;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, prepare_database_url};

const MAX_REQUEST_BODY_BYTES: usize = 16 * 1024;

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .init();

    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, %database_url, "token registry listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("token registry stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(%err, "failed to install ctrl-c handler");
    }
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/tokens", get(http_list_tokens).post(http_add_token))
        .route(
            "/tokens/:token_id",
            put(http_update_token).delete(http_delete_token),
        )
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    match state.api.storage.health_check().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(err) => {
            error!(%err, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "storage unavailable")
        }
    }
}

async fn http_list_tokens(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<TokenRecord>>> {
    let tokens = list_tokens(&state.api).await.map_err(into_response)?;
    Ok(Json(tokens))
}

async fn http_add_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddTokenRequest>,
) -> ApiResult<(StatusCode, Json<AddTokenResponse>)> {
    let created = add_token(&state.api, req).await.map_err(into_response)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn http_update_token(
    State(state): State<Arc<AppState>>,
    Path(token_id): Path<i64>,
    Json(req): Json<UpdateTokenRequest>,
) -> ApiResult<StatusCode> {
    update_token(&state.api, TokenId(token_id), req)
        .await
        .map_err(into_response)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn http_delete_token(
    State(state): State<Arc<AppState>>,
    Path(token_id): Path<i64>,
) -> ApiResult<StatusCode> {
    delete_token(&state.api, TokenId(token_id))
        .await
        .map_err(into_response)?;
    Ok(StatusCode::NO_CONTENT)
}

fn into_response(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => {
            error!(message = %err.message, "registry request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(err))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
