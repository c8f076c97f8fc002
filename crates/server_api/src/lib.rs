use shared::{
    domain::{TokenId, TokenRecord},
    error::{ApiError, ErrorCode},
    protocol::{AddTokenRequest, AddTokenResponse, UpdateTokenRequest},
};
use storage::Storage;
use tracing::info;

/// Largest supply the store can hold.
pub const MAX_SUPPLY: u64 = i64::MAX as u64;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub async fn list_tokens(ctx: &ApiContext) -> Result<Vec<TokenRecord>, ApiError> {
    ctx.storage.list_tokens().await.map_err(internal)
}

pub async fn add_token(
    ctx: &ApiContext,
    request: AddTokenRequest,
) -> Result<AddTokenResponse, ApiError> {
    ensure_name(&request.name)?;
    let supply = supply_from_wire(request.initial_supply, "initial_supply")?;
    let token_id = ctx
        .storage
        .create_token(&request.name, &request.symbol, supply)
        .await
        .map_err(internal)?;
    info!(token_id = token_id.0, symbol = %request.symbol, supply, "token added");
    Ok(AddTokenResponse { token_id })
}

pub async fn update_token(
    ctx: &ApiContext,
    token_id: TokenId,
    request: UpdateTokenRequest,
) -> Result<(), ApiError> {
    ensure_name(&request.name)?;
    let supply = supply_from_wire(request.total_supply, "total_supply")?;
    let updated = ctx
        .storage
        .update_token(token_id, &request.name, &request.symbol, supply)
        .await
        .map_err(internal)?;
    if !updated {
        return Err(ApiError::not_found(format!("token {token_id} not found")));
    }
    info!(token_id = token_id.0, supply, "token updated");
    Ok(())
}

pub async fn delete_token(ctx: &ApiContext, token_id: TokenId) -> Result<(), ApiError> {
    let deleted = ctx
        .storage
        .delete_token(token_id)
        .await
        .map_err(internal)?;
    if !deleted {
        return Err(ApiError::not_found(format!("token {token_id} not found")));
    }
    info!(token_id = token_id.0, "token deleted");
    Ok(())
}

fn ensure_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::validation("token name must not be empty"));
    }
    Ok(())
}

/// Accepts only finite, whole, non-negative numbers that fit the store.
pub fn supply_from_wire(value: Option<f64>, field: &str) -> Result<u64, ApiError> {
    let Some(value) = value else {
        return Err(ApiError::validation(format!(
            "{field} must be a number, got null"
        )));
    };
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value >= MAX_SUPPLY as f64 {
        return Err(ApiError::validation(format!(
            "{field} must be a whole number between 0 and {MAX_SUPPLY}, got {value}"
        )));
    }
    Ok(value as u64)
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}
