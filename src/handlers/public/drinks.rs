use axum::extract::State;

use crate::app::AppState;
use crate::database::models::DrinkShort;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /drinks - All drinks, short projection, no token required
pub async fn get(State(state): State<AppState>) -> ApiResult<Vec<DrinkShort>> {
    let drinks = state.store.list().await?;

    if drinks.is_empty() {
        return Err(ApiError::resource_not_found());
    }

    Ok(ApiResponse::short_drinks(drinks.iter().map(|d| d.short()).collect()))
}
