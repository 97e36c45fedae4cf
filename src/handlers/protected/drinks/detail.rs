use axum::extract::State;

use crate::app::AppState;
use crate::database::models::DrinkLong;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Authorized, GetDrinksDetail};

/// GET /drinks-detail - All drinks with full recipes
pub async fn get(
    State(state): State<AppState>,
    _auth: Authorized<GetDrinksDetail>,
) -> ApiResult<Vec<DrinkLong>> {
    let drinks = state.store.list().await?;

    if drinks.is_empty() {
        return Err(ApiError::resource_not_found());
    }

    Ok(ApiResponse::long_drinks(drinks.iter().map(|d| d.long()).collect()))
}
