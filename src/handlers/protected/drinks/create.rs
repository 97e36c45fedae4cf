use axum::extract::{rejection::JsonRejection, State};
use axum::Json;

use super::payload::{validate_body, DrinkPayload};
use crate::app::AppState;
use crate::database::models::DrinkLong;
use crate::middleware::{ApiResponse, ApiResult, Authorized, PostDrinks};

/// POST /drinks - Create a drink from `{title, recipe}`
pub async fn post(
    State(state): State<AppState>,
    auth: Authorized<PostDrinks>,
    payload: Result<Json<DrinkPayload>, JsonRejection>,
) -> ApiResult<Vec<DrinkLong>> {
    let drink = validate_body(payload)?;
    let created = state.store.create(drink).await?;

    tracing::info!(
        drink_id = created.id,
        title = %created.title,
        subject = ?auth.user.subject,
        "Drink created"
    );

    Ok(ApiResponse::long_drinks(vec![created.long()]))
}
