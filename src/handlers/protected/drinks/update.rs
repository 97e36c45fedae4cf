use axum::extract::{
    rejection::{JsonRejection, PathRejection},
    Path, State,
};
use axum::Json;

use super::payload::{validate_body, DrinkPayload};
use crate::app::AppState;
use crate::database::models::DrinkLong;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Authorized, PatchDrinks};

/// PATCH /drinks/:id - Replace title and recipe of an existing drink
///
/// Both fields are required; there is no partial patch. The body is validated
/// before the store is touched, so an invalid body never changes a record.
pub async fn patch(
    State(state): State<AppState>,
    auth: Authorized<PatchDrinks>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<DrinkPayload>, JsonRejection>,
) -> ApiResult<Vec<DrinkLong>> {
    let Path(id) = id.map_err(|_| ApiError::resource_not_found())?;
    let drink = validate_body(payload)?;
    let updated = state.store.update(id, drink).await?;

    tracing::info!(
        drink_id = updated.id,
        title = %updated.title,
        subject = ?auth.user.subject,
        "Drink updated"
    );

    Ok(ApiResponse::long_drinks(vec![updated.long()]))
}
