use axum::extract::{rejection::PathRejection, Path, State};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Authorized, DeleteDrinks};

/// DELETE /drinks/:id - Hard delete, echoing the id back
pub async fn delete(
    State(state): State<AppState>,
    auth: Authorized<DeleteDrinks>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<i32> {
    let Path(id) = id.map_err(|_| ApiError::resource_not_found())?;
    let deleted = state.store.delete(id).await?;

    tracing::info!(drink_id = deleted, subject = ?auth.user.subject, "Drink deleted");

    Ok(ApiResponse::deleted(deleted))
}
