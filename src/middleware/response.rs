use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::database::models::{DrinkLong, DrinkShort};
use crate::error::ApiError;

/// Success envelope: `{"success": true, <key>: <data>}`
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub key: &'static str,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response, always 200
    pub fn success(key: &'static str, data: T) -> Self {
        Self { key, data }
    }
}

impl ApiResponse<Vec<DrinkShort>> {
    pub fn short_drinks(drinks: Vec<DrinkShort>) -> Self {
        Self::success("drinks", drinks)
    }
}

impl ApiResponse<Vec<DrinkLong>> {
    pub fn long_drinks(drinks: Vec<DrinkLong>) -> Self {
        Self::success("drinks", drinks)
    }
}

impl ApiResponse<i32> {
    pub fn deleted(id: i32) -> Self {
        Self::success("delete", id)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return ApiError::internal_server_error("Failed to serialize response data")
                    .into_response();
            }
        };

        let mut envelope = Map::new();
        envelope.insert("success".to_string(), json!(true));
        envelope.insert(self.key.to_string(), data_value);

        (StatusCode::OK, Json(Value::Object(envelope))).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::IngredientShort;

    async fn body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn wraps_data_under_key() {
        let response = ApiResponse::deleted(4).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await, json!({"success": true, "delete": 4}));
    }

    #[tokio::test]
    async fn short_drinks_sit_under_drinks_key() {
        let drinks = vec![DrinkShort {
            id: 1,
            title: "Water".into(),
            recipe: vec![IngredientShort { color: "blue".into() }],
        }];
        let response = ApiResponse::short_drinks(drinks).into_response();
        assert_eq!(
            body(response).await,
            json!({"success": true, "drinks": [{"id": 1, "title": "Water", "recipe": [{"color": "blue"}]}]})
        );
    }
}
