use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::Deserialize;

use crate::database::models::{Ingredient, NewDrink};
use crate::error::ApiError;

/// Request body for create and update, before validation
#[derive(Debug, Deserialize)]
pub struct DrinkPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub recipe: Option<RecipeInput>,
}

/// A recipe may be sent as a list or as a single ingredient object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RecipeInput {
    Many(Vec<IngredientInput>),
    One(IngredientInput),
}

#[derive(Debug, Deserialize)]
pub struct IngredientInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub parts: Option<i64>,
}

/// Turn the raw body extraction into a validated drink, or a 422
pub fn validate_body(payload: Result<Json<DrinkPayload>, JsonRejection>) -> Result<NewDrink, ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::debug!("Rejected drink body: {}", rejection.body_text());
        ApiError::unprocessable(format!("unprocessable: {}", rejection.body_text()))
    })?;
    payload.validate()
}

impl DrinkPayload {
    pub fn validate(self) -> Result<NewDrink, ApiError> {
        let title = required_text(self.title, "title")?;

        let entries = match self.recipe {
            Some(RecipeInput::Many(entries)) => entries,
            Some(RecipeInput::One(entry)) => vec![entry],
            None => return Err(ApiError::unprocessable("recipe is required")),
        };
        if entries.is_empty() {
            return Err(ApiError::unprocessable("recipe must list at least one ingredient"));
        }

        let recipe = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| entry.validate(index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NewDrink { title, recipe })
    }
}

impl IngredientInput {
    fn validate(self, index: usize) -> Result<Ingredient, ApiError> {
        let name = required_text(self.name, &format!("recipe[{}].name", index))?;
        let color = required_text(self.color, &format!("recipe[{}].color", index))?;
        let parts = match self.parts {
            Some(parts) if (1..=i64::from(u32::MAX)).contains(&parts) => parts as u32,
            Some(_) => {
                return Err(ApiError::unprocessable(format!(
                    "recipe[{}].parts must be a positive integer",
                    index
                )))
            }
            None => {
                return Err(ApiError::unprocessable(format!("recipe[{}].parts is required", index)))
            }
        };

        Ok(Ingredient { name, color, parts })
    }
}

fn required_text(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::unprocessable(format!("{} is required", field))),
    }
}
