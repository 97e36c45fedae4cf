use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    pub parts: u32,
}

/// A stored drink. `id` is assigned by the store and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Validated input for create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Public projection: ingredient names and quantities are withheld.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrinkShort {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<IngredientShort>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngredientShort {
    pub color: String,
}

/// Full projection returned to callers holding the detail scope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrinkLong {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl Drink {
    pub fn short(&self) -> DrinkShort {
        DrinkShort {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .iter()
                .map(|i| IngredientShort {
                    color: i.color.clone(),
                })
                .collect(),
        }
    }

    pub fn long(&self) -> DrinkLong {
        DrinkLong {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.clone(),
        }
    }
}

/// Row shape of the `drinks` table; the recipe column holds serialized JSON.
#[derive(Debug, Clone, FromRow)]
pub struct DrinkRow {
    pub id: i32,
    pub title: String,
    pub recipe: String,
}

impl TryFrom<DrinkRow> for Drink {
    type Error = serde_json::Error;

    fn try_from(row: DrinkRow) -> Result<Self, Self::Error> {
        Ok(Drink {
            id: row.id,
            title: row.title,
            recipe: serde_json::from_str(&row.recipe)?,
        })
    }
}

/// Serialize a recipe for the text column.
pub fn encode_recipe(recipe: &[Ingredient]) -> Result<String, serde_json::Error> {
    serde_json::to_string(recipe)
}

/// The drink written by a store reset.
pub fn seed_drink() -> NewDrink {
    NewDrink {
        title: "water".to_string(),
        recipe: vec![Ingredient {
            name: "water".to_string(),
            color: "blue".to_string(),
            parts: 1,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn latte() -> Drink {
        Drink {
            id: 3,
            title: "Latte".to_string(),
            recipe: vec![
                Ingredient {
                    name: "espresso".to_string(),
                    color: "brown".to_string(),
                    parts: 1,
                },
                Ingredient {
                    name: "milk".to_string(),
                    color: "white".to_string(),
                    parts: 3,
                },
            ],
        }
    }

    #[test]
    fn short_projection_hides_names_and_parts() {
        let value = serde_json::to_value(latte().short()).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 3,
                "title": "Latte",
                "recipe": [{"color": "brown"}, {"color": "white"}]
            })
        );
    }

    #[test]
    fn long_projection_keeps_full_recipe() {
        let value = serde_json::to_value(latte().long()).unwrap();
        assert_eq!(value["recipe"][1], json!({"name": "milk", "color": "white", "parts": 3}));
    }

    #[test]
    fn row_decodes_stored_recipe() {
        let drink = latte();
        let row = DrinkRow {
            id: drink.id,
            title: drink.title.clone(),
            recipe: encode_recipe(&drink.recipe).unwrap(),
        };
        assert_eq!(Drink::try_from(row).unwrap(), drink);
    }

    #[test]
    fn corrupt_recipe_column_is_an_error() {
        let row = DrinkRow {
            id: 1,
            title: "Broken".to_string(),
            recipe: "{not json".to_string(),
        };
        assert!(Drink::try_from(row).is_err());
    }
}
