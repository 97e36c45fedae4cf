use async_trait::async_trait;
use thiserror::Error;

use super::models::{Drink, NewDrink};

/// Errors from the drink store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Drink {0} not found")]
    NotFound(i32),

    #[error("Drink title already exists: {0}")]
    DuplicateTitle(String),

    #[error("Stored recipe for drink {id} is unreadable: {source}")]
    CorruptRecipe {
        id: i32,
        #[source]
        source: serde_json::Error,
    },

    #[error("Recipe serialization failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence for drink records. Every call touches a single record (or the
/// whole table for `list`/`reset`) in one statement.
#[async_trait]
pub trait DrinkStore: Send + Sync {
    /// All drinks in id order.
    async fn list(&self) -> Result<Vec<Drink>, DatabaseError>;

    async fn get(&self, id: i32) -> Result<Drink, DatabaseError>;

    /// Insert and return the drink with its assigned id.
    async fn create(&self, drink: NewDrink) -> Result<Drink, DatabaseError>;

    /// Replace title and recipe wholesale.
    async fn update(&self, id: i32, drink: NewDrink) -> Result<Drink, DatabaseError>;

    /// Hard delete, returning the removed id.
    async fn delete(&self, id: i32) -> Result<i32, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;

    /// Drop every record and seed the default drink.
    async fn reset(&self) -> Result<(), DatabaseError>;

    /// Release pooled connections on shutdown.
    async fn close(&self) {}
}
