pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

use std::sync::Arc;

pub use memory::MemoryDrinkStore;
pub use postgres::PgDrinkStore;
pub use store::{DatabaseError, DrinkStore};

use crate::config::DatabaseConfig;

/// Build the configured store: Postgres when a URL is present, memory otherwise
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn DrinkStore>, DatabaseError> {
    match &config.url {
        Some(url) => {
            let store = PgDrinkStore::connect(url, config).await?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; drinks are kept in memory and lost on restart");
            Ok(Arc::new(MemoryDrinkStore::new()))
        }
    }
}
