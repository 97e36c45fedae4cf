use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use super::models::drink::{encode_recipe, seed_drink};
use super::models::{Drink, DrinkRow, NewDrink};
use super::store::{DatabaseError, DrinkStore};
use crate::config::DatabaseConfig;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS drinks (
        id SERIAL PRIMARY KEY,
        title TEXT NOT NULL UNIQUE,
        recipe TEXT NOT NULL
    )
"#;

/// Postgres-backed drink store over a shared connection pool
pub struct PgDrinkStore {
    pool: PgPool,
}

impl PgDrinkStore {
    /// Open a pool against `url` and make sure the table exists
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let url = Self::validate_url(url)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&url)
            .await?;

        info!(
            "Created database pool (max_connections={})",
            config.max_connections
        );

        let store = Self::from_pool(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    fn validate_url(raw: &str) -> Result<String, DatabaseError> {
        let url = url::Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        match url.scheme() {
            "postgres" | "postgresql" => Ok(url.into()),
            _ => Err(DatabaseError::InvalidDatabaseUrl),
        }
    }

    fn decode(row: DrinkRow) -> Result<Drink, DatabaseError> {
        let id = row.id;
        Drink::try_from(row).map_err(|source| DatabaseError::CorruptRecipe { id, source })
    }

    fn write_error(err: sqlx::Error, title: &str) -> DatabaseError {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DatabaseError::DuplicateTitle(title.to_string())
            }
            _ => DatabaseError::Sqlx(err),
        }
    }
}

#[async_trait]
impl DrinkStore for PgDrinkStore {
    async fn list(&self) -> Result<Vec<Drink>, DatabaseError> {
        let rows: Vec<DrinkRow> =
            sqlx::query_as("SELECT id, title, recipe FROM drinks ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(Self::decode).collect()
    }

    async fn get(&self, id: i32) -> Result<Drink, DatabaseError> {
        let row: Option<DrinkRow> =
            sqlx::query_as("SELECT id, title, recipe FROM drinks WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Self::decode)
            .unwrap_or(Err(DatabaseError::NotFound(id)))
    }

    async fn create(&self, drink: NewDrink) -> Result<Drink, DatabaseError> {
        let recipe = encode_recipe(&drink.recipe)?;

        let row: DrinkRow = sqlx::query_as(
            "INSERT INTO drinks (title, recipe) VALUES ($1, $2) RETURNING id, title, recipe",
        )
        .bind(&drink.title)
        .bind(&recipe)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::write_error(e, &drink.title))?;

        Self::decode(row)
    }

    async fn update(&self, id: i32, drink: NewDrink) -> Result<Drink, DatabaseError> {
        let recipe = encode_recipe(&drink.recipe)?;

        let row: Option<DrinkRow> = sqlx::query_as(
            "UPDATE drinks SET title = $1, recipe = $2 WHERE id = $3 RETURNING id, title, recipe",
        )
        .bind(&drink.title)
        .bind(&recipe)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::write_error(e, &drink.title))?;

        row.map(Self::decode)
            .unwrap_or(Err(DatabaseError::NotFound(id)))
    }

    async fn delete(&self, id: i32) -> Result<i32, DatabaseError> {
        let deleted: Option<i32> = sqlx::query_scalar("DELETE FROM drinks WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        deleted.ok_or(DatabaseError::NotFound(id))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn reset(&self) -> Result<(), DatabaseError> {
        let seed = seed_drink();
        let recipe = encode_recipe(&seed.recipe)?;

        // Drop, recreate and seed commit together
        let mut tx = self.pool.begin().await?;
        sqlx::query("DROP TABLE IF EXISTS drinks")
            .execute(&mut *tx)
            .await?;
        sqlx::query(CREATE_TABLE).execute(&mut *tx).await?;
        sqlx::query("INSERT INTO drinks (title, recipe) VALUES ($1, $2)")
            .bind(&seed.title)
            .bind(&recipe)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!("Reset drinks table and seeded '{}'", seed.title);
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}
