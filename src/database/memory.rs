use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::models::drink::seed_drink;
use super::models::{Drink, NewDrink};
use super::store::{DatabaseError, DrinkStore};

/// Process-local drink store used when no database is configured and in tests
pub struct MemoryDrinkStore {
    inner: RwLock<MemoryState>,
}

struct MemoryState {
    next_id: i32,
    drinks: BTreeMap<i32, Drink>,
}

impl MemoryDrinkStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryState {
                next_id: 1,
                drinks: BTreeMap::new(),
            }),
        }
    }
}

impl Default for MemoryDrinkStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryState {
    fn title_taken(&self, title: &str, except: Option<i32>) -> bool {
        self.drinks
            .values()
            .any(|d| d.title == title && Some(d.id) != except)
    }

    fn insert(&mut self, drink: NewDrink) -> Result<Drink, DatabaseError> {
        if self.title_taken(&drink.title, None) {
            return Err(DatabaseError::DuplicateTitle(drink.title));
        }

        // Ids only move forward so a deleted id is never handed out again
        let id = self.next_id;
        self.next_id += 1;

        let stored = Drink {
            id,
            title: drink.title,
            recipe: drink.recipe,
        };
        self.drinks.insert(id, stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl DrinkStore for MemoryDrinkStore {
    async fn list(&self) -> Result<Vec<Drink>, DatabaseError> {
        let state = self.inner.read().await;
        Ok(state.drinks.values().cloned().collect())
    }

    async fn get(&self, id: i32) -> Result<Drink, DatabaseError> {
        let state = self.inner.read().await;
        state.drinks.get(&id).cloned().ok_or(DatabaseError::NotFound(id))
    }

    async fn create(&self, drink: NewDrink) -> Result<Drink, DatabaseError> {
        self.inner.write().await.insert(drink)
    }

    async fn update(&self, id: i32, drink: NewDrink) -> Result<Drink, DatabaseError> {
        let mut state = self.inner.write().await;

        if !state.drinks.contains_key(&id) {
            return Err(DatabaseError::NotFound(id));
        }
        if state.title_taken(&drink.title, Some(id)) {
            return Err(DatabaseError::DuplicateTitle(drink.title));
        }

        let updated = Drink {
            id,
            title: drink.title,
            recipe: drink.recipe,
        };
        state.drinks.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<i32, DatabaseError> {
        let mut state = self.inner.write().await;
        state
            .drinks
            .remove(&id)
            .map(|d| d.id)
            .ok_or(DatabaseError::NotFound(id))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn reset(&self) -> Result<(), DatabaseError> {
        let mut state = self.inner.write().await;
        state.drinks.clear();
        state.insert(seed_drink())?;
        Ok(())
    }
}
