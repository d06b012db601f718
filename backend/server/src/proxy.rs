//! # Storage Proxy
//!
//! Entity-shaped operations over the key-value capabilities in [`crate::store`].
//!
//! ## Races
//!
//! `create`, `update`, `delete` and `rate_recipe` check existence and then act in a
//! second round trip. Two concurrent creates of one id can both pass the check and the
//! later write wins. This is accepted: the store offers `HSETNX` per field, not per
//! record, and the service makes no stronger promise.
//!
//! ## Cascade
//!
//! `delete` removes the recipe first and its ratings second. If the second step fails
//! the recipe stays deleted, the orphaned ratings are logged and the caller gets a
//! storage failure.
use std::sync::Arc;

use tracing::{debug, error};

use crate::{
    codec::{
        RECIPE_NAMESPACE, decode_recipe, encode_rating, encode_recipe, rate_key, recipe_key,
        token_key,
    },
    error::AppError,
    logging::Logger,
    models::{Rate, Recipe},
    store::KeyValueStore,
    utils::{Clock, SystemClock, rating_field},
};

/// Upper bound on same-second ratings for one recipe.
pub const MAX_RATINGS_PER_SECOND: u32 = 1000;

#[derive(Clone)]
pub struct StorageProxy {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    log: Logger,
}

impl StorageProxy {
    pub fn new(store: Arc<dyn KeyValueStore>, log: Logger) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            log,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Recipe, AppError> {
        let key = recipe_key(id);
        let fields = self.store.get_all_fields(&key).await?;

        if fields.is_empty() {
            return Err(AppError::NotExists);
        }

        Ok(decode_recipe(&key, &fields)?)
    }

    /// All recipes ordered by id. One undecodable record fails the whole listing.
    pub async fn list_all(&self) -> Result<Vec<Recipe>, AppError> {
        let keys = self.store.list_keys(RECIPE_NAMESPACE).await?;
        let mut recipes = Vec::with_capacity(keys.len());

        for key in keys {
            let fields = self.store.get_all_fields(&key).await?;

            // deleted between the scan and the read
            if fields.is_empty() {
                self.log.scope(|| debug!(%key, "recipe vanished during listing"));
                continue;
            }

            recipes.push(decode_recipe(&key, &fields)?);
        }

        recipes.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(recipes)
    }

    pub async fn create(&self, recipe: &Recipe) -> Result<(), AppError> {
        let key = recipe_key(&recipe.id);

        if self.store.exists(&key).await? {
            return Err(AppError::AlreadyExists);
        }

        self.store.set_fields(&key, &encode_recipe(recipe)).await?;
        Ok(())
    }

    /// Rewrites every field of the record.
    pub async fn update(&self, recipe: &Recipe) -> Result<(), AppError> {
        let key = recipe_key(&recipe.id);

        if !self.store.exists(&key).await? {
            return Err(AppError::NotExists);
        }

        self.store.set_fields(&key, &encode_recipe(recipe)).await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let ratings = rate_key(id);
        let rated = self.store.exists(&ratings).await?;

        if self.store.delete(&recipe_key(id)).await? == 0 {
            return Err(AppError::NotExists);
        }

        if rated {
            if let Err(err) = self.store.delete(&ratings).await {
                self.log
                    .scope(|| error!(id, %err, "recipe deleted but its ratings were left behind"));
                return Err(err.into());
            }
        }

        Ok(())
    }

    /// Stores one rating keyed by the current second. Ratings landing in the same second
    /// take the next free `<seconds>.<n>` field instead of overwriting each other.
    pub async fn rate_recipe(&self, id: &str, rate: &Rate) -> Result<(), AppError> {
        if !self.store.exists(&recipe_key(id)).await? {
            return Err(AppError::NotExists);
        }

        let key = rate_key(id);
        let note = encode_rating(rate.note);
        let seconds = self.clock.unix_seconds();

        for attempt in 0..MAX_RATINGS_PER_SECOND {
            let field = rating_field(seconds, attempt);

            if self.store.set_field_if_absent(&key, &field, &note).await? {
                return Ok(());
            }
        }

        Err(AppError::StorageFailure(format!(
            "no free rating field left in {key} for second {seconds}"
        )))
    }

    pub async fn check_auth_token(&self, hash: &str) -> Result<(), AppError> {
        if self.store.exists(&token_key(hash)).await? {
            Ok(())
        } else {
            Err(AppError::AuthFailure)
        }
    }
}
