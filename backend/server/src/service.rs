//! Use cases: validate, hit storage, log the outcome.
//!
//! Nothing reaches the proxy while the input carries violations.
use crate::{
    error::AppError,
    logging::Logger,
    models::{Rate, Recipe},
    proxy::StorageProxy,
    validation::{ID, Violation, flag, validate_rate, validate_recipe},
};

#[derive(Clone)]
pub struct RecipeService {
    proxy: StorageProxy,
    log: Logger,
}

impl RecipeService {
    pub fn new(proxy: StorageProxy, log: Logger) -> Self {
        Self { proxy, log }
    }

    pub async fn get(&self, id: &str) -> Result<Recipe, AppError> {
        self.proxy
            .get_by_id(id)
            .await
            .inspect_err(|err| self.log.observe("get", err))
    }

    pub async fn list(&self) -> Result<Vec<Recipe>, AppError> {
        self.proxy
            .list_all()
            .await
            .inspect_err(|err| self.log.observe("list", err))
    }

    pub async fn create(&self, recipe: Recipe) -> Result<Recipe, AppError> {
        let violations = validate_recipe(&recipe);

        let result = if violations.is_empty() {
            self.proxy.create(&recipe).await
        } else {
            Err(AppError::InvalidInput(violations))
        };

        result
            .map(|_| recipe)
            .inspect_err(|err| self.log.observe("create", err))
    }

    /// Full overwrite of the recipe at `path_id`. A body naming another id is rejected.
    pub async fn update(&self, path_id: &str, recipe: Recipe) -> Result<Recipe, AppError> {
        let mut violations = validate_recipe(&recipe);
        if recipe.id != path_id {
            flag(&mut violations, ID, Violation::IdMismatch);
        }

        let result = if violations.is_empty() {
            self.proxy.update(&recipe).await
        } else {
            Err(AppError::InvalidInput(violations))
        };

        result
            .map(|_| recipe)
            .inspect_err(|err| self.log.observe("update", err))
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.proxy
            .delete(id)
            .await
            .inspect_err(|err| self.log.observe("delete", err))
    }
}

#[derive(Clone)]
pub struct RateService {
    proxy: StorageProxy,
    log: Logger,
}

impl RateService {
    pub fn new(proxy: StorageProxy, log: Logger) -> Self {
        Self { proxy, log }
    }

    pub async fn rate(&self, id: &str, rate: Rate) -> Result<(), AppError> {
        let violations = validate_rate(id, &rate);

        let result = if violations.is_empty() {
            self.proxy.rate_recipe(id, &rate).await
        } else {
            Err(AppError::InvalidInput(violations))
        };

        result.inspect_err(|err| self.log.observe("rate", err))
    }
}
