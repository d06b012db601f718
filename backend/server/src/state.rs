use std::sync::Arc;

use crate::{
    auth::Authenticator,
    config::{Config, StoreBackend},
    database::RedisStore,
    logging::Logger,
    proxy::StorageProxy,
    service::{RateService, RecipeService},
    store::{KeyValueStore, MemoryStore, StoreError},
};

pub struct AppState {
    pub config: Config,
    pub logger: Logger,
    pub recipes: RecipeService,
    pub rates: RateService,
    pub auth: Authenticator,
}

impl AppState {
    pub async fn new(config: Config, logger: Logger) -> Result<Arc<Self>, StoreError> {
        let store: Arc<dyn KeyValueStore> = match config.store {
            StoreBackend::Redis => Arc::new(
                RedisStore::connect(&config.redis_url, config.redis_retries, config.redis_timeout)
                    .await?,
            ),
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
        };

        Ok(Self::with_store(config, store, logger))
    }

    pub fn with_store(config: Config, store: Arc<dyn KeyValueStore>, logger: Logger) -> Arc<Self> {
        let proxy = StorageProxy::new(store, logger.clone());

        Arc::new(Self {
            recipes: RecipeService::new(proxy.clone(), logger.clone()),
            rates: RateService::new(proxy.clone(), logger.clone()),
            auth: Authenticator::new(proxy, logger.clone()),
            config,
            logger,
        })
    }
}
