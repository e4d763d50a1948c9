use crate::config::{IndexStoreBackend, IndexStoreConfig};
use crate::error::{AppError, Result};
use crate::search::{ElasticsearchConfig, ElasticsearchStore, InMemoryIndexStore, IndexStore};
use std::sync::Arc;

/// Create an index store based on configuration
pub async fn create_index_store(config: &IndexStoreConfig) -> Result<Arc<dyn IndexStore>> {
    match config.backend {
        IndexStoreBackend::Elasticsearch => {
            let password = match &config.password_env {
                Some(var) => Some(std::env::var(var).map_err(|_| {
                    AppError::Configuration(format!(
                        "Environment variable {} for the index store password is not set",
                        var
                    ))
                })?),
                None => None,
            };

            tracing::info!(url = %config.url, "Initializing Elasticsearch index store");

            let store = ElasticsearchStore::connect(ElasticsearchConfig {
                url: config.url.clone(),
                timeout_secs: config.timeout_secs,
                username: config.username.clone(),
                password,
            })
            .await?;
            Ok(Arc::new(store))
        }

        IndexStoreBackend::InMemory => {
            tracing::info!("Initializing in-memory index store");
            Ok(create_in_memory_store())
        }
    }
}

/// Create an in-memory index store (for testing)
pub fn create_in_memory_store() -> Arc<dyn IndexStore> {
    Arc::new(InMemoryIndexStore::new())
}
