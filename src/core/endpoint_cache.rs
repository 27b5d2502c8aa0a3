//! Session-scoped cache of resolved pipeline endpoints

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Maps a pipeline cache key (task type + target language) to a callable endpoint URL.
///
/// Entries are never invalidated during a session; `clear` ends the session.
/// Two tasks missing the same key at once may both resolve it; the last write wins,
/// which is harmless because resolution is idempotent per language.
#[derive(Debug, Clone, Default)]
pub struct PipelineEndpointCache {
    endpoints: Arc<RwLock<HashMap<String, String>>>,
}

impl PipelineEndpointCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key for a translation pipeline into `target_lang`
    pub fn key(task_type: &str, target_lang: &str) -> String {
        format!("{}_{}", task_type, target_lang)
    }

    /// Look up a resolved endpoint
    pub async fn get(&self, key: &str) -> Option<String> {
        let endpoints = self.endpoints.read().await;
        endpoints.get(key).cloned()
    }

    /// Store a resolved endpoint
    pub async fn insert(&self, key: String, endpoint: String) {
        let mut endpoints = self.endpoints.write().await;
        debug!("Caching pipeline endpoint for {}", key);
        endpoints.insert(key, endpoint);
    }

    pub async fn len(&self) -> usize {
        self.endpoints.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.endpoints.read().await.is_empty()
    }

    /// Drop every entry (tool reset)
    pub async fn clear(&self) {
        let mut endpoints = self.endpoints.write().await;
        let dropped = endpoints.len();
        endpoints.clear();
        info!("Pipeline endpoint cache cleared ({} entries)", dropped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_insert_and_clear() {
        let cache = PipelineEndpointCache::new();
        let key = PipelineEndpointCache::key("translation", "hi");
        assert_eq!(key, "translation_hi");
        assert!(cache.get(&key).await.is_none());

        cache.insert(key.clone(), "https://infer/hi".to_string()).await;
        assert_eq!(cache.get(&key).await.as_deref(), Some("https://infer/hi"));

        // Clones share the same session
        let shared = cache.clone();
        assert_eq!(shared.len().await, 1);

        cache.clear().await;
        assert!(shared.is_empty().await);
    }
}
