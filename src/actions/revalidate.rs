use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Marks the cached view of a path stale. Fire-and-forget: callers neither
/// wait on nor observe the effect.
#[async_trait]
pub trait Revalidator: Send + Sync {
    async fn revalidate_path(&self, path: &str);
}

#[derive(Default)]
struct Views {
    by_path: HashMap<String, Value>,
    /// Bumped by every revalidation
    generation: u64,
}

/// Rendered read views keyed by request path
#[derive(Clone, Default)]
pub struct ViewCache {
    views: Arc<RwLock<Views>>,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, path: &str) -> Option<Value> {
        self.views.read().await.by_path.get(path).cloned()
    }

    /// Read before rendering a view; pass to [`ViewCache::put_if_current`]
    pub async fn generation(&self) -> u64 {
        self.views.read().await.generation
    }

    /// Cache `view` unless a revalidation happened since `generation` was
    /// read. Returns whether the view was stored.
    pub async fn put_if_current(&self, path: &str, view: Value, generation: u64) -> bool {
        let mut views = self.views.write().await;
        if views.generation != generation {
            return false;
        }
        views.by_path.insert(path.to_string(), view);
        true
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.views.read().await.by_path.contains_key(path)
    }
}

#[async_trait]
impl Revalidator for ViewCache {
    async fn revalidate_path(&self, path: &str) {
        let mut views = self.views.write().await;
        views.generation += 1;
        if views.by_path.remove(path).is_some() {
            tracing::debug!("Revalidated cached view: {}", path);
        }
    }
}
