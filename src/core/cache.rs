//! Rendered-view cache and the invalidation capability
//!
//! Read endpoints store their rendered JSON under the route path; the
//! mutation actions call [`Revalidate::revalidate`] on that path so the
//! next read recomputes from the store.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Marks the cached render of a route stale. Fire-and-forget.
pub trait Revalidate: Send + Sync {
    fn revalidate(&self, path: &str);
}

impl<F> Revalidate for F
where
    F: Fn(&str) + Send + Sync,
{
    fn revalidate(&self, path: &str) {
        self(path)
    }
}

/// Invalidation that does nothing, for callers without a cache
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRevalidate;

impl Revalidate for NoRevalidate {
    fn revalidate(&self, _path: &str) {}
}

/// Default bound on cached views
pub const DEFAULT_VIEW_CAPACITY: usize = 512;

/// In-process cache of rendered views keyed by route path
///
/// Holds at most `capacity` views; once full, new keys are not cached
/// until a revalidation frees room.
#[derive(Clone)]
pub struct ViewCache {
    views: Arc<RwLock<HashMap<String, Value>>>,
    capacity: usize,
}

impl Default for ViewCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_VIEW_CAPACITY)
    }
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            views: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, path: &str) -> Option<Value> {
        match self.views.read() {
            Ok(views) => views.get(path).cloned(),
            Err(e) => {
                tracing::warn!(path, error = %e, "view cache lock poisoned, treating as miss");
                None
            }
        }
    }

    pub fn insert(&self, path: impl Into<String>, view: Value) {
        match self.views.write() {
            Ok(mut views) => {
                let path = path.into();
                if views.len() >= self.capacity && !views.contains_key(&path) {
                    tracing::debug!(%path, capacity = self.capacity, "view cache full, not caching");
                    return;
                }
                views.insert(path, view);
            }
            Err(e) => tracing::warn!(error = %e, "view cache lock poisoned, skipping insert"),
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.views
            .read()
            .map(|views| views.contains_key(path))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.views.read().map(|views| views.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A path also owns its query-string variants (`/x?page=2`)
fn is_view_of(key: &str, path: &str) -> bool {
    match key.strip_prefix(path) {
        Some(rest) => rest.is_empty() || rest.starts_with('?'),
        None => false,
    }
}

impl Revalidate for ViewCache {
    fn revalidate(&self, path: &str) {
        match self.views.write() {
            Ok(mut views) => {
                let before = views.len();
                views.retain(|key, _| !is_view_of(key, path));
                let dropped = before - views.len();
                if dropped > 0 {
                    tracing::debug!(path, dropped, "cached views invalidated");
                }
            }
            Err(e) => tracing::warn!(path, error = %e, "view cache lock poisoned, skipping invalidation"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[test]
    fn test_insert_then_get() {
        let cache = ViewCache::new();
        cache.insert("/dashboard/invoices", json!({"count": 1}));
        assert_eq!(cache.get("/dashboard/invoices"), Some(json!({"count": 1})));
        assert!(cache.get("/dashboard").is_none());
    }

    #[test]
    fn test_insert_stops_at_capacity() {
        let cache = ViewCache::with_capacity(2);
        cache.insert("/a?page=1", json!(1));
        cache.insert("/a?page=2", json!(2));
        cache.insert("/a?page=3", json!(3));

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains("/a?page=3"));

        cache.insert("/a?page=1", json!("fresh"));
        assert_eq!(cache.get("/a?page=1"), Some(json!("fresh")));

        cache.revalidate("/a");
        cache.insert("/a?page=3", json!(3));
        assert!(cache.contains("/a?page=3"));
    }

    #[test]
    fn test_revalidate_removes_only_that_path() {
        let cache = ViewCache::new();
        cache.insert("/dashboard/invoices", json!([]));
        cache.insert("/dashboard", json!({}));

        cache.revalidate("/dashboard/invoices");

        assert!(!cache.contains("/dashboard/invoices"));
        assert!(cache.contains("/dashboard"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_revalidate_drops_query_variants() {
        let cache = ViewCache::new();
        cache.insert("/dashboard/invoices?page=2", json!([]));
        cache.insert("/dashboard/invoices?query=lee", json!([]));
        cache.insert("/dashboard/invoices/abc", json!({}));

        cache.revalidate("/dashboard/invoices");

        assert!(!cache.contains("/dashboard/invoices?page=2"));
        assert!(!cache.contains("/dashboard/invoices?query=lee"));
        assert!(cache.contains("/dashboard/invoices/abc"));
    }

    #[test]
    fn test_revalidate_missing_path_is_noop() {
        let cache = ViewCache::new();
        cache.revalidate("/nothing");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_closure_is_a_revalidator() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let revalidator = move |path: &str| sink.lock().unwrap().push(path.to_string());

        revalidator.revalidate("/a");
        NoRevalidate.revalidate("/b");

        assert_eq!(*seen.lock().unwrap(), vec!["/a".to_string()]);
    }
}
