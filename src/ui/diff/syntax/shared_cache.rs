use super::tokens::StyledToken;
use crate::ui::diff::render::types::Color;
use lru::LruCache;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

pub const DEFAULT_SHARED_CAPACITY: usize = 4096;

/// Highlight of one line: its tokens and the per-character colors they
/// paint.
#[derive(Debug, Clone, PartialEq)]
pub struct LineHighlight {
    pub tokens: Arc<[StyledToken]>,
    pub colors: Arc<[Color]>,
}

/// Content key. Equal text in the same language and appearance highlights
/// identically regardless of which view or line it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SharedKey {
    pub text: Arc<str>,
    pub language: Arc<str>,
    pub is_dark: bool,
}

impl SharedKey {
    pub fn new(text: Arc<str>, language: &str, is_dark: bool) -> Self {
        Self {
            text,
            language: Arc::from(language),
            is_dark,
        }
    }
}

/// Cross-session highlight cache. Clones share one LRU.
#[derive(Clone)]
pub struct SharedSyntaxCache(Arc<Mutex<LruCache<SharedKey, Arc<LineHighlight>>>>);

static GLOBAL: Lazy<SharedSyntaxCache> =
    Lazy::new(|| SharedSyntaxCache::new(DEFAULT_SHARED_CAPACITY));

impl Default for SharedSyntaxCache {
    fn default() -> Self {
        Self::new(DEFAULT_SHARED_CAPACITY)
    }
}

impl SharedSyntaxCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self(Arc::new(Mutex::new(LruCache::new(capacity))))
    }

    /// The process-wide instance.
    pub fn global() -> Self {
        GLOBAL.clone()
    }

    pub fn get(&self, key: &SharedKey) -> Option<Arc<LineHighlight>> {
        self.0.lock().get(key).cloned()
    }

    pub fn insert(&self, key: SharedKey, highlight: Arc<LineHighlight>) {
        self.0.lock().put(key, highlight);
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::diff::syntax::ScopeCategory;

    fn highlight() -> Arc<LineHighlight> {
        Arc::new(LineHighlight {
            tokens: Arc::from(vec![StyledToken::new(0..2, ScopeCategory::Keyword)]),
            colors: Arc::from(vec![Color::from_rgb(1, 2, 3); 2]),
        })
    }

    #[test]
    fn clones_share_entries() {
        let cache = SharedSyntaxCache::new(8);
        let other = cache.clone();
        cache.insert(SharedKey::new(Arc::from("fn"), "rust", true), highlight());
        assert!(other.get(&SharedKey::new(Arc::from("fn"), "rust", true)).is_some());
    }

    #[test]
    fn key_includes_language_and_appearance() {
        let cache = SharedSyntaxCache::new(8);
        cache.insert(SharedKey::new(Arc::from("fn"), "rust", true), highlight());
        assert!(cache.get(&SharedKey::new(Arc::from("fn"), "rust", false)).is_none());
        assert!(cache.get(&SharedKey::new(Arc::from("fn"), "go", true)).is_none());
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = SharedSyntaxCache::new(2);
        for text in ["a", "b", "c"] {
            cache.insert(SharedKey::new(Arc::from(text), "rust", true), highlight());
        }
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&SharedKey::new(Arc::from("a"), "rust", true)).is_none());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let cache = SharedSyntaxCache::new(0);
        cache.insert(SharedKey::new(Arc::from("x"), "rust", true), highlight());
        assert_eq!(cache.len(), 1);
    }
}
