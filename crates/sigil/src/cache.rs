// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Compiled template caching.
//!
//! An [`Engine`](crate::Engine) with a cache skips parsing and compiling
//! when it sees a source text again. Entries are keyed by [`cache_key`], the
//! SHA-256 digest of the engine's settings and the source, and stored as
//! [`CompiledTemplate`] handles, so a hit shares the closures of the first
//! compilation. Engines with different escaping or validation never see each
//! other's entries, even when they share one cache.
//!
//! Implement [`TemplateCache`] for other storage strategies.

use crate::error::{Result, SigilError};
use crate::template::CompiledTemplate;
use lru::LruCache;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

/// Lowercase hex SHA-256 digest of an engine settings fingerprint and a
/// template source.
///
/// `settings` must change whenever the same source would compile to a
/// template that renders differently.
pub fn cache_key(settings: &str, source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(settings.as_bytes());
    hasher.update([0u8]);
    hasher.update(source.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Trait for compiled template caches.
pub trait TemplateCache: Send + Sync + std::fmt::Debug {
    /// Retrieves a template.
    fn get(&self, key: &str) -> Result<Option<CompiledTemplate>>;
    /// Stores a template.
    fn set(&self, key: &str, template: CompiledTemplate) -> Result<()>;
    /// Removes a template.
    fn remove(&self, key: &str) -> Result<()>;
    /// Drops every entry.
    fn clear(&self) -> Result<()>;
    /// Checks if a key is present.
    fn contains_key(&self, key: &str) -> bool;
    /// Number of entries.
    fn len(&self) -> usize;
    /// True if the cache holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Creates a boxed handle to the same storage.
    fn clone_box(&self) -> Box<dyn TemplateCache>;
}

impl Clone for Box<dyn TemplateCache> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// In-memory LRU cache.
///
/// Clones share storage. Once `capacity` entries are held, storing another
/// evicts the least recently used one.
///
/// ```rust,ignore
/// use sigil::{Engine, MemoryCache};
///
/// let cache = MemoryCache::new(100)?;
/// let engine = Engine::new().with_cache(Box::new(cache));
/// ```
#[derive(Debug, Clone)]
pub struct MemoryCache {
    cache: Arc<Mutex<LruCache<String, CompiledTemplate>>>,
}

impl MemoryCache {
    /// Creates a cache holding at most `capacity` templates.
    ///
    /// # Errors
    ///
    /// Returns [`SigilError::Config`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| {
            SigilError::Config("cache capacity must be greater than 0".to_string())
        })?;
        Ok(Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        })
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.lock().map(|cache| cache.cap().get()).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, LruCache<String, CompiledTemplate>>> {
        self.cache
            .lock()
            .map_err(|_| SigilError::Cache("Failed to acquire cache lock".to_string()))
    }
}

impl TemplateCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<CompiledTemplate>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, template: CompiledTemplate) -> Result<()> {
        self.lock()?.put(key.to_string(), template);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.pop(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    fn contains_key(&self, key: &str) -> bool {
        self.lock().map(|cache| cache.contains(key)).unwrap_or(false)
    }

    fn len(&self) -> usize {
        self.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    fn clone_box(&self) -> Box<dyn TemplateCache> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Engine;

    fn template(source: &str) -> CompiledTemplate {
        Engine::new().create_template(source).unwrap()
    }

    #[test]
    fn test_cache_key_is_sha256_hex() {
        // SHA-256 of the single byte 0x00.
        assert_eq!(
            cache_key("", ""),
            "6e340b9cffb37a989ca544e6bb780a2c78901d3fb33738768511a30617afa01d"
        );
        assert_eq!(cache_key("s", "a").len(), 64);
        assert_ne!(cache_key("s", "a"), cache_key("s", "b"));
        assert_ne!(cache_key("html", "a"), cache_key("raw", "a"));
        assert_ne!(cache_key("ab", "c"), cache_key("a", "bc"));
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        assert!(matches!(MemoryCache::new(0), Err(SigilError::Config(_))));
    }

    #[test]
    fn test_set_get_remove_clear() {
        let cache = MemoryCache::new(4).unwrap();
        let t = template("hello");

        cache.set("k", t.clone()).unwrap();
        assert!(cache.contains_key("k"));
        assert_eq!(cache.len(), 1);

        let hit = cache.get("k").unwrap().unwrap();
        assert!(CompiledTemplate::ptr_eq(&hit, &t));

        cache.remove("k").unwrap();
        assert!(!cache.contains_key("k"));
        assert!(cache.get("k").unwrap().is_none());

        cache.set("a", template("a")).unwrap();
        cache.set("b", template("b")).unwrap();
        cache.clear().unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_lru_eviction() {
        let cache = MemoryCache::new(2).unwrap();
        cache.set("a", template("a")).unwrap();
        cache.set("b", template("b")).unwrap();

        // Touch "a" so "b" is the least recently used.
        cache.get("a").unwrap();
        cache.set("c", template("c")).unwrap();

        assert!(cache.contains_key("a"));
        assert!(!cache.contains_key("b"));
        assert!(cache.contains_key("c"));
        assert_eq!(cache.capacity(), 2);
    }

    #[test]
    fn test_clones_share_storage() {
        let cache = MemoryCache::new(2).unwrap();
        let boxed: Box<dyn TemplateCache> = Box::new(cache.clone());
        let again = boxed.clone();

        again.set("x", template("x")).unwrap();
        assert!(cache.contains_key("x"));
    }
}
