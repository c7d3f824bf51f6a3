use std::num::NonZeroUsize;

use lru::LruCache;

use crate::image::Image;

/// Bounded cache of image handles by asset key.
///
/// Eviction is least-recently-used with a fixed capacity. Evicting an entry
/// only drops the cache's handle: layers still holding the image keep it alive.
pub struct ImageCache {
    inner: LruCache<String, Image>,
}

impl ImageCache {
    /// A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self { inner: LruCache::new(cap) }
    }

    /// Looks up `key` and marks it most recently used.
    pub fn get(&mut self, key: &str) -> Option<Image> {
        self.inner.get(key).cloned()
    }

    /// Inserts or replaces `key`. Returns the entry evicted to make room, if any.
    pub fn insert(&mut self, key: impl Into<String>, image: Image) -> Option<(String, Image)> {
        let key = key.into();
        match self.inner.push(key.clone(), image) {
            Some((old_key, _)) if old_key == key => None,
            evicted => {
                if let Some((k, _)) = &evicted {
                    log::debug!("image cache evicted `{k}`");
                }
                evicted
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Image> {
        self.inner.pop(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.cap().get()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }
}
