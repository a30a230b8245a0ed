use lru::LruCache;
use std::num::NonZeroUsize;

/// Bounded set of transaction hashes that already produced a whale alert.
///
/// Sized to the replay window of the upstream feed: once a hash is evicted it
/// can alert again, which only happens after `capacity` newer hashes.
pub struct TxDedup {
    seen: LruCache<String, ()>,
}

impl TxDedup {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            seen: LruCache::new(capacity),
        }
    }

    /// Record `hash`. Returns false if it was already present.
    pub fn insert(&mut self, hash: &str) -> bool {
        if self.seen.get(hash).is_some() {
            return false;
        }
        self.seen.put(hash.to_string(), ());
        true
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.seen.contains(hash)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
