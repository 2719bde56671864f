// laralog - core/cache.rs
//
// Fixed-capacity least-recently-used map.
//
// Every `get` hit and every `set` stamps the key with a fresh, strictly
// increasing tick; `order` maps ticks back to keys, so its first entry is
// always the least recently touched key.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Counters reported by `LruCache::stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub len: usize,
    pub capacity: usize,
}

#[derive(Debug)]
struct Slot<V> {
    value: V,
    tick: u64,
}

#[derive(Debug)]
pub struct LruCache<K, V> {
    capacity: usize,
    map: HashMap<K, Slot<V>>,
    order: BTreeMap<u64, K>,
    tick: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            map: HashMap::with_capacity(capacity),
            order: BTreeMap::new(),
            tick: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Look up `key`, marking it most recently used on a hit.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let tick = self.next_tick();
        let Some(slot) = self.map.get_mut(key) else {
            self.misses += 1;
            return None;
        };

        if let Some(k) = self.order.remove(&slot.tick) {
            self.order.insert(tick, k);
        }
        slot.tick = tick;
        self.hits += 1;
        Some(&slot.value)
    }

    /// Insert or replace `key` as the most recently used entry, evicting the
    /// least recently used one first when a new key would exceed capacity.
    pub fn set(&mut self, key: K, value: V) {
        let tick = self.next_tick();

        if let Some(slot) = self.map.get_mut(&key) {
            self.order.remove(&slot.tick);
            slot.value = value;
            slot.tick = tick;
            self.order.insert(tick, key);
            return;
        }

        if self.map.len() >= self.capacity {
            if let Some((_, oldest)) = self.order.pop_first() {
                self.map.remove(&oldest);
                self.evictions += 1;
                tracing::trace!(len = self.map.len(), "Evicted least recently used entry");
            }
        }

        self.map.insert(key.clone(), Slot { value, tick });
        self.order.insert(tick, key);
    }

    /// Membership test that does not count as a use.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Remove every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            len: self.map.len(),
            capacity: self.capacity,
        }
    }
}
