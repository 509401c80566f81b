//! A hash table with separate chaining.
//!
//! Each bucket is an intrusive list of boxed entries. Growing the table relinks the existing
//! entries into the new buckets; no entry is moved or reallocated.

use core::{
    hash::{BuildHasher, Hash},
    iter::FusedIterator,
    marker::PhantomPinned,
    mem,
    ptr::{self, NonNull},
    slice,
};
use std::{borrow::Borrow, collections::hash_map::RandomState, fmt};

use cordyceps::{list, Linked, List};

use crate::ConfigError;

const DEFAULT_CAPACITY: usize = 20;
const DEFAULT_LOAD_FACTOR: f32 = 0.5;
const CAPACITY_GROWTH: usize = 2;

/// Sizing parameters for a [`ChainedHashMap`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HashMapConfig {
    /// Number of buckets allocated up front.
    pub initial_capacity: usize,
    /// Maximum ratio of entries to buckets before the table grows.
    pub load_factor: f32,
}

impl HashMapConfig {
    /// Returns the default configuration: 20 buckets and a load factor of 0.5.
    pub const fn new() -> Self {
        HashMapConfig {
            initial_capacity: DEFAULT_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }

    #[must_use]
    pub const fn with_initial_capacity(self, initial_capacity: usize) -> Self {
        HashMapConfig {
            initial_capacity,
            ..self
        }
    }

    #[must_use]
    pub const fn with_load_factor(self, load_factor: f32) -> Self {
        HashMapConfig {
            load_factor,
            ..self
        }
    }

    /// Checks that the configuration describes a usable table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        if !self.load_factor.is_finite() || self.load_factor <= 0.0 {
            return Err(ConfigError::InvalidLoadFactor(self.load_factor));
        }

        Ok(())
    }
}

impl Default for HashMapConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A hash map that resolves collisions by chaining entries within each bucket.
///
/// When the number of entries exceeds `capacity * load_factor`, the bucket count grows to the
/// next prime at least twice the current count. Iteration follows bucket order, which is
/// unrelated to insertion order.
///
/// ```
/// use avl_collections::ChainedHashMap;
///
/// let mut map = ChainedHashMap::new();
/// assert_eq!(map.put("a", 1), None);
/// assert_eq!(map.put("a", 2), Some(1));
/// assert_eq!(map.get("a"), Some(&2));
/// assert_eq!(map.remove("a"), Some(2));
/// assert!(map.is_empty());
/// ```
pub struct ChainedHashMap<K, V, S = RandomState> {
    buckets: Vec<List<Entry<K, V>>>,
    len: usize,
    load_factor: f32,
    hash_builder: S,
}

struct Entry<K, V> {
    links: list::Links<Entry<K, V>>,
    key: K,
    value: V,
    _unpin: PhantomPinned,
}

unsafe impl<K, V> Linked<list::Links<Entry<K, V>>> for Entry<K, V> {
    type Handle = Box<Self>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        Box::leak(r).into()
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<list::Links<Entry<K, V>>> {
        let ptr = ptr.as_ptr();
        // SAFETY: `ptr` is non-null, so a pointer to one of its fields is too.
        unsafe { NonNull::new_unchecked(ptr::addr_of_mut!((*ptr).links)) }
    }
}

impl<K, V> Entry<K, V> {
    fn new(key: K, value: V) -> Box<Self> {
        Box::new(Entry {
            links: list::Links::new(),
            key,
            value,
            _unpin: PhantomPinned,
        })
    }

    #[inline]
    fn matches<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let own: &Q = self.key.borrow();
        own == key
    }
}

fn empty_buckets<K, V>(capacity: usize) -> Vec<List<Entry<K, V>>> {
    (0..capacity).map(|_| List::new()).collect()
}

impl<K, V> ChainedHashMap<K, V, RandomState> {
    /// Creates an empty map with the default configuration.
    pub fn new() -> Self {
        Self::from_parts(HashMapConfig::new(), RandomState::new())
    }

    /// Creates an empty map with `capacity` buckets.
    ///
    /// A capacity of zero falls back to the default.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = if capacity > 0 {
            capacity
        } else {
            DEFAULT_CAPACITY
        };

        Self::from_parts(
            HashMapConfig::new().with_initial_capacity(capacity),
            RandomState::new(),
        )
    }

    /// Creates an empty map sized according to `config`.
    pub fn with_config(config: HashMapConfig) -> Result<Self, ConfigError> {
        Self::with_config_and_hasher(config, RandomState::new())
    }
}

impl<K, V, S> ChainedHashMap<K, V, S> {
    /// Creates an empty map sized according to `config` that hashes keys with `hash_builder`.
    pub fn with_config_and_hasher(
        config: HashMapConfig,
        hash_builder: S,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_parts(config, hash_builder))
    }

    fn from_parts(config: HashMapConfig, hash_builder: S) -> Self {
        ChainedHashMap {
            buckets: empty_buckets(config.initial_capacity),
            len: 0,
            load_factor: config.load_factor,
            hash_builder,
        }
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Removes all entries, keeping the current capacity.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            *bucket = List::new();
        }

        self.len = 0;
    }

    /// Returns an iterator over the entries of the map, in bucket order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            chain: None,
            len: self.len,
        }
    }

    /// Returns an iterator over the keys of the map, in bucket order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over the values of the map, in bucket order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, value)| value)
    }
}

impl<K, V, S> ChainedHashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    #[inline]
    fn bucket_index<Q>(&self, key: &Q) -> usize
    where
        Q: Hash + ?Sized,
    {
        (self.hash_builder.hash_one(key) % self.buckets.len() as u64) as usize
    }

    fn needs_rehash(&self) -> bool {
        self.len as f32 > self.buckets.len() as f32 * self.load_factor
    }

    // Grows the bucket array and relinks every entry into its new bucket.
    fn rehash(&mut self) {
        let capacity = next_prime(self.buckets.len() * CAPACITY_GROWTH);
        log::debug!(
            "rehashing {} entries from {} to {capacity} buckets",
            self.len,
            self.buckets.len()
        );

        let old = mem::replace(&mut self.buckets, empty_buckets(capacity));
        for mut bucket in old {
            while let Some(entry) = bucket.pop_front() {
                let index = self.bucket_index(&entry.key);
                self.buckets[index].push_back(entry);
            }
        }
    }

    /// Inserts a key-value pair, returning the previous value if `key` was already present.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        if let Some(slot) = self.get_mut(&key) {
            return Some(mem::replace(slot, value));
        }

        let index = self.bucket_index(&key);
        self.buckets[index].push_back(Entry::new(key, value));
        self.len += 1;

        if self.needs_rehash() {
            self.rehash();
        }

        None
    }

    /// Returns a reference to the value associated with `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.buckets[self.bucket_index(key)]
            .iter()
            .find(|entry| entry.matches(key))
            .map(|entry| &entry.value)
    }

    /// Returns a mutable reference to the value associated with `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.bucket_index(key);
        self.buckets[index]
            .iter_mut()
            .find(|entry| entry.matches(key))
            // SAFETY: Pinning is not structural for `entry.value`.
            .map(|entry| unsafe { &mut entry.get_unchecked_mut().value })
    }

    /// Returns `true` if the map contains a value associated with `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Removes the entry associated with `key`, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.bucket_index(key);

        let entry = {
            let mut cursor = self.buckets[index].cursor_front_mut();
            loop {
                if cursor.current()?.matches(key) {
                    break cursor.remove_current()?;
                }
                cursor.move_next();
            }
        };

        self.len -= 1;

        let Entry { value, .. } = *entry;
        Some(value)
    }
}

impl<K, V> Default for ChainedHashMap<K, V, RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for ChainedHashMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for ChainedHashMap<K, V, RandomState> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ChainedHashMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> Extend<(K, V)> for ChainedHashMap<K, V, S> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<'map, K, V, S> IntoIterator for &'map ChainedHashMap<K, V, S> {
    type Item = (&'map K, &'map V);
    type IntoIter = Iter<'map, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the entries of a [`ChainedHashMap`].
pub struct Iter<'map, K, V> {
    buckets: slice::Iter<'map, List<Entry<K, V>>>,
    chain: Option<list::Iter<'map, Entry<K, V>>>,
    len: usize,
}

impl<'map, K, V> Iterator for Iter<'map, K, V> {
    type Item = (&'map K, &'map V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.chain.as_mut().and_then(Iterator::next) {
                self.len -= 1;
                return Some((&entry.key, &entry.value));
            }

            // The current chain is exhausted; move on to the next bucket.
            self.chain = Some(self.buckets.next()?.iter());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }

    if n < 4 {
        return true;
    }

    if n % 2 == 0 {
        return false;
    }

    let mut divisor = 3;
    while divisor * divisor <= n {
        if n % divisor == 0 {
            return false;
        }
        divisor += 2;
    }

    true
}

/// Returns the smallest prime greater than or equal to `n`.
fn next_prime(n: usize) -> usize {
    let mut candidate = n.max(2);
    while !is_prime(candidate) {
        candidate += 1;
    }

    candidate
}

#[cfg(test)]
mod tests {
    use std::hash::{BuildHasherDefault, Hasher};

    use super::*;

    // Sends every key to the same bucket.
    #[derive(Default)]
    struct CollidingHasher;

    impl Hasher for CollidingHasher {
        fn finish(&self) -> u64 {
            0
        }

        fn write(&mut self, _bytes: &[u8]) {}
    }

    type Colliding = BuildHasherDefault<CollidingHasher>;

    fn colliding_map(capacity: usize) -> ChainedHashMap<u32, &'static str, Colliding> {
        let config = HashMapConfig::new()
            .with_initial_capacity(capacity)
            .with_load_factor(100.0);
        ChainedHashMap::with_config_and_hasher(config, Colliding::default()).unwrap()
    }

    #[test]
    fn primes() {
        assert_eq!(next_prime(0), 2);
        assert_eq!(next_prime(2), 2);
        assert_eq!(next_prime(40), 41);
        assert_eq!(next_prime(82), 83);
        assert_eq!(next_prime(90), 97);
        assert!(!is_prime(1));
        assert!(!is_prime(49));
        assert!(is_prime(97));
    }

    #[test]
    fn put_get_replace() {
        let mut map = ChainedHashMap::new();

        assert_eq!(map.put("one", 1), None);
        assert_eq!(map.put("two", 2), None);
        assert_eq!(map.put("one", 11), Some(1));

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("one"), Some(&11));
        assert_eq!(map.get("two"), Some(&2));
        assert_eq!(map.get("three"), None);
        assert!(map.contains_key("two"));
        assert!(!map.contains_key("three"));
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut map: ChainedHashMap<String, Vec<u8>> = ChainedHashMap::new();
        map.put("k".to_string(), vec![1]);

        map.get_mut("k").unwrap().push(2);
        assert_eq!(map.get("k"), Some(&vec![1, 2]));
        assert!(map.get_mut("missing").is_none());
    }

    #[test]
    fn remove_from_shared_chain() {
        let mut map = colliding_map(4);
        for key in 0..5 {
            map.put(key, "v");
        }
        assert_eq!(map.capacity(), 4);

        // Middle, head, tail, then absent.
        assert_eq!(map.remove(&2), Some("v"));
        assert_eq!(map.remove(&0), Some("v"));
        assert_eq!(map.remove(&4), Some("v"));
        assert_eq!(map.remove(&2), None);

        assert_eq!(map.len(), 2);
        let mut keys: Vec<u32> = map.keys().copied().collect();
        keys.sort_unstable();
        assert_eq!(keys, [1, 3]);
    }

    #[test]
    fn grows_to_next_prime() {
        let mut map = ChainedHashMap::new();
        assert_eq!(map.capacity(), 20);

        // 10 entries sit exactly at the 0.5 load factor; the 11th triggers growth.
        for key in 0..10 {
            map.put(key, key * 10);
        }
        assert_eq!(map.capacity(), 20);

        map.put(10, 100);
        assert_eq!(map.capacity(), 41);

        for key in 0..=10 {
            assert_eq!(map.get(&key), Some(&(key * 10)));
        }
        assert_eq!(map.iter().count(), 11);
    }

    #[test]
    fn with_capacity_zero_uses_default() {
        let map: ChainedHashMap<u8, u8> = ChainedHashMap::with_capacity(0);
        assert_eq!(map.capacity(), DEFAULT_CAPACITY);

        let map: ChainedHashMap<u8, u8> = ChainedHashMap::with_capacity(7);
        assert_eq!(map.capacity(), 7);
    }

    #[test]
    fn invalid_configs() {
        let zero = HashMapConfig::new().with_initial_capacity(0);
        assert_eq!(zero.validate(), Err(ConfigError::ZeroCapacity));
        assert!(ChainedHashMap::<u8, u8>::with_config(zero).is_err());

        let negative = HashMapConfig::new().with_load_factor(-1.0);
        assert_eq!(
            negative.validate(),
            Err(ConfigError::InvalidLoadFactor(-1.0))
        );

        let nan = HashMapConfig::new().with_load_factor(f32::NAN);
        assert!(matches!(
            nan.validate(),
            Err(ConfigError::InvalidLoadFactor(_))
        ));

        assert_eq!(HashMapConfig::default().validate(), Ok(()));
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut map: ChainedHashMap<u32, u32> = (0..100).map(|k| (k, k)).collect();
        let capacity = map.capacity();

        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.capacity(), capacity);
        assert_eq!(map.iter().next(), None);
        assert_eq!(map.get(&5), None);
    }

    #[test]
    fn debug_lists_entries() {
        let mut map = ChainedHashMap::new();
        map.put(1, "x");
        assert_eq!(format!("{map:?}"), r#"{1: "x"}"#);
    }
}
