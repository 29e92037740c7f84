use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::iter::FusedIterator;
use std::collections::hash_map::RandomState;

use log::{debug, trace};

use crate::raw::{Handle, RawChainMap};

/// Number of buckets used by [`ChainedHashMap::new`].
pub const DEFAULT_BUCKETS: usize = 11;

/// Mask applied to a key's hash before reducing it modulo the bucket count.
///
/// Keeps the index a function of the low 31 bits only, the same index a
/// signed 32-bit hash code would produce once its sign bit is cleared.
const HASH_MASK: u64 = 0x7fff_ffff;

/// A hash map resolving collisions by [separate chaining] over a fixed number
/// of buckets.
///
/// A key's bucket is `(hash & 0x7fff_ffff) % bucket_count`, where `hash` comes
/// from the map's [`BuildHasher`]. Each bucket holds a singly linked chain of
/// entries, newest first. Within a chain, key equality decides matches; two
/// keys sharing a hash are simply chained together.
///
/// The bucket count is chosen at construction and never changes: the map does
/// not rehash or resize, so chains grow without bound as entries are added and
/// lookups degrade linearly with the [load factor](ChainedHashMap::load_factor).
/// This makes [`bucket_sizes`](ChainedHashMap::bucket_sizes) a faithful
/// picture of how a hash function spreads keys over a given table size.
///
/// It is a logic error for two equal keys to hash differently, or for a key to
/// be modified while it is in the map such that its hash or equality changes.
///
/// The default hasher is [`RandomState`], whose seed differs between runs. Use
/// [`BuildPassThroughHasher`](crate::hasher::BuildPassThroughHasher) or any
/// other deterministic builder to get reproducible bucket placement.
///
/// # Examples
///
/// ```
/// use chainbst::ChainedHashMap;
///
/// let mut book_reviews = ChainedHashMap::new();
/// book_reviews.put("Adventures of Huckleberry Finn", "My favorite book.");
/// book_reviews.put("Grimms' Fairy Tales", "Masterpiece.");
/// book_reviews.put("Pride and Prejudice", "Very enjoyable.");
///
/// assert_eq!(book_reviews.len(), 3);
/// assert_eq!(book_reviews.get("Grimms' Fairy Tales"), Some(&"Masterpiece."));
/// assert_eq!(book_reviews.key_of(&"Very enjoyable."), Some(&"Pride and Prejudice"));
///
/// assert_eq!(book_reviews.remove("Pride and Prejudice"), Some("Very enjoyable."));
/// assert!(!book_reviews.contains_value(&"Very enjoyable."));
/// assert_eq!(book_reviews.bucket_sizes().iter().sum::<usize>(), 2);
/// ```
///
/// [separate chaining]: https://en.wikipedia.org/wiki/Hash_table#Separate_chaining
pub struct ChainedHashMap<K, V, S = RandomState> {
    hash_builder: S,
    raw: RawChainMap<K, V>,
}

/// An iterator over the entries of a `ChainedHashMap`, in bucket order and
/// newest first within each bucket.
///
/// This `struct` is created by the [`iter`] method on [`ChainedHashMap`].
///
/// [`iter`]: ChainedHashMap::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    raw: &'a RawChainMap<K, V>,
    bucket: usize,
    link: Option<Handle>,
    remaining: usize,
}

/// An iterator over the entries of a single bucket's chain, newest first.
///
/// This `struct` is created by the [`bucket`] method on [`ChainedHashMap`].
///
/// [`bucket`]: ChainedHashMap::bucket
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Chain<'a, K, V> {
    raw: &'a RawChainMap<K, V>,
    link: Option<Handle>,
}

/// An iterator over the keys of a `ChainedHashMap`.
///
/// This `struct` is created by the [`keys`] method on [`ChainedHashMap`].
///
/// [`keys`]: ChainedHashMap::keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over the values of a `ChainedHashMap`.
///
/// This `struct` is created by the [`values`] method on [`ChainedHashMap`].
///
/// [`values`]: ChainedHashMap::values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<K, V> ChainedHashMap<K, V, RandomState> {
    /// Creates an empty map with [`DEFAULT_BUCKETS`] buckets.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainbst::ChainedHashMap;
    ///
    /// let map: ChainedHashMap<&str, i32> = ChainedHashMap::new();
    /// assert_eq!(map.bucket_count(), 11);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_buckets(DEFAULT_BUCKETS)
    }

    /// Creates an empty map with exactly `buckets` buckets.
    ///
    /// # Panics
    ///
    /// Panics if `buckets` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainbst::ChainedHashMap;
    ///
    /// let map: ChainedHashMap<u32, u32> = ChainedHashMap::with_buckets(37);
    /// assert_eq!(map.bucket_sizes(), vec![0; 37]);
    /// ```
    #[must_use]
    pub fn with_buckets(buckets: usize) -> Self {
        Self::with_buckets_and_hasher(buckets, RandomState::new())
    }
}

impl<K, V, S> ChainedHashMap<K, V, S> {
    /// Creates an empty map with [`DEFAULT_BUCKETS`] buckets which will use
    /// the given hash builder to hash keys.
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_buckets_and_hasher(DEFAULT_BUCKETS, hash_builder)
    }

    /// Creates an empty map with exactly `buckets` buckets which will use the
    /// given hash builder to hash keys.
    ///
    /// # Panics
    ///
    /// Panics if `buckets` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainbst::ChainedHashMap;
    /// use chainbst::hasher::BuildPassThroughHasher;
    ///
    /// let mut map = ChainedHashMap::with_buckets_and_hasher(7, BuildPassThroughHasher::default());
    /// map.put(9u32, "nine");
    /// assert_eq!(map.bucket_of(&9u32), 2);
    /// ```
    pub fn with_buckets_and_hasher(buckets: usize, hash_builder: S) -> Self {
        assert!(buckets > 0, "`ChainedHashMap::with_buckets_and_hasher()` - `buckets` must be non-zero!");
        debug!("creating chained hash map with {buckets} buckets");
        ChainedHashMap {
            hash_builder,
            raw: RawChainMap::new(buckets),
        }
    }

    /// Returns a reference to the map's [`BuildHasher`].
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the fixed number of buckets.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.raw.bucket_count()
    }

    /// Returns the number of entries in the map.
    ///
    /// This is a stored count, not a scan.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the average chain length: entries divided by buckets.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainbst::ChainedHashMap;
    ///
    /// let mut map = ChainedHashMap::with_buckets(4);
    /// for key in 0..10 {
    ///     map.put(key, ());
    /// }
    /// assert_eq!(map.load_factor(), 2.5);
    /// ```
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.bucket_count() as f64
    }

    /// Returns, for each bucket index in order, the number of entries chained
    /// there. The counts always sum to [`len`](Self::len).
    ///
    /// # Examples
    ///
    /// ```
    /// use chainbst::ChainedHashMap;
    ///
    /// let mut map = ChainedHashMap::with_buckets(1);
    /// map.put("A", 1);
    /// map.put("B", 2);
    /// map.put("C", 3);
    /// assert_eq!(map.bucket_sizes(), [3]);
    /// ```
    #[must_use]
    pub fn bucket_sizes(&self) -> Vec<usize> {
        self.raw.chain_lengths()
    }

    /// Removes every entry, keeping the bucket count.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// An iterator visiting all entries, bucket by bucket in index order and
    /// newest first within a bucket. This is the order in which
    /// [`contains_value`](Self::contains_value) and [`key_of`](Self::key_of)
    /// scan the table.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            raw: &self.raw,
            bucket: 0,
            link: self.raw.head(0),
            remaining: self.raw.len(),
        }
    }

    /// An iterator visiting all keys in [`iter`](Self::iter) order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// An iterator visiting all values in [`iter`](Self::iter) order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// An iterator over the chain of bucket `index`, most recently inserted
    /// entry first.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.bucket_count()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainbst::ChainedHashMap;
    ///
    /// let mut map = ChainedHashMap::with_buckets(1);
    /// map.put('a', 1);
    /// map.put('b', 2);
    /// let chain: Vec<_> = map.bucket(0).map(|(k, _)| *k).collect();
    /// assert_eq!(chain, ['b', 'a']);
    /// ```
    pub fn bucket(&self, index: usize) -> Chain<'_, K, V> {
        assert!(
            index < self.bucket_count(),
            "`ChainedHashMap::bucket()` - `index` ({index}) >= bucket count ({})",
            self.bucket_count()
        );
        Chain {
            raw: &self.raw,
            link: self.raw.head(index),
        }
    }
}

impl<K, V: PartialEq, S> ChainedHashMap<K, V, S> {
    /// Returns `true` if any key maps to a value equal to `value`.
    ///
    /// Values are not indexed: this scans every entry of every bucket.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainbst::ChainedHashMap;
    ///
    /// let mut map = ChainedHashMap::new();
    /// map.put(1, "a");
    /// assert!(map.contains_value(&"a"));
    /// assert!(!map.contains_value(&"b"));
    /// ```
    pub fn contains_value(&self, value: &V) -> bool {
        self.values().any(|candidate| candidate == value)
    }

    /// Returns the key of the first entry, in [`iter`](Self::iter) order,
    /// whose value equals `value`.
    ///
    /// When several keys hold equal values, which one is found depends on
    /// their buckets and insertion order; callers should treat any of them
    /// as a valid answer.
    pub fn key_of(&self, value: &V) -> Option<&K> {
        self.iter().find(|(_, candidate)| *candidate == value).map(|(key, _)| key)
    }
}

impl<K, V, S> ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Returns the bucket index `key` maps to.
    ///
    /// This is a pure function of the key's hash and the bucket count, so it
    /// is the same on every call for the life of the map.
    pub fn bucket_of<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        let hash = self.hash_builder.hash_one(key);
        #[allow(clippy::cast_possible_truncation)]
        let masked = (hash & HASH_MASK) as usize;
        masked % self.raw.bucket_count()
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the key is already present its value is replaced in place and the
    /// old value returned. Otherwise the entry is pushed onto the head of its
    /// bucket's chain and `None` is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainbst::ChainedHashMap;
    ///
    /// let mut map = ChainedHashMap::new();
    /// assert_eq!(map.put(37, "a"), None);
    /// assert_eq!(map.put(37, "b"), Some("a"));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let index = self.bucket_of(&key);
        trace!("placing key in bucket {index}");
        self.raw.insert(index, key, value)
    }

    /// Returns a reference to the value corresponding to the key, or `None`
    /// if the key is absent.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.get(self.bucket_of(key), key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let index = self.bucket_of(key);
        self.raw.get_mut(index, key)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.raw.search(self.bucket_of(key), key).is_some()
    }

    /// Removes a key from the map, returning its value if the key was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainbst::ChainedHashMap;
    ///
    /// let mut map = ChainedHashMap::new();
    /// map.put(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let index = self.bucket_of(key);
        self.raw.remove(index, key).map(|(_, value)| value)
    }
}

impl<K, V> Default for ChainedHashMap<K, V, RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone, S: Clone> Clone for ChainedHashMap<K, V, S> {
    fn clone(&self) -> Self {
        ChainedHashMap {
            hash_builder: self.hash_builder.clone(),
            raw: self.raw.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for ChainedHashMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> Extend<(K, V)> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChainedHashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        loop {
            if let Some(handle) = self.link {
                let entry = self.raw.entry(handle);
                self.link = entry.next;
                self.remaining -= 1;
                return Some((&entry.key, &entry.value));
            }

            if self.bucket + 1 >= self.raw.bucket_count() {
                return None;
            }
            self.bucket += 1;
            self.link = self.raw.head(self.bucket);
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<'a, K, V> Iterator for Chain<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        let entry = self.raw.entry(self.link?);
        self.link = entry.next;
        Some((&entry.key, &entry.value))
    }
}

impl<K, V> FusedIterator for Chain<'_, K, V> {}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}
