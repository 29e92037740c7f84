use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;

use crate::raw::{RawBstMap, Spine};

/// An ordered map based on an unbalanced [binary search tree].
///
/// Keys must implement [`Ord`]. For every node, all keys in its left subtree
/// compare less than its key and all keys in its right subtree compare
/// greater, so an in-order walk visits keys in ascending order.
///
/// The tree never rebalances: its shape is fixed by insertion order alone.
/// Random insertion order gives O(log n) expected depth, while sorted or
/// reverse-sorted insertion produces a list-shaped tree of depth n (see
/// [`BstMap::height`]). Callers that need a depth guarantee should shuffle
/// their input or use a self-balancing map instead.
///
/// Nodes live in a slot arena and link to their children by handle, and every
/// operation walks the tree iteratively, so even a degenerate tree never
/// overflows the call stack.
///
/// It is a logic error for a key to be modified in such a way that its
/// ordering relative to any other key changes while it is in the map. The
/// behavior resulting from such a logic error is not specified, but will not
/// result in undefined behavior.
///
/// # Examples
///
/// ```
/// use chainbst::BstMap;
///
/// let mut map = BstMap::new();
/// for key in [5, 3, 8, 1, 4] {
///     map.put(key, key * 100);
/// }
///
/// assert_eq!(map.keys().copied().collect::<Vec<_>>(), [1, 3, 4, 5, 8]);
///
/// map.delete(&3);
/// assert_eq!(map.keys().copied().collect::<Vec<_>>(), [1, 4, 5, 8]);
/// assert_eq!(map.get(&3), None);
/// assert_eq!(map.get(&4), Some(&400));
/// ```
///
/// [binary search tree]: https://en.wikipedia.org/wiki/Binary_search_tree
pub struct BstMap<K, V> {
    raw: RawBstMap<K, V>,
}

/// An iterator over the entries of a `BstMap`, in ascending key order.
///
/// This `struct` is created by the [`iter`] method on [`BstMap`].
///
/// [`iter`]: BstMap::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    tree: &'a RawBstMap<K, V>,
    spine: Spine,
    remaining: usize,
}

/// An iterator over the keys of a `BstMap`, in ascending order.
///
/// This `struct` is created by the [`keys`] method on [`BstMap`].
///
/// [`keys`]: BstMap::keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over the values of a `BstMap`, in ascending key order.
///
/// This `struct` is created by the [`values`] method on [`BstMap`].
///
/// [`values`]: BstMap::values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<K, V> BstMap<K, V> {
    /// Makes a new, empty `BstMap`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainbst::BstMap;
    ///
    /// let mut map = BstMap::new();
    /// map.put(1, "a");
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        BstMap { raw: RawBstMap::new() }
    }

    /// Creates an empty map with room for at least `capacity` nodes before
    /// the node arena reallocates.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainbst::BstMap;
    ///
    /// let map: BstMap<i32, i32> = BstMap::with_capacity(32);
    /// assert!(map.is_empty());
    /// assert!(map.capacity() >= 32);
    /// ```
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        BstMap {
            raw: RawBstMap::with_capacity(capacity),
        }
    }

    /// Returns the number of nodes the map can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Returns the number of elements in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainbst::BstMap;
    ///
    /// let mut a = BstMap::new();
    /// assert_eq!(a.len(), 0);
    /// a.put(1, "a");
    /// assert_eq!(a.len(), 1);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears the map, removing all elements.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the number of nodes on the longest path from the root to a
    /// leaf, or 0 for an empty map.
    ///
    /// # Examples
    ///
    /// Sorted insertion order degenerates the tree into a list:
    ///
    /// ```
    /// use chainbst::BstMap;
    ///
    /// let sorted: BstMap<_, _> = (0..100).map(|k| (k, ())).collect();
    /// assert_eq!(sorted.height(), 100);
    ///
    /// let mut bushy = BstMap::new();
    /// for key in [4, 2, 6, 1, 3, 5, 7] {
    ///     bushy.put(key, ());
    /// }
    /// assert_eq!(bushy.height(), 3);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Returns the entry with the smallest key.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainbst::BstMap;
    ///
    /// let mut map = BstMap::new();
    /// assert_eq!(map.first_key_value(), None);
    /// map.put(2, "b");
    /// map.put(1, "a");
    /// assert_eq!(map.first_key_value(), Some((&1, &"a")));
    /// ```
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.raw.first()
    }

    /// Returns the entry with the largest key.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.raw.last()
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// Each call starts a fresh traversal of the map's current contents.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainbst::BstMap;
    ///
    /// let mut map = BstMap::new();
    /// map.put(3, "c");
    /// map.put(2, "b");
    /// map.put(1, "a");
    ///
    /// let (first_key, first_value) = map.iter().next().unwrap();
    /// assert_eq!((*first_key, *first_value), (1, "a"));
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut spine = Spine::new();
        self.raw.push_left_spine(&mut spine, self.raw.root());
        Iter {
            tree: &self.raw,
            spine,
            remaining: self.raw.len(),
        }
    }

    /// Gets an iterator over the keys of the map, in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainbst::BstMap;
    ///
    /// let mut a = BstMap::new();
    /// a.put(2, "b");
    /// a.put(1, "a");
    ///
    /// let keys: Vec<_> = a.keys().cloned().collect();
    /// assert_eq!(keys, [1, 2]);
    /// ```
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the map, in order by key.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }
}

impl<K: Ord, V> BstMap<K, V> {
    /// Inserts a key-value pair into the map.
    ///
    /// If the map did not have this key present, a new leaf node is created
    /// and `None` is returned. If it did, the value is replaced in place, the
    /// tree keeps its shape, and the old value is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainbst::BstMap;
    ///
    /// let mut map = BstMap::new();
    /// assert_eq!(map.put(37, "a"), None);
    /// assert_eq!(map.is_empty(), false);
    ///
    /// map.put(37, "b");
    /// assert_eq!(map.put(37, "c"), Some("b"));
    /// assert_eq!(map.get(&37), Some(&"c"));
    /// ```
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        self.raw.insert(key, value)
    }

    /// Returns a reference to the value corresponding to the key, or `None`
    /// if the key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainbst::BstMap;
    ///
    /// let mut map = BstMap::new();
    /// map.put(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get_mut(key)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).is_some()
    }

    /// Removes a key from the map, returning its value if the key was present.
    ///
    /// Deleting an absent key is a no-op. When the deleted node has two
    /// children, its in-order successor's entry moves up into it and the
    /// successor node is unlinked from the right subtree.
    ///
    /// # Examples
    ///
    /// ```
    /// use chainbst::BstMap;
    ///
    /// let mut map = BstMap::new();
    /// map.put(1, "a");
    /// assert_eq!(map.delete(&1), Some("a"));
    /// assert_eq!(map.delete(&1), None);
    /// ```
    pub fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key).map(|(_, value)| value)
    }
}

impl<K, V> Default for BstMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for BstMap<K, V> {
    fn clone(&self) -> Self {
        BstMap { raw: self.raw.clone() }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for BstMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for BstMap<K, V> {
    /// Two maps are equal when they hold the same entries, whatever their
    /// tree shapes.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for BstMap<K, V> {}

impl<K: Ord, V> FromIterator<(K, V)> for BstMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = BstMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for BstMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for BstMap<K, V> {
    /// Builds the tree by inserting the pairs in array order.
    ///
    /// ```
    /// use chainbst::BstMap;
    ///
    /// let map1 = BstMap::from([(1, 2), (3, 4)]);
    /// let map2: BstMap<_, _> = [(1, 2), (3, 4)].into();
    /// assert_eq!(map1, map2);
    /// ```
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, K, V> IntoIterator for &'a BstMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        let handle = self.spine.pop()?;
        let node = self.tree.node(handle);
        self.tree.push_left_spine(&mut self.spine, node.right);
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            spine: self.spine.clone(),
            remaining: self.remaining,
        }
    }
}

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
