use core::borrow::Borrow;
use core::mem;

use super::arena::Arena;
use super::handle::Handle;

/// One link of a bucket chain.
#[derive(Clone)]
pub(crate) struct ChainEntry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) next: Option<Handle>,
}

/// Fixed set of singly linked bucket chains backing `ChainedHashMap`.
///
/// This layer never hashes: callers pass the bucket index they computed. Keys
/// are matched by equality alone, so entries whose hashes collide, or whose
/// full hashes differ but reduce to the same index, share a chain safely.
#[derive(Clone)]
pub(crate) struct RawChainMap<K, V> {
    /// Arena storing every entry of every chain.
    entries: Arena<ChainEntry<K, V>>,
    /// Head of each chain; the most recently inserted entry of that bucket.
    heads: Vec<Option<Handle>>,
    /// Total number of entries across all chains.
    len: usize,
}

impl<K, V> RawChainMap<K, V> {
    pub(crate) fn new(buckets: usize) -> Self {
        assert!(buckets > 0, "`RawChainMap::new()` - `buckets` must be non-zero!");
        Self {
            entries: Arena::new(),
            heads: vec![None; buckets],
            len: 0,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn bucket_count(&self) -> usize {
        self.heads.len()
    }

    pub(crate) fn head(&self, index: usize) -> Option<Handle> {
        self.heads[index]
    }

    pub(crate) fn entry(&self, handle: Handle) -> &ChainEntry<K, V> {
        self.entries.get(handle)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.heads.fill(None);
        self.len = 0;
    }

    /// Length of every chain, in bucket order.
    pub(crate) fn chain_lengths(&self) -> Vec<usize> {
        (0..self.heads.len()).map(|index| self.chain_length(index)).collect()
    }

    fn chain_length(&self, index: usize) -> usize {
        let mut count = 0;
        let mut link = self.heads[index];
        while let Some(handle) = link {
            count += 1;
            link = self.entries.get(handle).next;
        }
        count
    }
}

impl<K: Eq, V> RawChainMap<K, V> {
    /// Walks the chain at `index` and returns the entry whose key equals `key`.
    pub(crate) fn search<Q>(&self, index: usize, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut link = self.heads[index];
        while let Some(handle) = link {
            let entry = self.entries.get(handle);
            let candidate: &Q = entry.key.borrow();
            if candidate == key {
                return Some(handle);
            }
            link = entry.next;
        }
        None
    }

    pub(crate) fn get<Q>(&self, index: usize, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let handle = self.search(index, key)?;
        Some(&self.entries.get(handle).value)
    }

    pub(crate) fn get_mut<Q>(&mut self, index: usize, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let handle = self.search(index, key)?;
        Some(&mut self.entries.get_mut(handle).value)
    }

    /// Replaces the value of an existing key in place, or pushes a new entry
    /// at the head of the chain. Returns the replaced value.
    pub(crate) fn insert(&mut self, index: usize, key: K, value: V) -> Option<V> {
        if let Some(handle) = self.search(index, &key) {
            return Some(mem::replace(&mut self.entries.get_mut(handle).value, value));
        }

        let next = self.heads[index];
        self.heads[index] = Some(self.entries.alloc(ChainEntry { key, value, next }));
        self.len += 1;
        None
    }

    /// Unlinks the entry for `key` from the chain at `index`, patching either
    /// the predecessor's `next` or the bucket head.
    pub(crate) fn remove<Q>(&mut self, index: usize, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let mut prev: Option<Handle> = None;
        let mut current = self.heads[index]?;
        loop {
            let entry = self.entries.get(current);
            let candidate: &Q = entry.key.borrow();
            if candidate == key {
                break;
            }
            prev = Some(current);
            current = entry.next?;
        }

        let removed = self.entries.take(current);
        match prev {
            Some(prev) => self.entries.get_mut(prev).next = removed.next,
            None => self.heads[index] = removed.next,
        }
        self.len -= 1;
        debug_assert_eq!(self.entries.len(), self.len);
        Some((removed.key, removed.value))
    }
}

#[cfg(test)]
#[allow(clippy::manual_assert, clippy::uninlined_format_args)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::collections::HashMap;

    impl<K: Eq + core::fmt::Debug, V> RawChainMap<K, V> {
        /// Checks that chains are acyclic, disjoint, free of duplicate keys,
        /// and that their total length matches `len`.
        pub(crate) fn validate_invariants(&self) {
            let mut errors: Vec<String> = Vec::new();
            let mut seen: Vec<Handle> = Vec::new();

            for (index, head) in self.heads.iter().enumerate() {
                let mut keys: Vec<&K> = Vec::new();
                let mut link = *head;
                while let Some(handle) = link {
                    if seen.contains(&handle) {
                        errors.push(format!("bucket {} reaches entry {:?} twice", index, handle));
                        break;
                    }
                    seen.push(handle);

                    let entry = self.entries.get(handle);
                    if keys.contains(&&entry.key) {
                        errors.push(format!("bucket {} holds key {:?} twice", index, entry.key));
                    }
                    keys.push(&entry.key);
                    link = entry.next;
                }
            }

            if seen.len() != self.len {
                errors.push(format!("len mismatch: self.len={}, chained entries={}", self.len, seen.len()));
            }
            if self.entries.len() != self.len {
                errors.push(format!("arena holds {} entries but len is {}", self.entries.len(), self.len));
            }

            assert!(errors.is_empty(), "Chain invariant violations:\n{}", errors.join("\n"));
        }

        fn chain_keys(&self, index: usize) -> Vec<&K> {
            let mut keys = Vec::new();
            let mut link = self.heads[index];
            while let Some(handle) = link {
                let entry = self.entries.get(handle);
                keys.push(&entry.key);
                link = entry.next;
            }
            keys
        }
    }

    #[test]
    #[should_panic(expected = "`RawChainMap::new()` - `buckets` must be non-zero!")]
    fn zero_buckets_panics() {
        let _ = RawChainMap::<u8, u8>::new(0);
    }

    #[test]
    fn chain_is_most_recent_first() {
        let mut chains = RawChainMap::new(1);
        chains.insert(0, 'a', 1);
        chains.insert(0, 'b', 2);
        chains.insert(0, 'c', 3);
        assert_eq!(chains.chain_keys(0), [&'c', &'b', &'a']);

        // updating does not move the entry
        assert_eq!(chains.insert(0, 'a', 10), Some(1));
        assert_eq!(chains.chain_keys(0), [&'c', &'b', &'a']);
        assert_eq!(chains.len(), 3);
    }

    #[test]
    fn remove_head_middle_and_tail() {
        let mut chains = RawChainMap::new(1);
        for (value, key) in ['a', 'b', 'c', 'd'].into_iter().enumerate() {
            chains.insert(0, key, value);
        }

        assert_eq!(chains.remove(0, &'d'), Some(('d', 3)));
        chains.validate_invariants();
        assert_eq!(chains.chain_keys(0), [&'c', &'b', &'a']);

        assert_eq!(chains.remove(0, &'b'), Some(('b', 1)));
        chains.validate_invariants();
        assert_eq!(chains.chain_keys(0), [&'c', &'a']);

        assert_eq!(chains.remove(0, &'a'), Some(('a', 0)));
        chains.validate_invariants();
        assert_eq!(chains.chain_keys(0), [&'c']);

        assert_eq!(chains.remove(0, &'a'), None);
        assert_eq!(chains.remove(0, &'c'), Some(('c', 2)));
        assert_eq!(chains.head(0), None);
        assert_eq!(chains.len(), 0);
    }

    #[test]
    fn chain_lengths_track_each_bucket() {
        let mut chains = RawChainMap::new(3);
        chains.insert(0, 0, ());
        chains.insert(0, 3, ());
        chains.insert(2, 2, ());
        assert_eq!(chains.chain_lengths(), [2, 0, 1]);

        chains.clear();
        assert_eq!(chains.chain_lengths(), [0, 0, 0]);
        assert_eq!(chains.bucket_count(), 3);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(u16, u16),
        Remove(u16),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0u16..200, any::<u16>()).prop_map(|(k, v)| Op::Insert(k, v)),
            2 => (0u16..200).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn chain_invariants_maintained_after_operations(
            buckets in 1usize..8,
            ops in prop::collection::vec(op_strategy(), 0..400),
        ) {
            let mut chains: RawChainMap<u16, u16> = RawChainMap::new(buckets);
            let mut model: HashMap<u16, u16> = HashMap::new();

            for op in ops {
                match op {
                    Op::Insert(key, value) => {
                        let index = usize::from(key) % buckets;
                        prop_assert_eq!(chains.insert(index, key, value), model.insert(key, value));
                    }
                    Op::Remove(key) => {
                        let index = usize::from(key) % buckets;
                        prop_assert_eq!(chains.remove(index, &key).map(|(_, v)| v), model.remove(&key));
                    }
                }
                chains.validate_invariants();
            }

            prop_assert_eq!(chains.chain_lengths().iter().sum::<usize>(), model.len());
        }
    }
}
