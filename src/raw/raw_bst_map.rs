use core::borrow::Borrow;
use core::cmp::Ordering;
use core::mem;

use log::trace;
use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;

/// A tree node owning one entry and links to its two subtrees.
#[derive(Clone)]
pub(crate) struct TreeNode<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Option<Handle>,
    pub(crate) right: Option<Handle>,
}

impl<K, V> TreeNode<K, V> {
    fn leaf(key: K, value: V) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
        }
    }
}

/// The place a subtree hangs from: the root slot, or one side of a parent.
#[derive(Clone, Copy)]
enum Link {
    Root,
    Left(Handle),
    Right(Handle),
}

/// Stack used by traversals. Deep enough for a randomly built tree of a few
/// million entries before it spills to the heap.
pub(crate) type Spine = SmallVec<[Handle; 32]>;

/// The unbalanced binary search tree backing `BstMap`.
///
/// Every operation descends iteratively, so a degenerate (list-shaped) tree
/// costs O(n) time but never O(n) call stack.
#[derive(Clone)]
pub(crate) struct RawBstMap<K, V> {
    /// Arena storing all tree nodes.
    nodes: Arena<TreeNode<K, V>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Total number of key-value pairs in the tree.
    len: usize,
}

impl<K, V> RawBstMap<K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
            len: 0,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    pub(crate) fn root(&self) -> Option<Handle> {
        self.root
    }

    pub(crate) fn node(&self, handle: Handle) -> &TreeNode<K, V> {
        self.nodes.get(handle)
    }

    /// Leftmost node of the subtree rooted at `handle`.
    fn min_from(&self, mut handle: Handle) -> Handle {
        while let Some(left) = self.nodes.get(handle).left {
            handle = left;
        }
        handle
    }

    /// Rightmost node of the subtree rooted at `handle`.
    fn max_from(&self, mut handle: Handle) -> Handle {
        while let Some(right) = self.nodes.get(handle).right {
            handle = right;
        }
        handle
    }

    pub(crate) fn first(&self) -> Option<(&K, &V)> {
        let node = self.nodes.get(self.min_from(self.root?));
        Some((&node.key, &node.value))
    }

    pub(crate) fn last(&self) -> Option<(&K, &V)> {
        let node = self.nodes.get(self.max_from(self.root?));
        Some((&node.key, &node.value))
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub(crate) fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: SmallVec<[(Handle, usize); 32]> = SmallVec::new();
        if let Some(root) = self.root {
            stack.push((root, 1));
        }

        while let Some((handle, depth)) = stack.pop() {
            height = height.max(depth);
            let node = self.nodes.get(handle);
            if let Some(left) = node.left {
                stack.push((left, depth + 1));
            }
            if let Some(right) = node.right {
                stack.push((right, depth + 1));
            }
        }

        height
    }

    /// Pushes `handle` and its chain of left descendants onto `spine`.
    ///
    /// An in-order traversal pops a node, yields it, then descends into its
    /// right subtree with this same call.
    pub(crate) fn push_left_spine(&self, spine: &mut Spine, mut link: Option<Handle>) {
        while let Some(handle) = link {
            spine.push(handle);
            link = self.nodes.get(handle).left;
        }
    }

    fn set_link(&mut self, link: Link, child: Option<Handle>) {
        match link {
            Link::Root => self.root = child,
            Link::Left(parent) => self.nodes.get_mut(parent).left = child,
            Link::Right(parent) => self.nodes.get_mut(parent).right = child,
        }
    }
}

impl<K: Ord, V> RawBstMap<K, V> {
    /// Descends from the root by comparison and returns the node holding `key`.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root?;
        loop {
            let node = self.nodes.get(current);
            current = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left?,
                Ordering::Greater => node.right?,
                Ordering::Equal => return Some(current),
            };
        }
    }

    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key)?;
        Some(&self.nodes.get(handle).value)
    }

    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key)?;
        Some(&mut self.nodes.get_mut(handle).value)
    }

    /// Inserts a key-value pair, or replaces the value of an existing key in
    /// place. Returns the replaced value. The shape of the tree changes only
    /// when a new leaf is hung.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut link = Link::Root;
        let mut next = self.root;

        while let Some(current) = next {
            let node = self.nodes.get_mut(current);
            match key.cmp(&node.key) {
                Ordering::Less => {
                    link = Link::Left(current);
                    next = node.left;
                }
                Ordering::Greater => {
                    link = Link::Right(current);
                    next = node.right;
                }
                Ordering::Equal => return Some(mem::replace(&mut node.value, value)),
            }
        }

        let leaf = self.nodes.alloc(TreeNode::leaf(key, value));
        self.set_link(link, Some(leaf));
        self.len += 1;
        None
    }

    /// Removes `key` from the tree, returning its entry.
    ///
    /// A node with at most one child is replaced by that child. A node with
    /// two children takes over the entry of its in-order successor (the
    /// minimum of its right subtree), and the successor node, which has no
    /// left child, is unlinked instead.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut link = Link::Root;
        let mut target = self.root?;
        loop {
            let node = self.nodes.get(target);
            match key.cmp(node.key.borrow()) {
                Ordering::Less => {
                    link = Link::Left(target);
                    target = node.left?;
                }
                Ordering::Greater => {
                    link = Link::Right(target);
                    target = node.right?;
                }
                Ordering::Equal => break,
            }
        }

        let node = self.nodes.get(target);
        let entry = match (node.left, node.right) {
            (None, child) | (child, None) => {
                self.set_link(link, child);
                let removed = self.nodes.take(target);
                (removed.key, removed.value)
            }
            (Some(_), Some(right)) => {
                let mut successor_link = Link::Right(target);
                let mut successor = right;
                while let Some(left) = self.nodes.get(successor).left {
                    successor_link = Link::Left(successor);
                    successor = left;
                }

                let successor_right = self.nodes.get(successor).right;
                self.set_link(successor_link, successor_right);
                let spliced = self.nodes.take(successor);
                trace!("splicing in-order successor into a node with two children");

                let node = self.nodes.get_mut(target);
                let key = mem::replace(&mut node.key, spliced.key);
                let value = mem::replace(&mut node.value, spliced.value);
                (key, value)
            }
        };

        self.len -= 1;
        debug_assert_eq!(self.nodes.len(), self.len);
        Some(entry)
    }
}

#[cfg(test)]
#[allow(clippy::manual_assert, clippy::uninlined_format_args)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    impl<K: Ord + Clone + core::fmt::Debug, V> RawBstMap<K, V> {
        /// Checks ordering, key uniqueness, link sanity and `len`. Panics with
        /// every violation found.
        pub(crate) fn validate_invariants(&self) {
            let mut errors: Vec<String> = Vec::new();
            let mut count = 0;

            // (node, exclusive lower bound, exclusive upper bound)
            let mut stack: Vec<(Handle, Option<K>, Option<K>)> = Vec::new();
            if let Some(root) = self.root {
                stack.push((root, None, None));
            }

            while let Some((handle, lower, upper)) = stack.pop() {
                count += 1;
                if count > self.nodes.len() {
                    errors.push(String::from("cycle detected: visited more nodes than allocated"));
                    break;
                }

                let node = self.nodes.get(handle);
                if let Some(lower) = &lower
                    && node.key <= *lower
                {
                    errors.push(format!("{:?} is not greater than ancestor {:?}", node.key, lower));
                }
                if let Some(upper) = &upper
                    && node.key >= *upper
                {
                    errors.push(format!("{:?} is not less than ancestor {:?}", node.key, upper));
                }

                if let Some(left) = node.left {
                    stack.push((left, lower.clone(), Some(node.key.clone())));
                }
                if let Some(right) = node.right {
                    stack.push((right, Some(node.key.clone()), upper.clone()));
                }
            }

            if count != self.len {
                errors.push(format!("len mismatch: self.len={}, reachable nodes={}", self.len, count));
            }
            if self.nodes.len() != self.len {
                errors.push(format!("arena holds {} nodes but len is {}", self.nodes.len(), self.len));
            }

            assert!(errors.is_empty(), "Tree invariant violations:\n{}", errors.join("\n"));
        }

        fn in_order_keys(&self) -> Vec<K> {
            let mut keys = Vec::with_capacity(self.len);
            let mut spine = Spine::new();
            self.push_left_spine(&mut spine, self.root);
            while let Some(handle) = spine.pop() {
                let node = self.node(handle);
                keys.push(node.key.clone());
                self.push_left_spine(&mut spine, node.right);
            }
            keys
        }
    }

    fn tree_of(keys: &[i32]) -> RawBstMap<i32, i32> {
        let mut tree = RawBstMap::new();
        for &key in keys {
            tree.insert(key, key * 10);
        }
        tree
    }

    #[test]
    fn remove_leaf() {
        let mut tree = tree_of(&[5, 3, 8]);
        assert_eq!(tree.remove(&8), Some((8, 80)));
        tree.validate_invariants();
        assert_eq!(tree.in_order_keys(), [3, 5]);
    }

    #[test]
    fn remove_node_with_only_left_child() {
        let mut tree = tree_of(&[5, 3, 1]);
        assert_eq!(tree.remove(&3), Some((3, 30)));
        tree.validate_invariants();
        assert_eq!(tree.node(tree.root().unwrap()).left.map(|h| tree.node(h).key), Some(1));
    }

    #[test]
    fn remove_node_with_only_right_child() {
        let mut tree = tree_of(&[5, 8, 9]);
        assert_eq!(tree.remove(&8), Some((8, 80)));
        tree.validate_invariants();
        assert_eq!(tree.in_order_keys(), [5, 9]);
    }

    #[test]
    fn remove_root_with_two_children_takes_successor_entry() {
        let mut tree = tree_of(&[5, 3, 8, 7, 9, 6]);
        let root = tree.root().unwrap();

        assert_eq!(tree.remove(&5), Some((5, 50)));
        tree.validate_invariants();

        // The root node stays in place and now carries the successor's entry.
        assert_eq!(tree.root(), Some(root));
        assert_eq!(tree.node(root).key, 6);
        assert_eq!(tree.node(root).value, 60);
        assert_eq!(tree.in_order_keys(), [3, 6, 7, 8, 9]);
    }

    #[test]
    fn remove_with_successor_as_direct_right_child() {
        let mut tree = tree_of(&[5, 3, 8, 9]);
        assert_eq!(tree.remove(&5), Some((5, 50)));
        tree.validate_invariants();
        assert_eq!(tree.in_order_keys(), [3, 8, 9]);
    }

    #[test]
    fn remove_missing_key_leaves_tree_untouched() {
        let mut tree = tree_of(&[5, 3, 8]);
        assert_eq!(tree.remove(&4), None);
        assert_eq!(tree.remove(&10), None);
        tree.validate_invariants();
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn insert_existing_key_replaces_value_without_reshaping() {
        let mut tree = tree_of(&[5, 3, 8]);
        let before = tree.search(&3);
        assert_eq!(tree.insert(3, -1), Some(30));
        assert_eq!(tree.search(&3), before);
        assert_eq!(tree.get(&3), Some(&-1));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn sorted_insertion_degenerates_to_a_list() {
        let keys: Vec<i32> = (0..1_000).collect();
        let tree = tree_of(&keys);
        tree.validate_invariants();
        assert_eq!(tree.height(), 1_000);
        assert_eq!(tree.first(), Some((&0, &0)));
        assert_eq!(tree.last(), Some((&999, &9_990)));
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        Remove(i32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0i32..1000).prop_map(Op::Insert),
            1 => (0i32..1000).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn tree_invariants_maintained_after_operations(ops in prop::collection::vec(op_strategy(), 0..500)) {
            let mut tree: RawBstMap<i32, i32> = RawBstMap::new();
            let mut model: BTreeSet<i32> = BTreeSet::new();

            for op in ops {
                match op {
                    Op::Insert(key) => {
                        tree.insert(key, key * 2);
                        model.insert(key);
                    }
                    Op::Remove(key) => {
                        prop_assert_eq!(tree.remove(&key).is_some(), model.remove(&key));
                    }
                }
                tree.validate_invariants();
            }

            prop_assert_eq!(tree.in_order_keys(), model.into_iter().collect::<Vec<_>>());
        }
    }
}
