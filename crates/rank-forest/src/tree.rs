//! The owning tree structure: search, insertion, deletion, traversal and
//! the consuming join/split composition API.

use std::fmt::Debug;
use std::mem;

use crate::balance::{rank_of, rebalance};
use crate::error::TreeError;
use crate::join::{join_roots, split_at};
use crate::node::RankNode;
use crate::util::{first, last, next, prev};

fn default_comparator<K: PartialOrd>(a: &K, b: &K) -> i32 {
    if a == b {
        0
    } else if a < b {
        -1
    } else {
        1
    }
}

/// Ordered map over distinct keys with rank-balanced search, insertion and
/// deletion, plus join/split composition.
///
/// Nodes live in an arena owned by the tree; root and min/max are cached
/// `Option<u32>` links into it. Join and split consume their inputs by
/// value and return new owned trees, so a node always belongs to exactly
/// one tree.
pub struct RankTree<K, V, C = fn(&K, &K) -> i32>
where
    C: Fn(&K, &K) -> i32,
{
    root: Option<u32>,
    min: Option<u32>,
    max: Option<u32>,
    comparator: C,
    arena: Vec<RankNode<K, V>>,
}

impl<K, V> RankTree<K, V, fn(&K, &K) -> i32>
where
    K: PartialOrd,
{
    pub fn new() -> Self {
        Self::with_comparator(default_comparator::<K>)
    }
}

impl<K, V> Default for RankTree<K, V, fn(&K, &K) -> i32>
where
    K: PartialOrd,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> RankTree<K, V, C>
where
    C: Fn(&K, &K) -> i32,
{
    pub fn with_comparator(comparator: C) -> Self {
        Self {
            root: None,
            min: None,
            max: None,
            comparator,
            arena: Vec::new(),
        }
    }

    fn from_parts(arena: Vec<RankNode<K, V>>, root: Option<u32>, comparator: C) -> Self {
        let min = first(&arena, root);
        let max = last(&arena, root);
        Self {
            root,
            min,
            max,
            comparator,
            arena,
        }
    }

    #[inline]
    fn compare(&self, a: &K, b: &K) -> i32 {
        (self.comparator)(a, b)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of keys, read off the root's cached subtree size.
    pub fn size(&self) -> usize {
        self.root.map_or(0, |r| self.arena[r as usize].size)
    }

    /// Rank of the whole tree: the root's rank, -1 when empty.
    pub fn rank(&self) -> i32 {
        rank_of(&self.arena, self.root)
    }

    /// Value bound to the smallest key.
    pub fn min(&self) -> Option<&V> {
        self.min.map(|i| &self.arena[i as usize].v)
    }

    /// Value bound to the largest key.
    pub fn max(&self) -> Option<&V> {
        self.max.map(|i| &self.arena[i as usize].v)
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.min = None;
        self.max = None;
        self.arena.clear();
    }

    fn find_node(&self, key: &K) -> Option<u32> {
        let mut curr = self.root;
        while let Some(i) = curr {
            let cmp = self.compare(key, &self.arena[i as usize].k);
            if cmp == 0 {
                return Some(i);
            }
            curr = if cmp < 0 {
                self.arena[i as usize].l
            } else {
                self.arena[i as usize].r
            };
        }
        None
    }

    /// Value bound to `key`.
    pub fn search(&self, key: &K) -> Result<&V, TreeError> {
        self.find_node(key)
            .map(|i| &self.arena[i as usize].v)
            .ok_or(TreeError::NotFound)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.find_node(key).map(|i| &self.arena[i as usize].v)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.find_node(key)
            .map(|i| &mut self.arena[i as usize].v)
    }

    pub fn has(&self, key: &K) -> bool {
        self.find_node(key).is_some()
    }

    /// Walk to the vacant slot for `key`, or fail on an equal key.
    fn locate_slot(&self, key: &K) -> Result<(u32, bool), TreeError> {
        let mut curr = self.root.expect("tree is non-empty");
        loop {
            let cmp = self.compare(key, &self.arena[curr as usize].k);
            if cmp == 0 {
                return Err(TreeError::Duplicate);
            }
            let nxt = if cmp < 0 {
                self.arena[curr as usize].l
            } else {
                self.arena[curr as usize].r
            };
            match nxt {
                Some(n) => curr = n,
                None => return Ok((curr, cmp < 0)),
            }
        }
    }

    /// Link the detached leaf `idx` under `parent`, refresh the min/max
    /// caches and rebalance upward. Returns the operation count.
    fn attach_leaf(&mut self, idx: u32, parent: u32, is_left: bool) -> usize {
        if is_left {
            self.arena[parent as usize].l = Some(idx);
        } else {
            self.arena[parent as usize].r = Some(idx);
        }
        self.arena[idx as usize].p = Some(parent);

        let min = self.min.expect("non-empty tree caches min");
        if self.compare(&self.arena[idx as usize].k, &self.arena[min as usize].k) < 0 {
            self.min = Some(idx);
        } else {
            let max = self.max.expect("non-empty tree caches max");
            if self.compare(&self.arena[idx as usize].k, &self.arena[max as usize].k) > 0 {
                self.max = Some(idx);
            }
        }

        let (root, ops) = rebalance(&mut self.arena, self.root, Some(parent), false);
        self.root = root;
        ops
    }

    /// Insert `key` bound to `value`.
    ///
    /// Returns the number of rebalancing operations, or [`TreeError::Duplicate`]
    /// without touching the tree when the key is already present.
    pub fn insert(&mut self, key: K, value: V) -> Result<usize, TreeError> {
        if self.root.is_none() {
            self.arena.push(RankNode::new(key, value));
            let idx = (self.arena.len() - 1) as u32;
            self.root = Some(idx);
            self.min = Some(idx);
            self.max = Some(idx);
            return Ok(0);
        }
        let (parent, is_left) = self.locate_slot(&key)?;
        self.arena.push(RankNode::new(key, value));
        let idx = (self.arena.len() - 1) as u32;
        Ok(self.attach_leaf(idx, parent, is_left))
    }

    /// Attach the detached leaf `idx`, already in the arena, at its ordered
    /// position. Used by the empty-side join path.
    fn insert_node(&mut self, idx: u32) -> usize {
        if self.root.is_none() {
            self.root = Some(idx);
            self.min = Some(idx);
            self.max = Some(idx);
            return 0;
        }
        // An equal key would violate the join ordering contract; the
        // separator is dropped rather than duplicated.
        let Ok((parent, is_left)) = self.locate_slot(&self.arena[idx as usize].k) else {
            debug_assert!(false, "separator key collides with an existing key");
            return 0;
        };
        self.attach_leaf(idx, parent, is_left)
    }

    /// Swap the key/value payloads of two arena slots.
    fn swap_payload(&mut self, a: u32, b: u32) {
        debug_assert_ne!(a, b);
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.arena.split_at_mut(hi as usize);
        let (x, y) = (&mut head[lo as usize], &mut tail[0]);
        mem::swap(&mut x.k, &mut y.k);
        mem::swap(&mut x.v, &mut y.v);
    }

    /// Delete the node with `key`.
    ///
    /// Returns the number of rebalancing operations, or
    /// [`TreeError::NotFound`] without touching the tree.
    pub fn delete(&mut self, key: &K) -> Result<usize, TreeError> {
        let node = self.find_node(key).ok_or(TreeError::NotFound)?;
        // One key leaves per call, so the caches move exactly one step.
        if self.min == Some(node) {
            self.min = next(&self.arena, node);
        }
        if self.max == Some(node) {
            self.max = prev(&self.arena, node);
        }
        Ok(self.delete_node(node))
    }

    fn delete_node(&mut self, mut node: u32) -> usize {
        if self.arena[node as usize].l.is_some() && self.arena[node as usize].r.is_some() {
            // Two children: the slot keeps its rank, size and links but
            // takes over the successor's payload, then the successor node,
            // which has at most one child, is unlinked instead.
            let suc = next(&self.arena, node).expect("node with a right child has a successor");
            self.swap_payload(node, suc);
            if self.max == Some(suc) {
                self.max = Some(node);
            }
            node = suc;
        }

        let parent = self.arena[node as usize].p;
        let child = self.arena[node as usize].l.or(self.arena[node as usize].r);
        self.arena[node as usize].p = None;
        self.arena[node as usize].l = None;
        self.arena[node as usize].r = None;
        if let Some(c) = child {
            self.arena[c as usize].p = parent;
        }

        match parent {
            None => {
                self.root = child;
                0
            }
            Some(p) => {
                if self.arena[p as usize].l == Some(node) {
                    self.arena[p as usize].l = child;
                } else {
                    self.arena[p as usize].r = child;
                }
                let (root, ops) = rebalance(&mut self.arena, self.root, Some(p), false);
                self.root = root;
                ops
            }
        }
    }

    /// Join `self`, a separator key/value and `other` into one tree.
    ///
    /// Caller contract, not checked: all keys of one input lie below `key`
    /// and all keys of the other above it. Either input may be empty. Both
    /// inputs are consumed; every node ends up owned by the returned tree.
    ///
    /// Returns the joined tree and the join cost,
    /// `|rank(self) - rank(other)| + 1` (an empty side degenerates to an
    /// insertion costing the other side's rank + 1).
    pub fn join(mut self, key: K, value: V, other: Self) -> (Self, usize) {
        // Migrate the other arena into this one; only indices shift.
        let offset = self.arena.len() as u32;
        let shift = |link: Option<u32>| link.map(|i| i + offset);
        for mut n in other.arena {
            n.p = shift(n.p);
            n.l = shift(n.l);
            n.r = shift(n.r);
            self.arena.push(n);
        }
        let other_root = shift(other.root);
        let other_min = shift(other.min);
        let other_max = shift(other.max);

        self.arena.push(RankNode::new(key, value));
        let x = (self.arena.len() - 1) as u32;

        if self.root.is_none() {
            let cost = (rank_of(&self.arena, other_root) + 1) as usize;
            self.root = other_root;
            self.min = other_min;
            self.max = other_max;
            self.insert_node(x);
            return (self, cost);
        }
        if other_root.is_none() {
            let cost = (rank_of(&self.arena, self.root) + 1) as usize;
            self.insert_node(x);
            return (self, cost);
        }

        let root = self.root.expect("tree is non-empty");
        let separator_below = self.compare(&self.arena[root as usize].k, &self.arena[x as usize].k) > 0;
        let (lower_root, upper_root, lower_min, upper_max) = if separator_below {
            (other_root, self.root, other_min, self.max)
        } else {
            (self.root, other_root, self.min, other_max)
        };

        let (new_root, cost) = join_roots(&mut self.arena, lower_root, x, upper_root);
        self.root = Some(new_root);
        self.min = lower_min;
        self.max = upper_max;
        (self, cost)
    }

    /// Split around `key`, which must be present, into the tree of smaller
    /// keys and the tree of larger keys. The key's own node is dropped.
    ///
    /// Consumes the tree; each remaining node moves into exactly one of the
    /// two returned trees, whose min/max caches are rebuilt from scratch.
    pub fn split(mut self, key: &K) -> Result<(Self, Self), TreeError>
    where
        C: Clone,
    {
        let node = self.find_node(key).ok_or(TreeError::PreconditionViolated)?;
        let (lower_root, upper_root) = split_at(&mut self.arena, node);

        // Repartition the arena: each kept node moves into the compacted
        // arena of the tree that now owns it.
        let mut tags = vec![0u8; self.arena.len()];
        Self::mark_tree(&self.arena, lower_root, 1, &mut tags);
        Self::mark_tree(&self.arena, upper_root, 2, &mut tags);

        let mut map = vec![0u32; self.arena.len()];
        let (mut n_lower, mut n_upper) = (0u32, 0u32);
        for (i, t) in tags.iter().enumerate() {
            match *t {
                1 => {
                    map[i] = n_lower;
                    n_lower += 1;
                }
                2 => {
                    map[i] = n_upper;
                    n_upper += 1;
                }
                _ => {}
            }
        }

        let mut lower_arena: Vec<RankNode<K, V>> = Vec::with_capacity(n_lower as usize);
        let mut upper_arena: Vec<RankNode<K, V>> = Vec::with_capacity(n_upper as usize);
        for (i, mut n) in self.arena.into_iter().enumerate() {
            match tags[i] {
                0 => {} // the split key's node and unlinked slots drop here
                t => {
                    let remap = |link: Option<u32>| link.map(|j| map[j as usize]);
                    n.p = remap(n.p);
                    n.l = remap(n.l);
                    n.r = remap(n.r);
                    if t == 1 {
                        lower_arena.push(n);
                    } else {
                        upper_arena.push(n);
                    }
                }
            }
        }

        let lower = Self::from_parts(
            lower_arena,
            lower_root.map(|i| map[i as usize]),
            self.comparator.clone(),
        );
        let upper = Self::from_parts(
            upper_arena,
            upper_root.map(|i| map[i as usize]),
            self.comparator,
        );
        Ok((lower, upper))
    }

    fn mark_tree(arena: &[RankNode<K, V>], root: Option<u32>, tag: u8, tags: &mut [u8]) {
        let mut curr = first(arena, root);
        while let Some(i) = curr {
            tags[i as usize] = tag;
            curr = next(arena, i);
        }
    }

    /// Keys in ascending order, eagerly collected.
    pub fn keys_in_order(&self) -> Vec<K>
    where
        K: Clone,
    {
        let mut out = Vec::with_capacity(self.size());
        let mut curr = first(&self.arena, self.root);
        while let Some(i) = curr {
            out.push(self.arena[i as usize].k.clone());
            curr = next(&self.arena, i);
        }
        out
    }

    /// Values in ascending key order, eagerly collected.
    pub fn values_in_order(&self) -> Vec<&V> {
        let mut out = Vec::with_capacity(self.size());
        let mut curr = first(&self.arena, self.root);
        while let Some(i) = curr {
            out.push(&self.arena[i as usize].v);
            curr = next(&self.arena, i);
        }
        out
    }

    /// Structural validation: link symmetry, exact ranks, the rank
    /// difference rule, cached sizes, strict key order and the min/max
    /// caches.
    pub fn assert_valid(&self) -> Result<(), String> {
        let Some(root) = self.root else {
            if self.min.is_some() || self.max.is_some() {
                return Err("empty tree carries min/max caches".to_string());
            }
            return Ok(());
        };
        if self.arena[root as usize].p.is_some() {
            return Err("root has a parent".to_string());
        }

        self.validate_node(root)?;

        let mut curr = first(&self.arena, Some(root));
        let mut prev_idx: Option<u32> = None;
        while let Some(i) = curr {
            if let Some(p) = prev_idx {
                if self.compare(&self.arena[p as usize].k, &self.arena[i as usize].k) >= 0 {
                    return Err("key order violated".to_string());
                }
            }
            prev_idx = Some(i);
            curr = next(&self.arena, i);
        }

        if self.min != first(&self.arena, Some(root)) {
            return Err("min cache is stale".to_string());
        }
        if self.max != last(&self.arena, Some(root)) {
            return Err("max cache is stale".to_string());
        }
        Ok(())
    }

    /// Validate the subtree under `i`, returning its height.
    fn validate_node(&self, i: u32) -> Result<i32, String> {
        let n = &self.arena[i as usize];

        let hl = match n.l {
            None => -1,
            Some(l) => {
                if self.arena[l as usize].p != Some(i) {
                    return Err(format!("broken parent link on left child of node {i}"));
                }
                self.validate_node(l)?
            }
        };
        let hr = match n.r {
            None => -1,
            Some(r) => {
                if self.arena[r as usize].p != Some(i) {
                    return Err(format!("broken parent link on right child of node {i}"));
                }
                self.validate_node(r)?
            }
        };

        if (hl - hr).abs() > 1 {
            return Err(format!("rank rule violated at node {i}: {hl} vs {hr}"));
        }
        let h = 1 + hl.max(hr);
        if n.rank != h {
            return Err(format!("rank {} does not match height {h} at node {i}", n.rank));
        }

        let sl = n.l.map_or(0, |l| self.arena[l as usize].size);
        let sr = n.r.map_or(0, |r| self.arena[r as usize].size);
        if n.size != 1 + sl + sr {
            return Err(format!(
                "size {} does not match 1 + {sl} + {sr} at node {i}",
                n.size
            ));
        }
        Ok(h)
    }

    /// Indented debug rendering of the tree structure.
    pub fn print(&self) -> String
    where
        K: Debug,
        V: Debug,
    {
        self.print_node(self.root, "")
    }

    fn print_node(&self, node: Option<u32>, tab: &str) -> String
    where
        K: Debug,
        V: Debug,
    {
        match node {
            None => "∅".to_string(),
            Some(i) => {
                let n = &self.arena[i as usize];
                let left = self.print_node(n.l, &format!("{tab}  "));
                let right = self.print_node(n.r, &format!("{tab}  "));
                format!(
                    "Node[{i}] [rank={} size={}] {{ {:?} = {:?} }}\n{tab}L={left}\n{tab}R={right}",
                    n.rank, n.size, n.k, n.v
                )
            }
        }
    }
}
