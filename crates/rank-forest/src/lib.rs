//! Arena-based rank-balanced search tree with join and split.
//!
//! [`RankTree`] keeps distinct keys in an ordered binary tree whose nodes
//! carry a balance rank (the exact subtree height) and a cached subtree
//! size. Besides logarithmic search, insertion and deletion it offers two
//! composition operations:
//!
//! - [`RankTree::join`] merges two key-disjoint trees around a separator
//!   key in time proportional to their rank difference;
//! - [`RankTree::split`] partitions a tree around a contained key by
//!   replaying joins along the ancestor path.
//!
//! Instead of raw pointers, all links are `Option<u32>` indices into a
//! `Vec`-backed arena: child links own their subtrees, the parent link is
//! a back-reference, and `None` is the sentinel standing in for an absent
//! subtree (rank -1, size 0).
//!
//! The link-level code ([`balance`], [`join`], [`util`]) consists of free
//! functions over `(arena, index)` pairs, generic over [`RankNodeLike`],
//! so callers that keep several trees inside one caller-owned arena can
//! drive the algorithms directly; [`RankTree`] is the owning wrapper.
//!
//! # Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`node`] | [`Node`] and [`RankNodeLike`] traits, concrete [`RankNode`] |
//! | [`util`] | leftmost/rightmost and in-order successor/predecessor walks |
//! | [`balance`] | rotations, promote/demote and the shared rebalancing walk |
//! | [`join`] | [`join_roots`] and [`split_at`] over a shared arena |
//! | [`tree`] | [`RankTree`], the owning map-like API |
//! | [`error`] | [`TreeError`] |

pub mod balance;
pub mod error;
pub mod join;
pub mod node;
pub mod tree;
pub mod util;

pub use balance::{demote, promote, rank_of, rebalance, rotate_left, rotate_right, size_of};
pub use error::TreeError;
pub use join::{join_roots, split_at};
pub use node::{Node, RankNode, RankNodeLike};
pub use tree::RankTree;
pub use util::{first, last, next, prev};
