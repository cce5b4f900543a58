//! The unified rebalancing walk shared by insertion, deletion and join,
//! together with its rank and rotation primitives.
//!
//! Ranks label every node with the exact height of its subtree, so the
//! difference `rank(node) - rank(child)` is 1 or 2 in a balanced tree
//! (a missing child counts as rank -1). The walk climbs from a mutation
//! point toward the root, dispatching on the pair of child rank
//! differences, until the tree is balanced again. Join splices may look
//! locally balanced while ancestors still violate the rule, which is what
//! the `forced_continue` flag is for: the first evaluated step does not
//! stop early, every later step does.

use crate::node::RankNodeLike;
use crate::util::{get_l, get_p, get_r, set_l, set_p, set_r};

/// Rank of the subtree behind a link; the missing link is the sentinel
/// with rank -1.
#[inline]
pub fn rank_of<N: RankNodeLike>(arena: &[N], link: Option<u32>) -> i32 {
    link.map_or(-1, |i| arena[i as usize].rank())
}

/// Size of the subtree behind a link; 0 for the missing link.
#[inline]
pub fn size_of<N: RankNodeLike>(arena: &[N], link: Option<u32>) -> usize {
    link.map_or(0, |i| arena[i as usize].size())
}

/// Recompute the cached size of one node from its children.
#[inline]
fn update_size<N: RankNodeLike>(arena: &mut [N], i: u32) {
    let s = 1 + size_of(arena, get_l(arena, i)) + size_of(arena, get_r(arena, i));
    arena[i as usize].set_size(s);
}

/// Recompute cached sizes from `from` through every ancestor up to the root.
fn update_sizes_to_root<N: RankNodeLike>(arena: &mut [N], from: Option<u32>) {
    let mut curr = from;
    while let Some(i) = curr {
        update_size(arena, i);
        curr = get_p(arena, i);
    }
}

/// Raise the rank of `i` by one.
#[inline]
pub fn promote<N: RankNodeLike>(arena: &mut [N], i: u32) {
    let r = arena[i as usize].rank();
    arena[i as usize].set_rank(r + 1);
}

/// Lower the rank of `i` by one.
#[inline]
pub fn demote<N: RankNodeLike>(arena: &mut [N], i: u32) {
    let r = arena[i as usize].rank();
    arena[i as usize].set_rank(r - 1);
}

/// Left rotation at `n`: the right child becomes the subtree root and `n`
/// its left child. Relinks three nodes, reattaches the pivot to `n`'s old
/// parent slot, recomputes the two changed sizes. Returns the pivot.
pub fn rotate_left<N: RankNodeLike>(arena: &mut [N], n: u32) -> u32 {
    let p = get_p(arena, n);
    let pivot = get_r(arena, n).expect("rotation needs a right child");
    let inner = get_l(arena, pivot);

    set_r(arena, n, inner);
    if let Some(inner) = inner {
        set_p(arena, inner, Some(n));
    }
    set_l(arena, pivot, Some(n));
    set_p(arena, n, Some(pivot));
    set_p(arena, pivot, p);
    if let Some(p) = p {
        if get_l(arena, p) == Some(n) {
            set_l(arena, p, Some(pivot));
        } else {
            set_r(arena, p, Some(pivot));
        }
    }

    update_size(arena, n);
    update_size(arena, pivot);
    pivot
}

/// Right rotation at `n`, the mirror of [`rotate_left`].
pub fn rotate_right<N: RankNodeLike>(arena: &mut [N], n: u32) -> u32 {
    let p = get_p(arena, n);
    let pivot = get_l(arena, n).expect("rotation needs a left child");
    let inner = get_r(arena, pivot);

    set_l(arena, n, inner);
    if let Some(inner) = inner {
        set_p(arena, inner, Some(n));
    }
    set_r(arena, pivot, Some(n));
    set_p(arena, n, Some(pivot));
    set_p(arena, pivot, p);
    if let Some(p) = p {
        if get_l(arena, p) == Some(n) {
            set_l(arena, p, Some(pivot));
        } else {
            set_r(arena, p, Some(pivot));
        }
    }

    update_size(arena, n);
    update_size(arena, pivot);
    pivot
}

/// Rebalancing walk from `from` toward the root.
///
/// Returns the possibly changed root together with the number of
/// rebalancing operations performed (a promotion, a demotion or a single
/// rotation each count as one, a double rotation as two). The count is
/// instrumentation for complexity accounting; correctness never depends
/// on it.
///
/// With `forced_continue` the first evaluated node does not end the walk
/// even when it is balanced; join needs this because the splice point can
/// be locally balanced while an ancestor above it is not.
pub fn rebalance<N: RankNodeLike>(
    arena: &mut [N],
    root: Option<u32>,
    from: Option<u32>,
    forced_continue: bool,
) -> (Option<u32>, usize) {
    let mut root = root;
    let mut forced = forced_continue;
    let mut ops = 0usize;
    let mut curr = from;

    while let Some(n) = curr {
        let dl = arena[n as usize].rank() - rank_of(arena, get_l(arena, n));
        let dr = arena[n as usize].rank() - rank_of(arena, get_r(arena, n));

        match (dl, dr) {
            // Balanced: done, unless a join splice forces one more step up.
            (1, 1) | (1, 2) | (2, 1) => {
                update_sizes_to_root(arena, Some(n));
                if !forced {
                    return (root, ops);
                }
                curr = get_p(arena, n);
            }

            // One child grew by an insertion below it.
            (0, 1) | (1, 0) => {
                update_size(arena, n);
                promote(arena, n);
                ops += 1;
                curr = get_p(arena, n);
            }

            // Left-heavy by two.
            (0, 2) => {
                let left = get_l(arena, n).expect("0-difference child is present");
                let ldl = arena[left as usize].rank() - rank_of(arena, get_l(arena, left));
                let ldr = arena[left as usize].rank() - rank_of(arena, get_r(arena, left));
                if ldl == 1 && ldr == 2 {
                    let pivot = rotate_right(arena, n);
                    demote(arena, n);
                    ops += 2;
                    if get_p(arena, pivot).is_none() {
                        root = Some(pivot);
                    }
                    update_sizes_to_root(arena, Some(n));
                    if !forced {
                        return (root, ops);
                    }
                    curr = get_p(arena, pivot);
                } else if ldl == 2 && ldr == 1 {
                    rotate_left(arena, left);
                    let pivot = rotate_right(arena, n);
                    demote(arena, left);
                    demote(arena, n);
                    promote(arena, pivot);
                    ops += 5;
                    if get_p(arena, pivot).is_none() {
                        root = Some(pivot);
                    }
                    update_sizes_to_root(arena, Some(n));
                    if !forced {
                        return (root, ops);
                    }
                    curr = get_p(arena, pivot);
                } else {
                    // Both left differences are 1: only a join splice
                    // produces this shape, and it never ends the walk.
                    debug_assert!(ldl == 1 && ldr == 1);
                    let pivot = rotate_right(arena, n);
                    promote(arena, pivot);
                    ops += 2;
                    if get_p(arena, pivot).is_none() {
                        root = Some(pivot);
                    }
                    curr = get_p(arena, pivot);
                }
            }

            // Right-heavy by two, the mirror of the above.
            (2, 0) => {
                let right = get_r(arena, n).expect("0-difference child is present");
                let rdl = arena[right as usize].rank() - rank_of(arena, get_l(arena, right));
                let rdr = arena[right as usize].rank() - rank_of(arena, get_r(arena, right));
                if rdl == 2 && rdr == 1 {
                    let pivot = rotate_left(arena, n);
                    demote(arena, n);
                    ops += 2;
                    if get_p(arena, pivot).is_none() {
                        root = Some(pivot);
                    }
                    update_sizes_to_root(arena, Some(n));
                    if !forced {
                        return (root, ops);
                    }
                    curr = get_p(arena, pivot);
                } else if rdl == 1 && rdr == 2 {
                    rotate_right(arena, right);
                    let pivot = rotate_left(arena, n);
                    demote(arena, right);
                    demote(arena, n);
                    promote(arena, pivot);
                    ops += 5;
                    if get_p(arena, pivot).is_none() {
                        root = Some(pivot);
                    }
                    update_sizes_to_root(arena, Some(n));
                    if !forced {
                        return (root, ops);
                    }
                    curr = get_p(arena, pivot);
                } else {
                    debug_assert!(rdl == 1 && rdr == 1);
                    let pivot = rotate_left(arena, n);
                    promote(arena, pivot);
                    ops += 2;
                    if get_p(arena, pivot).is_none() {
                        root = Some(pivot);
                    }
                    curr = get_p(arena, pivot);
                }
            }

            // Both children shrank by a deletion below.
            (2, 2) => {
                update_size(arena, n);
                demote(arena, n);
                ops += 1;
                curr = get_p(arena, n);
            }

            // Deep left-side shrink after a deletion.
            (3, 1) => {
                let right = get_r(arena, n).expect("1-difference child is present");
                let rdl = arena[right as usize].rank() - rank_of(arena, get_l(arena, right));
                let rdr = arena[right as usize].rank() - rank_of(arena, get_r(arena, right));
                if rdl == 1 && rdr == 1 {
                    let pivot = rotate_left(arena, n);
                    demote(arena, n);
                    promote(arena, pivot);
                    ops += 3;
                    if get_p(arena, pivot).is_none() {
                        root = Some(pivot);
                    }
                    update_sizes_to_root(arena, Some(n));
                    if !forced {
                        return (root, ops);
                    }
                    curr = get_p(arena, pivot);
                } else if rdl == 2 && rdr == 1 {
                    let pivot = rotate_left(arena, n);
                    demote(arena, n);
                    demote(arena, n);
                    ops += 2;
                    if get_p(arena, pivot).is_none() {
                        root = Some(pivot);
                    }
                    curr = get_p(arena, pivot);
                } else {
                    debug_assert!(rdl == 1 && rdr == 2);
                    rotate_right(arena, right);
                    let pivot = rotate_left(arena, n);
                    demote(arena, n);
                    demote(arena, n);
                    promote(arena, pivot);
                    demote(arena, right);
                    ops += 5;
                    if get_p(arena, pivot).is_none() {
                        root = Some(pivot);
                    }
                    curr = get_p(arena, pivot);
                }
            }

            // Deep right-side shrink, the mirror of (3, 1).
            (1, 3) => {
                let left = get_l(arena, n).expect("1-difference child is present");
                let ldl = arena[left as usize].rank() - rank_of(arena, get_l(arena, left));
                let ldr = arena[left as usize].rank() - rank_of(arena, get_r(arena, left));
                if ldl == 1 && ldr == 1 {
                    let pivot = rotate_right(arena, n);
                    demote(arena, n);
                    promote(arena, pivot);
                    ops += 3;
                    if get_p(arena, pivot).is_none() {
                        root = Some(pivot);
                    }
                    update_sizes_to_root(arena, Some(n));
                    if !forced {
                        return (root, ops);
                    }
                    curr = get_p(arena, pivot);
                } else if ldl == 1 && ldr == 2 {
                    let pivot = rotate_right(arena, n);
                    demote(arena, n);
                    demote(arena, n);
                    ops += 2;
                    if get_p(arena, pivot).is_none() {
                        root = Some(pivot);
                    }
                    curr = get_p(arena, pivot);
                } else {
                    debug_assert!(ldl == 2 && ldr == 1);
                    rotate_left(arena, left);
                    let pivot = rotate_right(arena, n);
                    demote(arena, n);
                    demote(arena, n);
                    promote(arena, pivot);
                    demote(arena, left);
                    ops += 5;
                    if get_p(arena, pivot).is_none() {
                        root = Some(pivot);
                    }
                    curr = get_p(arena, pivot);
                }
            }

            _ => unreachable!("unexpected rank differences ({dl}, {dr})"),
        }

        forced = false;
    }

    (root, ops)
}
