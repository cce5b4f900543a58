//! Tree composition over a shared arena: join two trees around a
//! separator node, and split one tree by replaying joins along the
//! ancestor path.
//!
//! Both functions work on `(arena, index)` pairs like the rest of the
//! link-level code, so [`RankTree`](crate::RankTree) and callers that keep
//! several trees inside one caller-owned arena can use them alike.

use crate::balance::{rank_of, rebalance};
use crate::node::RankNodeLike;
use crate::util::{first, get_l, get_p, get_r, last, set_l, set_p, set_r};

/// Reshape `x` into a detached leaf before it is spliced.
fn reset_leaf<N: RankNodeLike>(arena: &mut [N], x: u32) {
    let n = &mut arena[x as usize];
    n.set_p(None);
    n.set_l(None);
    n.set_r(None);
    n.set_rank(0);
    n.set_size(1);
}

/// Join the trees rooted at `lower` and `upper` around the node `x`.
///
/// Caller contract, not checked here: every key under `lower` is below
/// `x`'s key and every key under `upper` above it. Either side may be
/// `None`. `x` may carry stale links or rank; it is reshaped first.
///
/// Returns the root of the joined tree and the cost of the operation:
/// `|rank(lower) - rank(upper)| + 1` when both sides are present, the
/// present side's rank + 1 otherwise. The splice itself touches only the
/// outer spine of the taller tree down to the shorter tree's rank, which
/// is what bounds the work by the rank difference.
pub fn join_roots<N: RankNodeLike>(
    arena: &mut [N],
    lower: Option<u32>,
    x: u32,
    upper: Option<u32>,
) -> (u32, usize) {
    reset_leaf(arena, x);

    let (lo, up) = match (lower, upper) {
        (None, None) => return (x, 0),
        (None, Some(up)) => {
            let cost = (rank_of(arena, upper) + 1) as usize;
            let leaf = first(arena, upper).expect("non-empty tree has a leftmost node");
            set_l(arena, leaf, Some(x));
            set_p(arena, x, Some(leaf));
            let (root, _) = rebalance(arena, Some(up), Some(leaf), false);
            return (root.expect("joined tree is non-empty"), cost);
        }
        (Some(lo), None) => {
            let cost = (rank_of(arena, lower) + 1) as usize;
            let leaf = last(arena, lower).expect("non-empty tree has a rightmost node");
            set_r(arena, leaf, Some(x));
            set_p(arena, x, Some(leaf));
            let (root, _) = rebalance(arena, Some(lo), Some(leaf), false);
            return (root.expect("joined tree is non-empty"), cost);
        }
        (Some(lo), Some(up)) => (lo, up),
    };

    let lr = arena[lo as usize].rank();
    let ur = arena[up as usize].rank();
    let cost = (lr - ur).unsigned_abs() as usize + 1;

    let root = if lr == ur {
        // Same rank: x becomes the root over both trees.
        set_l(arena, x, Some(lo));
        set_p(arena, lo, Some(x));
        set_r(arena, x, Some(up));
        set_p(arena, up, Some(x));
        arena[x as usize].set_rank(lr + 1);
        Some(x)
    } else if ur > lr {
        // Walk the taller upper tree's left spine down to the splice rank.
        let mut spine = up;
        while arena[spine as usize].rank() > lr + 2 {
            spine = get_l(arena, spine).expect("spine continues above the splice rank");
        }
        let freed = get_l(arena, spine);
        set_l(arena, x, Some(lo));
        set_p(arena, lo, Some(x));
        set_r(arena, x, freed);
        if let Some(freed) = freed {
            set_p(arena, freed, Some(x));
        }
        set_l(arena, spine, Some(x));
        set_p(arena, x, Some(spine));
        let spine_rank = arena[spine as usize].rank();
        arena[x as usize].set_rank(spine_rank);
        Some(up)
    } else {
        // Mirror: walk the taller lower tree's right spine.
        let mut spine = lo;
        while arena[spine as usize].rank() > ur + 2 {
            spine = get_r(arena, spine).expect("spine continues above the splice rank");
        }
        let freed = get_r(arena, spine);
        set_l(arena, x, freed);
        if let Some(freed) = freed {
            set_p(arena, freed, Some(x));
        }
        set_r(arena, x, Some(up));
        set_p(arena, up, Some(x));
        set_r(arena, spine, Some(x));
        set_p(arena, x, Some(spine));
        let spine_rank = arena[spine as usize].rank();
        arena[x as usize].set_rank(spine_rank);
        Some(lo)
    };

    let (root, _) = rebalance(arena, root, Some(x), true);
    (root.expect("joined tree is non-empty"), cost)
}

/// Split the tree containing `node` into the trees of keys below and above
/// `node`'s key.
///
/// The node's subtrees seed the two results; the walk then climbs the
/// ancestor chain, consuming each ancestor slot as the connector of a
/// [`join_roots`] call: an ancestor left behind via its right child joins
/// its left subtree into the lower result, one left via its left child
/// joins its right subtree into the upper result. Every join is bounded by
/// the rank difference at that step, which keeps the whole split
/// logarithmic.
///
/// Returns `(lower_root, upper_root)`. `node`'s slot is left fully
/// detached and belongs to neither result.
pub fn split_at<N: RankNodeLike>(arena: &mut [N], node: u32) -> (Option<u32>, Option<u32>) {
    let mut lower = get_l(arena, node);
    let mut upper = get_r(arena, node);
    if let Some(l) = lower {
        set_p(arena, l, None);
    }
    if let Some(r) = upper {
        set_p(arena, r, None);
    }
    set_l(arena, node, None);
    set_r(arena, node, None);

    let mut child = node;
    let mut parent = get_p(arena, child);
    set_p(arena, node, None);

    while let Some(anc) = parent {
        // The ancestor slot is relinked by the join below, so the chain is
        // saved before it is consumed.
        let grand = get_p(arena, anc);
        let from_left = get_l(arena, anc) == Some(child);
        if from_left {
            let sub = get_r(arena, anc);
            if let Some(s) = sub {
                set_p(arena, s, None);
            }
            let (root, _) = join_roots(arena, upper, anc, sub);
            upper = Some(root);
        } else {
            let sub = get_l(arena, anc);
            if let Some(s) = sub {
                set_p(arena, s, None);
            }
            let (root, _) = join_roots(arena, sub, anc, lower);
            lower = Some(root);
        }
        child = anc;
        parent = grand;
    }

    (lower, upper)
}
