use rank_forest::{RankTree, TreeError};

fn tree_of(keys: &[i64]) -> RankTree<i64, i64> {
    let mut tree = RankTree::new();
    for &k in keys {
        tree.insert(k, k * 10).unwrap();
    }
    tree
}

#[test]
fn join_equal_rank_trees_matrix() {
    let a = tree_of(&[1, 2, 3]);
    let b = tree_of(&[5, 6, 7]);
    let (joined, cost) = a.join(4, 40, b);
    joined.assert_valid().unwrap();
    assert_eq!(joined.keys_in_order(), vec![1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(joined.size(), 7);
    assert_eq!(cost, 1);
    assert_eq!(joined.min(), Some(&10));
    assert_eq!(joined.max(), Some(&70));
    assert_eq!(joined.get(&4), Some(&40));
}

#[test]
fn join_orientation_is_resolved_by_keys() {
    // The receiver may hold either the smaller or the larger keys.
    let a = tree_of(&[1, 2, 3]);
    let b = tree_of(&[5, 6, 7]);
    let (joined, cost) = b.join(4, 40, a);
    joined.assert_valid().unwrap();
    assert_eq!(joined.keys_in_order(), vec![1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(cost, 1);
}

#[test]
fn join_taller_upper_tree_matrix() {
    let a = tree_of(&[1, 2]);
    let b = tree_of(&(10..40).collect::<Vec<_>>());
    let (ra, rb) = (a.rank(), b.rank());
    assert!(rb > ra);
    let (joined, cost) = a.join(5, 50, b);
    joined.assert_valid().unwrap();
    assert_eq!(cost, (ra - rb).unsigned_abs() as usize + 1);
    let mut expected: Vec<i64> = vec![1, 2, 5];
    expected.extend(10..40);
    assert_eq!(joined.keys_in_order(), expected);
}

#[test]
fn join_taller_lower_tree_matrix() {
    let a = tree_of(&(0..40).collect::<Vec<_>>());
    let b = tree_of(&[100, 101]);
    let (ra, rb) = (a.rank(), b.rank());
    assert!(ra > rb);
    let (joined, cost) = a.join(50, 500, b);
    joined.assert_valid().unwrap();
    assert_eq!(cost, (ra - rb).unsigned_abs() as usize + 1);
    let mut expected: Vec<i64> = (0..40).collect();
    expected.push(50);
    expected.extend([100, 101]);
    assert_eq!(joined.keys_in_order(), expected);
}

#[test]
fn join_with_empty_sides_matrix() {
    // An empty side degenerates to inserting the separator; the cost is
    // the other side's rank plus one.
    let empty = RankTree::<i64, i64>::new();
    let b = tree_of(&[5, 6, 7]);
    let rb = b.rank();
    let (joined, cost) = empty.join(4, 40, b);
    joined.assert_valid().unwrap();
    assert_eq!(joined.keys_in_order(), vec![4, 5, 6, 7]);
    assert_eq!(cost, (rb + 1) as usize);

    let a = tree_of(&[1, 2, 3]);
    let ra = a.rank();
    let (joined, cost) = a.join(9, 90, RankTree::new());
    joined.assert_valid().unwrap();
    assert_eq!(joined.keys_in_order(), vec![1, 2, 3, 9]);
    assert_eq!(cost, (ra + 1) as usize);

    let (joined, cost) = RankTree::<i64, i64>::new().join(4, 40, RankTree::new());
    joined.assert_valid().unwrap();
    assert_eq!(joined.keys_in_order(), vec![4]);
    assert_eq!(joined.min(), Some(&40));
    assert_eq!(joined.max(), Some(&40));
    assert_eq!(cost, 0);
}

#[test]
fn split_middle_and_rejoin_matrix() {
    let tree = tree_of(&(1..=9).collect::<Vec<_>>());
    let (lower, upper) = tree.split(&5).unwrap();
    lower.assert_valid().unwrap();
    upper.assert_valid().unwrap();
    assert_eq!(lower.keys_in_order(), vec![1, 2, 3, 4]);
    assert_eq!(upper.keys_in_order(), vec![6, 7, 8, 9]);
    assert_eq!(lower.max(), Some(&40));
    assert_eq!(upper.min(), Some(&60));

    let (rejoined, _cost) = lower.join(5, 50, upper);
    rejoined.assert_valid().unwrap();
    assert_eq!(rejoined.keys_in_order(), (1..=9).collect::<Vec<_>>());
}

#[test]
fn split_at_every_key_matrix() {
    let keys: Vec<i64> = (1..=9).collect();
    for &split_key in &keys {
        let tree = tree_of(&keys);
        let (lower, upper) = tree.split(&split_key).unwrap();
        lower.assert_valid().unwrap();
        upper.assert_valid().unwrap();
        let expect_lower: Vec<i64> = keys.iter().copied().filter(|&k| k < split_key).collect();
        let expect_upper: Vec<i64> = keys.iter().copied().filter(|&k| k > split_key).collect();
        assert_eq!(lower.keys_in_order(), expect_lower);
        assert_eq!(upper.keys_in_order(), expect_upper);
        assert_eq!(lower.size() + upper.size(), keys.len() - 1);
    }
}

#[test]
fn split_at_extremes_matrix() {
    let tree = tree_of(&(1..=9).collect::<Vec<_>>());
    let (lower, upper) = tree.split(&1).unwrap();
    assert!(lower.is_empty());
    assert_eq!(lower.min(), None);
    assert_eq!(upper.keys_in_order(), (2..=9).collect::<Vec<_>>());

    let tree = tree_of(&(1..=9).collect::<Vec<_>>());
    let (lower, upper) = tree.split(&9).unwrap();
    assert_eq!(lower.keys_in_order(), (1..=8).collect::<Vec<_>>());
    assert!(upper.is_empty());
    assert_eq!(upper.max(), None);
}

#[test]
fn split_on_absent_key_is_a_precondition_violation() {
    let tree = tree_of(&[1, 2, 3]);
    assert!(matches!(
        tree.split(&100),
        Err(TreeError::PreconditionViolated)
    ));
}

#[test]
fn split_single_node_tree_matrix() {
    let tree = tree_of(&[42]);
    let (lower, upper) = tree.split(&42).unwrap();
    assert!(lower.is_empty());
    assert!(upper.is_empty());
    lower.assert_valid().unwrap();
    upper.assert_valid().unwrap();
}

#[test]
fn chained_joins_and_splits_matrix() {
    // Alternate splits and joins to push work through the forced
    // rebalancing path repeatedly.
    let mut tree = tree_of(&(0..64).collect::<Vec<_>>());
    for step in 1..8 {
        let pivot = step * 8;
        let value = tree.get(&pivot).copied().unwrap();
        let (lower, upper) = tree.split(&pivot).unwrap();
        lower.assert_valid().unwrap();
        upper.assert_valid().unwrap();
        let (rejoined, _) = lower.join(pivot, value, upper);
        rejoined.assert_valid().unwrap();
        tree = rejoined;
    }
    assert_eq!(tree.keys_in_order(), (0..64).collect::<Vec<_>>());
}
