//! End-to-end exercises of the core tree against `std::collections::BTreeMap`
//! as the reference model, plus the small-order boundary scripts that pin
//! down the rebalancing behavior.

use pretty_assertions::assert_eq;
use rand::prelude::*;
use ranktree::{Error, RankTree};
use std::collections::BTreeMap;

fn assert_matches_model(tree: &RankTree<i32, i32>, model: &BTreeMap<i32, i32>) {
    assert_eq!(tree.len(), model.len());
    let tree_pairs: Vec<(i32, i32)> = tree.iter().map(|(k, v)| (*k, *v)).collect();
    let model_pairs: Vec<(i32, i32)> = model.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(tree_pairs, model_pairs);
}

#[test]
fn mixed_churn_matches_btreemap_across_orders() {
    for order in [4, 5, 8, 32] {
        let mut rng = StdRng::seed_from_u64(order as u64);
        let mut tree = RankTree::new(order).unwrap();
        let mut model = BTreeMap::new();

        for round in 0..4000 {
            let key = rng.gen_range(0..600);
            match rng.gen_range(0..10) {
                0..=4 => {
                    let value = rng.gen_range(0..1000);
                    assert_eq!(tree.insert(key, value), model.insert(key, value));
                }
                5..=8 => {
                    assert_eq!(tree.remove(&key), model.remove(&key));
                }
                _ => {
                    assert_eq!(tree.get(&key), model.get(&key));
                }
            }
            if round % 97 == 0 {
                tree.check_invariants_detailed().unwrap();
            }
        }
        tree.check_invariants_detailed().unwrap();
        assert_matches_model(&tree, &model);
    }
}

#[test]
fn bulk_load_equals_repeated_insertion() {
    let entries: Vec<(i32, i32)> = (0..500).map(|i| (i, i * 7)).collect();

    let loaded = RankTree::from_sorted_iter(4, entries.clone()).unwrap();
    let mut inserted = RankTree::new(4).unwrap();
    for (k, v) in &entries {
        inserted.insert(*k, *v);
    }

    loaded.check_invariants_detailed().unwrap();
    inserted.check_invariants_detailed().unwrap();
    let a: Vec<(i32, i32)> = loaded.iter().map(|(k, v)| (*k, *v)).collect();
    let b: Vec<(i32, i32)> = inserted.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(a, b);
    for rank in 0..500 {
        assert_eq!(loaded.get_by_rank(rank), inserted.get_by_rank(rank));
    }
}

#[test]
fn underflow_repair_reaches_across_parents() {
    // Order 4, 30 ascending keys: ten full leaves, parents of four leaves
    // each. Leaf [9, 10, 11] is the last child of the first parent; draining
    // it below the floor forces a borrow from [12, 13, 14], which lives
    // under the second parent.
    let mut tree = RankTree::from_sorted_iter(4, (0..30).map(|i| (i, i))).unwrap();
    assert_eq!(tree.leaf_sizes(), vec![3; 10]);

    assert_eq!(tree.remove(&9), Some(9));
    assert_eq!(tree.remove(&10), Some(10));
    tree.check_invariants_detailed().unwrap();

    let keys: Vec<i32> = tree.iter().map(|(k, _)| *k).collect();
    let expected: Vec<i32> = (0..30).filter(|k| *k != 9 && *k != 10).collect();
    assert_eq!(keys, expected);
    for (rank, key) in expected.iter().enumerate() {
        assert_eq!(tree.rank_of_key(key), Some(rank));
    }
}

#[test]
fn merges_cascade_to_root_collapse() {
    // Build a three-level tree, then delete everything from the left so the
    // merges climb: leaves merge, their parent underflows, branches merge,
    // and finally the root is left with one child and collapses.
    let mut tree = RankTree::from_sorted_iter(4, (0..60).map(|i| (i, i))).unwrap();
    tree.check_invariants_detailed().unwrap();

    for i in 0..55 {
        assert_eq!(tree.remove(&i), Some(i));
        tree.check_invariants_detailed().unwrap();
    }
    assert_eq!(tree.len(), 5);
    let rest: Vec<i32> = tree.iter().map(|(k, _)| *k).collect();
    assert_eq!(rest, vec![55, 56, 57, 58, 59]);
}

#[test]
fn append_heavy_growth_then_total_teardown() {
    let mut tree = RankTree::new(4).unwrap();
    for i in 0..1000 {
        tree.insert(i, i);
    }
    tree.check_invariants_detailed().unwrap();

    // Alternate ends to exercise both the empty-rightmost unlink and the
    // leftmost pivot rewrites.
    let mut lo = 0;
    let mut hi = 999;
    while lo <= hi {
        assert!(tree.remove(&lo).is_some());
        if lo != hi {
            assert!(tree.remove(&hi).is_some());
        }
        lo += 1;
        hi -= 1;
        tree.check_invariants_detailed().unwrap();
    }
    assert!(tree.is_empty());
}

#[test]
fn clear_resets_and_tree_is_reusable() {
    let mut tree = RankTree::from_sorted_iter(4, (0..100).map(|i| (i, i))).unwrap();
    tree.clear();
    assert!(tree.is_empty());
    assert_eq!(tree.iter().count(), 0);
    tree.check_invariants_detailed().unwrap();

    for i in (0..50).rev() {
        tree.insert(i, i);
    }
    assert_eq!(tree.len(), 50);
    tree.check_invariants_detailed().unwrap();
}

#[test]
fn stage_advances_on_every_mutation_kind() {
    let mut tree = RankTree::new(4).unwrap();
    let mut last = tree.stage();
    let mut expect_bump = |tree: &RankTree<i32, i32>, what: &str| {
        assert_ne!(tree.stage(), last, "{} did not advance the stage", what);
        last = tree.stage();
    };

    tree.insert(1, 10);
    expect_bump(&tree, "insert");
    tree.insert(1, 11);
    expect_bump(&tree, "replace");
    tree.insert_dup(1, 12);
    expect_bump(&tree, "insert_dup");
    tree.remove(&1);
    expect_bump(&tree, "remove");
    tree.remove_by_rank(0).unwrap();
    expect_bump(&tree, "remove_by_rank");
    tree.insert(2, 20);
    expect_bump(&tree, "insert");
    if let Some(v) = tree.get_mut(&2) {
        *v += 1;
    }
    expect_bump(&tree, "get_mut");
    if let Some((_, v)) = tree.get_by_rank_mut(0) {
        *v += 1;
    }
    expect_bump(&tree, "get_by_rank_mut");
    tree.clear();
    expect_bump(&tree, "clear");

    // Failed mutations leave the stage alone.
    tree.insert(5, 0);
    let stage = tree.stage();
    assert_eq!(tree.try_insert(5, 1), Err(Error::DuplicateKey));
    assert_eq!(tree.remove(&99), None);
    assert!(tree.remove_by_rank(10).is_err());
    assert_eq!(tree.stage(), stage);
}

#[test]
fn arena_slots_are_recycled() {
    let mut tree = RankTree::new(4).unwrap();
    for i in 0..200 {
        tree.insert(i, i);
    }
    let grown = tree.leaf_arena_stats();
    for i in 0..200 {
        tree.remove(&i);
    }
    for i in 0..200 {
        tree.insert(i, i);
    }
    let regrown = tree.leaf_arena_stats();
    // Freed pages are reused before the storage grows further.
    assert!(regrown.total_capacity <= grown.total_capacity + 1);
    tree.check_invariants_detailed().unwrap();
}

#[test]
fn string_keys_and_unsized_friendly_values() {
    let mut tree: RankTree<String, Vec<u8>> = RankTree::new(4).unwrap();
    for word in ["pear", "apple", "plum", "fig", "quince", "olive"] {
        tree.insert(word.to_string(), word.as_bytes().to_vec());
    }
    assert_eq!(tree.get_by_rank(0).map(|(k, _)| k.as_str()), Some("apple"));
    assert_eq!(tree.rank_of_key(&"plum".to_string()), Some(4));
    assert_eq!(
        tree.get(&"fig".to_string()).map(Vec::as_slice),
        Some(&b"fig"[..])
    );
    tree.check_invariants_detailed().unwrap();
}
