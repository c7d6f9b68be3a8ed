//! Rank query behavior under churn, plus the façade surfaces.

use pretty_assertions::assert_eq;
use rand::prelude::*;
use ranktree::{RankMap, RankMultimap, RankSet, RankTree};

#[test]
fn ranks_stay_consistent_under_random_churn() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut tree = RankTree::new(4).unwrap();
    let mut sorted: Vec<i32> = Vec::new();

    for _ in 0..2500 {
        let key = rng.gen_range(0..500);
        if rng.gen_bool(0.6) {
            if tree.insert(key, key).is_none() {
                let at = sorted.binary_search(&key).unwrap_err();
                sorted.insert(at, key);
            }
        } else if tree.remove(&key).is_some() {
            let at = sorted.binary_search(&key).unwrap();
            sorted.remove(at);
        }

        // Spot-check both directions of the rank mapping.
        if !sorted.is_empty() {
            let rank = rng.gen_range(0..sorted.len());
            assert_eq!(tree.get_by_rank(rank).map(|(k, _)| *k), Some(sorted[rank]));
            assert_eq!(tree.rank_of_key(&sorted[rank]), Some(rank));
        }
        assert_eq!(tree.get_by_rank(sorted.len()), None);
    }
}

#[test]
fn draining_by_rank_yields_sorted_order() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut keys: Vec<i32> = (0..300).collect();
    keys.shuffle(&mut rng);

    let mut tree = RankTree::new(4).unwrap();
    for &k in &keys {
        tree.insert(k, k);
    }

    // Always removing rank 0 is a selection sort.
    let mut drained = Vec::new();
    while let Ok((k, _)) = tree.remove_by_rank(0) {
        drained.push(k);
        tree.check_invariants_detailed().unwrap();
    }
    assert_eq!(drained, (0..300).collect::<Vec<_>>());
    assert!(tree.is_empty());
}

#[test]
fn median_tracking_is_a_one_liner() {
    // The headline use case: the median is just the middle rank.
    let mut tree = RankTree::with_default_order();
    let mut rng = StdRng::seed_from_u64(11);
    let mut values: Vec<i32> = Vec::new();

    for _ in 0..1001 {
        let v = rng.gen_range(0..100_000);
        if tree.try_insert(v, ()).is_ok() {
            values.push(v);
        }
    }
    values.sort_unstable();
    let median_rank = values.len() / 2;
    assert_eq!(
        tree.get_by_rank(median_rank).map(|(k, _)| *k),
        Some(values[median_rank])
    );
}

#[test]
fn rank_bounds_partition_around_absent_keys() {
    let tree = RankTree::from_sorted_iter(4, (0..100).map(|i| (i * 10, ()))).unwrap();
    for needle in [-5, 0, 5, 500, 995, 1200] {
        let expected = (0..100).filter(|i| i * 10 < needle).count();
        assert_eq!(tree.rank_lower_bound(&needle), expected);
    }
    assert_eq!(tree.rank_upper_bound(&500), 51);
    assert_eq!(tree.rank_upper_bound(&505), 51);
}

#[test]
fn map_facade_round_trip() {
    let mut map: RankMap<i32, String> = RankMap::new();
    for i in [5, 3, 8, 1, 9] {
        map.insert(i, format!("v{}", i));
    }
    assert_eq!(map.get_by_rank(0).map(|(k, _)| *k), Some(1));
    assert_eq!(map.rank_of_key(&8), Some(3));
    assert_eq!(map.pop_last().map(|(k, _)| k), Some(9));
    assert_eq!(map.len(), 4);

    // Rank 1 of [1, 3, 5, 8] is key 3.
    if let Some((_, v)) = map.get_by_rank_mut(1) {
        v.push('!');
    }
    assert_eq!(map.get(&3).map(String::as_str), Some("v3!"));
}

#[test]
fn set_facade_round_trip() {
    let mut set = RankSet::with_order(4).unwrap();
    for i in 0..100 {
        set.insert(i * 2);
    }
    assert_eq!(set.get_by_rank(10), Some(&20));
    assert_eq!(set.rank_of(&40), Some(20));
    assert!(set.remove(&40));
    assert_eq!(set.rank_of(&42), Some(20));
    set.as_tree().check_invariants_detailed().unwrap();
}

#[test]
fn multimap_facade_round_trip() {
    let mut map = RankMultimap::with_order(4).unwrap();
    for day in 0..7 {
        for event in 0..day {
            map.insert(day, event);
        }
    }
    assert_eq!(map.len(), 21);
    assert_eq!(map.count(&6), 6);
    assert_eq!(map.rank_of_key(&6), Some(15));
    let sixes: Vec<i32> = map.get_all(&6).copied().collect();
    assert_eq!(sixes, vec![0, 1, 2, 3, 4, 5]);

    assert_eq!(map.remove_all(&3), 3);
    assert_eq!(map.count(&3), 0);
    assert_eq!(map.rank_of_key(&6), Some(12));
    map.as_tree().check_invariants_detailed().unwrap();
}

#[test]
fn cursors_survive_reads_but_not_writes() {
    let mut tree = RankTree::from_sorted_iter(4, (0..50).map(|i| (i, i))).unwrap();
    let mut cursor = tree.cursor_at_rank(25).unwrap();

    // Reads do not invalidate.
    assert_eq!(tree.get(&10), Some(&10));
    assert_eq!(tree.rank_of_key(&30), Some(30));
    assert_eq!(tree.cursor_entry(&cursor).unwrap(), (&25, &25));
    assert!(tree.cursor_advance(&mut cursor).unwrap());
    assert_eq!(tree.cursor_entry(&cursor).unwrap(), (&26, &26));

    // Any write does.
    tree.remove(&0);
    assert!(tree.cursor_entry(&cursor).is_err());

    // A fresh cursor picks up the new shape.
    let cursor = tree.cursor_at_rank(25).unwrap();
    assert_eq!(tree.cursor_entry(&cursor).unwrap(), (&26, &26));
}
