use keyroute::{ConsistentNodeRouter, Node, NodeRouter, PhysicalNode, RoutedNode, XxHash};

use rand::{rng, RngExt};
use std::collections::{HashMap, HashSet};

const REPLICAS: u32 = 15;

fn create_router() -> ConsistentNodeRouter {
    ConsistentNodeRouter::new(REPLICAS)
}

fn owner(router: &ConsistentNodeRouter, key: &str) -> Option<String> {
    router.get_node(key).map(|n| n.node_id().to_string())
}

fn snapshot(router: &ConsistentNodeRouter, keys: &[String]) -> Vec<Option<String>> {
    keys.iter().map(|k| owner(router, k)).collect()
}

fn keys(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("key_{}", i)).collect()
}

#[test]
fn empty_pool_returns_nothing() {
    let router = create_router();
    for key in keys(100) {
        assert!(router.get_node(&key).is_none());
    }
}

#[test]
fn same_node_after_large_pool_change() {
    let router = create_router();
    router
        .add_nodes((0..1000).map(|i| PhysicalNode::of(format!("node{}", i))))
        .unwrap();

    let node = owner(&router, "key").expect("pool is not empty");

    let mut rng = rng();
    let mut removed = HashSet::new();
    while removed.len() < 250 {
        let node_id = format!("node{}", rng.random_range(0..1000));
        if node_id != node {
            removed.insert(node_id);
        }
    }
    router.remove_nodes(&removed).unwrap();

    assert_eq!(router.node_count(), 750);
    assert_eq!(owner(&router, "key"), Some(node));
}

#[test]
fn new_node_returned_after_previous_deleted() {
    let router = create_router();
    router
        .add_nodes(vec![PhysicalNode::of("node1"), PhysicalNode::of("node2")])
        .unwrap();

    let before = owner(&router, "key").unwrap();
    router.remove_node(&before).unwrap();

    let after = owner(&router, "key").unwrap();
    assert_ne!(before, after);
    assert!(after == "node1" || after == "node2");
}

#[test]
fn re_add_restores_mapping() {
    let router = create_router();
    router
        .add_nodes((0..10).map(|i| PhysicalNode::of(format!("node{}", i))))
        .unwrap();

    let keys = keys(2000);
    let before = snapshot(&router, &keys);

    router.remove_node("node3").unwrap();
    router.add_node(PhysicalNode::of("node3")).unwrap();

    assert_eq!(snapshot(&router, &keys), before);
}

#[test]
fn insertion_order_does_not_matter() {
    let forward = create_router();
    let reverse = create_router();

    forward
        .add_nodes((0..1000).map(|i| PhysicalNode::of(format!("node{}", i))))
        .unwrap();
    reverse
        .add_nodes((0..1000).rev().map(|i| PhysicalNode::of(format!("node{}", i))))
        .unwrap();

    let keys = keys(1000);
    assert_eq!(snapshot(&forward, &keys), snapshot(&reverse, &keys));
}

#[test]
fn removal_only_moves_keys_of_removed_node() {
    let router = create_router();
    router
        .add_nodes((0..20).map(|i| PhysicalNode::of(format!("node{}", i))))
        .unwrap();

    let keys = keys(5000);
    let before = snapshot(&router, &keys);

    router.remove_node("node7").unwrap();
    let after = snapshot(&router, &keys);

    for (i, (b, a)) in before.iter().zip(after.iter()).enumerate() {
        if b.as_deref() != Some("node7") {
            assert_eq!(b, a, "key {} was not on node7 but moved", i);
        } else {
            assert_ne!(a.as_deref(), Some("node7"));
        }
    }
}

#[test]
fn adding_node_only_takes_keys_for_itself() {
    let router = create_router();
    router
        .add_nodes((0..20).map(|i| PhysicalNode::of(format!("node{}", i))))
        .unwrap();

    let keys = keys(5000);
    let before = snapshot(&router, &keys);

    router.add_node(PhysicalNode::of("newcomer")).unwrap();
    let after = snapshot(&router, &keys);

    for (b, a) in before.iter().zip(after.iter()) {
        if b != a {
            assert_eq!(a.as_deref(), Some("newcomer"));
        }
    }
}

#[test]
fn repeated_lookups_are_stable() {
    let router = create_router();
    router
        .add_nodes((0..50).map(|i| PhysicalNode::of(format!("node{}", i))))
        .unwrap();

    let keys = keys(500);
    let first = snapshot(&router, &keys);
    for _ in 0..5 {
        assert_eq!(snapshot(&router, &keys), first);
    }
}

#[test]
fn independent_routers_agree() {
    let nodes = || (0..30).map(|i| PhysicalNode::of(format!("node{}", i)));
    let a = ConsistentNodeRouter::with_nodes(nodes(), REPLICAS, Box::new(XxHash)).unwrap();
    let b = ConsistentNodeRouter::with_nodes(nodes(), REPLICAS, Box::new(XxHash)).unwrap();

    let keys = keys(1000);
    assert_eq!(snapshot(&a, &keys), snapshot(&b, &keys));
}

#[test]
fn keys_spread_across_nodes() {
    let router = ConsistentNodeRouter::new(200);
    router
        .add_nodes(vec![
            PhysicalNode::of("node1"),
            PhysicalNode::of("node2"),
            PhysicalNode::of("node3"),
        ])
        .unwrap();

    let total = 30_000;
    let mut counts: HashMap<String, usize> = HashMap::new();
    for key in keys(total) {
        *counts.entry(owner(&router, &key).unwrap()).or_default() += 1;
    }

    for (node, count) in &counts {
        let share = *count as f64 / total as f64;
        assert!(
            (0.2..=0.47).contains(&share),
            "{} holds {:.2} of keys",
            node,
            share
        );
    }
    assert_eq!(counts.len(), 3);
}

#[test]
fn more_replicas_attract_more_keys() {
    let router = create_router();
    router
        .add_node(PhysicalNode::with_virtual_node_count(Node::new("small"), 50))
        .unwrap();
    router
        .add_node(PhysicalNode::with_virtual_node_count(Node::new("large"), 150))
        .unwrap();

    let total = 20_000;
    let large = keys(total)
        .iter()
        .filter(|k| owner(&router, k).as_deref() == Some("large"))
        .count();
    let small = total - large;

    let ratio = large as f64 / small as f64;
    assert!(
        (1.5..=5.0).contains(&ratio),
        "large={} small={} (ratio {:.2})",
        large,
        small,
        ratio
    );
}

#[test]
fn injected_hash_function_decides_placement() {
    // node ids end in their ring position, keys are parsed the same way
    let positional = |s: &str| -> u64 {
        let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
        digits.parse().unwrap_or(0)
    };
    let router = ConsistentNodeRouter::new_with_hasher(1, Box::new(positional));
    router
        .add_nodes(vec![PhysicalNode::of("n1"), PhysicalNode::of("n5")])
        .unwrap();

    // derived ids are "n1-0" and "n5-0", i.e. positions 10 and 50
    assert_eq!(owner(&router, "k10").as_deref(), Some("n1"));
    assert_eq!(owner(&router, "k11").as_deref(), Some("n5"));
    assert_eq!(owner(&router, "k50").as_deref(), Some("n5"));
    assert_eq!(owner(&router, "k51").as_deref(), Some("n1"));
}
