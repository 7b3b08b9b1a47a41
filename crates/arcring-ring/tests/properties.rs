//! Property tests for ring assignment.

use arcring_ring::{
    arcs, moved_keys, reset, responsible_node, Key, KeyId, Node, NodeId, Ring, RingPosition,
    RING_DEGREES,
};
use proptest::prelude::*;

fn position() -> impl Strategy<Value = RingPosition> {
    (0..RING_DEGREES as u64).prop_map(RingPosition::wrapping)
}

fn node_sets(max: usize) -> impl Strategy<Value = Vec<Node>> {
    prop::collection::vec(position(), 1..max).prop_map(|positions| {
        positions
            .into_iter()
            .enumerate()
            .map(|(i, p)| Node::new(NodeId::from_index(i), p))
            .collect()
    })
}

fn node_by_id<'a>(nodes: &'a [Node], id: &NodeId) -> &'a Node {
    nodes.iter().find(|n| &n.id == id).expect("owner is one of the nodes")
}

proptest! {
    #[test]
    fn owner_is_successor_or_wraps_to_minimum(nodes in node_sets(12), key in position()) {
        let owner = node_by_id(&nodes, responsible_node(key, &nodes).unwrap());
        let min = nodes.iter().map(|n| n.position).min().unwrap();

        if nodes.iter().any(|n| n.position >= key) {
            prop_assert!(owner.position >= key);
            // No node sits strictly between the key and its owner.
            prop_assert!(!nodes.iter().any(|n| n.position >= key && n.position < owner.position));
        } else {
            prop_assert_eq!(owner.position, min);
        }
    }

    #[test]
    fn resolution_is_idempotent(nodes in node_sets(12), key in position()) {
        let first = responsible_node(key, &nodes).unwrap().clone();
        let second = responsible_node(key, &nodes).unwrap().clone();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn adding_a_node_outside_the_owned_gap_keeps_the_owner(
        nodes in node_sets(12),
        key in position(),
        extra in position(),
    ) {
        let owner = node_by_id(&nodes, responsible_node(key, &nodes).unwrap()).clone();

        // The new node only steals the key by landing strictly between the
        // key and its owner; landing on the owner loses the tie.
        let gap = key.clockwise_to(owner.position);
        prop_assume!(key.clockwise_to(extra) >= gap);

        let mut grown = nodes.clone();
        grown.push(Node::new(NodeId::new("NEW"), extra));

        prop_assert_eq!(responsible_node(key, &grown).unwrap(), &owner.id);
    }

    #[test]
    fn only_keys_in_the_split_arc_move(
        seed in any::<u64>(),
        key_count in 0usize..40,
    ) {
        let mut ring = Ring::seeded(seed);
        for _ in 0..key_count {
            ring.add_key();
        }
        let before = ring.nodes().to_vec();
        let added = ring.add_node();

        let moves = moved_keys(ring.keys(), &before, ring.nodes()).unwrap();
        for m in &moves {
            prop_assert_eq!(&m.to, &added.id);
        }
    }

    #[test]
    fn arc_lengths_sum_to_circumference(nodes in node_sets(12)) {
        let total: u32 = arcs(&nodes).iter().map(|a| u32::from(a.length)).sum();
        prop_assert_eq!(total, u32::from(RING_DEGREES));
    }

    #[test]
    fn owner_arc_contains_the_key(nodes in node_sets(12), key in position()) {
        let owner = responsible_node(key, &nodes).unwrap();
        let arcs = arcs(&nodes);
        let arc = arcs.iter().find(|a| &a.node == owner).unwrap();
        prop_assert!(arc.contains(key));
    }

    #[test]
    fn reset_restores_initial_state(seed in any::<u64>(), steps in prop::collection::vec(any::<bool>(), 0..30)) {
        let mut ring = Ring::seeded(seed);
        for add_node in steps {
            if add_node {
                ring.add_node();
            } else {
                ring.add_key();
            }
        }
        ring.reset();
        prop_assert_eq!(ring.state(), reset());
    }
}

#[test]
fn key_zero_with_node_at_zero() {
    let nodes = vec![
        Node::new(NodeId::new("A"), RingPosition::ZERO),
        Node::new(NodeId::new("B"), RingPosition::wrapping(180)),
    ];
    assert_eq!(responsible_node(RingPosition::ZERO, &nodes).unwrap().as_str(), "A");
}

#[test]
fn key_at_359_wraps_to_lowest() {
    let nodes: Vec<_> = [("A", 10), ("B", 120), ("C", 240)]
        .into_iter()
        .map(|(label, d)| Node::new(NodeId::new(label), RingPosition::wrapping(d)))
        .collect();
    assert_eq!(responsible_node(RingPosition::MAX, &nodes).unwrap().as_str(), "A");
}

#[test]
fn moved_keys_is_empty_when_nothing_changes() {
    let nodes = reset().nodes;
    let keys = vec![Key::new(KeyId::new(1), RingPosition::wrapping(5))];
    assert!(moved_keys(&keys, &nodes, &nodes).unwrap().is_empty());
}
