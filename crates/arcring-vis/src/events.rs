//! Ring events for the explainer timeline.

use arcring_ring::{
    arcs, load, responsible_node, Key, KeyId, Node, NodeArc, NodeId, NodeLoad, RingPosition,
};
use serde::{Deserialize, Serialize};

/// A key as drawn by the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyState {
    pub id: KeyId,
    pub position: RingPosition,
    /// `None` only while the ring has no nodes.
    pub owner: Option<NodeId>,
}

/// Events recorded while the user manipulates the ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RingEvent {
    /// The ring was cleared; the starting nodes follow as `NodeAdded`
    RingReset { frame: u64 },

    /// A node joined the ring
    NodeAdded {
        node: NodeId,
        position: RingPosition,
        frame: u64,
    },

    /// A key was placed; `owner` is its owner at the moment it was added
    KeyAdded {
        key: KeyId,
        position: RingPosition,
        owner: NodeId,
        frame: u64,
    },
}

impl RingEvent {
    /// Get the frame number for this event.
    pub fn frame(&self) -> u64 {
        match self {
            RingEvent::RingReset { frame } => *frame,
            RingEvent::NodeAdded { frame, .. } => *frame,
            RingEvent::KeyAdded { frame, .. } => *frame,
        }
    }
}

/// The ring as seen at one point of the timeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RingSnapshot {
    pub frame: u64,
    /// Ascending by position
    pub nodes: Vec<Node>,
    pub keys: Vec<KeyState>,
    pub arcs: Vec<NodeArc>,
    pub load: Vec<NodeLoad>,
    pub node_count: usize,
    pub key_count: usize,
}

impl RingSnapshot {
    /// Build a snapshot from the current nodes and keys.
    pub fn build(frame: u64, nodes: &[Node], keys: &[Key]) -> Self {
        let key_states = keys
            .iter()
            .map(|k| KeyState {
                id: k.id,
                position: k.position,
                owner: responsible_node(k.position, nodes).ok().cloned(),
            })
            .collect();

        RingSnapshot {
            frame,
            nodes: nodes.to_vec(),
            keys: key_states,
            arcs: arcs(nodes),
            load: load(keys, nodes).unwrap_or_default(),
            node_count: nodes.len(),
            key_count: keys.len(),
        }
    }

    /// Rebuild ring state from events up to (but not including) the given event index.
    pub fn from_events(events: &[RingEvent], up_to_event: usize) -> Self {
        let mut nodes: Vec<Node> = Vec::new();
        let mut keys: Vec<Key> = Vec::new();
        let mut frame = 0u64;

        for event in events.iter().take(up_to_event) {
            frame = event.frame();
            match event {
                RingEvent::RingReset { .. } => {
                    nodes.clear();
                    keys.clear();
                }
                RingEvent::NodeAdded { node, position, .. } => {
                    let at = nodes.partition_point(|n| n.position <= *position);
                    nodes.insert(at, Node::new(node.clone(), *position));
                }
                RingEvent::KeyAdded { key, position, .. } => {
                    keys.push(Key::new(*key, *position));
                }
            }
        }

        Self::build(frame, &nodes, &keys)
    }
}
