//! Interest scoring of candidate destinations.
//!
//! For a pod sitting on node P, every neighbor N of P is scored:
//!
//! * unowned production is worth `1 + production`;
//! * each visible neighbor of N adds 1 (rewards pushing the visible
//!   frontier outward);
//! * a neutral N multiplies the total by 10, an enemy-held N by 20
//!   (a node has exactly one owner, so at most one multiplier applies);
//! * a node that is already someone's target this turn, or that was this
//!   pod's previous target, scores 0 outright — no duplicate assignments,
//!   no thrashing back and forth.
//!
//! Scores are memoized on the node with the current turn number, so when
//! several pods share a frontier each node is computed once per turn and the
//! first evaluation wins — including a forced zero.

use crate::graph::{NodeGraph, NodeId, Owner};
use crate::pods::Pod;

/// A scored neighbor of the evaluating pod's node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub node: NodeId,
    pub interest: f32,
}

/// Score every neighbor of `pod`'s node for the given turn. Cached scores
/// are reused; fresh ones are written back to the graph.
pub fn score_neighbors(graph: &mut NodeGraph, pod: &Pod, turn: u64) -> Vec<Candidate> {
    let Some(origin) = graph.node(pod.node) else {
        return Vec::new();
    };
    let neighbors: Vec<NodeId> = origin.neighbors().to_vec();

    neighbors
        .into_iter()
        .map(|node| {
            let interest = match graph.cached_interest(node, turn) {
                Some(cached) => cached,
                None => {
                    let fresh = compute_interest(graph, pod, node);
                    graph.store_interest(node, turn, fresh);
                    fresh
                }
            };
            Candidate { node, interest }
        })
        .collect()
}

fn compute_interest(graph: &NodeGraph, pod: &Pod, id: NodeId) -> f32 {
    let Some(node) = graph.node(id) else {
        return 0.0;
    };

    let mut interest = 0.0;
    if node.production > 0 && node.owner != Owner::Me {
        interest += 1.0 + node.production as f32;
    }
    for &m in node.neighbors() {
        if graph.node(m).is_some_and(|n| n.visible) {
            interest += 1.0;
        }
    }
    match node.owner {
        Owner::Neutral => interest *= 10.0,
        Owner::Enemy => interest *= 20.0,
        Owner::Me => {}
    }
    if node.targeted || pod.last_target == Some(id) {
        interest = 0.0;
    }
    interest
}
