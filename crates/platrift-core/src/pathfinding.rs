//! BFS shortest paths over the node graph, with a lazy all-pairs distance
//! table.
//!
//! The topology is immutable after setup, so a distance computed once is
//! valid for the process lifetime. The table is keyed by the unordered node
//! pair (stored `(min, max)`) — each pair is searched at most once no matter
//! which direction is asked for.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::graph::{NodeGraph, NodeId};

/// Shortest-path search plus the distance memo.
#[derive(Debug)]
pub struct PathFinder {
    /// (min id, max id) → hop count, `None` for unreachable pairs.
    distances: HashMap<(NodeId, NodeId), Option<u32>>,
}

impl Default for PathFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl PathFinder {
    pub fn new() -> Self {
        Self {
            distances: HashMap::new(),
        }
    }

    /// Shortest path from `from` to `to`, both endpoints included.
    ///
    /// Returns `Some(vec![])` when `from == to` (zero hops), `None` when
    /// unreachable. For distinct reachable nodes the result starts at `from`
    /// and ends at `to`, so its length is hop count + 1.
    pub fn shortest_path(
        &self,
        graph: &NodeGraph,
        from: NodeId,
        to: NodeId,
    ) -> Option<Vec<NodeId>> {
        if from == to {
            return Some(vec![]);
        }
        graph.node(from)?;
        graph.node(to)?;

        let mut visited = HashSet::new();
        let mut queue: VecDeque<(NodeId, Vec<NodeId>)> = VecDeque::new();
        visited.insert(from);
        queue.push_back((from, vec![from]));

        while let Some((current, path)) = queue.pop_front() {
            for &next in graph.node(current)?.neighbors() {
                if next == to {
                    let mut result = path.clone();
                    result.push(next);
                    return Some(result);
                }
                if visited.insert(next) {
                    let mut new_path = path.clone();
                    new_path.push(next);
                    queue.push_back((next, new_path));
                }
            }
        }

        None
    }

    /// Hop count between `from` and `to`, memoized per unordered pair.
    /// `Some(0)` iff `from == to`; `None` when unreachable.
    pub fn distance(&mut self, graph: &NodeGraph, from: NodeId, to: NodeId) -> Option<u32> {
        if from == to {
            return graph.node(from).map(|_| 0);
        }
        let key = (from.min(to), from.max(to));
        if let Some(&cached) = self.distances.get(&key) {
            return cached;
        }
        let hops = self
            .shortest_path(graph, from, to)
            .map(|path| (path.len() - 1) as u32);
        self.distances.insert(key, hops);
        hops
    }

    /// Number of memoized pairs (reachable or not).
    pub fn cached_pairs(&self) -> usize {
        self.distances.len()
    }
}
