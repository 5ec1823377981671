//! Static map topology plus per-turn node annotations.
//!
//! `NodeGraph` owns every [`Node`]. Adjacency is symmetric and never changes
//! after setup; only the per-turn fields (owner, production, pod counts,
//! visibility, interest) do. Pods never hold node references — they carry
//! node ids and look state up here, so nodes and pods live in independent
//! collections with no cycles.

use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::pathfinding::PathFinder;
use crate::snapshot::ZoneState;

/// Node identifier, stable for the process lifetime.
pub type NodeId = u32;

/// Which side holds a node this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Neutral,
    Me,
    Enemy,
}

/// A map vertex with its per-turn state.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub owner: Owner,
    pub production: u32,
    pub my_pods: u32,
    pub enemy_pods: u32,
    pub visible: bool,
    /// Set by the targeting policy when a pod is routed here this turn.
    pub targeted: bool,
    /// Cached interest score, valid only for the turn in `interest_turn`.
    interest: f32,
    /// Turn stamp for `interest`. 0 = never scored (turns start at 1).
    interest_turn: u64,
    neighbors: Vec<NodeId>,
}

impl Node {
    fn new(id: NodeId) -> Self {
        Self {
            id,
            owner: Owner::Neutral,
            production: 0,
            my_pods: 0,
            enemy_pods: 0,
            visible: false,
            targeted: false,
            interest: 0.0,
            interest_turn: 0,
            neighbors: Vec::new(),
        }
    }

    /// Ids of the nodes adjacent to this one.
    pub fn neighbors(&self) -> &[NodeId] {
        &self.neighbors
    }

    pub fn is_neutral(&self) -> bool {
        self.owner == Owner::Neutral
    }
}

/// The full map: fixed topology, per-turn state, occupied-node membership.
#[derive(Debug)]
pub struct NodeGraph {
    nodes: Vec<Node>,
    /// Nodes currently holding at least one of my pods. Maintained by
    /// explicit add/remove from the snapshot pass, never recomputed.
    occupied: Vec<NodeId>,
    hq: Option<NodeId>,
    enemy_hq: Option<NodeId>,
    strategic: Vec<NodeId>,
}

impl NodeGraph {
    /// Create a graph of `node_count` nodes with ids `0..node_count` and no
    /// links.
    pub fn new(node_count: u32) -> Self {
        Self {
            nodes: (0..node_count).map(Node::new).collect(),
            occupied: Vec::new(),
            hq: None,
            enemy_hq: None,
            strategic: Vec::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id as usize)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Record the undirected edge `a` ↔ `b` on both endpoints.
    pub fn link(&mut self, a: NodeId, b: NodeId) -> Result<(), GraphError> {
        if self.node(a).is_none() {
            return Err(GraphError::UnknownNode(a));
        }
        if self.node(b).is_none() {
            return Err(GraphError::UnknownNode(b));
        }
        self.nodes[a as usize].neighbors.push(b);
        self.nodes[b as usize].neighbors.push(a);
        Ok(())
    }

    pub fn set_hq(&mut self, id: NodeId) -> Result<(), GraphError> {
        self.node(id).ok_or(GraphError::UnknownNode(id))?;
        self.hq = Some(id);
        Ok(())
    }

    pub fn set_enemy_hq(&mut self, id: NodeId) -> Result<(), GraphError> {
        self.node(id).ok_or(GraphError::UnknownNode(id))?;
        self.enemy_hq = Some(id);
        Ok(())
    }

    pub fn hq(&self) -> Option<NodeId> {
        self.hq
    }

    pub fn enemy_hq(&self) -> Option<NodeId> {
        self.enemy_hq
    }

    /// Nodes currently holding my pods, in insertion order.
    pub fn nodes_with_pods(&self) -> &[NodeId] {
        &self.occupied
    }

    fn add_node_with_pods(&mut self, id: NodeId) {
        if !self.occupied.contains(&id) {
            self.occupied.push(id);
        }
    }

    fn remove_node_with_pods(&mut self, id: NodeId) {
        self.occupied.retain(|&n| n != id);
    }

    /// Apply one node's authoritative snapshot state, keeping the
    /// occupied-node membership in step with the pod counts. A zero count
    /// means nothing of mine stands there any more — the caller must drop
    /// any registry pods located on the node, whether or not it was in the
    /// occupied set before (a pod that arrived only last turn never was).
    pub fn apply_zone(&mut self, id: NodeId, state: &ZoneState) -> Result<(), GraphError> {
        let node = self
            .nodes
            .get_mut(id as usize)
            .ok_or(GraphError::UnknownNode(id))?;
        node.owner = state.owner;
        node.production = state.production;
        node.my_pods = state.my_pods;
        node.enemy_pods = state.enemy_pods;
        node.visible = state.visible;
        node.targeted = false;
        if state.my_pods > 0 {
            self.add_node_with_pods(id);
        } else {
            self.remove_node_with_pods(id);
        }
        Ok(())
    }

    /// The neighbor of `id` with the highest platinum production, if any
    /// neighbor produces at all. Ties keep the earlier neighbor: a later one
    /// wins only with a strictly greater value.
    pub fn max_platinum_neighbor(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id)?;
        let mut best = None;
        let mut quantity = 0;
        for &n in &node.neighbors {
            let production = self.nodes[n as usize].production;
            if production > quantity {
                best = Some(n);
                quantity = production;
            }
        }
        best
    }

    /// A node is strategic iff it sits at equal hop distance from both
    /// headquarters. Nodes unreachable from either are not strategic.
    pub fn is_strategic(&self, pathfinder: &mut PathFinder, id: NodeId) -> bool {
        let (Some(hq), Some(enemy_hq)) = (self.hq, self.enemy_hq) else {
            return false;
        };
        match (
            pathfinder.distance(self, hq, id),
            pathfinder.distance(self, enemy_hq, id),
        ) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Compute and cache the strategic node set. Call once after setup;
    /// topology never changes, so neither does the result.
    pub fn compute_strategic_nodes(&mut self, pathfinder: &mut PathFinder) {
        let strategic: Vec<NodeId> = (0..self.nodes.len() as NodeId)
            .filter(|&id| self.is_strategic(pathfinder, id))
            .collect();
        self.strategic = strategic;
    }

    pub fn strategic_nodes(&self) -> &[NodeId] {
        &self.strategic
    }

    /// The interest cached for `id` this turn, or `None` if not yet scored.
    /// Stale stamps from earlier turns read as unset, so nobody has to
    /// remember to wipe the cache between turns.
    pub fn cached_interest(&self, id: NodeId, turn: u64) -> Option<f32> {
        let node = self.node(id)?;
        (node.interest_turn == turn).then_some(node.interest)
    }

    /// Cache `interest` for `id`, only if `id` has not been scored this turn.
    pub fn store_interest(&mut self, id: NodeId, turn: u64, interest: f32) {
        if let Some(node) = self.nodes.get_mut(id as usize) {
            if node.interest_turn != turn {
                node.interest = interest;
                node.interest_turn = turn;
            }
        }
    }

    /// Force every interest score back to unset. The turn stamp already
    /// invalidates stale scores; this exists for tests and for callers that
    /// want to re-score inside a single turn.
    pub fn reset_interest(&mut self) {
        for node in &mut self.nodes {
            node.interest_turn = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 0 - 1 - 2 - 3, with 4 hanging off 1.
    fn line_graph() -> NodeGraph {
        let mut g = NodeGraph::new(5);
        g.link(0, 1).unwrap();
        g.link(1, 2).unwrap();
        g.link(2, 3).unwrap();
        g.link(1, 4).unwrap();
        g
    }

    fn zone(my_pods: u32) -> ZoneState {
        ZoneState {
            owner: Owner::Me,
            production: 0,
            my_pods,
            enemy_pods: 0,
            visible: true,
        }
    }

    // --- Topology ---

    #[test]
    fn links_are_symmetric() {
        let g = line_graph();
        assert!(g.node(0).unwrap().neighbors().contains(&1));
        assert!(g.node(1).unwrap().neighbors().contains(&0));
        assert_eq!(g.node(1).unwrap().neighbors(), &[0, 2, 4]);
    }

    #[test]
    fn link_to_unknown_node_fails() {
        let mut g = NodeGraph::new(2);
        assert_eq!(g.link(0, 9), Err(GraphError::UnknownNode(9)));
        assert_eq!(g.link(9, 0), Err(GraphError::UnknownNode(9)));
        // and the valid endpoint gained no half-edge
        assert!(g.node(0).unwrap().neighbors().is_empty());
    }

    // --- Occupied membership ---

    #[test]
    fn apply_zone_tracks_occupied_nodes() {
        let mut g = line_graph();
        g.apply_zone(2, &zone(3)).unwrap();
        assert_eq!(g.nodes_with_pods(), &[2]);
        // same node again: membership unchanged, no duplicate
        g.apply_zone(2, &zone(5)).unwrap();
        assert_eq!(g.nodes_with_pods(), &[2]);
    }

    #[test]
    fn zero_count_removes_membership() {
        let mut g = line_graph();
        g.apply_zone(2, &zone(3)).unwrap();
        g.apply_zone(2, &zone(0)).unwrap();
        assert!(g.nodes_with_pods().is_empty());
        // a node that never had pods stays out
        g.apply_zone(3, &zone(0)).unwrap();
        assert!(g.nodes_with_pods().is_empty());
    }

    // --- Greedy expansion helper ---

    #[test]
    fn max_platinum_neighbor_prefers_first_on_tie() {
        let mut g = line_graph();
        g.node_mut(0).unwrap().production = 2;
        g.node_mut(2).unwrap().production = 2;
        g.node_mut(4).unwrap().production = 1;
        // neighbors of 1 are [0, 2, 4]; 0 and 2 tie at 2, first wins
        assert_eq!(g.max_platinum_neighbor(1), Some(0));
        g.node_mut(2).unwrap().production = 3;
        assert_eq!(g.max_platinum_neighbor(1), Some(2));
    }

    #[test]
    fn max_platinum_neighbor_none_when_barren() {
        let g = line_graph();
        assert_eq!(g.max_platinum_neighbor(1), None);
    }

    // --- Strategic classification ---

    #[test]
    fn strategic_nodes_are_equidistant_from_both_hqs() {
        let mut g = line_graph();
        g.set_hq(0).unwrap();
        g.set_enemy_hq(3).unwrap();
        let mut pf = PathFinder::new();
        // distances from 0: [0,1,2,3,2]; from 3: [3,2,1,0,3]
        assert!(!g.is_strategic(&mut pf, 0));
        assert!(!g.is_strategic(&mut pf, 1));
        assert!(!g.is_strategic(&mut pf, 4));
        g.compute_strategic_nodes(&mut pf);
        assert!(g.strategic_nodes().is_empty());
        // a 3-node line with HQs at the ends has a true midpoint
        let mut g = NodeGraph::new(3);
        g.link(0, 1).unwrap();
        g.link(1, 2).unwrap();
        g.set_hq(0).unwrap();
        g.set_enemy_hq(2).unwrap();
        let mut pf = PathFinder::new();
        g.compute_strategic_nodes(&mut pf);
        assert_eq!(g.strategic_nodes(), &[1]);
    }

    #[test]
    fn unreachable_node_is_not_strategic() {
        let mut g = NodeGraph::new(3);
        g.link(0, 1).unwrap();
        // node 2 is isolated: unreachable from both HQs
        g.set_hq(0).unwrap();
        g.set_enemy_hq(1).unwrap();
        let mut pf = PathFinder::new();
        assert!(!g.is_strategic(&mut pf, 2));
    }

    // --- Interest cache ---

    #[test]
    fn interest_cache_is_turn_scoped() {
        let mut g = line_graph();
        assert_eq!(g.cached_interest(1, 1), None);
        g.store_interest(1, 1, 60.0);
        assert_eq!(g.cached_interest(1, 1), Some(60.0));
        // a later evaluation in the same turn cannot overwrite
        g.store_interest(1, 1, 99.0);
        assert_eq!(g.cached_interest(1, 1), Some(60.0));
        // next turn the stamp is stale: reads as unset, writes take
        assert_eq!(g.cached_interest(1, 2), None);
        g.store_interest(1, 2, 99.0);
        assert_eq!(g.cached_interest(1, 2), Some(99.0));
    }

    #[test]
    fn reset_interest_clears_all_stamps() {
        let mut g = line_graph();
        g.store_interest(0, 7, 10.0);
        g.store_interest(1, 7, 20.0);
        g.reset_interest();
        assert_eq!(g.cached_interest(0, 7), None);
        assert_eq!(g.cached_interest(1, 7), None);
    }
}
