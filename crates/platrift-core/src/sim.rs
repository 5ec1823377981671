//! The per-turn decision cycle, held together by one explicitly constructed
//! context.
//!
//! `Simulation` owns the graph, the pod registry, the pathfinder and the
//! order sheet — there is no global instance anywhere. One turn runs:
//!
//! 1. [`Simulation::begin_turn`] — apply the authoritative snapshot;
//! 2. [`Simulation::reconcile`] — merge co-located pods, correct battles;
//! 3. caller targeting — score neighbors, route idle pods;
//! 4. [`Simulation::move_pods`] — advance every routed pod one legal hop;
//! 5. caller splits, if any;
//! 6. [`Simulation::commit`] — apply the buffered split results;
//! 7. [`Simulation::render_orders`] — the host's movement line.

use crate::command::CommandSheet;
use crate::error::GraphError;
use crate::graph::{NodeGraph, NodeId};
use crate::pathfinding::PathFinder;
use crate::pods::{PodId, PodRegistry};
use crate::snapshot::TurnSnapshot;
use crate::targeting::{self, Candidate};

/// Everything one decision cycle needs, owned in one place.
#[derive(Debug)]
pub struct Simulation {
    pub graph: NodeGraph,
    pub pods: PodRegistry,
    pub pathfinder: PathFinder,
    orders: CommandSheet,
    turn: u64,
}

impl Simulation {
    /// Build the static world: `node_count` nodes, the undirected `links`,
    /// and both headquarters. Also precomputes the strategic node set, since
    /// the topology is now final.
    pub fn new(
        node_count: u32,
        links: &[(NodeId, NodeId)],
        hq: NodeId,
        enemy_hq: NodeId,
    ) -> Result<Self, GraphError> {
        let mut graph = NodeGraph::new(node_count);
        for &(a, b) in links {
            graph.link(a, b)?;
        }
        graph.set_hq(hq)?;
        graph.set_enemy_hq(enemy_hq)?;
        let mut pathfinder = PathFinder::new();
        graph.compute_strategic_nodes(&mut pathfinder);
        Ok(Self {
            graph,
            pods: PodRegistry::new(),
            pathfinder,
            orders: CommandSheet::new(),
            turn: 0,
        })
    }

    /// Current turn number. 0 before the first snapshot, then 1, 2, ...
    /// Also the stamp under which this turn's interest scores are cached.
    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// Start a new turn from the authoritative snapshot. Advancing the turn
    /// counter invalidates every cached interest score. Any node the
    /// snapshot reports empty gets its registry pods dropped here —
    /// including nodes a pod only just moved onto, which the occupied set
    /// has not caught up with yet.
    pub fn begin_turn(&mut self, snapshot: &TurnSnapshot) -> Result<(), GraphError> {
        self.turn += 1;
        for (id, zone) in snapshot.zones.iter().enumerate() {
            let id = id as NodeId;
            self.graph.apply_zone(id, zone)?;
            if zone.my_pods == 0 {
                self.pods.remove_pods_on(id);
            }
        }
        Ok(())
    }

    /// Merge co-located pods, then reconcile each survivor's quantity with
    /// the snapshot count.
    pub fn reconcile(&mut self) {
        self.pods.update(&self.graph);
    }

    /// Score the neighbors of `pod` as candidate destinations for this turn.
    pub fn score_targets(&mut self, pod: PodId) -> Vec<Candidate> {
        match self.pods.pod(pod) {
            Some(p) => {
                let p = p.clone();
                targeting::score_neighbors(&mut self.graph, &p, self.turn)
            }
            None => Vec::new(),
        }
    }

    /// Route `pod` toward `target`: mark the node targeted, remember it as
    /// the pod's own last target, and assign the shortest path (first hop
    /// onward). A no-op when the target is unreachable.
    pub fn route_pod(&mut self, pod: PodId, target: NodeId) {
        let Some(from) = self.pods.pod(pod).map(|p| p.node) else {
            return;
        };
        let Some(path) = self.pathfinder.shortest_path(&self.graph, from, target) else {
            return;
        };
        if let Some(node) = self.graph.node_mut(target) {
            node.targeted = true;
        }
        if let Some(p) = self.pods.pod_mut(pod) {
            p.last_target = Some(target);
            p.set_path(path.into_iter().skip(1).collect());
        }
    }

    /// Advance every routed pod one legal hop, recording the orders.
    pub fn move_pods(&mut self) {
        self.pods.move_pods(&self.graph, &mut self.orders);
    }

    /// Schedule `pod` to be split into `n` equal shares (plus remainder).
    pub fn split(&mut self, pod: PodId, n: u32) {
        self.pods.split(pod, n);
    }

    /// Commit the turn's buffered pod additions and removals.
    pub fn commit(&mut self) {
        self.pods.post_update();
    }

    /// Render this turn's movement line and clear the sheet.
    pub fn render_orders(&mut self) -> String {
        self.orders.render()
    }

    /// The orders accumulated so far this turn.
    pub fn orders(&self) -> &[crate::command::MoveOrder] {
        self.orders.orders()
    }
}
