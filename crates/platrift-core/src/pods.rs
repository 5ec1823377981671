//! Pod lifecycle: creation, merge, battle correction, split, one-hop
//! advancement.
//!
//! `PodRegistry` owns every live pod. Split results and their originals are
//! staged in pending-add / pending-remove buffers and become visible only at
//! the [`PodRegistry::post_update`] commit point, so split decisions taken
//! while iterating the pod list never mutate it under the iterator. Merge
//! replacement and battle elimination apply inside the reconcile pass itself:
//! that pass walks the occupied-*node* list, and the battle and movement
//! steps of the same turn must see the merged pod, not the originals.

use std::collections::VecDeque;

use crate::command::CommandSheet;
use crate::graph::{NodeGraph, NodeId};

/// Pod identifier: the monotonically increasing creation id, unique for the
/// process lifetime.
pub type PodId = u64;

/// A mobile group of units sitting on exactly one node.
#[derive(Debug, Clone)]
pub struct Pod {
    pub id: PodId,
    /// Location, as a lookup key into the graph — never an owning reference.
    pub node: NodeId,
    /// Strictly positive while the pod is live.
    pub quantity: u32,
    /// Remaining hops; the front element is next turn's destination.
    path: VecDeque<NodeId>,
    /// True iff this pod lost units to combat this turn. Cleared by the
    /// movement pass.
    pub fighting: bool,
    /// The node this pod was last routed toward. Anti-thrash memory for the
    /// targeting heuristic.
    pub last_target: Option<NodeId>,
}

impl Pod {
    pub fn new(id: PodId, node: NodeId, quantity: u32) -> Self {
        Self {
            id,
            node,
            quantity,
            path: VecDeque::new(),
            fighting: false,
            last_target: None,
        }
    }

    pub fn has_path(&self) -> bool {
        !self.path.is_empty()
    }

    /// Next hop, if a path is assigned.
    pub fn next_hop(&self) -> Option<NodeId> {
        self.path.front().copied()
    }

    /// Final node of the remaining path, if any.
    pub fn destination(&self) -> Option<NodeId> {
        self.path.back().copied()
    }

    pub fn path(&self) -> &VecDeque<NodeId> {
        &self.path
    }

    /// Replace the remaining path. The sequence must start at the first hop
    /// away from the pod's current node, not at the node itself.
    pub fn set_path(&mut self, path: Vec<NodeId>) {
        self.path = path.into();
    }

    pub fn clear_path(&mut self) {
        self.path.clear();
    }
}

/// Owns all live pods plus the pending split buffers.
#[derive(Debug, Default)]
pub struct PodRegistry {
    pods: Vec<Pod>,
    pending_add: Vec<Pod>,
    pending_remove: Vec<PodId>,
    next_id: PodId,
}

impl PodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pods(&self) -> &[Pod] {
        &self.pods
    }

    pub fn len(&self) -> usize {
        self.pods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pods.is_empty()
    }

    pub fn pod(&self, id: PodId) -> Option<&Pod> {
        self.pods.iter().find(|p| p.id == id)
    }

    pub fn pod_mut(&mut self, id: PodId) -> Option<&mut Pod> {
        self.pods.iter_mut().find(|p| p.id == id)
    }

    /// The pod on `node`, if one is there. After the reconcile pass a node
    /// hosts at most one pod; before it there may be several, in which case
    /// the first by registry order is returned.
    pub fn pod_on(&self, node: NodeId) -> Option<&Pod> {
        self.pods.iter().find(|p| p.node == node)
    }

    /// Total unit quantity sitting on `node` (e.g. the headquarters).
    pub fn quantity_on(&self, node: NodeId) -> u32 {
        self.pods
            .iter()
            .filter(|p| p.node == node)
            .map(|p| p.quantity)
            .sum()
    }

    /// Ids of pods with no assigned path — the idle set for the targeting
    /// pass.
    pub fn idle_pods(&self) -> Vec<PodId> {
        self.pods
            .iter()
            .filter(|p| !p.has_path())
            .map(|p| p.id)
            .collect()
    }

    /// The first pod, by registry order, currently routed at the enemy
    /// headquarters. Used for rush detection.
    pub fn first_rush_pod(&self, enemy_hq: NodeId) -> Option<PodId> {
        self.pods
            .iter()
            .find(|p| p.destination() == Some(enemy_hq))
            .map(|p| p.id)
    }

    fn fresh_id(&mut self) -> PodId {
        self.next_id += 1;
        self.next_id
    }

    /// Register a new pod. Zero quantity is a silent no-op: no pod is
    /// created, no id is consumed, and `None` is returned.
    pub fn create_pod(&mut self, node: NodeId, quantity: u32) -> Option<PodId> {
        if quantity == 0 {
            return None;
        }
        let id = self.fresh_id();
        self.pods.push(Pod::new(id, node, quantity));
        Some(id)
    }

    /// Register a new pod already routed along `path`.
    pub fn create_pod_with_path(
        &mut self,
        node: NodeId,
        quantity: u32,
        path: Vec<NodeId>,
    ) -> Option<PodId> {
        let id = self.create_pod(node, quantity)?;
        if let Some(pod) = self.pod_mut(id) {
            pod.set_path(path);
        }
        Some(id)
    }

    /// Drop every pod on `node`. No-op when the node hosts none — a node
    /// emptied by battle is expected, not a fault. There can be more than
    /// one pod here when several arrivals landed in the same turn and were
    /// wiped out before the reconcile pass merged them.
    pub fn remove_pods_on(&mut self, node: NodeId) {
        self.pods.retain(|p| p.node != node);
    }

    /// Reconcile the registry against the graph's authoritative state:
    /// for every occupied node, first collapse co-located pods into one,
    /// then correct the survivor's quantity against the snapshot count.
    pub fn update(&mut self, graph: &NodeGraph) {
        let occupied: Vec<NodeId> = graph.nodes_with_pods().to_vec();
        for node in occupied {
            self.check_merge(node);
            self.check_battle(node, graph);
        }
    }

    /// Collapse all pods on `node` into a single replacement whose quantity
    /// is their sum. The replacement inherits the longest remaining path
    /// among the originals; on equal lengths the lowest creation id wins —
    /// deterministic regardless of registry order.
    pub fn check_merge(&mut self, node: NodeId) {
        let on_node: Vec<usize> = self
            .pods
            .iter()
            .enumerate()
            .filter(|(_, p)| p.node == node)
            .map(|(i, _)| i)
            .collect();
        if on_node.len() < 2 {
            return;
        }

        let quantity: u32 = on_node.iter().map(|&i| self.pods[i].quantity).sum();
        let survivor = on_node
            .iter()
            .map(|&i| &self.pods[i])
            .max_by(|a, b| {
                a.path
                    .len()
                    .cmp(&b.path.len())
                    .then(b.id.cmp(&a.id))
            })
            .map(|p| p.path.iter().copied().collect::<Vec<_>>())
            .unwrap_or_default();

        // back-to-front so the indices stay valid
        for &i in on_node.iter().rev() {
            self.pods.remove(i);
        }
        // quantity is a sum of positive quantities, so this always creates
        let _ = self.create_pod_with_path(node, quantity, survivor);
    }

    /// Compare the tracked quantity on `node` against the snapshot count.
    /// A mismatch means combat happened: adopt the authoritative value and
    /// raise the fighting flag.
    pub fn check_battle(&mut self, node: NodeId, graph: &NodeGraph) {
        let Some(authoritative) = graph.node(node).map(|n| n.my_pods) else {
            return;
        };
        if let Some(pod) = self.pods.iter_mut().find(|p| p.node == node) {
            if pod.quantity != authoritative && authoritative > 0 {
                pod.quantity = authoritative;
                pod.fighting = true;
            }
        }
    }

    /// Advance every routed pod one hop, where legal. An illegal or
    /// currently-infeasible hop leaves the pod untouched — it retries on a
    /// later turn. Every pod's fighting flag is cleared on the way out.
    pub fn move_pods(&mut self, graph: &NodeGraph, orders: &mut CommandSheet) {
        for pod in &mut self.pods {
            if let Some(dest) = pod.path.front().copied() {
                if let (Some(from), Some(to)) = (graph.node(pod.node), graph.node(dest)) {
                    if orders.is_valid_move(pod.quantity, from, to, pod) {
                        orders.push(pod.quantity, pod.node, dest);
                        pod.node = dest;
                        pod.path.pop_front();
                    }
                }
            }
            pod.fighting = false;
        }
    }

    /// Schedule `pod` to be divided into `n` equal shares at its location,
    /// plus one remainder pod when the division is inexact. Nothing changes
    /// until [`Self::post_update`] commits the buffers.
    pub fn split(&mut self, id: PodId, n: u32) {
        debug_assert!(n > 0, "split into zero parts");
        if n == 0 {
            return;
        }
        let Some((node, quantity)) = self.pod(id).map(|p| (p.node, p.quantity)) else {
            return;
        };
        let share = quantity / n;
        if quantity % n != 0 {
            self.buffer_add(node, quantity % n);
        }
        for _ in 0..n {
            self.buffer_add(node, share);
        }
        self.buffer_remove(id);
    }

    /// Stage a pod for creation at the next commit. Zero quantity stages
    /// nothing.
    pub fn buffer_add(&mut self, node: NodeId, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let id = self.fresh_id();
        self.pending_add.push(Pod::new(id, node, quantity));
    }

    /// Stage a pod for removal at the next commit.
    pub fn buffer_remove(&mut self, id: PodId) {
        self.pending_remove.push(id);
    }

    /// Commit all buffered additions and removals, then clear the buffers.
    /// Runs exactly once per turn, after all split decisions, before the
    /// next turn's reconcile.
    pub fn post_update(&mut self) {
        self.pods.append(&mut self.pending_add);
        let removed = std::mem::take(&mut self.pending_remove);
        self.pods.retain(|p| !removed.contains(&p.id));
        debug_assert!(
            self.pods.iter().all(|p| p.quantity > 0),
            "zero-quantity pod survived commit"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeGraph, Owner};
    use crate::snapshot::ZoneState;

    fn line_graph() -> NodeGraph {
        let mut g = NodeGraph::new(4);
        g.link(0, 1).unwrap();
        g.link(1, 2).unwrap();
        g.link(2, 3).unwrap();
        g
    }

    fn occupy(g: &mut NodeGraph, node: NodeId, my_pods: u32) {
        g.apply_zone(
            node,
            &ZoneState {
                owner: Owner::Me,
                production: 0,
                my_pods,
                enemy_pods: 0,
                visible: true,
            },
        )
        .unwrap();
    }

    // --- Creation ---

    #[test]
    fn create_pod_with_zero_quantity_is_a_no_op() {
        let mut reg = PodRegistry::new();
        assert_eq!(reg.create_pod(0, 0), None);
        assert!(reg.is_empty());
        // and no id was burned
        assert_eq!(reg.create_pod(0, 5), Some(1));
    }

    #[test]
    fn creation_ids_are_monotonic_across_direct_and_buffered() {
        let mut reg = PodRegistry::new();
        let a = reg.create_pod(0, 1).unwrap();
        reg.buffer_add(1, 2);
        let b = reg.create_pod(2, 3).unwrap();
        reg.post_update();
        let buffered = reg.pod_on(1).unwrap().id;
        assert!(a < buffered && buffered < b);
    }

    // --- Merge ---

    #[test]
    fn merge_sums_quantities_and_keeps_one_pod() {
        let mut g = line_graph();
        occupy(&mut g, 1, 8);
        let mut reg = PodRegistry::new();
        let a = reg.create_pod_with_path(1, 3, vec![2]).unwrap();
        let b = reg.create_pod_with_path(1, 5, vec![0]).unwrap();
        reg.update(&g);
        assert_eq!(reg.len(), 1);
        let merged = reg.pod_on(1).unwrap();
        assert_eq!(merged.quantity, 8);
        assert!(merged.id != a && merged.id != b);
    }

    #[test]
    fn merge_inherits_longest_path_then_lowest_id() {
        let mut g = line_graph();
        occupy(&mut g, 1, 9);
        let mut reg = PodRegistry::new();
        reg.create_pod_with_path(1, 3, vec![2, 3]).unwrap();
        reg.create_pod_with_path(1, 5, vec![0]).unwrap();
        reg.update(&g);
        let merged = reg.pod_on(1).unwrap();
        assert_eq!(merged.path(), &[2, 3]);

        // equal lengths: the earlier-created pod's path survives
        let mut g = line_graph();
        occupy(&mut g, 2, 4);
        let mut reg = PodRegistry::new();
        reg.create_pod_with_path(2, 2, vec![1]).unwrap();
        reg.create_pod_with_path(2, 2, vec![3]).unwrap();
        reg.update(&g);
        assert_eq!(reg.pod_on(2).unwrap().path(), &[1]);
    }

    // --- Battle ---

    #[test]
    fn battle_corrects_quantity_and_flags_fighting() {
        let mut g = line_graph();
        occupy(&mut g, 2, 2); // snapshot says 2 survived
        let mut reg = PodRegistry::new();
        reg.create_pod(2, 5).unwrap();
        reg.update(&g);
        let pod = reg.pod_on(2).unwrap();
        assert_eq!(pod.quantity, 2);
        assert!(pod.fighting);
    }

    #[test]
    fn matching_quantity_is_not_a_battle() {
        let mut g = line_graph();
        occupy(&mut g, 2, 5);
        let mut reg = PodRegistry::new();
        reg.create_pod(2, 5).unwrap();
        reg.update(&g);
        assert!(!reg.pod_on(2).unwrap().fighting);
    }

    // --- Movement ---

    #[test]
    fn routed_pod_advances_one_hop_and_records_order() {
        let mut g = line_graph();
        occupy(&mut g, 0, 4);
        let mut reg = PodRegistry::new();
        let id = reg.create_pod_with_path(0, 4, vec![1, 2]).unwrap();
        let mut orders = CommandSheet::new();
        reg.move_pods(&g, &mut orders);
        let pod = reg.pod(id).unwrap();
        assert_eq!(pod.node, 1);
        assert_eq!(pod.path(), &[2]);
        assert_eq!(orders.orders().len(), 1);
        assert_eq!(orders.render(), "4 0 1");
    }

    #[test]
    fn illegal_hop_leaves_pod_untouched() {
        let mut g = line_graph();
        occupy(&mut g, 0, 4);
        let mut reg = PodRegistry::new();
        // path jumps 0 -> 2, which are not adjacent
        let id = reg.create_pod_with_path(0, 4, vec![2]).unwrap();
        let mut orders = CommandSheet::new();
        reg.move_pods(&g, &mut orders);
        let pod = reg.pod(id).unwrap();
        assert_eq!(pod.node, 0);
        assert_eq!(pod.path(), &[2]);
        assert!(orders.is_empty());
    }

    #[test]
    fn idle_pod_never_moves() {
        let mut g = line_graph();
        occupy(&mut g, 1, 2);
        let mut reg = PodRegistry::new();
        let id = reg.create_pod(1, 2).unwrap();
        let mut orders = CommandSheet::new();
        for _ in 0..3 {
            reg.move_pods(&g, &mut orders);
        }
        assert_eq!(reg.pod(id).unwrap().node, 1);
        assert!(orders.is_empty());
    }

    #[test]
    fn movement_pass_clears_fighting_flags() {
        let mut g = line_graph();
        occupy(&mut g, 1, 1);
        let mut reg = PodRegistry::new();
        let id = reg.create_pod(1, 1).unwrap();
        reg.pod_mut(id).unwrap().fighting = true;
        let mut orders = CommandSheet::new();
        reg.move_pods(&g, &mut orders);
        assert!(!reg.pod(id).unwrap().fighting);
    }

    // --- Split ---

    #[test]
    fn split_is_invisible_until_commit() {
        let mut reg = PodRegistry::new();
        let id = reg.create_pod(2, 10).unwrap();
        reg.split(id, 3);
        // still the single original
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.quantity_on(2), 10);

        reg.post_update();
        assert_eq!(reg.len(), 4); // three shares of 3 plus a remainder of 1
        assert!(reg.pod(id).is_none());
        assert_eq!(reg.quantity_on(2), 10);
        let mut sizes: Vec<u32> = reg.pods().iter().map(|p| p.quantity).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![1, 3, 3, 3]);
    }

    #[test]
    fn exact_split_has_no_remainder_pod() {
        let mut reg = PodRegistry::new();
        let id = reg.create_pod(0, 9).unwrap();
        reg.split(id, 3);
        reg.post_update();
        assert_eq!(reg.len(), 3);
        assert!(reg.pods().iter().all(|p| p.quantity == 3));
    }

    #[test]
    fn splitting_below_share_size_conserves_quantity() {
        // 2 units into 3 parts: zero-size shares are dropped, remainder kept
        let mut reg = PodRegistry::new();
        let id = reg.create_pod(0, 2).unwrap();
        reg.split(id, 3);
        reg.post_update();
        assert_eq!(reg.quantity_on(0), 2);
        assert!(reg.pods().iter().all(|p| p.quantity > 0));
    }

    // --- Queries ---

    #[test]
    fn idle_pods_are_those_without_a_path() {
        let mut reg = PodRegistry::new();
        let a = reg.create_pod(0, 1).unwrap();
        let _b = reg.create_pod_with_path(1, 1, vec![2]).unwrap();
        let c = reg.create_pod(2, 1).unwrap();
        assert_eq!(reg.idle_pods(), vec![a, c]);
    }

    #[test]
    fn rush_pod_is_first_routed_at_enemy_hq() {
        let mut reg = PodRegistry::new();
        reg.create_pod_with_path(0, 1, vec![1, 2]).unwrap();
        let rush = reg.create_pod_with_path(1, 1, vec![2, 3]).unwrap();
        reg.create_pod_with_path(2, 1, vec![3]).unwrap();
        assert_eq!(reg.first_rush_pod(3), Some(rush));
        assert_eq!(reg.first_rush_pod(0), None);
    }

    #[test]
    fn quantity_on_sums_co_located_pods() {
        let mut reg = PodRegistry::new();
        reg.create_pod(5, 3).unwrap();
        reg.create_pod(5, 4).unwrap();
        reg.create_pod(6, 9).unwrap();
        assert_eq!(reg.quantity_on(5), 7);
        assert_eq!(reg.quantity_on(7), 0);
    }

    #[test]
    fn pod_on_empty_node_is_none() {
        let reg = PodRegistry::new();
        assert!(reg.pod_on(3).is_none());
    }

    #[test]
    fn remove_pods_on_clears_every_co_located_pod() {
        let mut reg = PodRegistry::new();
        reg.create_pod(1, 2).unwrap();
        reg.create_pod(1, 4).unwrap();
        let survivor = reg.create_pod(2, 1).unwrap();
        reg.remove_pods_on(1);
        assert_eq!(reg.len(), 1);
        assert!(reg.pod(survivor).is_some());
        // empty node: no-op
        reg.remove_pods_on(9);
        assert_eq!(reg.len(), 1);
    }
}
