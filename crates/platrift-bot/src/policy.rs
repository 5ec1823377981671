//! Destination selection on top of the core's scores.
//!
//! The core produces scored candidates and movement primitives; this module
//! is the policy that picks among them: adopt engine-spawned pods, route
//! every idle pod at its best-scoring neighbor, and split oversized idle
//! pods so one fat stack fans out over several fronts.

use log::debug;
use platrift_core::pods::PodId;
use platrift_core::sim::Simulation;
use platrift_core::targeting::Candidate;

/// An idle pod at least this big, with room to fan out, gets split.
const SPLIT_THRESHOLD: u32 = 6;

/// Register a pod for every occupied node the registry does not know yet.
/// The engine spawns new units at the headquarters; they enter the
/// registry here, at snapshot quantity.
pub fn adopt_spawned_pods(sim: &mut Simulation) {
    let unknown: Vec<_> = sim
        .graph
        .nodes_with_pods()
        .iter()
        .copied()
        .filter(|&n| sim.pods.pod_on(n).is_none())
        .collect();
    for node in unknown {
        let quantity = sim.graph.node(node).map(|n| n.my_pods).unwrap_or(0);
        if let Some(id) = sim.pods.create_pod(node, quantity) {
            debug!("adopted pod {} ({} units) on node {}", id, quantity, node);
        }
    }
}

/// The best-scoring candidate with positive interest, earliest on a tie.
pub fn choose_target(candidates: &[Candidate]) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for &c in candidates {
        if c.interest > 0.0 && best.map_or(true, |b| c.interest > b.interest) {
            best = Some(c);
        }
    }
    best
}

/// Route every idle pod: best positive-interest neighbor first, the richest
/// neighbor as a fallback, otherwise stay put this turn.
pub fn assign_targets(sim: &mut Simulation) {
    for pod in sim.pods.idle_pods() {
        let candidates = sim.score_targets(pod);
        match choose_target(&candidates) {
            Some(best) => {
                debug!("pod {} -> node {} (interest {})", pod, best.node, best.interest);
                sim.route_pod(pod, best.node);
            }
            None => {
                let at = sim.pods.pod(pod).map(|p| p.node);
                if let Some(rich) = at.and_then(|n| sim.graph.max_platinum_neighbor(n)) {
                    debug!("pod {} -> node {} (platinum fallback)", pod, rich);
                    sim.route_pod(pod, rich);
                }
            }
        }
    }
}

/// Split any big idle pod that sees several worthwhile directions. The
/// shares only exist after the commit, so they are routed next turn.
pub fn split_oversized_pods(sim: &mut Simulation) {
    let idle: Vec<PodId> = sim.pods.idle_pods();
    for pod in idle {
        let Some(quantity) = sim.pods.pod(pod).map(|p| p.quantity) else {
            continue;
        };
        if quantity < SPLIT_THRESHOLD {
            continue;
        }
        let positive = sim
            .score_targets(pod)
            .iter()
            .filter(|c| c.interest > 0.0)
            .count() as u32;
        if positive >= 2 {
            let parts = positive.min(quantity);
            debug!("splitting pod {} ({} units) into {}", pod, quantity, parts);
            sim.split(pod, parts);
        }
    }
}
