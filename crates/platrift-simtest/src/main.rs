//! Headless validation harness for the decision core.
//!
//! Drives full turn cycles against a fixture map and randomized soak maps,
//! with no host engine on the other side — the harness plays the engine,
//! echoing authoritative snapshots back from its own bookkeeping.
//!
//! Usage:
//!   cargo run -p platrift-simtest
//!   cargo run -p platrift-simtest -- --verbose

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use platrift_core::graph::{NodeId, Owner};
use platrift_core::pathfinding::PathFinder;
use platrift_core::sim::Simulation;
use platrift_core::snapshot::{TurnSnapshot, ZoneState};

// ── Fixture map (checked into the repo next to this binary) ─────────────
const MAP_JSON: &str = include_str!("../data/map.json");

#[derive(Debug, Deserialize)]
struct MapFixture {
    node_count: u32,
    hq: NodeId,
    enemy_hq: NodeId,
    links: Vec<(NodeId, NodeId)>,
    production: Vec<u32>,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: String) -> TestResult {
    TestResult {
        name: name.to_string(),
        passed,
        detail,
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== platrift Simulation Harness ===\n");

    let mut results = Vec::new();

    results.extend(validate_fixture_map(verbose));
    results.extend(validate_lifecycle(verbose));
    results.extend(validate_orders(verbose));
    results.extend(validate_soak(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn load_fixture() -> MapFixture {
    serde_json::from_str(MAP_JSON).expect("map fixture must parse")
}

fn fixture_sim(fixture: &MapFixture) -> Simulation {
    Simulation::new(
        fixture.node_count,
        &fixture.links,
        fixture.hq,
        fixture.enemy_hq,
    )
    .expect("fixture topology must be valid")
}

/// A snapshot where every zone is visible, production comes from the
/// fixture, and my pod counts are the given per-node pairs.
fn snapshot_for(fixture: &MapFixture, counts: &[(NodeId, u32)]) -> TurnSnapshot {
    let mut snap = TurnSnapshot::new(fixture.node_count as usize);
    for (id, zone) in snap.zones.iter_mut().enumerate() {
        *zone = ZoneState {
            owner: Owner::Neutral,
            production: fixture.production[id],
            my_pods: 0,
            enemy_pods: 0,
            visible: true,
        };
    }
    for &(id, my_pods) in counts {
        snap.zones[id as usize].my_pods = my_pods;
        snap.zones[id as usize].owner = Owner::Me;
    }
    snap
}

// ── 1. Fixture map ──────────────────────────────────────────────────────

fn validate_fixture_map(_verbose: bool) -> Vec<TestResult> {
    println!("--- Fixture map ---");
    let mut results = Vec::new();
    let fixture = load_fixture();
    let sim = fixture_sim(&fixture);

    let symmetric = sim.graph.nodes().iter().all(|node| {
        node.neighbors().iter().all(|&n| {
            sim.graph
                .node(n)
                .map(|other| other.neighbors().contains(&node.id))
                .unwrap_or(false)
        })
    });
    results.push(check(
        "adjacency_symmetric",
        symmetric,
        "every edge recorded on both endpoints".into(),
    ));

    // ring of 8 with two chords: nodes 2, 6, 8, 9 tie at distance 2 from
    // both headquarters
    results.push(check(
        "strategic_set",
        sim.graph.strategic_nodes() == [2, 6, 8, 9].as_slice(),
        format!("strategic = {:?}", sim.graph.strategic_nodes()),
    ));

    let mut pf = PathFinder::new();
    let mut symmetric_distances = true;
    for a in 0..fixture.node_count {
        for b in 0..fixture.node_count {
            if pf.distance(&sim.graph, a, b) != pf.distance(&sim.graph, b, a) {
                symmetric_distances = false;
            }
        }
    }
    results.push(check(
        "distance_symmetry",
        symmetric_distances,
        "d(a,b) == d(b,a) for all pairs".into(),
    ));

    let path = pf.shortest_path(&sim.graph, 0, 4).unwrap_or_default();
    results.push(check(
        "path_endpoints",
        path.first() == Some(&0) && path.last() == Some(&4) && path.len() == 5,
        format!("0 -> 4 via {:?}", path),
    ));

    results
}

// ── 2. Pod lifecycle ────────────────────────────────────────────────────

fn validate_lifecycle(_verbose: bool) -> Vec<TestResult> {
    println!("--- Pod lifecycle ---");
    let mut results = Vec::new();
    let fixture = load_fixture();
    let mut sim = fixture_sim(&fixture);

    // two stacks land on node 1, the snapshot already sums them
    sim.begin_turn(&snapshot_for(&fixture, &[(1, 8)])).unwrap();
    sim.pods.create_pod(1, 3).unwrap();
    sim.pods.create_pod(1, 5).unwrap();
    sim.reconcile();
    results.push(check(
        "merge_collapses_stacks",
        sim.pods.len() == 1 && sim.pods.quantity_on(1) == 8,
        format!("{} pods, {} units on node 1", sim.pods.len(), sim.pods.quantity_on(1)),
    ));

    // combat: the engine reports fewer survivors than tracked
    sim.begin_turn(&snapshot_for(&fixture, &[(1, 2)])).unwrap();
    sim.reconcile();
    let fought = sim.pods.pod_on(1).map(|p| (p.quantity, p.fighting));
    results.push(check(
        "battle_correction",
        fought == Some((2, true)),
        format!("pod after battle: {:?}", fought),
    ));

    // split conserves quantity across the commit boundary
    let mut sim = fixture_sim(&fixture);
    sim.begin_turn(&snapshot_for(&fixture, &[(0, 10)])).unwrap();
    let id = sim.pods.create_pod(0, 10).unwrap();
    sim.split(id, 3);
    let before = sim.pods.quantity_on(0);
    sim.commit();
    results.push(check(
        "split_conserves_quantity",
        before == 10 && sim.pods.quantity_on(0) == 10 && sim.pods.len() == 4,
        format!(
            "10 units -> {} pods totalling {}",
            sim.pods.len(),
            sim.pods.quantity_on(0)
        ),
    ));
    let no_zero = sim.pods.pods().iter().all(|p| p.quantity > 0);
    results.push(check(
        "no_zero_quantity_pods",
        no_zero,
        "every live pod has positive quantity".into(),
    ));

    results
}

// ── 3. Orders ───────────────────────────────────────────────────────────

fn validate_orders(_verbose: bool) -> Vec<TestResult> {
    println!("--- Orders ---");
    let mut results = Vec::new();
    let fixture = load_fixture();
    let mut sim = fixture_sim(&fixture);

    // nothing to do: explicit no-op
    sim.begin_turn(&snapshot_for(&fixture, &[])).unwrap();
    sim.reconcile();
    sim.move_pods();
    sim.commit();
    results.push(check(
        "empty_turn_renders_wait",
        sim.render_orders() == "WAIT",
        "no pods, no orders".into(),
    ));

    // a routed pod emits exactly one hop per turn
    sim.begin_turn(&snapshot_for(&fixture, &[(0, 4)])).unwrap();
    let id = sim.pods.create_pod(0, 4).unwrap();
    sim.route_pod(id, fixture.enemy_hq);
    sim.reconcile();
    sim.move_pods();
    sim.commit();
    let line = sim.render_orders();
    results.push(check(
        "one_hop_per_turn",
        line == "4 0 1" && sim.pods.pod(id).unwrap().node == 1,
        format!("rendered {:?}", line),
    ));

    // an infeasible hop is retried, not raised: pod keeps path and place
    let mut sim = fixture_sim(&fixture);
    sim.begin_turn(&snapshot_for(&fixture, &[(0, 4)])).unwrap();
    let id = sim.pods.create_pod(0, 4).unwrap();
    sim.pods.pod_mut(id).unwrap().set_path(vec![5]); // 0-5 not adjacent
    sim.move_pods();
    sim.commit();
    let rendered = sim.render_orders();
    let pod = sim.pods.pod(id).unwrap();
    results.push(check(
        "infeasible_hop_left_pending",
        rendered == "WAIT" && pod.node == 0 && pod.has_path(),
        format!("pod stayed on {} with path {:?}", pod.node, pod.path()),
    ));

    results
}

// ── 4. Randomized soak ──────────────────────────────────────────────────

/// Ring plus random chords: always connected, shape varies by seed.
fn random_map(rng: &mut StdRng, n: u32) -> (Vec<(NodeId, NodeId)>, Vec<u32>) {
    let mut links = Vec::new();
    for i in 0..n {
        links.push((i, (i + 1) % n));
    }
    for _ in 0..n / 3 {
        let a = rng.gen_range(0..n);
        let b = rng.gen_range(0..n);
        if a != b {
            links.push((a, b));
        }
    }
    let production = (0..n).map(|_| rng.gen_range(0..4)).collect();
    (links, production)
}

fn validate_soak(verbose: bool) -> Vec<TestResult> {
    println!("--- Randomized soak ---");
    let mut results = Vec::new();

    for seed in 0..4u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let n = rng.gen_range(12..30);
        let (links, production) = random_map(&mut rng, n);
        let hq = 0;
        let enemy_hq = n / 2;
        let mut sim = Simulation::new(n, &links, hq, enemy_hq).expect("soak map is valid");

        let mut ok = true;
        let mut detail = String::new();
        for turn in 0..30 {
            // the harness plays the engine: echo tracked counts back,
            // spawn reinforcements at the HQ, occasionally inflict losses
            let mut snap = TurnSnapshot::new(n as usize);
            for (id, zone) in snap.zones.iter_mut().enumerate() {
                let mut my_pods = sim.pods.quantity_on(id as NodeId);
                if id as NodeId == hq && turn % 3 == 0 {
                    my_pods += 2;
                }
                if my_pods > 0 && rng.gen_ratio(1, 10) {
                    my_pods -= 1; // skirmish losses
                }
                if my_pods > 0 && rng.gen_ratio(1, 12) {
                    my_pods = 0; // the whole stack is annihilated
                }
                *zone = ZoneState {
                    owner: if my_pods > 0 { Owner::Me } else { Owner::Neutral },
                    production: production[id],
                    my_pods,
                    enemy_pods: 0,
                    visible: true,
                };
            }

            sim.begin_turn(&snap).unwrap();
            // every surviving registry pod must stand on a node the
            // snapshot still reports occupied — wiped stacks leave no ghost
            if let Some(ghost) = sim
                .pods
                .pods()
                .iter()
                .find(|p| sim.graph.node(p.node).map_or(true, |z| z.my_pods == 0))
            {
                ok = false;
                detail = format!("turn {}: pod {} survived an empty node {}", turn, ghost.id, ghost.node);
            }
            // adopt engine-spawned units the registry does not know yet
            let unknown: Vec<NodeId> = sim
                .graph
                .nodes_with_pods()
                .iter()
                .copied()
                .filter(|&node| sim.pods.pod_on(node).is_none())
                .collect();
            for node in unknown {
                let quantity = sim.graph.node(node).map(|z| z.my_pods).unwrap_or(0);
                let _ = sim.pods.create_pod(node, quantity);
            }
            sim.reconcile();

            for pod in sim.pods.idle_pods() {
                let best = sim
                    .score_targets(pod)
                    .into_iter()
                    .filter(|c| c.interest > 0.0)
                    .max_by(|a, b| a.interest.total_cmp(&b.interest));
                if let Some(best) = best {
                    sim.route_pod(pod, best.node);
                }
            }

            sim.move_pods();
            sim.commit();

            // invariants after every full cycle
            for order in sim.orders() {
                let from = sim.graph.node(order.from).unwrap();
                if order.quantity == 0 || !from.neighbors().contains(&order.to) {
                    ok = false;
                    detail = format!("turn {}: illegal order {:?}", turn, order);
                }
            }
            if !sim.pods.pods().iter().all(|p| p.quantity > 0) {
                ok = false;
                detail = format!("turn {}: zero-quantity pod survived", turn);
            }
            if sim
                .pods
                .pods()
                .iter()
                .any(|p| sim.graph.node(p.node).is_none())
            {
                ok = false;
                detail = format!("turn {}: pod on nonexistent node", turn);
            }

            let line = sim.render_orders();
            if verbose {
                println!("  seed {} turn {}: {}", seed, turn, line);
            }
        }

        if ok {
            detail = format!("{} nodes, 30 turns clean", n);
        }
        results.push(check(&format!("soak_seed_{}", seed), ok, detail));
    }

    results
}
