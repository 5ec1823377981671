//! Stdin/stdout driver for the decision core.
//!
//! Wire protocol (one game per process, host on the other end of the pipes):
//!
//! * init, line 1: `my_id node_count link_count hq0 hq1` — `hq0`/`hq1` are
//!   the headquarters of players 0 and 1;
//! * init, next `link_count` lines: `a b`, one undirected edge each;
//! * per turn, `node_count` lines: `id owner pods0 pods1 visible production`
//!   with `owner` −1 for neutral, otherwise the holding player's id;
//! * per turn, one line out: the movement orders, or `WAIT`.
//!
//! Diagnostics go to stderr through the `log` facade; the host ignores or
//! records them.

mod policy;

use std::error::Error;
use std::fmt;
use std::io::{self, BufRead, Write};

use log::{info, LevelFilter, Metadata, Record};
use platrift_core::graph::Owner;
use platrift_core::sim::Simulation;
use platrift_core::snapshot::{TurnSnapshot, ZoneState};

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

#[derive(Debug)]
struct ProtocolError(String);

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "protocol error: {}", self.0)
    }
}

impl Error for ProtocolError {}

fn malformed(context: &str) -> Box<dyn Error> {
    Box::new(ProtocolError(context.to_string()))
}

/// Read one line and parse it as whitespace-separated integers.
fn read_ints(input: &mut impl BufRead) -> Result<Option<Vec<i64>>, Box<dyn Error>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None); // EOF: game over
    }
    let values = line
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<Vec<i64>, _>>()?;
    Ok(Some(values))
}

fn expect_ints(input: &mut impl BufRead, n: usize, what: &str) -> Result<Vec<i64>, Box<dyn Error>> {
    match read_ints(input)? {
        Some(values) if values.len() == n => Ok(values),
        Some(values) => Err(malformed(&format!(
            "{}: expected {} fields, got {}",
            what,
            n,
            values.len()
        ))),
        None => Err(malformed(&format!("{}: unexpected end of input", what))),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(LevelFilter::Debug);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut output = stdout.lock();

    // --- Init ---
    let header = expect_ints(&mut input, 5, "init header")?;
    let (my_id, node_count) = (header[0], header[1] as u32);
    let link_count = header[2];
    let (hq0, hq1) = (header[3] as u32, header[4] as u32);
    let (hq, enemy_hq) = if my_id == 0 { (hq0, hq1) } else { (hq1, hq0) };

    let mut links = Vec::with_capacity(link_count as usize);
    for _ in 0..link_count {
        let pair = expect_ints(&mut input, 2, "link")?;
        links.push((pair[0] as u32, pair[1] as u32));
    }

    let mut sim = Simulation::new(node_count, &links, hq, enemy_hq)?;
    info!(
        "map ready: {} nodes, {} links, HQ {} vs {}, {} strategic",
        node_count,
        link_count,
        hq,
        enemy_hq,
        sim.graph.strategic_nodes().len()
    );

    // --- Turn loop ---
    loop {
        let Some(snapshot) = read_snapshot(&mut input, my_id, node_count)? else {
            info!("input closed after turn {}", sim.turn());
            return Ok(());
        };

        sim.begin_turn(&snapshot)?;
        policy::adopt_spawned_pods(&mut sim);
        sim.reconcile();
        policy::assign_targets(&mut sim);
        sim.move_pods();
        policy::split_oversized_pods(&mut sim);
        sim.commit();

        let line = sim.render_orders();
        writeln!(output, "{}", line)?;
        output.flush()?;
    }
}

/// Read one turn's node states. Pod count columns are per player id; swap
/// them into my/enemy form for the core.
fn read_snapshot(
    input: &mut impl BufRead,
    my_id: i64,
    node_count: u32,
) -> Result<Option<TurnSnapshot>, Box<dyn Error>> {
    let mut snapshot = TurnSnapshot::new(node_count as usize);
    for i in 0..node_count {
        let Some(fields) = read_ints(input)? else {
            if i == 0 {
                return Ok(None);
            }
            return Err(malformed("snapshot truncated mid-turn"));
        };
        if fields.len() != 6 {
            return Err(malformed("zone line: expected 6 fields"));
        }
        let (id, owner_id, pods0, pods1) = (fields[0], fields[1], fields[2], fields[3]);
        let (visible, production) = (fields[4], fields[5]);
        if id < 0 || id >= node_count as i64 {
            return Err(malformed("zone line: id out of range"));
        }
        let owner = if owner_id < 0 {
            Owner::Neutral
        } else if owner_id == my_id {
            Owner::Me
        } else {
            Owner::Enemy
        };
        let (my_pods, enemy_pods) = if my_id == 0 {
            (pods0, pods1)
        } else {
            (pods1, pods0)
        };
        snapshot.zones[id as usize] = ZoneState {
            owner,
            production: production.max(0) as u32,
            my_pods: my_pods.max(0) as u32,
            enemy_pods: enemy_pods.max(0) as u32,
            visible: visible != 0,
        };
    }
    Ok(Some(snapshot))
}
