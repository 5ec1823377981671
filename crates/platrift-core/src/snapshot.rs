//! Plain data types for the authoritative per-turn snapshot.
//!
//! The host engine is the source of truth for ownership, production, pod
//! counts and visibility. Once per turn the driver hands the core a
//! [`TurnSnapshot`]; the core consumes it exclusively through
//! [`crate::sim::Simulation::begin_turn`].

use serde::{Deserialize, Serialize};

use crate::graph::Owner;

/// Authoritative state of one node for the current turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ZoneState {
    pub owner: Owner,
    pub production: u32,
    pub my_pods: u32,
    pub enemy_pods: u32,
    pub visible: bool,
}

impl ZoneState {
    /// An invisible neutral zone with nothing on it.
    pub fn hidden() -> Self {
        Self {
            owner: Owner::Neutral,
            production: 0,
            my_pods: 0,
            enemy_pods: 0,
            visible: false,
        }
    }
}

/// One full turn snapshot, indexed positionally by node id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnSnapshot {
    pub zones: Vec<ZoneState>,
}

impl TurnSnapshot {
    pub fn new(node_count: usize) -> Self {
        Self {
            zones: vec![ZoneState::hidden(); node_count],
        }
    }
}
