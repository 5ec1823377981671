//! Per-turn decision core for a pod-based territory game.
//!
//! This crate contains the simulation and state-reconciliation layer of the
//! bot: the map graph, pathfinding, the pod lifecycle (merge / battle /
//! split / advance), neighbor scoring, and the movement order sheet. It is
//! pure in-process logic — no I/O, no global state. The host-facing driver
//! and the headless harness live in sibling crates and talk to this one
//! through [`sim::Simulation`].
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`graph`] | Static node topology plus per-turn node annotations |
//! | [`pathfinding`] | BFS shortest paths and the lazy all-pairs distance table |
//! | [`pods`] | Pod registry: merge, battle correction, split, one-hop advance |
//! | [`targeting`] | Turn-memoized interest scoring of candidate destinations |
//! | [`command`] | Movement order accumulation, legality gate, host rendering |
//! | [`snapshot`] | Plain data types for the per-turn authoritative snapshot |
//! | [`sim`] | The per-turn protocol: one explicitly constructed context |
//! | [`error`] | Setup-time graph errors |

pub mod command;
pub mod error;
pub mod graph;
pub mod pathfinding;
pub mod pods;
pub mod sim;
pub mod snapshot;
pub mod targeting;
