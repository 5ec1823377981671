//! Movement order accumulation and the single legality gate.
//!
//! `CommandSheet` collects the turn's `(quantity, source, destination)`
//! triples and renders them in the host's wire syntax: all triples
//! space-joined on one line, or `WAIT` when nothing moved. Legality of a
//! candidate move is checked here and nowhere else — the registry's movement
//! pass calls [`CommandSheet::is_valid_move`] before realizing any hop.

use serde::Serialize;

use crate::graph::{Node, NodeId, Owner};
use crate::pods::Pod;

/// One movement directive for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveOrder {
    pub quantity: u32,
    pub from: NodeId,
    pub to: NodeId,
}

/// The turn's accumulated movement directives.
#[derive(Debug, Default)]
pub struct CommandSheet {
    orders: Vec<MoveOrder>,
}

impl CommandSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, quantity: u32, from: NodeId, to: NodeId) {
        self.orders.push(MoveOrder { quantity, from, to });
    }

    pub fn orders(&self) -> &[MoveOrder] {
        &self.orders
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Whether moving `quantity` units of `mover` from `from` to `to` is
    /// legal this turn. False for zero quantity, a destination that is not
    /// adjacent to the source, more units than the source actually holds,
    /// or a pod that fought this turn trying to advance into enemy ground
    /// (fought pods may only hold or retreat).
    pub fn is_valid_move(&self, quantity: u32, from: &Node, to: &Node, mover: &Pod) -> bool {
        if quantity == 0 || from.id == to.id {
            return false;
        }
        if !from.neighbors().contains(&to.id) {
            return false;
        }
        if from.my_pods < quantity {
            return false;
        }
        if mover.fighting && to.owner == Owner::Enemy {
            return false;
        }
        true
    }

    /// Render the accumulated directives in host syntax and clear the sheet
    /// for the next turn. An empty sheet renders the explicit no-op `WAIT`.
    pub fn render(&mut self) -> String {
        let line = if self.orders.is_empty() {
            "WAIT".to_string()
        } else {
            self.orders
                .iter()
                .map(|o| format!("{} {} {}", o.quantity, o.from, o.to))
                .collect::<Vec<_>>()
                .join(" ")
        };
        self.orders.clear();
        line
    }
}
