//! Error types for floor mutations and persistence.
//!
//! Most "failures" in the simulation are not errors: an impossible path is
//! `None` and an empty move is a no-op. These types cover caller mistakes
//! (stale unit ids, bad slots, bad targets) and malformed save data.

use tactica_core::Point;

use crate::unit::UnitId;

/// Why a floor mutation was rejected. Rejected mutations append no events.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("no live unit {0}")]
    UnknownUnit(UnitId),

    #[error("no cell at {0}")]
    NoSuchCell(Point),

    #[error("cell {0} cannot be occupied")]
    CellUnavailable(Point),

    #[error("no free cell left to place a unit")]
    NoFreeCell,

    #[error("unit {unit} has no inventory slot {slot}")]
    NoSuchItem { unit: UnitId, slot: usize },

    #[error("{0} is not a valid target")]
    InvalidTarget(Point),
}

/// Failure to read or write serialized floor state.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("malformed save data: {0}")]
    Json(#[from] serde_json::Error),
}
