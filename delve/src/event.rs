//! The floor's append-only event log.
//!
//! Every mutation of a [`Floor`](crate::Floor) records what happened as a
//! [`FloorEvent`], in causal order. Presentation reads the log through its
//! own [`EventCursor`] and never mutates it.

use std::fmt;

use serde::{Deserialize, Serialize};
use tactica_core::Point;

use crate::item::Item;
use crate::unit::{Team, UnitId};

/// Something that happened on a floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum FloorEvent {
    PathMove {
        unit: UnitId,
        from_cell: Point,
        path: Vec<Point>,
    },
    Teleport {
        unit: UnitId,
        from_cell: Point,
        to_cell: Point,
    },
    Attack {
        unit: UnitId,
        target: UnitId,
        damage: i32,
    },
    EndMove {
        unit: UnitId,
    },
    StartPhase {
        team: Team,
    },
    EndPhase {
        team: Team,
    },
    Defeated {
        unit: UnitId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        by: Option<UnitId>,
    },
    OpenChest {
        unit: UnitId,
        target_cell: Point,
    },
    PickupItem {
        unit: UnitId,
        item: Item,
    },
    UseItem {
        unit: UnitId,
        item: Item,
    },
    FloorCleared,
    FloorFailed,
}

impl fmt::Display for FloorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FloorEvent::PathMove {
                unit,
                from_cell,
                path,
            } => match path.last() {
                Some(to) => write!(f, "{unit} moves {from_cell} -> {to} ({} steps)", path.len()),
                None => write!(f, "{unit} stays at {from_cell}"),
            },
            FloorEvent::Teleport {
                unit,
                from_cell,
                to_cell,
            } => write!(f, "{unit} teleports {from_cell} -> {to_cell}"),
            FloorEvent::Attack {
                unit,
                target,
                damage,
            } => write!(f, "{unit} hits {target} for {damage}"),
            FloorEvent::EndMove { unit } => write!(f, "{unit} ends its move"),
            FloorEvent::StartPhase { team } => write!(f, "{team} phase begins"),
            FloorEvent::EndPhase { team } => write!(f, "{team} phase ends"),
            FloorEvent::Defeated { unit, by: Some(by) } => write!(f, "{unit} is defeated by {by}"),
            FloorEvent::Defeated { unit, by: None } => write!(f, "{unit} is defeated"),
            FloorEvent::OpenChest { unit, target_cell } => {
                write!(f, "{unit} opens the chest at {target_cell}")
            }
            FloorEvent::PickupItem { unit, item } => write!(f, "{unit} picks up {item}"),
            FloorEvent::UseItem { unit, item } => write!(f, "{unit} uses {item}"),
            FloorEvent::FloorCleared => f.write_str("floor cleared"),
            FloorEvent::FloorFailed => f.write_str("floor failed"),
        }
    }
}

/// Append-only, ordered record of floor events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<FloorEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, event: FloorEvent) {
        log::trace!("event {}: {}", self.events.len(), event);
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FloorEvent> {
        self.events.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FloorEvent> {
        self.events.iter()
    }

    pub fn as_slice(&self) -> &[FloorEvent] {
        &self.events
    }

    /// Events the cursor has not consumed yet.
    pub fn since(&self, cursor: &EventCursor) -> &[FloorEvent] {
        self.events.get(cursor.consumed..).unwrap_or(&[])
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a FloorEvent;
    type IntoIter = std::slice::Iter<'a, FloorEvent>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A consumer-owned read position into an [`EventLog`].
///
/// Each event is yielded exactly once, in log order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventCursor {
    consumed: usize,
}

impl EventCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events consumed so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Number of events appended but not consumed yet.
    pub fn pending(&self, log: &EventLog) -> usize {
        log.len().saturating_sub(self.consumed)
    }

    /// Consume and return the next event, if any.
    pub fn next<'a>(&mut self, log: &'a EventLog) -> Option<&'a FloorEvent> {
        let event = log.get(self.consumed)?;
        self.consumed += 1;
        Some(event)
    }
}
