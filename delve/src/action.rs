//! Special abilities, one type per ability.

use std::collections::BTreeSet;

use tactica_core::Point;

use crate::error::ActionError;
use crate::floor::Floor;
use crate::unit::UnitId;

/// An ability a unit can use instead of a basic attack.
pub trait UnitAction: Sync {
    /// Stable identifier, matching the peep's ability key.
    fn name(&self) -> &'static str;

    /// Cells the ability may currently be aimed at.
    fn target_cells(&self, floor: &Floor, unit: UnitId) -> BTreeSet<Point>;

    /// Use the ability on `target`, which must be one of [`target_cells`].
    ///
    /// [`target_cells`]: UnitAction::target_cells
    fn execute(&self, floor: &mut Floor, unit: UnitId, target: Point) -> Result<(), ActionError>;
}

/// Ranged shot at any visible enemy within a few cells. Weaker than a melee
/// attack and ends the shooter's move.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnipeAction;

pub static SNIPE_ACTION: SnipeAction = SnipeAction;

impl UnitAction for SnipeAction {
    fn name(&self) -> &'static str {
        crate::peep::SNIPE
    }

    fn target_cells(&self, floor: &Floor, unit: UnitId) -> BTreeSet<Point> {
        let Some(view) = floor.view(unit) else {
            return BTreeSet::new();
        };
        let range = floor.config().combat.snipe_range;
        let from = view.pos();
        view.enemies()
            .map(|e| e.pos())
            .filter(|&p| from.manhattan(p) <= range && floor.line_of_sight(from, p).is_some())
            .collect()
    }

    fn execute(&self, floor: &mut Floor, unit: UnitId, target: Point) -> Result<(), ActionError> {
        if floor.unit(unit).is_none() {
            return Err(ActionError::UnknownUnit(unit));
        }
        if !self.target_cells(floor, unit).contains(&target) {
            return Err(ActionError::InvalidTarget(target));
        }
        let victim = floor
            .unit_at(target)
            .map(|u| u.id())
            .ok_or(ActionError::InvalidTarget(target))?;
        log::debug!("{unit} snipes {victim}");
        floor.strike(unit, victim, floor.config().combat.snipe_damage)?;
        floor.end_move(unit)
    }
}
