//! Combatants and their side-effect-free query surface.
//!
//! A [`Unit`] is plain data owned by its [`Floor`]. Queries that need the
//! rest of the floor (occupancy, terrain, other units) go through a
//! [`UnitView`], which borrows both. Mutations are `Floor` methods.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use tactica_core::Point;
use tactica_paths::{Pather, dijkstra, dijkstra_range};

use crate::action::{SNIPE_ACTION, UnitAction};
use crate::floor::Floor;
use crate::item::Item;
use crate::peep::{Peep, SNIPE};

/// Identity of a unit, unique for the lifetime of a floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

/// Side of a unit; also names the acting phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    #[default]
    Player,
    Enemy,
}

impl Team {
    pub fn opponent(self) -> Team {
        match self {
            Team::Player => Team::Enemy,
            Team::Enemy => Team::Player,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Team::Player => "Player",
            Team::Enemy => "Enemy",
        })
    }
}

/// A combatant positioned on a floor.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub(crate) id: UnitId,
    pub(crate) pos: Point,
    pub(crate) peep: Peep,
    pub(crate) team: Team,
    pub(crate) moved: bool,
    pub(crate) move_range: i32,
    pub(crate) health: i32,
    pub(crate) max_health: i32,
    pub(crate) inventory: Vec<Item>,
}

impl Unit {
    #[inline]
    pub fn id(&self) -> UnitId {
        self.id
    }

    #[inline]
    pub fn pos(&self) -> Point {
        self.pos
    }

    pub fn peep(&self) -> &Peep {
        &self.peep
    }

    pub fn name(&self) -> &str {
        &self.peep.name
    }

    #[inline]
    pub fn team(&self) -> Team {
        self.team
    }

    /// Whether the unit has acted this phase.
    #[inline]
    pub fn moved(&self) -> bool {
        self.moved
    }

    pub fn move_range(&self) -> i32 {
        self.move_range
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn inventory(&self) -> &[Item] {
        &self.inventory
    }

    /// Reach of the best carried weapon, 1 when unarmed.
    pub fn attack_range(&self) -> i32 {
        self.inventory
            .iter()
            .filter_map(Item::weapon_range)
            .max()
            .unwrap_or(1)
    }
}

/// A unit together with the floor it stands on.
#[derive(Clone, Copy)]
pub struct UnitView<'a> {
    floor: &'a Floor,
    unit: &'a Unit,
}

impl<'a> Deref for UnitView<'a> {
    type Target = Unit;
    fn deref(&self) -> &Unit {
        self.unit
    }
}

impl fmt::Debug for UnitView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UnitView").field(self.unit).finish()
    }
}

impl<'a> UnitView<'a> {
    pub(crate) fn new(floor: &'a Floor, unit: &'a Unit) -> Self {
        Self { floor, unit }
    }

    pub fn unit(&self) -> &'a Unit {
        self.unit
    }

    pub fn floor(&self) -> &'a Floor {
        self.floor
    }

    // -------------------------------------------------------------------
    // Cell legality
    // -------------------------------------------------------------------

    /// Pathable and either empty or holding this unit.
    pub fn can_occupy(&self, pos: Point) -> bool {
        self.floor.cell(pos).is_some_and(|c| c.pathable())
            && self
                .floor
                .unit_at(pos)
                .is_none_or(|other| other.id == self.unit.id)
    }

    /// Pathable and either empty or holding a unit of the same team.
    pub fn can_path_through(&self, pos: Point) -> bool {
        self.floor.cell(pos).is_some_and(|c| c.pathable())
            && self
                .floor
                .unit_at(pos)
                .is_none_or(|other| other.team == self.unit.team)
    }

    /// Whether standing on `from` would let this unit attack `target`.
    pub fn can_attack_cell_from(&self, from: Point, target: Point) -> bool {
        if self.floor.config().combat.ranged_attacks {
            let d = from.manhattan(target);
            d >= 1 && d <= self.attack_range() && self.floor.line_of_sight(from, target).is_some()
        } else {
            from.is_adjacent(target)
        }
    }

    pub fn can_attack_from(&self, from: Point, target: UnitId) -> bool {
        self.floor
            .unit(target)
            .is_some_and(|t| self.can_attack_cell_from(from, t.pos))
    }

    // -------------------------------------------------------------------
    // Envelopes
    // -------------------------------------------------------------------

    /// Cells this unit could end its move on this turn, its own cell included.
    pub fn reachable_unoccupied_cells(&self) -> BTreeSet<Point> {
        dijkstra_range(self.unit.pos, self.unit.move_range, self)
            .into_iter()
            .map(|n| n.node)
            .filter(|&p| self.can_occupy(p))
            .collect()
    }

    /// Pathable cells outside the move envelope that could be attacked from
    /// some cell inside it.
    pub fn attack_border_cells(&self) -> BTreeSet<Point> {
        let reachable = self.reachable_unoccupied_cells();
        let reach = if self.floor.config().combat.ranged_attacks {
            self.attack_range()
        } else {
            1
        };
        let mut border = BTreeSet::new();
        for &from in &reachable {
            for dy in -reach..=reach {
                for dx in -reach..=reach {
                    let p = from.shift(dx, dy);
                    if reachable.contains(&p) || border.contains(&p) {
                        continue;
                    }
                    if self.floor.cell(p).is_some_and(|c| c.pathable())
                        && self.can_attack_cell_from(from, p)
                    {
                        border.insert(p);
                    }
                }
            }
        }
        border
    }

    // -------------------------------------------------------------------
    // Targets
    // -------------------------------------------------------------------

    /// All opposing units, in spawn order.
    pub fn enemies(&self) -> impl Iterator<Item = &'a Unit> + use<'a> {
        let team = self.unit.team;
        self.floor.units().iter().filter(move |u| u.team != team)
    }

    /// Opposing units with a clear line of sight from this unit.
    pub fn visible_enemies(&self) -> Vec<&'a Unit> {
        let from = self.unit.pos;
        let floor = self.floor;
        self.enemies()
            .filter(|e| floor.line_of_sight(from, e.pos).is_some())
            .collect()
    }

    /// Special abilities this unit can use.
    pub fn actions(&self) -> Vec<&'static dyn UnitAction> {
        let mut actions: Vec<&'static dyn UnitAction> = Vec::new();
        if self.unit.peep.ability_level(SNIPE) > 0 {
            actions.push(&SNIPE_ACTION);
        }
        actions
    }

    // -------------------------------------------------------------------
    // Paths
    // -------------------------------------------------------------------

    /// Shortest path to `target` through cells this unit can path through.
    pub fn get_path_to(&self, target: Point) -> Option<Vec<Point>> {
        dijkstra(self.unit.pos, |p| p == target, self)
    }

    /// Path to `target` if the unit can end there this turn.
    pub fn get_path_to_occupy_this_turn(&self, target: Point) -> Option<Vec<Point>> {
        if !self.can_occupy(target) {
            return None;
        }
        self.get_path_to(target)
            .filter(|path| path.len() as i32 <= self.unit.move_range)
    }

    /// Path to the nearest cell this unit could attack `target` from, if it
    /// is within this turn's move range.
    pub fn get_path_to_attack_this_turn(&self, target: UnitId) -> Option<Vec<Point>> {
        let tpos = self.floor.unit(target)?.pos;
        dijkstra(
            self.unit.pos,
            |p| self.can_occupy(p) && self.can_attack_cell_from(p, tpos),
            self,
        )
        .filter(|path| path.len() as i32 <= self.unit.move_range)
    }

    /// Path to the nearest cell from which any enemy becomes attackable,
    /// regardless of move range.
    pub fn path_towards_attack_position(&self) -> Option<Vec<Point>> {
        let targets: Vec<Point> = self.enemies().map(|e| e.pos).collect();
        if targets.is_empty() {
            return None;
        }
        dijkstra(
            self.unit.pos,
            |p| self.can_occupy(p) && targets.iter().any(|&t| self.can_attack_cell_from(p, t)),
            self,
        )
    }
}

impl Pather<Point> for UnitView<'_> {
    fn neighbors(&self, p: Point, buf: &mut Vec<Point>) {
        buf.extend(self.floor.neighbors(p).filter(|&n| self.can_path_through(n)));
    }
}
