//! The floor: cells, live units, the phase state machine and the event log.
//!
//! Every public mutation ends in `settle`, which re-evaluates the
//! victory/defeat predicates and the phase-completion predicate in that
//! order. Each predicate appends an event only when it flips from false to
//! true, so re-checking a condition that already holds appends nothing.
//! A phase change into the AI team's phase runs the AI synchronously; the
//! AI's own mutations re-check the terminal predicates but never start a
//! nested phase change.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use tactica_core::{Point, Range};
use tactica_paths::bresenham;

use crate::ai::Ai;
use crate::cell::{Cell, Fixture, FixtureId};
use crate::config::FloorConfig;
use crate::error::ActionError;
use crate::event::{EventLog, FloorEvent};
use crate::item::{Effect, Item};
use crate::peep::{Peep, kind_data};
use crate::terrain::{Biome, Block};
use crate::unit::{Team, Unit, UnitId, UnitView};

/// How a floor ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Only player units remain.
    Cleared,
    /// Only enemy units remain.
    Failed,
}

/// Last observed value of each terminal predicate.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Watch {
    cleared: bool,
    failed: bool,
}

/// Deterministic RNG for a floor seed string (FNV-1a of the seed).
pub fn seed_rng(seed: &str) -> StdRng {
    let hash = seed.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |h, b| {
        (h ^ u64::from(b)).wrapping_mul(0x0000_0100_0000_01b3)
    });
    StdRng::seed_from_u64(hash)
}

/// One level: the aggregate root of the simulation.
pub struct Floor {
    pub(crate) biome: Biome,
    pub(crate) cells: BTreeMap<Point, Cell>,
    pub(crate) units: Vec<Unit>,
    pub(crate) phase: Team,
    pub(crate) events: EventLog,
    pub(crate) ai: Option<Ai>,
    pub(crate) seed: String,
    pub(crate) rng: StdRng,
    pub(crate) config: FloorConfig,
    pub(crate) next_unit: u32,
    pub(crate) next_fixture: u32,
    pub(crate) watch: Watch,
    advancing: bool,
}

impl Floor {
    /// A floor over the given cells, with no units, in the player phase.
    pub fn new(
        biome: Biome,
        cells: impl IntoIterator<Item = Cell>,
        seed: &str,
        config: FloorConfig,
    ) -> Self {
        let mut map = BTreeMap::new();
        for cell in cells {
            let prev = map.insert(cell.pos(), cell);
            debug_assert!(prev.is_none(), "two cells share a position");
        }
        Self {
            biome,
            cells: map,
            units: Vec::new(),
            phase: Team::Player,
            events: EventLog::new(),
            ai: Some(Ai::new(Team::Enemy)),
            seed: seed.to_string(),
            rng: seed_rng(seed),
            config,
            next_unit: 0,
            next_fixture: 0,
            watch: Watch::default(),
            advancing: false,
        }
    }

    // -------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------

    pub fn biome(&self) -> Biome {
        self.biome
    }

    /// The team currently acting.
    pub fn phase(&self) -> Team {
        self.phase
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn config(&self) -> &FloorConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut FloorConfig {
        &mut self.config
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn ai(&self) -> Option<Ai> {
        self.ai
    }

    /// Replace the policy driving the enemy phase. `None` leaves that phase
    /// to external callers.
    pub fn set_ai(&mut self, ai: Option<Ai>) {
        self.ai = ai;
    }

    /// Smallest rectangle containing every cell.
    pub fn bounds(&self) -> Range {
        Range::bounding(self.cells.keys().copied())
    }

    pub fn cell(&self, pos: Point) -> Option<&Cell> {
        self.cells.get(&pos)
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    /// Live units in spawn order.
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    /// The unit standing on `pos`, derived from unit positions.
    pub fn unit_at(&self, pos: Point) -> Option<&Unit> {
        self.units.iter().find(|u| u.pos == pos)
    }

    pub fn team_units(&self, team: Team) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(move |u| u.team == team)
    }

    /// Query surface for one unit.
    pub fn view(&self, id: UnitId) -> Option<UnitView<'_>> {
        self.unit(id).map(|u| UnitView::new(self, u))
    }

    /// The decided outcome, if only one team remains.
    pub fn outcome(&self) -> Option<Outcome> {
        if self.watch.cleared {
            Some(Outcome::Cleared)
        } else if self.watch.failed {
            Some(Outcome::Failed)
        } else {
            None
        }
    }

    /// Existing cells orthogonally adjacent to `pos`.
    pub fn neighbors(&self, pos: Point) -> impl Iterator<Item = Point> + '_ {
        pos.neighbors_4()
            .into_iter()
            .filter(|p| self.cells.contains_key(p))
    }

    /// Cells strictly between `from` and `to` along a Bresenham line, or
    /// `None` when one of them is missing or a wall.
    pub fn line_of_sight(&self, from: Point, to: Point) -> Option<Vec<Point>> {
        let mut between = Vec::new();
        let clear = bresenham(from.x, from.y, to.x, to.y, |x, y| {
            let p = Point::new(x, y);
            if p == from || p == to {
                return true;
            }
            if self.cell(p).is_some_and(Cell::pathable) {
                between.push(p);
                true
            } else {
                false
            }
        });
        clear.then_some(between)
    }

    /// Where a fixture currently lies.
    pub fn find_fixture(&self, id: FixtureId) -> Option<Point> {
        self.cells
            .values()
            .find(|c| c.contents().iter().any(|f| f.id() == id))
            .map(Cell::pos)
    }

    fn is_free(&self, pos: Point) -> bool {
        self.cell(pos).is_some_and(Cell::pathable) && self.unit_at(pos).is_none()
    }

    fn index_of(&self, id: UnitId) -> Result<usize, ActionError> {
        self.units
            .iter()
            .position(|u| u.id == id)
            .ok_or(ActionError::UnknownUnit(id))
    }

    // -------------------------------------------------------------------
    // Placement
    // -------------------------------------------------------------------

    /// Add a unit mid-floor. Without `at`, the first free spawn cell of its
    /// team is used, then any free cell.
    pub fn spawn_unit(
        &mut self,
        peep: Peep,
        team: Team,
        at: Option<Point>,
    ) -> Result<UnitId, ActionError> {
        let id = self.place_unit(peep, team, at)?;
        self.settle();
        Ok(id)
    }

    /// Add a unit without re-evaluating watchers. Used while building a floor.
    pub(crate) fn place_unit(
        &mut self,
        peep: Peep,
        team: Team,
        at: Option<Point>,
    ) -> Result<UnitId, ActionError> {
        let pos = match at {
            Some(p) if self.is_free(p) => p,
            Some(p) if self.cell(p).is_none() => return Err(ActionError::NoSuchCell(p)),
            Some(p) => return Err(ActionError::CellUnavailable(p)),
            None => self.free_spawn_cell(team).ok_or(ActionError::NoFreeCell)?,
        };
        let (health, move_range) = kind_data(&peep.kind_id).map_or(
            (self.config.default_health, self.config.default_move_range),
            |d| (d.health, d.move_range),
        );
        Ok(self.insert_unit(Unit {
            id: UnitId(0),
            pos,
            peep,
            team,
            moved: false,
            move_range,
            health,
            max_health: health,
            inventory: Vec::new(),
        }))
    }

    /// Assign a fresh id and add the unit as given.
    pub(crate) fn insert_unit(&mut self, mut unit: Unit) -> UnitId {
        debug_assert!(self.is_free(unit.pos), "unit placed on a blocked cell");
        unit.id = UnitId(self.next_unit);
        self.next_unit += 1;
        let id = unit.id;
        log::trace!("{} joins {:?} at {}", unit.peep.name, unit.team, unit.pos);
        self.units.push(unit);
        id
    }

    fn free_spawn_cell(&self, team: Team) -> Option<Point> {
        let marker = match team {
            Team::Player => Block::PlayerSpawn,
            Team::Enemy => Block::EnemySpawn,
        };
        let mut spawns = self.cells.values().filter(|c| c.has(marker)).map(Cell::pos);
        spawns
            .find(|&p| self.is_free(p))
            .or_else(|| self.cells.keys().copied().find(|&p| self.is_free(p)))
    }

    /// A chest holding `items`, with a fresh fixture id.
    pub fn new_chest(&mut self, items: Vec<Item>) -> Fixture {
        let id = self.fresh_fixture_id();
        Fixture::Chest { id, items }
    }

    /// A loose item, with a fresh fixture id.
    pub fn new_loot(&mut self, item: Item) -> Fixture {
        let id = self.fresh_fixture_id();
        Fixture::Loot { id, item }
    }

    fn fresh_fixture_id(&mut self) -> FixtureId {
        let id = FixtureId(self.next_fixture);
        self.next_fixture += 1;
        id
    }

    /// Put a fixture on `pos`, taking it off whatever cell held it before.
    pub fn place_fixture(&mut self, pos: Point, fixture: Fixture) -> Result<(), ActionError> {
        if !self.cells.contains_key(&pos) {
            return Err(ActionError::NoSuchCell(pos));
        }
        let id = fixture.id();
        for cell in self.cells.values_mut() {
            cell.remove(id);
        }
        self.next_fixture = self.next_fixture.max(id.0 + 1);
        if let Some(cell) = self.cells.get_mut(&pos) {
            cell.add(fixture);
        }
        Ok(())
    }

    // -------------------------------------------------------------------
    // Unit mutations
    // -------------------------------------------------------------------

    /// Walk `path` as far as legal this turn.
    ///
    /// The path is cut at the first cell the unit cannot path through, then
    /// at its move range, then back to the last cell it can occupy. Returns
    /// the number of steps taken; zero steps is a no-op with no event.
    pub fn move_along(&mut self, id: UnitId, path: &[Point]) -> Result<usize, ActionError> {
        let idx = self.index_of(id)?;
        let route = {
            let view = UnitView::new(self, &self.units[idx]);
            let passable = path.iter().take_while(|&&p| view.can_path_through(p)).count();
            let limit = passable.min(view.move_range().max(0) as usize);
            match path[..limit].iter().rposition(|&p| view.can_occupy(p)) {
                Some(end) => path[..=end].to_vec(),
                None => Vec::new(),
            }
        };
        let Some(&to) = route.last() else {
            return Ok(0);
        };
        let from = self.units[idx].pos;
        self.units[idx].pos = to;
        let steps = route.len();
        log::debug!("{id} moves {from} -> {to}");
        self.events.push(FloorEvent::PathMove {
            unit: id,
            from_cell: from,
            path: route,
        });
        self.settle();
        Ok(steps)
    }

    /// Relocate without legality checks beyond the cell existing.
    pub fn teleport_to(&mut self, id: UnitId, to: Point) -> Result<(), ActionError> {
        let idx = self.index_of(id)?;
        if !self.cells.contains_key(&to) {
            return Err(ActionError::NoSuchCell(to));
        }
        self.relocate(idx, to);
        self.settle();
        Ok(())
    }

    fn relocate(&mut self, idx: usize, to: Point) {
        let unit = &mut self.units[idx];
        let from = unit.pos;
        unit.pos = to;
        self.events.push(FloorEvent::Teleport {
            unit: unit.id,
            from_cell: from,
            to_cell: to,
        });
    }

    /// Basic attack for the configured damage.
    pub fn attack(&mut self, id: UnitId, target: UnitId) -> Result<(), ActionError> {
        self.strike(id, target, self.config.combat.attack_damage)
    }

    /// Deal `damage` to `target`. The attack event precedes the health
    /// change; a target left at zero health or below is defeated.
    pub fn strike(&mut self, id: UnitId, target: UnitId, damage: i32) -> Result<(), ActionError> {
        self.index_of(id)?;
        let ti = self.index_of(target)?;
        self.events.push(FloorEvent::Attack {
            unit: id,
            target,
            damage,
        });
        self.units[ti].health -= damage;
        log::debug!("{id} hits {target} for {damage}, {} left", self.units[ti].health);
        if self.units[ti].health <= 0 {
            self.remove_defeated(ti, Some(id));
        }
        self.settle();
        Ok(())
    }

    /// Remove a unit from the floor for good.
    pub fn defeat(&mut self, id: UnitId, by: Option<UnitId>) -> Result<(), ActionError> {
        let idx = self.index_of(id)?;
        self.remove_defeated(idx, by);
        self.settle();
        Ok(())
    }

    fn remove_defeated(&mut self, idx: usize, by: Option<UnitId>) {
        let unit = self.units.remove(idx);
        log::debug!("{} ({}) is defeated", unit.peep.name, unit.id);
        self.events.push(FloorEvent::Defeated { unit: unit.id, by });
    }

    /// Mark the unit as done for this phase.
    pub fn end_move(&mut self, id: UnitId) -> Result<(), ActionError> {
        let idx = self.index_of(id)?;
        self.events.push(FloorEvent::EndMove { unit: id });
        self.units[idx].moved = true;
        self.settle();
        Ok(())
    }

    /// End the move of every unit of the acting team that has not moved yet.
    pub fn end_turn(&mut self) {
        let team = self.phase;
        let pending: Vec<UnitId> = self
            .team_units(team)
            .filter(|u| !u.moved)
            .map(Unit::id)
            .collect();
        for id in pending {
            if self.phase != team {
                break;
            }
            if let Err(e) = self.end_move(id) {
                log::debug!("skipping {id}: {e}");
            }
        }
    }

    /// Add an item to the unit's inventory.
    pub fn receive(&mut self, id: UnitId, item: Item) -> Result<(), ActionError> {
        let idx = self.index_of(id)?;
        self.give(idx, item);
        self.settle();
        Ok(())
    }

    fn give(&mut self, idx: usize, item: Item) {
        let unit = &mut self.units[idx];
        self.events.push(FloorEvent::PickupItem {
            unit: unit.id,
            item: item.clone(),
        });
        unit.inventory.push(item);
    }

    /// Open every chest on an adjacent cell and take its items.
    /// Returns the number of chests opened.
    pub fn open_nearby(&mut self, id: UnitId) -> Result<usize, ActionError> {
        let idx = self.index_of(id)?;
        let around: Vec<Point> = self.neighbors(self.units[idx].pos).collect();
        let mut opened = 0;
        for pos in around {
            let Some(cell) = self.cells.get_mut(&pos) else {
                continue;
            };
            for chest in cell.take_where(Fixture::is_chest) {
                let Fixture::Chest { items, .. } = chest else {
                    continue;
                };
                self.events.push(FloorEvent::OpenChest {
                    unit: id,
                    target_cell: pos,
                });
                opened += 1;
                for item in items {
                    self.give(idx, item);
                }
            }
        }
        self.settle();
        Ok(opened)
    }

    /// Pick up every loose item on the unit's own cell.
    pub fn pickup_below(&mut self, id: UnitId) -> Result<usize, ActionError> {
        let idx = self.index_of(id)?;
        let pos = self.units[idx].pos;
        let loot = match self.cells.get_mut(&pos) {
            Some(cell) => cell.take_where(|f| !f.is_chest()),
            None => Vec::new(),
        };
        let mut taken = 0;
        for fixture in loot {
            if let Fixture::Loot { item, .. } = fixture {
                self.give(idx, item);
                taken += 1;
            }
        }
        self.settle();
        Ok(taken)
    }

    /// Use the consumable in inventory `slot`.
    ///
    /// Returns `false`, consuming nothing, when the item has no effect.
    pub fn use_item(&mut self, id: UnitId, slot: usize) -> Result<bool, ActionError> {
        let idx = self.index_of(id)?;
        let effect = self.units[idx]
            .inventory
            .get(slot)
            .ok_or(ActionError::NoSuchItem { unit: id, slot })?
            .effect_id;
        let Some(effect) = effect else {
            return Ok(false);
        };
        let item = self.units[idx].inventory.remove(slot);
        self.events.push(FloorEvent::UseItem { unit: id, item });
        match effect {
            Effect::Healing => {
                let heal = self.config.combat.heal_amount;
                let unit = &mut self.units[idx];
                unit.health = (unit.health + heal).min(unit.max_health);
            }
            Effect::Teleport => {
                let from = self.units[idx].pos;
                let free: Vec<Point> = self
                    .cells
                    .keys()
                    .copied()
                    .filter(|&p| p != from && self.is_free(p))
                    .collect();
                if free.is_empty() {
                    log::debug!("{id} has nowhere to teleport");
                } else {
                    let to = free[self.rng.random_range(0..free.len())];
                    self.relocate(idx, to);
                }
            }
        }
        self.settle();
        Ok(true)
    }

    // -------------------------------------------------------------------
    // Watchers
    // -------------------------------------------------------------------

    /// Re-run every watcher after a mutation.
    fn settle(&mut self) {
        self.check_outcome();
        if self.advancing {
            return;
        }
        self.advancing = true;
        while self.phase_complete() {
            self.advance_phase();
            self.check_outcome();
        }
        self.advancing = false;
    }

    /// Sync the terminal latches with the current state without appending
    /// events, so a freshly built or loaded floor does not announce an
    /// outcome it started with.
    pub(crate) fn reset_watch(&mut self) {
        let (cleared, failed) = self.terminal_predicates();
        self.watch = Watch { cleared, failed };
    }

    fn terminal_predicates(&self) -> (bool, bool) {
        let any = !self.units.is_empty();
        (
            any && self.units.iter().all(|u| u.team == Team::Player),
            any && self.units.iter().all(|u| u.team == Team::Enemy),
        )
    }

    fn check_outcome(&mut self) {
        let (cleared, failed) = self.terminal_predicates();
        if cleared && !self.watch.cleared {
            log::info!("floor cleared");
            self.events.push(FloorEvent::FloorCleared);
        }
        if failed && !self.watch.failed {
            log::info!("floor failed");
            self.events.push(FloorEvent::FloorFailed);
        }
        self.watch = Watch { cleared, failed };
    }

    /// Every unit of the acting team has moved. A phase with no units passes
    /// straight to the other team while it has any, unless the AI drives that
    /// team: it would end its turn at once and hand the empty phase back.
    fn phase_complete(&self) -> bool {
        let mut acting = self.team_units(self.phase).peekable();
        if acting.peek().is_none() {
            let next = self.phase.opponent();
            let ai_next = self.ai.is_some_and(|ai| ai.team() == next);
            return !ai_next && self.team_units(next).next().is_some();
        }
        acting.all(|u| u.moved)
    }

    fn advance_phase(&mut self) {
        let ending = self.phase;
        let next = ending.opponent();
        self.events.push(FloorEvent::EndPhase { team: ending });
        self.events.push(FloorEvent::StartPhase { team: next });
        self.phase = next;
        for unit in self.units.iter_mut().filter(|u| u.team == next) {
            unit.moved = false;
        }
        log::debug!("phase {ending} -> {next}");
        if let Some(ai) = self.ai.filter(|ai| ai.team() == next) {
            ai.take_turn(self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventCursor;
    use crate::test_util::*;

    fn kinds(floor: &Floor) -> Vec<&'static str> {
        floor
            .events()
            .iter()
            .map(|e| match e {
                FloorEvent::PathMove { .. } => "pathMove",
                FloorEvent::Teleport { .. } => "teleport",
                FloorEvent::Attack { .. } => "attack",
                FloorEvent::EndMove { .. } => "endMove",
                FloorEvent::StartPhase { .. } => "startPhase",
                FloorEvent::EndPhase { .. } => "endPhase",
                FloorEvent::Defeated { .. } => "defeated",
                FloorEvent::OpenChest { .. } => "openChest",
                FloorEvent::PickupItem { .. } => "pickupItem",
                FloorEvent::UseItem { .. } => "useItem",
                FloorEvent::FloorCleared => "floorCleared",
                FloorEvent::FloorFailed => "floorFailed",
            })
            .collect()
    }

    #[test]
    fn test_line_of_sight() {
        // . . # .
        // . . . .
        let f = floor_from(&["..#.", "...."]);
        assert_eq!(
            f.line_of_sight(Point::new(0, 1), Point::new(3, 1)),
            Some(vec![Point::new(1, 1), Point::new(2, 1)])
        );
        assert_eq!(f.line_of_sight(Point::new(0, 0), Point::new(3, 0)), None);
        assert_eq!(f.line_of_sight(Point::new(0, 0), Point::new(1, 0)), Some(vec![]));
        // Endpoints may be walls; only intervening cells matter.
        assert_eq!(f.line_of_sight(Point::new(1, 0), Point::new(2, 0)), Some(vec![]));
        // Missing cells block.
        assert_eq!(f.line_of_sight(Point::new(0, 0), Point::new(6, 0)), None);
    }

    #[test]
    fn test_neighbors_stay_in_bounds() {
        let f = floor_from(&["..", ".."]);
        let n: Vec<Point> = f.neighbors(Point::new(0, 0)).collect();
        assert_eq!(n, vec![Point::new(1, 0), Point::new(0, 1)]);
        assert_eq!(f.bounds(), Range::new(0, 0, 2, 2));
    }

    #[test]
    fn test_move_along_truncates_at_wall() {
        // Five-cell path with a wall on the fourth cell, range 3.
        let mut f = floor_from(&["....#."]);
        let a = spawn_with(&mut f, Team::Player, (0, 0), 3);
        spawn(&mut f, Team::Enemy, (5, 0));
        let path: Vec<Point> = (1..=5).map(|x| Point::new(x, 0)).collect();
        assert_eq!(f.move_along(a, &path), Ok(3));
        assert_eq!(f.unit(a).unwrap().pos(), Point::new(3, 0));
        match f.events().iter().last() {
            Some(FloorEvent::PathMove {
                unit,
                from_cell,
                path,
            }) => {
                assert_eq!(*unit, a);
                assert_eq!(*from_cell, Point::new(0, 0));
                assert_eq!(path.len(), 3);
                assert_eq!(path.last(), Some(&Point::new(3, 0)));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_move_along_stops_before_wall() {
        let mut f = floor_from(&["..#..."]);
        let a = spawn_with(&mut f, Team::Player, (0, 0), 4);
        spawn(&mut f, Team::Enemy, (5, 0));
        let path: Vec<Point> = (1..=5).map(|x| Point::new(x, 0)).collect();
        assert_eq!(f.move_along(a, &path), Ok(1));
        assert_eq!(f.unit(a).unwrap().pos(), Point::new(1, 0));
    }

    #[test]
    fn test_move_along_truncates_at_range() {
        let mut f = floor_from(&["......"]);
        let a = spawn_with(&mut f, Team::Player, (0, 0), 3);
        spawn(&mut f, Team::Enemy, (5, 0));
        let path: Vec<Point> = (1..=4).map(|x| Point::new(x, 0)).collect();
        assert_eq!(f.move_along(a, &path), Ok(3));
        assert_eq!(f.unit(a).unwrap().pos(), Point::new(3, 0));
    }

    #[test]
    fn test_move_along_backs_off_occupied_end() {
        // The last in-range cell holds an ally: stop one short.
        let mut f = floor_from(&["....."]);
        let a = spawn_with(&mut f, Team::Player, (0, 0), 3);
        spawn(&mut f, Team::Player, (3, 0));
        spawn(&mut f, Team::Enemy, (4, 0));
        let path: Vec<Point> = (1..=3).map(|x| Point::new(x, 0)).collect();
        assert_eq!(f.move_along(a, &path), Ok(2));
        assert_eq!(f.unit(a).unwrap().pos(), Point::new(2, 0));
    }

    #[test]
    fn test_move_along_empty_is_noop() {
        let mut f = floor_from(&[".#."]);
        let a = spawn(&mut f, Team::Player, (0, 0));
        spawn(&mut f, Team::Enemy, (2, 0));
        let before = f.events().len();
        assert_eq!(f.move_along(a, &[]), Ok(0));
        assert_eq!(f.move_along(a, &[Point::new(1, 0)]), Ok(0));
        assert_eq!(f.events().len(), before);
        assert_eq!(f.unit(a).unwrap().pos(), Point::new(0, 0));
    }

    #[test]
    fn test_attack_then_defeat_order() {
        let mut f = floor_from(&["...."]);
        let a = spawn(&mut f, Team::Player, (0, 0));
        let b = spawn(&mut f, Team::Enemy, (1, 0));
        let c = spawn(&mut f, Team::Enemy, (3, 0));
        f.units.iter_mut().find(|u| u.id == b).unwrap().health = 3;
        f.attack(a, b).unwrap();
        assert_eq!(
            f.events().as_slice(),
            &[
                FloorEvent::Attack {
                    unit: a,
                    target: b,
                    damage: 4
                },
                FloorEvent::Defeated {
                    unit: b,
                    by: Some(a)
                },
            ]
        );
        assert!(f.unit(b).is_none());
        assert!(f.unit(c).is_some());
        assert_eq!(f.attack(a, b), Err(ActionError::UnknownUnit(b)));
    }

    #[test]
    fn test_attack_survivable() {
        let mut f = floor_from(&[".."]);
        let a = spawn(&mut f, Team::Player, (0, 0));
        let b = spawn(&mut f, Team::Enemy, (1, 0));
        f.attack(a, b).unwrap();
        assert_eq!(f.unit(b).unwrap().health(), 6);
        assert_eq!(kinds(&f), vec!["attack"]);
    }

    #[test]
    fn test_phase_auto_advance_without_ai() {
        let mut f = floor_from(&["....", "...."]);
        f.set_ai(None);
        let p1 = spawn(&mut f, Team::Player, (0, 0));
        let p2 = spawn(&mut f, Team::Player, (0, 1));
        let e1 = spawn(&mut f, Team::Enemy, (3, 0));
        spawn(&mut f, Team::Enemy, (3, 1));
        f.end_move(p2).unwrap();
        assert_eq!(f.phase(), Team::Player);
        f.end_move(p1).unwrap();
        assert_eq!(f.phase(), Team::Enemy);
        assert_eq!(
            kinds(&f),
            vec!["endMove", "endMove", "endPhase", "startPhase"]
        );
        assert_eq!(
            f.events().get(3),
            Some(&FloorEvent::StartPhase { team: Team::Enemy })
        );
        assert!(f.team_units(Team::Enemy).all(|u| !u.moved()));

        // Nothing more happens until the enemies act.
        f.end_move(e1).unwrap();
        assert_eq!(f.phase(), Team::Enemy);
        f.end_turn();
        assert_eq!(f.phase(), Team::Player);
        assert!(f.team_units(Team::Player).all(|u| !u.moved()));
    }

    #[test]
    fn test_phase_round_trip_with_ai() {
        let mut f = floor_from(&["......", "......"]);
        let p1 = spawn(&mut f, Team::Player, (0, 0));
        let p2 = spawn(&mut f, Team::Player, (0, 1));
        spawn(&mut f, Team::Enemy, (5, 0));
        spawn(&mut f, Team::Enemy, (5, 1));
        f.end_move(p1).unwrap();
        f.end_move(p2).unwrap();
        let k = kinds(&f);
        let start_enemy = f
            .events()
            .iter()
            .position(|e| *e == FloorEvent::StartPhase { team: Team::Enemy })
            .unwrap();
        assert_eq!(start_enemy, 3);
        assert_eq!(&k[..2], &["endMove", "endMove"]);
        // The AI moved and ended both enemies, handing control back.
        assert_eq!(f.phase(), Team::Player);
        assert_eq!(
            f.events().iter().last(),
            Some(&FloorEvent::StartPhase { team: Team::Player })
        );
        let enemy_ends = f.events().as_slice()[start_enemy..]
            .iter()
            .filter(|e| matches!(e, FloorEvent::EndMove { .. }))
            .count();
        assert_eq!(enemy_ends, 2);
    }

    #[test]
    fn test_end_turn_ends_pending_units() {
        let mut f = floor_from(&["....."]);
        f.set_ai(None);
        let p1 = spawn(&mut f, Team::Player, (0, 0));
        spawn(&mut f, Team::Player, (1, 0));
        spawn(&mut f, Team::Enemy, (4, 0));
        f.end_move(p1).unwrap();
        f.end_turn();
        assert_eq!(f.phase(), Team::Enemy);
        assert_eq!(
            kinds(&f),
            vec!["endMove", "endMove", "endPhase", "startPhase"]
        );
    }

    #[test]
    fn test_victory_fires_once() {
        let mut f = floor_from(&["....."]);
        let a = spawn(&mut f, Team::Player, (0, 0));
        let b = spawn(&mut f, Team::Enemy, (1, 0));
        f.defeat(b, Some(a)).unwrap();
        assert_eq!(f.outcome(), Some(Outcome::Cleared));
        f.move_along(a, &[Point::new(1, 0)]).unwrap();
        f.receive(a, Item::sword()).unwrap();
        f.end_turn();
        f.end_turn();
        let cleared = f
            .events()
            .iter()
            .filter(|e| **e == FloorEvent::FloorCleared)
            .count();
        assert_eq!(cleared, 1);
        // Defeat precedes the announcement.
        let k = kinds(&f);
        assert_eq!(&k[..2], &["defeated", "floorCleared"]);
    }

    #[test]
    fn test_defeat_fires_once() {
        let mut f = floor_from(&["...."]);
        let p = spawn(&mut f, Team::Player, (0, 0));
        let e = spawn(&mut f, Team::Enemy, (1, 0));
        f.strike(e, p, 100).unwrap();
        assert_eq!(f.outcome(), Some(Outcome::Failed));
        f.end_turn();
        f.move_along(e, &[Point::new(2, 0)]).unwrap();
        let failed = f
            .events()
            .iter()
            .filter(|ev| **ev == FloorEvent::FloorFailed)
            .count();
        assert_eq!(failed, 1);
    }

    #[test]
    fn test_outcome_refires_after_new_edge() {
        let mut f = floor_from(&["....."]);
        let a = spawn(&mut f, Team::Player, (0, 0));
        let b = spawn(&mut f, Team::Enemy, (4, 0));
        f.defeat(b, None).unwrap();
        let reinforcement = f
            .spawn_unit(Peep::monster("bat", 1), Team::Enemy, Some(Point::new(4, 0)))
            .unwrap();
        assert_eq!(f.outcome(), None);
        f.strike(a, reinforcement, 99).unwrap();
        let cleared = f
            .events()
            .iter()
            .filter(|e| **e == FloorEvent::FloorCleared)
            .count();
        assert_eq!(cleared, 2);
    }

    #[test]
    fn test_chests_and_loot() {
        let mut f = floor_from(&["...", "..."]);
        let a = spawn(&mut f, Team::Player, (0, 0));
        spawn(&mut f, Team::Enemy, (2, 1));
        let chest = f.new_chest(vec![Item::healing_potion(), Item::sword()]);
        let chest_id = chest.id();
        f.place_fixture(Point::new(1, 0), chest).unwrap();
        let loot = f.new_loot(Item::teleport_scroll());
        f.place_fixture(Point::new(0, 0), loot).unwrap();

        assert_eq!(f.pickup_below(a), Ok(1));
        assert_eq!(f.open_nearby(a), Ok(1));
        assert_eq!(f.find_fixture(chest_id), None);
        assert_eq!(f.open_nearby(a), Ok(0));
        assert_eq!(
            kinds(&f),
            vec!["pickupItem", "openChest", "pickupItem", "pickupItem"]
        );
        let names: Vec<&str> = f
            .unit(a)
            .unwrap()
            .inventory()
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(names, vec!["teleport-scroll", "healing-potion", "sword"]);
    }

    #[test]
    fn test_fixture_has_one_location() {
        let mut f = floor_from(&["..."]);
        let loot = f.new_loot(Item::sword());
        let id = loot.id();
        f.place_fixture(Point::new(0, 0), loot.clone()).unwrap();
        f.place_fixture(Point::new(2, 0), loot).unwrap();
        assert!(f.cell(Point::new(0, 0)).unwrap().contents().is_empty());
        assert_eq!(f.find_fixture(id), Some(Point::new(2, 0)));
        let placed = f.cell(Point::new(2, 0)).unwrap().contents()[0].clone();
        assert_eq!(
            f.place_fixture(Point::new(7, 7), placed),
            Err(ActionError::NoSuchCell(Point::new(7, 7)))
        );
        assert_eq!(f.find_fixture(id), Some(Point::new(2, 0)));
    }

    #[test]
    fn test_use_items() {
        let mut f = floor_from(&["....", "...."]);
        let a = spawn(&mut f, Team::Player, (0, 0));
        spawn(&mut f, Team::Enemy, (3, 1));
        f.units[0].health = 2;
        f.receive(a, Item::sword()).unwrap();
        f.receive(a, Item::healing_potion()).unwrap();
        f.receive(a, Item::teleport_scroll()).unwrap();

        assert_eq!(f.use_item(a, 0), Ok(false), "swords do nothing");
        assert_eq!(f.use_item(a, 1), Ok(true));
        assert_eq!(f.unit(a).unwrap().health(), 7);
        assert_eq!(f.use_item(a, 1), Ok(true));
        let u = f.unit(a).unwrap();
        assert_ne!(u.pos(), Point::new(0, 0));
        assert_ne!(u.pos(), Point::new(3, 1));
        assert_eq!(u.inventory().len(), 1);
        assert_eq!(
            f.use_item(a, 5),
            Err(ActionError::NoSuchItem { unit: a, slot: 5 })
        );
        assert!(matches!(
            f.events().iter().last(),
            Some(FloorEvent::Teleport { .. })
        ));
    }

    #[test]
    fn test_healing_caps_at_max() {
        let mut f = floor_from(&[".."]);
        let a = spawn(&mut f, Team::Player, (0, 0));
        spawn(&mut f, Team::Enemy, (1, 0));
        f.units[0].health = 9;
        f.receive(a, Item::healing_potion()).unwrap();
        f.use_item(a, 0).unwrap();
        assert_eq!(f.unit(a).unwrap().health(), 10);
    }

    #[test]
    fn test_teleport_to() {
        let mut f = floor_from(&["..."]);
        let a = spawn(&mut f, Team::Player, (0, 0));
        spawn(&mut f, Team::Enemy, (1, 0));
        f.teleport_to(a, Point::new(2, 0)).unwrap();
        assert_eq!(f.unit(a).unwrap().pos(), Point::new(2, 0));
        assert_eq!(
            f.events().as_slice(),
            &[FloorEvent::Teleport {
                unit: a,
                from_cell: Point::new(0, 0),
                to_cell: Point::new(2, 0)
            }]
        );
        assert_eq!(
            f.teleport_to(a, Point::new(0, 5)),
            Err(ActionError::NoSuchCell(Point::new(0, 5)))
        );
    }

    #[test]
    fn test_spawn_unit_placement() {
        let mut f = floor_from(&["#..", "..."]);
        let a = f
            .place_unit(Peep::new("k", "Kay", "knight"), Team::Player, None)
            .unwrap();
        let u = f.unit(a).unwrap();
        assert_eq!(u.pos(), Point::new(1, 0));
        assert_eq!(u.max_health(), 12);
        assert_eq!(u.move_range(), 3);
        assert_eq!(
            f.place_unit(Peep::default(), Team::Enemy, Some(Point::new(0, 0))),
            Err(ActionError::CellUnavailable(Point::new(0, 0)))
        );
        assert_eq!(
            f.place_unit(Peep::default(), Team::Enemy, Some(Point::new(1, 0))),
            Err(ActionError::CellUnavailable(Point::new(1, 0)))
        );
        assert_eq!(
            f.place_unit(Peep::default(), Team::Enemy, Some(Point::new(5, 0))),
            Err(ActionError::NoSuchCell(Point::new(5, 0)))
        );
    }

    #[test]
    fn test_consumer_sees_causal_order() {
        let mut f = floor_from(&["....", "...."]);
        f.set_ai(None);
        let p = spawn(&mut f, Team::Player, (0, 0));
        let e1 = spawn(&mut f, Team::Enemy, (1, 0));
        spawn(&mut f, Team::Enemy, (3, 1));
        f.units.iter_mut().find(|u| u.id == e1).unwrap().health = 1;

        let mut cursor = EventCursor::new();
        f.attack(p, e1).unwrap();
        f.end_move(p).unwrap();
        let mut drained = Vec::new();
        while let Some(e) = cursor.next(f.events()) {
            drained.push(e.clone());
        }
        assert_eq!(drained.len(), 5);
        assert!(matches!(drained[0], FloorEvent::Attack { .. }));
        assert!(matches!(drained[1], FloorEvent::Defeated { .. }));
        assert!(matches!(drained[2], FloorEvent::EndMove { .. }));
        assert_eq!(drained[3], FloorEvent::EndPhase { team: Team::Player });
        assert_eq!(drained[4], FloorEvent::StartPhase { team: Team::Enemy });
        assert_eq!(cursor.pending(f.events()), 0);
    }

    #[test]
    fn test_empty_enemy_phase_passes_through() {
        let mut f = floor_from(&["...."]);
        let p = spawn(&mut f, Team::Player, (0, 0));
        let e = spawn(&mut f, Team::Enemy, (1, 0));
        f.defeat(e, Some(p)).unwrap();
        f.end_move(p).unwrap();
        assert_eq!(f.phase(), Team::Player);
        assert!(!f.unit(p).unwrap().moved());
        assert_eq!(
            kinds(&f),
            vec![
                "defeated",
                "floorCleared",
                "endMove",
                "endPhase",
                "startPhase",
                "endPhase",
                "startPhase"
            ]
        );
    }

    #[test]
    fn test_defeat_that_completes_a_phase_is_logged_first() {
        let mut f = floor_from(&["....", "...."]);
        f.set_ai(None);
        let p = spawn(&mut f, Team::Player, (0, 0));
        let e1 = spawn(&mut f, Team::Enemy, (1, 0));
        let e2 = spawn(&mut f, Team::Enemy, (3, 1));
        f.end_move(p).unwrap();
        f.end_move(e2).unwrap();
        assert_eq!(f.phase(), Team::Enemy);

        let mut cursor = EventCursor::new();
        while cursor.next(f.events()).is_some() {}
        f.strike(p, e1, 99).unwrap();
        let mut drained = Vec::new();
        while let Some(e) = cursor.next(f.events()) {
            drained.push(e.clone());
        }
        assert_eq!(drained.len(), 4);
        assert!(matches!(drained[0], FloorEvent::Attack { .. }));
        assert!(matches!(drained[1], FloorEvent::Defeated { .. }));
        assert_eq!(drained[2], FloorEvent::EndPhase { team: Team::Enemy });
        assert_eq!(drained[3], FloorEvent::StartPhase { team: Team::Player });
        assert_eq!(f.phase(), Team::Player);
        assert!(!f.unit(p).unwrap().moved());
    }

    #[test]
    fn test_enemy_kill_precedes_phase_change() {
        let mut f = floor_from(&["....", "...."]);
        let p1 = spawn(&mut f, Team::Player, (0, 0));
        let p2 = spawn(&mut f, Team::Player, (2, 1));
        spawn(&mut f, Team::Enemy, (3, 1));
        f.units.iter_mut().find(|u| u.id == p2).unwrap().health = 1;
        f.end_move(p1).unwrap();
        f.end_move(p2).unwrap();

        assert!(f.unit(p2).is_none());
        assert_eq!(f.phase(), Team::Player);
        assert_eq!(f.outcome(), None);
        let k = kinds(&f);
        assert_eq!(
            &k[k.len() - 5..],
            &["attack", "defeated", "endMove", "endPhase", "startPhase"]
        );
        assert_eq!(
            f.events().iter().last(),
            Some(&FloorEvent::StartPhase { team: Team::Player })
        );
    }

    #[test]
    fn test_cleared_enemy_phase_hands_back_without_ai() {
        let mut f = floor_from(&["...."]);
        f.set_ai(None);
        let p = spawn(&mut f, Team::Player, (0, 0));
        let e = spawn(&mut f, Team::Enemy, (1, 0));
        f.end_move(p).unwrap();
        assert_eq!(f.phase(), Team::Enemy);
        f.strike(p, e, 99).unwrap();
        assert_eq!(f.phase(), Team::Player);
        assert!(!f.unit(p).unwrap().moved());
        let k = kinds(&f);
        assert_eq!(
            &k[k.len() - 5..],
            &["attack", "defeated", "floorCleared", "endPhase", "startPhase"]
        );
    }

    #[test]
    fn test_empty_player_phase_stays_under_enemy_ai() {
        let mut f = floor_from(&["...."]);
        let p = spawn(&mut f, Team::Player, (0, 0));
        let e = spawn(&mut f, Team::Enemy, (1, 0));
        f.strike(e, p, 99).unwrap();
        assert_eq!(f.phase(), Team::Player);
        assert_eq!(kinds(&f), vec!["attack", "defeated", "floorFailed"]);
    }

    #[test]
    fn test_seed_rng_is_stable() {
        use rand::RngExt;
        let a: u64 = seed_rng("abc").random();
        let b: u64 = seed_rng("abc").random();
        let c: u64 = seed_rng("abd").random();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
