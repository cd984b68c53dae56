//! Greedy enemy policy: finish off the weakest visible target, otherwise
//! close the distance.

use tactica_core::Point;

use crate::floor::Floor;
use crate::unit::{Team, UnitId};

/// Stateless policy driving every unit of one team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ai {
    team: Team,
}

/// What a unit decided to do with its turn.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Plan {
    Attack { path: Vec<Point>, target: UnitId },
    Advance(Vec<Point>),
    Hold,
}

impl Ai {
    pub fn new(team: Team) -> Self {
        Self { team }
    }

    pub fn team(self) -> Team {
        self.team
    }

    /// Act with every unit of the team that has not moved yet, in spawn order.
    pub fn take_turn(self, floor: &mut Floor) {
        let pending: Vec<UnitId> = floor
            .team_units(self.team)
            .filter(|u| !u.moved())
            .map(|u| u.id())
            .collect();
        log::debug!("{} AI acting with {} units", self.team, pending.len());
        for id in pending {
            // Earlier units may have been defeated by now.
            if floor.unit(id).is_some() {
                self.act(floor, id);
            }
        }
    }

    /// Move, maybe attack, and always end the unit's move.
    pub fn act(self, floor: &mut Floor, id: UnitId) {
        match self.plan(floor, id) {
            Plan::Attack { path, target } => {
                log::debug!("{id} goes for {target}");
                if let Err(e) = floor.move_along(id, &path) {
                    log::debug!("{id} could not move: {e}");
                }
                let in_reach = floor.unit(id).is_some_and(|u| {
                    floor
                        .view(u.id())
                        .is_some_and(|v| v.can_attack_from(u.pos(), target))
                });
                if in_reach {
                    if let Err(e) = floor.attack(id, target) {
                        log::debug!("{id} could not attack: {e}");
                    }
                }
            }
            Plan::Advance(path) => {
                log::debug!("{id} advances {} steps", path.len());
                if let Err(e) = floor.move_along(id, &path) {
                    log::debug!("{id} could not move: {e}");
                }
            }
            Plan::Hold => log::debug!("{id} holds"),
        }
        if floor.unit(id).is_none() {
            return;
        }
        if let Err(e) = floor.end_move(id) {
            log::debug!("{id} could not end its move: {e}");
        }
    }

    fn plan(self, floor: &Floor, id: UnitId) -> Plan {
        let Some(view) = floor.view(id) else {
            return Plan::Hold;
        };
        let mut targets = view.visible_enemies();
        targets.sort_by_key(|u| u.health());
        for target in targets {
            if let Some(path) = view.get_path_to_attack_this_turn(target.id()) {
                return Plan::Attack {
                    path,
                    target: target.id(),
                };
            }
        }
        match view.path_towards_attack_position() {
            Some(path) => Plan::Advance(path),
            None => Plan::Hold,
        }
    }
}
