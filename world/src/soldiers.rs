//! Authoritative soldier collection and its per-tick advancement.

use log::debug;
use skirmish_core::{
    Event, Health, Path, Position, RetirementReason, SoldierId, SoldierSnapshot, Team,
};

/// Live soldier walking a shared route.
#[derive(Clone, Debug)]
pub(crate) struct Soldier {
    pub(crate) id: SoldierId,
    pub(crate) team: Team,
    pub(crate) position: Position,
    pub(crate) route: Path,
    pub(crate) progress: f32,
    pub(crate) health: Health,
}

impl Soldier {
    pub(crate) fn snapshot(&self) -> SoldierSnapshot {
        SoldierSnapshot {
            id: self.id,
            team: self.team,
            position: self.position,
            progress: self.progress,
            health: self.health,
            route: self.route.clone(),
        }
    }
}

/// Soldiers ordered by identifier, plus the identifier allocator.
#[derive(Debug, Default)]
pub(crate) struct SoldierRoster {
    soldiers: Vec<Soldier>,
    next_id: u32,
}

impl SoldierRoster {
    /// Adds a soldier at the first waypoint of `route`.
    ///
    /// Callers guarantee that `route` is not empty.
    pub(crate) fn spawn(&mut self, team: Team, route: Path, health: Health) -> Option<&Soldier> {
        let start = route.first()?;
        let id = SoldierId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.soldiers.push(Soldier {
            id,
            team,
            position: Position::from(start),
            route,
            progress: 0.0,
            health,
        });
        self.soldiers.last()
    }

    /// Moves every soldier `step` further along its route.
    ///
    /// Soldiers whose cursor reaches the final waypoint are consumed on
    /// arrival and leave the roster in the same pass, as do soldiers whose
    /// health already ran out.
    pub(crate) fn advance(&mut self, step: f32, out_events: &mut Vec<Event>) {
        self.soldiers.retain_mut(|soldier| {
            if soldier.health.is_depleted() {
                retire(soldier, RetirementReason::Defeated, out_events);
                return false;
            }

            soldier.progress += step;
            match soldier.route.position_at(soldier.progress) {
                Some(position) => {
                    soldier.position = position;
                    out_events.push(Event::SoldierAdvanced {
                        soldier: soldier.id,
                        position,
                    });
                    true
                }
                None => {
                    if let Some(last) = soldier.route.last() {
                        soldier.position = Position::from(last);
                    }
                    soldier.health = Health::ZERO;
                    retire(soldier, RetirementReason::Arrived, out_events);
                    false
                }
            }
        });
    }

    /// Applies damage, retiring the soldier when no health remains.
    pub(crate) fn damage(&mut self, id: SoldierId, amount: u32, out_events: &mut Vec<Event>) {
        let Some(index) = self.soldiers.iter().position(|soldier| soldier.id == id) else {
            debug!("ignoring damage for unknown soldier {}", id.get());
            return;
        };

        let soldier = &mut self.soldiers[index];
        soldier.health = soldier.health.saturating_sub(amount);
        if soldier.health.is_depleted() {
            let soldier = self.soldiers.remove(index);
            retire(&soldier, RetirementReason::Defeated, out_events);
        } else {
            out_events.push(Event::SoldierDamaged {
                soldier: soldier.id,
                health: soldier.health,
            });
        }
    }

    pub(crate) fn clear(&mut self) {
        self.soldiers.clear();
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Soldier> {
        self.soldiers.iter()
    }
}

fn retire(soldier: &Soldier, reason: RetirementReason, out_events: &mut Vec<Event>) {
    debug!(
        "{} soldier {} retired ({reason:?}) at progress {}",
        soldier.team,
        soldier.id.get(),
        soldier.progress
    );
    out_events.push(Event::SoldierRetired {
        soldier: soldier.id,
        team: soldier.team,
        reason,
    });
}
