use serde::{Deserialize, Serialize};

use super::decisions::Decisions;
use super::estate::Estate;
use super::flags::TuningFlags;
use super::house::House;
use super::prospect::ProspectId;
use super::report::TurnReport;
use super::world::{GameOver, WorldState};

/// Bounded view of the world for the turn log. Never contains the log
/// itself, so entries do not nest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub turn: u32,
    pub estate: Estate,
    pub flags: TuningFlags,
    pub player_house: Option<House>,
    pub living_persons: usize,
    pub active_prospects: Vec<ProspectId>,
    pub game_over: Option<GameOver>,
}

impl StateSnapshot {
    pub fn capture(world: &WorldState) -> Self {
        Self {
            turn: world.turn,
            estate: world.estate.clone(),
            flags: world.flags.clone(),
            player_house: world.houses.get(&world.player_house).cloned(),
            living_persons: world.persons.values().filter(|p| p.alive).count(),
            active_prospects: world.prospects.active.iter().map(|p| p.id.clone()).collect(),
            game_over: world.game_over,
        }
    }
}

/// Immutable record of one committed turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnLogEntry {
    pub turn: u32,
    pub decisions: Decisions,
    pub report: TurnReport,
    pub before: StateSnapshot,
    pub after: StateSnapshot,
}
