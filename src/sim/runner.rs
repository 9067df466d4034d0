use tracing::info;

use super::engine::TurnEngine;
use crate::error::SimResult;
use crate::model::{Decisions, TurnReport, WorldState};

/// Commit one turn per entry of `decisions`, stopping early when the run
/// ends. Returns the committed reports in order.
pub fn run_turns(
    world: &mut WorldState,
    engine: &TurnEngine,
    decisions: &[Decisions],
) -> SimResult<Vec<TurnReport>> {
    let mut reports = Vec::with_capacity(decisions.len());
    for turn_decisions in decisions {
        if world.is_over() {
            info!(turn = world.turn, "run ended early");
            break;
        }
        reports.push(engine.commit(world, turn_decisions)?);
    }
    Ok(reports)
}
