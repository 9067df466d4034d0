use tracing::debug;

use super::context::TurnContext;
use super::stage::TurnStage;
use super::summary::current_roles;
use crate::error::SimResult;
use crate::household;
use crate::kinship;

/// Opens the turn: fresh action budget, household registry in sync, a dead
/// head replaced, heirs designated, starting roles recorded.
pub struct Upkeep;

impl TurnStage for Upkeep {
    fn name(&self) -> &'static str {
        "upkeep"
    }

    fn run(&self, ctx: &mut TurnContext) -> SimResult<()> {
        ctx.world.estate.actions_remaining = ctx.balance.calendar.actions_per_turn;
        let added = kinship::sync_household(ctx.world)?;
        let house = ctx.world.player_house;
        let (_, events) = household::resolve_succession(ctx.world, house)?;
        ctx.report.life_events.extend(events);
        household::recompute_heirs(ctx.world)?;

        ctx.start_roles = current_roles(ctx.world)?;
        ctx.report.unrest_before = ctx.world.estate.unrest;
        debug!(edges_added = added, members = ctx.start_roles.len(), "upkeep");
        Ok(())
    }
}
