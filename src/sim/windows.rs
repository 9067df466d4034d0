use tracing::debug;

use super::context::TurnContext;
use super::stage::TurnStage;
use crate::error::SimResult;
use crate::marriage;
use crate::prospects;
use crate::rng::Channel;

/// Reservation sweep, offer expiry and generation, then the marriage and
/// prospects windows.
pub struct Windows;

impl TurnStage for Windows {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn run(&self, ctx: &mut TurnContext) -> SimResult<()> {
        let turn = ctx.world.turn;
        let swept = ctx.world.reservations.gc(turn)?;
        if ctx.world.is_over() {
            return Ok(());
        }

        let mut log = Vec::new();
        for id in prospects::expire(ctx.world) {
            log.push(format!("{id} expired"));
        }
        let arrears = ctx.report.obligations.arrears_before;
        let stream = ctx.stream(Channel::Prospects);
        for id in prospects::generate(ctx.world, ctx.balance, arrears, &stream)? {
            log.push(format!("{id} offered"));
        }

        ctx.report.marriage_window = marriage::build_window(ctx.world, ctx.balance)?;
        ctx.report.prospects_window = Some(prospects::build_window(ctx.world, log));
        debug!(
            swept = swept.len(),
            active = ctx.world.prospects.active.len(),
            "windows"
        );
        Ok(())
    }
}
