use tracing::debug;

use super::context::TurnContext;
use super::stage::TurnStage;
use crate::error::SimResult;
use crate::model::{Arrears, Dues, LevyDemand, OneShot, UnrestSource};

/// Interest on outstanding arrears and this turn's dues to the liege.
pub struct Obligations;

fn interest_on(amount: i64, rate: f64) -> i64 {
    if amount <= 0 {
        return 0;
    }
    (amount as f64 * rate).ceil() as i64
}

impl TurnStage for Obligations {
    fn name(&self) -> &'static str {
        "obligations"
    }

    fn run(&self, ctx: &mut TurnContext) -> SimResult<()> {
        let balance = ctx.balance;
        let cfg = &balance.obligations;
        let turn = ctx.world.turn;
        let before = ctx.world.estate.arrears;
        ctx.report.obligations.arrears_before = before;

        if !before.is_clear() {
            let interest = Arrears {
                coin: interest_on(before.coin, cfg.arrears_interest),
                bushels: interest_on(before.bushels, cfg.arrears_interest),
            };
            let arrears = &mut ctx.world.estate.arrears;
            arrears.coin += interest.coin;
            arrears.bushels += interest.bushels;
            ctx.report.obligations.interest = interest;
            ctx.add_unrest(UnrestSource::Arrears, cfg.arrears_unrest);
        }

        let mut coin = cfg.base_coin_due;
        if ctx.world.flags.take_one_shot(OneShot::LiegeLeniency) {
            coin /= 2;
        }
        let interval = cfg.war_levy_interval.max(1);
        let war_levy = (turn % interval == interval - 1).then_some(LevyDemand {
            men: cfg.war_levy_men,
            coin: cfg.war_levy_coin,
        });
        let dues = Dues {
            coin,
            bushels: (f64::from(ctx.world.estate.population) * cfg.bushels_due_per_head).floor()
                as i64,
            war_levy,
        };
        ctx.world.estate.dues = dues;
        ctx.report.obligations.due = dues;
        debug!(arrears = before.total(), levy = war_levy.is_some(), "obligations");
        Ok(())
    }
}
