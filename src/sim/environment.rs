use tracing::debug;

use super::context::TurnContext;
use super::stage::TurnStage;
use crate::error::SimResult;
use crate::model::{WeatherKind, WeatherReport};
use crate::rng::Channel;

/// Cooldowns tick, stores spoil, weather and market prices are rolled.
pub struct Environment;

impl TurnStage for Environment {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn run(&self, ctx: &mut TurnContext) -> SimResult<()> {
        let balance = ctx.balance;
        let economy = &balance.economy;
        ctx.world.flags.tick_cooldowns();

        let guard = ctx.content.built_effects(&ctx.world.estate).spoilage_guard;
        let estate = &mut ctx.world.estate;
        let spoilage = (estate.bushels.max(0) as f64 * economy.spoilage_rate * (1.0 - guard))
            .floor() as i64;
        estate.bushels -= spoilage;
        ctx.report.consumption.spoilage = spoilage;

        let weights: Vec<f64> = WeatherKind::ALL.iter().map(|w| w.weight()).collect();
        let kind = ctx
            .stream(Channel::Weather)
            .pick_weighted(&weights)
            .map(|i| WeatherKind::ALL[i])
            .unwrap_or(WeatherKind::Fair);
        ctx.report.weather = WeatherReport {
            kind,
            multiplier: kind.multiplier(),
        };

        let mut market = ctx.stream(Channel::Market);
        let price = economy.price_min + market.unit() * (economy.price_max - economy.price_min);
        let bushels = ctx.world.estate.bushels.max(0);
        let sell_cap = ((bushels as f64 * economy.sell_cap_fraction).floor() as i64)
            .min(i64::from(economy.market_depth));
        ctx.report.market.price = price;
        ctx.report.market.sell_cap = sell_cap;

        debug!(spoilage, weather = %kind, price, "environment");
        Ok(())
    }
}
