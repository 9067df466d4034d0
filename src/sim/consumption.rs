use tracing::{debug, info};

use super::context::TurnContext;
use super::household::household_scope;
use super::labor;
use super::stage::TurnStage;
use crate::error::SimResult;
use crate::model::{ShortageReport, UnrestSource};
use crate::rng::Channel;

/// Shortage severity is drawn from `[SEVERITY_MIN, SEVERITY_MIN + SEVERITY_SPAN)`.
pub const SEVERITY_MIN: f64 = 0.03;
pub const SEVERITY_SPAN: f64 = 0.08;
/// Share of the lost population that dies rather than flees, at minimum
/// severity; rises by `DEATH_SHARE_SPAN` at maximum severity.
pub const DEATH_SHARE_MIN: f64 = 0.30;
pub const DEATH_SHARE_SPAN: f64 = 0.20;

/// Peasants and the court eat.
pub struct Consumption;

impl TurnStage for Consumption {
    fn name(&self) -> &'static str {
        "consumption"
    }

    fn run(&self, ctx: &mut TurnContext) -> SimResult<()> {
        let balance = ctx.balance;
        let economy = &balance.economy;
        let court_size = household_scope(ctx.world)?.len() as u32;
        let report = &mut ctx.report.consumption;
        report.court_size = court_size;
        report.population_need =
            i64::from(ctx.world.estate.population) * i64::from(economy.peasant_ration);
        report.court_need = i64::from(court_size) * i64::from(economy.court_ration);

        let need = report.total_need();
        let estate = &mut ctx.world.estate;
        if estate.bushels >= need {
            estate.bushels -= need;
            report.consumed = need;
        } else {
            let available = estate.bushels.max(0);
            report.consumed = available;
            report.shortage = Some(ShortageReport {
                deficit: need - available,
                ..ShortageReport::default()
            });
            estate.bushels = 0;
        }
        debug!(need, court_size, "consumption");
        Ok(())
    }
}

/// Unmet need costs unrest and people, some dead and some fled.
pub struct Shortage;

impl TurnStage for Shortage {
    fn name(&self) -> &'static str {
        "shortage"
    }

    fn run(&self, ctx: &mut TurnContext) -> SimResult<()> {
        let Some(mut shortage) = ctx.report.consumption.shortage.take() else {
            return Ok(());
        };
        let balance = ctx.balance;
        let economy = &balance.economy;
        let need = ctx.report.consumption.total_need().max(1);
        let mut rng = ctx.stream(Channel::Demography).fork("shortage");

        let severity = SEVERITY_MIN + rng.unit() * SEVERITY_SPAN;
        let population = ctx.world.estate.population;
        let lost = ((f64::from(population) * severity).round() as u32)
            .max(1)
            .min(population);
        let death_share =
            DEATH_SHARE_MIN + DEATH_SHARE_SPAN * (severity - SEVERITY_MIN) / SEVERITY_SPAN;
        let deaths = (f64::from(lost) * death_share).round() as u32;
        let fled = lost - deaths;
        ctx.world.estate.population -= lost;

        let unrest = economy.shortage_unrest_base
            + (economy.shortage_unrest_scale * shortage.deficit as f64 / need as f64).round()
                as i32;
        shortage.severity = severity;
        shortage.lost = lost;
        shortage.deaths = deaths;
        shortage.fled = fled;
        shortage.unrest = unrest;
        ctx.add_unrest(UnrestSource::Shortage, unrest);
        ctx.report.vitals.peasant_deaths += deaths;
        ctx.report.vitals.peasant_fled += fled;
        labor::clamp_and_report(&mut ctx.world.estate, &mut ctx.report.labor);

        info!(deficit = shortage.deficit, lost, deaths, fled, "shortage");
        ctx.report.consumption.shortage = Some(shortage);
        Ok(())
    }
}
