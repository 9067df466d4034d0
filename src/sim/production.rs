use tracing::{debug, info};

use super::context::TurnContext;
use super::labor;
use super::stage::TurnStage;
use crate::error::{SimError, SimResult};
use crate::model::{LaborReport, OfficerPost, OneShot, WorldState};

/// Blessed-harvest bonus on top of the normal multiplier.
const BLESSED_HARVEST_BONUS: f64 = 0.10;
const STEWARD_BONUS_PER_POINT: f64 = 0.03;

/// Harvest with the labor allocation the turn opened with, then advance
/// construction.
pub struct Production;

/// Harvest bonus from the steward's stewardship, centred on an average 3.
pub fn steward_bonus(world: &WorldState) -> f64 {
    world
        .houses
        .get(&world.player_house)
        .and_then(|h| h.officers.get(&OfficerPost::Steward))
        .and_then(|id| world.persons.get(id))
        .filter(|p| p.alive)
        .map(|p| (f64::from(p.traits.stewardship) - 3.0) * STEWARD_BONUS_PER_POINT)
        .unwrap_or(0.0)
}

impl TurnStage for Production {
    fn name(&self) -> &'static str {
        "production"
    }

    fn run(&self, ctx: &mut TurnContext) -> SimResult<()> {
        let balance = ctx.balance;
        let economy = &balance.economy;
        let estate = &mut ctx.world.estate;
        ctx.report.labor = LaborReport {
            requested_farmers: estate.farmers,
            requested_builders: estate.builders,
            ..LaborReport::default()
        };
        labor::clamp_and_report(estate, &mut ctx.report.labor);

        let built = ctx.content.built_effects(&ctx.world.estate);
        let mut bonus = 1.0 + built.harvest_bonus + steward_bonus(ctx.world);
        if ctx.world.flags.take_one_shot(OneShot::BlessedHarvest) {
            bonus += BLESSED_HARVEST_BONUS;
        }
        let estate = &mut ctx.world.estate;
        let harvest = (f64::from(estate.farmers)
            * f64::from(economy.bushels_per_farmer)
            * ctx.report.weather.multiplier
            * bonus)
            .floor() as i64;
        estate.bushels += harvest;
        ctx.report.production.farmers = estate.farmers;
        ctx.report.production.harvest = harvest;
        ctx.report.production.bonus_mult = bonus;

        let progress = estate.builders * economy.progress_per_builder;
        if let Some(project) = estate.project.as_mut() {
            let def = ctx.content.improvement(&project.improvement).ok_or_else(|| {
                SimError::invariant(
                    "known_improvement",
                    format!("project names unknown improvement {}", project.improvement),
                )
            })?;
            project.progress += progress;
            ctx.report.production.construction_progress = progress;
            if project.progress >= def.required_progress {
                let done = project.improvement.clone();
                estate.project = None;
                estate.improvements.insert(done.clone());
                info!(improvement = %done, "construction completed");
                ctx.report.production.completed = Some(done);
            }
        }
        debug!(harvest, bonus, "production");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Balance;
    use crate::content::Content;
    use crate::model::Project;
    use crate::testutil;

    #[test]
    fn harvest_uses_weather_and_bonus() {
        let mut world = testutil::small_world(3);
        world.estate.farmers = 10;
        world.estate.builders = 0;
        world.flags.grant_one_shot(OneShot::BlessedHarvest);
        let steward = steward_bonus(&world);
        let balance = Balance::default();
        let content = Content::standard();
        let bushels = world.estate.bushels;
        let mut ctx = TurnContext::new(&mut world, &balance, &content);
        ctx.report.weather.multiplier = 1.0;
        Production.run(&mut ctx).unwrap();
        let bonus = ctx.report.production.bonus_mult;
        assert!((bonus - (1.1 + steward)).abs() < 1e-9);
        let expected = (100.0 * bonus).floor() as i64;
        assert_eq!(ctx.report.production.harvest, expected);
        assert_eq!(ctx.world.estate.bushels, bushels + expected);
        assert!(!ctx.world.flags.one_shots.contains(&OneShot::BlessedHarvest));
    }

    #[test]
    fn construction_completes() {
        let mut world = testutil::small_world(3);
        world.estate.builders = 4;
        world.estate.project = Some(Project {
            improvement: "chapel".into(),
            progress: 3,
        });
        let balance = Balance::default();
        let content = Content::standard();
        let mut ctx = TurnContext::new(&mut world, &balance, &content);
        Production.run(&mut ctx).unwrap();
        assert_eq!(ctx.report.production.completed.as_deref(), Some("chapel"));
        assert!(ctx.world.estate.project.is_none());
        assert!(ctx.world.estate.has_improvement("chapel"));
    }
}
