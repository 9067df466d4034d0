use super::context::TurnContext;
use super::labor;
use super::stage::TurnStage;
use crate::error::SimResult;
use crate::model::UnrestSource;

/// Standing relief from improvements, then every bounded quantity back in
/// range.
pub struct Normalize;

impl TurnStage for Normalize {
    fn name(&self) -> &'static str {
        "normalize"
    }

    fn run(&self, ctx: &mut TurnContext) -> SimResult<()> {
        let relief = ctx.content.built_effects(&ctx.world.estate).unrest_relief;
        if relief > 0 {
            ctx.add_unrest(UnrestSource::Improvement, -relief);
        }
        ctx.world.estate.normalize();
        for person in ctx.world.persons.values_mut() {
            person.traits.clamp();
        }
        for edge in ctx.world.relationships.iter_mut() {
            edge.clamp();
        }
        labor::clamp_and_report(&mut ctx.world.estate, &mut ctx.report.labor);
        Ok(())
    }
}
