use tracing::{debug, info};

use super::context::TurnContext;
use super::stage::TurnStage;
use crate::content::{EventDef, EventWeight};
use crate::error::SimResult;
use crate::model::{FiredEvent, UnrestSource, WorldState};
use crate::rng::Channel;

/// Cumulative probabilities of firing zero, one or two events.
const COUNT_TABLE: [(f64, usize); 3] = [(0.45, 0), (0.85, 1), (1.0, 2)];

/// Independent random events: up to two per turn, weighted among the
/// definitions off cooldown.
pub struct Events;

fn event_count(roll: f64) -> usize {
    COUNT_TABLE
        .iter()
        .find(|(cumulative, _)| roll < *cumulative)
        .map(|(_, n)| *n)
        .unwrap_or(0)
}

impl TurnStage for Events {
    fn name(&self) -> &'static str {
        "events"
    }

    fn run(&self, ctx: &mut TurnContext) -> SimResult<()> {
        let balance = ctx.balance;
        let content = ctx.content;
        let stream = ctx.stream(Channel::Events);
        let roll = stream.fork("count").unit();
        let count = event_count(roll);
        let mut fired: Vec<&'static str> = Vec::new();

        for slot in 0..count {
            let world: &WorldState = ctx.world;
            let built = content.built_effects(&world.estate);
            let eligible: Vec<(&EventDef, EventWeight)> = content
                .events
                .iter()
                .filter(|def| !world.flags.on_cooldown(def.id) && !fired.contains(&def.id))
                .map(|def| (def, (def.weight)(world, &built)))
                .filter(|(_, w)| w.value > 0.0)
                .collect();
            let weights: Vec<f64> = eligible.iter().map(|(_, w)| w.value).collect();
            let total: f64 = weights.iter().sum();
            let Some(pick) = stream.fork(format!("slot:{slot}")).pick_weighted(&weights) else {
                break;
            };
            let (def, weight) = &eligible[pick];

            let mut rng = stream.fork(format!("effect:{}", def.id));
            let outcome = (def.effect)(ctx.world, &mut rng, balance)?;
            ctx.world.flags.start_cooldown(def.id, def.cooldown);
            ctx.add_unrest(UnrestSource::Event, outcome.unrest);
            fired.push(def.id);

            let mut why = vec![
                format!("count roll {roll:.3} allowed {count} event(s)"),
                format!(
                    "slot {slot}: weight {:.2} of {total:.2} across {} eligible",
                    weight.value,
                    eligible.len()
                ),
            ];
            why.extend(weight.because.iter().cloned());
            info!(event = def.id, "event fired");
            ctx.report.fired_events.push(FiredEvent {
                id: def.id.to_string(),
                category: def.category.to_string(),
                weight: weight.value,
                summary: outcome.summary,
                impact: outcome.coin + outcome.bushels,
                why,
            });
        }
        debug!(roll, fired = fired.len(), "events");
        Ok(())
    }
}
