use tracing::debug;

use super::context::TurnContext;
use super::stage::TurnStage;
use crate::error::SimResult;

/// Relationships left alone drift back toward their baselines.
pub struct Drift;

/// Move `value` a fraction of the way to `target`, at least one point.
pub fn drift_toward(value: i32, target: i32, rate: f64) -> i32 {
    let gap = target - value;
    if gap == 0 {
        return value;
    }
    let step = ((f64::from(gap.abs()) * rate).floor() as i32).clamp(1, gap.abs());
    value + step * gap.signum()
}

impl TurnStage for Drift {
    fn name(&self) -> &'static str {
        "drift"
    }

    fn run(&self, ctx: &mut TurnContext) -> SimResult<()> {
        let cfg = &ctx.balance.relations;
        let turn = ctx.world.turn;
        let mut moved = 0usize;
        for edge in ctx.world.relationships.iter_mut() {
            if edge.recently_adjusted(turn) {
                continue;
            }
            let before = (edge.allegiance, edge.respect, edge.threat);
            edge.allegiance = drift_toward(edge.allegiance, cfg.baseline_allegiance, cfg.drift_rate);
            edge.respect = drift_toward(edge.respect, cfg.baseline_respect, cfg.drift_rate);
            edge.threat = drift_toward(edge.threat, cfg.baseline_threat, cfg.drift_rate);
            if before != (edge.allegiance, edge.respect, edge.threat) {
                moved += 1;
            }
        }
        debug!(moved, "relationships drifted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Balance;
    use crate::content::Content;
    use crate::id::PersonId;
    use crate::model::{RelationshipEdge, WorldState};

    #[test]
    fn step_is_a_fifth_of_the_gap_at_least_one() {
        assert_eq!(drift_toward(80, 50, 0.2), 74);
        assert_eq!(drift_toward(48, 50, 0.2), 49);
        assert_eq!(drift_toward(50, 50, 0.2), 50);
        assert_eq!(drift_toward(21, 20, 0.2), 20);
        assert_eq!(drift_toward(0, 20, 0.2), 4);
    }

    #[test]
    fn recently_adjusted_edges_hold() {
        let mut world = WorldState::new(1);
        world.turn = 5;
        let mut fresh = RelationshipEdge::new(PersonId(1), PersonId(2), 90, 50, 20);
        fresh.last_adjusted = Some(4);
        let stale = RelationshipEdge::new(PersonId(2), PersonId(1), 90, 50, 20);
        world.relationships = vec![fresh, stale];
        let balance = Balance::default();
        let content = Content::standard();
        let mut ctx = TurnContext::new(&mut world, &balance, &content);
        Drift.run(&mut ctx).unwrap();
        assert_eq!(world.relationships[0].allegiance, 90);
        assert_eq!(world.relationships[1].allegiance, 82);
    }
}
