use tracing::{debug, info};

use super::context::TurnContext;
use crate::error::SimResult;
use crate::household;
use crate::kinship::KinshipGraph;
use crate::model::{
    Dues, GameOver, RelationshipDelta, UNREST_MAX, UnrestSource, WarLevyChoice,
};

/// Close a committed turn: unpaid dues roll into arrears, the liege answers
/// compliance, a stable estate calms down, a dead head is replaced and the
/// dispossession check runs.
pub fn close_turn(ctx: &mut TurnContext) -> SimResult<()> {
    let balance = ctx.balance;
    let turn = ctx.world.turn;

    let estate = &mut ctx.world.estate;
    let unpaid = estate.dues;
    estate.arrears.coin += unpaid.coin.max(0);
    estate.arrears.bushels += unpaid.bushels.max(0);
    let dues_cleared = unpaid.coin <= 0 && unpaid.bushels <= 0;
    estate.dues = Dues::default();

    let refused = ctx.report.obligations.levy_choice == Some(WarLevyChoice::Refuse);
    let compliant = dues_cleared && !refused;
    let delta = if compliant {
        RelationshipDelta::new(2, 2, 0)
    } else {
        RelationshipDelta::new(0, -3, 3)
    };
    let head = ctx.world.player()?.head;
    if let (Some(liege), Some(head)) = (ctx.world.liege_head(), head) {
        ctx.world
            .adjust_relationship(liege, head, delta, balance.relations.baseline());
    }

    let stable = ctx.report.consumption.shortage.is_none() && ctx.world.estate.arrears.is_clear();
    if stable {
        ctx.add_unrest(UnrestSource::Stability, -balance.economy.stable_unrest_decay);
    }

    let house = ctx.world.player_house;
    let (_, events) = household::resolve_succession(ctx.world, house)?;
    ctx.report.life_events.extend(events);
    household::recompute_heirs(ctx.world)?;
    ctx.world.estate.normalize();

    if !ctx.world.is_over() && ctx.world.estate.unrest >= UNREST_MAX {
        ctx.world.game_over = Some(GameOver::Dispossessed);
        info!(turn, "estate dispossessed");
    }
    KinshipGraph::of(ctx.world).assert_spouse_exclusivity()?;

    ctx.report.obligations.arrears_after = ctx.world.estate.arrears;
    ctx.report.obligations.compliant = Some(compliant);
    debug!(turn, compliant, stable, "turn closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Balance;
    use crate::content::Content;
    use crate::model::{ShortageReport, WorldState};
    use crate::testutil;

    fn liege_edge(world: &WorldState) -> (i32, i32, i32) {
        let liege = world.liege_head().unwrap();
        let head = world.player().unwrap().head.unwrap();
        let edge = world.relationship(liege, head).unwrap();
        (edge.allegiance, edge.respect, edge.threat)
    }

    #[test]
    fn unpaid_dues_become_arrears() {
        let balance = Balance::default();
        let content = Content::standard();
        let mut world = testutil::small_world(3);
        world.estate.dues.coin = 6;
        world.estate.dues.bushels = 25;
        world.estate.arrears.coin = 2;
        let mut ctx = TurnContext::new(&mut world, &balance, &content);
        close_turn(&mut ctx).unwrap();
        assert_eq!(ctx.world.estate.arrears.coin, 8);
        assert_eq!(ctx.world.estate.arrears.bushels, 25);
        assert_eq!(ctx.world.estate.dues, Dues::default());
        assert_eq!(ctx.report.obligations.compliant, Some(false));
        assert!(ctx.report.unrest.iter().all(|u| u.source != UnrestSource::Stability));
    }

    #[test]
    fn compliance_warms_the_liege() {
        let balance = Balance::default();
        let content = Content::standard();
        let mut world = testutil::small_world(3);
        let before = liege_edge(&world);
        let unrest = world.estate.unrest;
        let mut ctx = TurnContext::new(&mut world, &balance, &content);
        close_turn(&mut ctx).unwrap();
        assert_eq!(ctx.report.obligations.compliant, Some(true));
        assert_eq!(ctx.world.estate.unrest, unrest - 2);
        let after = liege_edge(ctx.world);
        assert_eq!(after.0, (before.0 + 2).min(100));
        assert_eq!(after.1, (before.1 + 2).min(100));
    }

    #[test]
    fn refused_levy_is_not_compliant() {
        let balance = Balance::default();
        let content = Content::standard();
        let mut world = testutil::small_world(3);
        let before = liege_edge(&world);
        let mut ctx = TurnContext::new(&mut world, &balance, &content);
        ctx.report.obligations.levy_choice = Some(WarLevyChoice::Refuse);
        ctx.report.consumption.shortage = Some(ShortageReport::default());
        close_turn(&mut ctx).unwrap();
        let after = liege_edge(ctx.world);
        assert_eq!(after.1, (before.1 - 3).max(0));
        assert_eq!(after.2, (before.2 + 3).min(100));
    }

    #[test]
    fn maximum_unrest_dispossesses() {
        let balance = Balance::default();
        let content = Content::standard();
        let mut world = testutil::small_world(3);
        world.estate.unrest = 100;
        world.estate.arrears.coin = 4;
        let mut ctx = TurnContext::new(&mut world, &balance, &content);
        close_turn(&mut ctx).unwrap();
        assert_eq!(ctx.world.game_over, Some(GameOver::Dispossessed));
    }
}
