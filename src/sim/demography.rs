use rand::Rng;
use tracing::debug;

use super::context::TurnContext;
use super::stage::TurnStage;
use crate::demography;
use crate::error::SimResult;
use crate::household;
use crate::id::{HouseId, PersonId};
use crate::kinship::KinshipGraph;
use crate::marriage;
use crate::model::{LifeEvent, LifeEventKind};
use crate::rng::Channel;

/// Chance per turn that an unwed non-player head finds a match.
const MATCH_CHANCE: f64 = 0.5;

/// Births, deaths, succession and match-making for every house the player
/// does not run. Great houses stay off-stage.
pub struct WorldDemography;

impl TurnStage for WorldDemography {
    fn name(&self) -> &'static str {
        "world_demography"
    }

    fn run(&self, ctx: &mut TurnContext) -> SimResult<()> {
        let balance = ctx.balance;
        let stream = ctx.stream(Channel::Demography);
        let houses: Vec<HouseId> = ctx
            .world
            .houses
            .values()
            .filter(|h| !h.is_player && h.tier.in_world_demography())
            .map(|h| h.id)
            .collect();
        let scope: Vec<PersonId> = ctx
            .world
            .persons
            .values()
            .filter(|p| p.alive && p.house.is_some_and(|h| houses.contains(&h)))
            .map(|p| p.id)
            .collect();

        demography::age_persons(ctx.world, &scope, balance);
        let died = demography::roll_deaths(ctx.world, &scope, &stream, balance);
        ctx.report.vitals.world_deaths = died.len() as u32;

        for house in &houses {
            if demography::roll_birth(ctx.world, *house, &stream, balance, &ctx.content.names)?
                .is_some()
            {
                ctx.report.vitals.world_births += 1;
            }
        }

        for house in &houses {
            household::prune_dead(ctx.world, *house)?;
            let (_, events) = household::resolve_succession(ctx.world, *house)?;
            ctx.report.life_events.extend(events);
        }

        for house in &houses {
            if let Some(event) = self.match_head(ctx, *house)? {
                ctx.report.life_events.push(event);
            }
        }
        debug!(
            houses = houses.len(),
            births = ctx.report.vitals.world_births,
            deaths = ctx.report.vitals.world_deaths,
            "world demography"
        );
        Ok(())
    }
}

impl WorldDemography {
    /// Marry off an unwed adult head, drawing from `match:<house>`.
    fn match_head(&self, ctx: &mut TurnContext, house: HouseId) -> SimResult<Option<LifeEvent>> {
        let band = ctx.balance.household.marriage_min_age..=ctx.balance.household.marriage_max_age;
        let world = &*ctx.world;
        let Some(head) = world.house(house)?.head.filter(|h| world.is_alive(*h)) else {
            return Ok(None);
        };
        if !band.contains(&world.person(head)?.age)
            || KinshipGraph::of(world).spouse_of(head).is_some()
            || world.reservations.is_reserved(head, world.turn)
        {
            return Ok(None);
        }
        let mut rng = ctx.stream(Channel::Demography).fork(format!("match:{house}"));
        if !rng.chance(MATCH_CHANCE) {
            return Ok(None);
        }
        let scope = marriage::marriage_scope(world, house)?;
        let player = world.player_house;
        let pool: Vec<PersonId> =
            marriage::list_eligible_candidates(world, head, &scope, ctx.balance)?
                .into_iter()
                .filter(|c| c.house != player)
                .take(marriage::WINDOW_SIZE)
                .map(|c| c.person)
                .collect();
        if pool.is_empty() {
            return Ok(None);
        }
        let partner = pool[rng.random_range(0..pool.len())];
        marriage::arrange_match(ctx.world, head, partner)?;
        Ok(Some(LifeEvent {
            turn: ctx.world.turn,
            kind: LifeEventKind::Marriage,
            house: Some(house),
            person: Some(head),
            detail: format!("{head} married {partner}"),
        }))
    }
}
