use tracing::{debug, info};

use super::context::TurnContext;
use super::stage::TurnStage;
use crate::content::NamePools;
use crate::demography;
use crate::error::SimResult;
use crate::household;
use crate::id::PersonId;
use crate::kinship::KinshipGraph;
use crate::model::{LifeEvent, LifeEventKind, OfficerPost, WorldState};
use crate::rng::{Channel, RngStream};

/// Aging, births and deaths in the player household and its officers,
/// then succession and vacant posts.
pub struct Household;

/// Living player-house members plus officers, in id order.
pub fn household_scope(world: &WorldState) -> SimResult<Vec<PersonId>> {
    let mut scope = world.living_in_house(world.player_house);
    scope.extend(
        world
            .player()?
            .officers
            .values()
            .copied()
            .filter(|id| world.is_alive(*id)),
    );
    scope.sort();
    scope.dedup();
    Ok(scope)
}

impl TurnStage for Household {
    fn name(&self) -> &'static str {
        "household"
    }

    fn run(&self, ctx: &mut TurnContext) -> SimResult<()> {
        let balance = ctx.balance;
        let turn = ctx.world.turn;
        let house = ctx.world.player_house;
        let stream = ctx.stream(Channel::Household);
        let scope = household_scope(ctx.world)?;

        for id in demography::age_persons(ctx.world, &scope, balance) {
            if ctx.world.person(id)?.house == Some(house) {
                ctx.report.life_events.push(LifeEvent {
                    turn,
                    kind: LifeEventKind::ComingOfAge,
                    house: Some(house),
                    person: Some(id),
                    detail: format!("{} came of age", ctx.world.person(id)?.name),
                });
            }
        }

        let died = demography::roll_deaths(ctx.world, &scope, &stream, balance);
        ctx.report.vitals.household_deaths = died.len() as u32;
        let graph = KinshipGraph::of(ctx.world);
        let mut events = Vec::new();
        for id in &died {
            let person = ctx.world.person(*id)?;
            events.push(LifeEvent {
                turn,
                kind: LifeEventKind::Death,
                house: person.house,
                person: Some(*id),
                detail: format!("{} died aged {}", person.name, person.age),
            });
            for survivor in graph.spouses(*id) {
                if ctx.world.is_alive(survivor) && graph.spouse_of(survivor).is_none() {
                    events.push(LifeEvent {
                        turn,
                        kind: LifeEventKind::Widowed,
                        house: ctx.world.person(survivor)?.house,
                        person: Some(survivor),
                        detail: format!("widowed by the death of {}", person.name),
                    });
                }
            }
        }
        ctx.report.life_events.extend(events);

        if let Some(child) =
            demography::roll_birth(ctx.world, house, &stream, balance, &ctx.content.names)?
        {
            ctx.report.vitals.household_births += 1;
            ctx.report.life_events.push(LifeEvent {
                turn,
                kind: LifeEventKind::Birth,
                house: Some(house),
                person: Some(child),
                detail: format!("{} was born", ctx.world.person(child)?.name),
            });
        }

        household::prune_dead(ctx.world, house)?;
        let (_, events) = household::resolve_succession(ctx.world, house)?;
        ctx.report.life_events.extend(events);

        if !ctx.world.is_over() {
            let court = ctx.stream(Channel::Court);
            let names = &ctx.content.names;
            for post in OfficerPost::ALL {
                if let Some(event) = refill_post(ctx.world, *post, &court, names)? {
                    ctx.report.life_events.push(event);
                }
            }
        }
        debug!(deaths = died.len(), "household");
        Ok(())
    }
}

/// Appoint a fresh officer to `post` when it is vacant.
fn refill_post(
    world: &mut WorldState,
    post: OfficerPost,
    court: &RngStream,
    names: &NamePools,
) -> SimResult<Option<LifeEvent>> {
    let house = world.player_house;
    if world
        .player()?
        .officers
        .get(&post)
        .is_some_and(|id| world.is_alive(*id))
    {
        return Ok(None);
    }
    let mut rng = court.fork(format!("officer:{post}"));
    let officer = household::recruit_officer(&mut rng, post, names);
    let id = world.add_person(officer);
    world.player_mut()?.officers.insert(post, id);
    info!(%post, officer = %id, "officer appointed");
    Ok(Some(LifeEvent {
        turn: world.turn,
        kind: LifeEventKind::OfficerAppointed,
        house: Some(house),
        person: Some(id),
        detail: format!("appointed {post}"),
    }))
}
