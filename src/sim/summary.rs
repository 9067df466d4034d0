use std::collections::BTreeMap;

use super::context::TurnContext;
use super::stage::TurnStage;
use crate::error::SimResult;
use crate::id::PersonId;
use crate::kinship::KinshipGraph;
use crate::model::{
    Badge, Driver, House, KinshipKind, LifeEventKind, OfficerPost, Role, RosterRow, TurnReport,
    WorldState,
};

/// Drivers shown in the report.
pub const MAX_DRIVERS: usize = 3;

/// Drivers and rosters. Runs last in the preview and again after commit.
pub struct Summary;

impl TurnStage for Summary {
    fn name(&self) -> &'static str {
        "summary"
    }

    fn run(&self, ctx: &mut TurnContext) -> SimResult<()> {
        summarize(ctx)
    }
}

/// Fill the closing fields of the report from the current projection.
pub fn summarize(ctx: &mut TurnContext) -> SimResult<()> {
    ctx.report.unrest_after = ctx.world.estate.unrest;
    ctx.report.game_over = ctx.world.game_over;
    ctx.report.drivers = top_drivers(&ctx.report);
    let (household, court) = rosters(ctx.world, &ctx.start_roles, &ctx.report)?;
    ctx.report.household = household;
    ctx.report.court = court;
    Ok(())
}

fn role_in(house: &House, person: PersonId) -> Option<(Role, Option<OfficerPost>)> {
    if house.head == Some(person) {
        return Some((Role::Head, None));
    }
    if house.spouse == Some(person) {
        return Some((Role::Spouse, None));
    }
    if house.heir == Some(person) {
        return Some((Role::Heir, None));
    }
    if house.children.contains(&person) {
        return Some((Role::Child, None));
    }
    if house.court.contains(&person) {
        return Some((Role::Court, None));
    }
    house
        .officers
        .iter()
        .find(|(_, holder)| **holder == person)
        .map(|(post, _)| (Role::Officer, Some(*post)))
}

/// Every living person holding a role in the player house.
pub fn current_roles(
    world: &WorldState,
) -> SimResult<BTreeMap<PersonId, (Role, Option<OfficerPost>)>> {
    let house = world.player()?;
    let mut ids = house.member_ids();
    ids.extend(house.officers.values().copied());
    Ok(ids
        .into_iter()
        .filter(|id| world.is_alive(*id))
        .filter_map(|id| role_in(house, id).map(|role| (id, role)))
        .collect())
}

/// Up to three largest resource movements, by magnitude then label.
pub fn top_drivers(report: &TurnReport) -> Vec<Driver> {
    let mut drivers = vec![
        Driver {
            label: "harvest".into(),
            impact: report.production.harvest,
        },
        Driver {
            label: "spoilage".into(),
            impact: -report.consumption.spoilage,
        },
        Driver {
            label: "consumption".into(),
            impact: -report.consumption.consumed,
        },
        Driver {
            label: "arrears interest".into(),
            impact: -report.obligations.interest.total(),
        },
        Driver {
            label: "market sales".into(),
            impact: report.market.income,
        },
        Driver {
            label: "dues paid".into(),
            impact: -(report.obligations.paid_coin + report.obligations.paid_bushels),
        },
    ];
    if let Some(shortage) = &report.consumption.shortage {
        drivers.push(Driver {
            label: "shortage".into(),
            impact: -shortage.deficit,
        });
    }
    for event in &report.fired_events {
        drivers.push(Driver {
            label: format!("event: {}", event.id),
            impact: event.impact,
        });
    }
    drivers.retain(|d| d.impact != 0);
    drivers.sort_by(|a, b| {
        b.impact
            .abs()
            .cmp(&a.impact.abs())
            .then_with(|| a.label.cmp(&b.label))
    });
    drivers.truncate(MAX_DRIVERS);
    drivers
}

fn role_rank(role: Role) -> usize {
    Role::ALL.iter().position(|r| *r == role).unwrap_or(Role::ALL.len())
}

/// Household and court rosters. Members who died this turn keep the row of
/// the role they opened the turn with, badged deceased.
fn rosters(
    world: &WorldState,
    start_roles: &BTreeMap<PersonId, (Role, Option<OfficerPost>)>,
    report: &TurnReport,
) -> SimResult<(Vec<RosterRow>, Vec<RosterRow>)> {
    let turn = world.turn;
    let mut roles = current_roles(world)?;
    for (id, role) in start_roles {
        let died_now = world
            .persons
            .get(id)
            .is_some_and(|p| !p.alive && p.died_turn == Some(turn));
        if died_now {
            roles.entry(*id).or_insert(*role);
        }
    }

    let graph = KinshipGraph::of(world);
    let married_now = |id: PersonId| {
        world
            .kinship
            .iter()
            .any(|e| e.kind == KinshipKind::SpouseOf && e.since_turn == turn && e.involves(id))
    };
    let came_of_age = |id: PersonId| {
        report
            .life_events
            .iter()
            .any(|e| e.kind == LifeEventKind::ComingOfAge && e.person == Some(id))
    };

    let mut rows = Vec::new();
    for (id, (role, post)) in roles {
        let person = world.person(id)?;
        let mut badges = Vec::new();
        if !person.alive {
            badges.push(Badge::Deceased);
        } else if graph.is_widowed(id) {
            badges.push(Badge::Widowed);
        }
        if person.born_turn == Some(turn) {
            badges.push(Badge::Newborn);
        }
        if came_of_age(id) {
            badges.push(Badge::ComingOfAge);
        }
        if married_now(id) {
            badges.push(Badge::Married);
        }
        rows.push(RosterRow {
            person: id,
            name: person.name.clone(),
            sex: person.sex,
            age: person.age,
            role,
            post,
            badges,
        });
    }
    rows.sort_by_key(|r| (role_rank(r.role), r.person));
    let (household, court): (Vec<RosterRow>, Vec<RosterRow>) = rows
        .into_iter()
        .partition(|r| matches!(r.role, Role::Head | Role::Spouse | Role::Heir | Role::Child));
    Ok((household, court))
}
