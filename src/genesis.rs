//! Opening world: the player house, its liege, five peer houses and the
//! player's officers, all drawn from the `world_generation` channel.

use std::ops::RangeInclusive;

use rand::Rng;
use tracing::info;

use crate::config::Balance;
use crate::content::{Content, NamePools};
use crate::demography::roll_traits;
use crate::error::SimResult;
use crate::household;
use crate::id::{HouseId, PersonId};
use crate::kinship::{self, KinshipGraph};
use crate::model::{House, OfficerPost, Person, RelationshipEdge, Sex, Tier, WorldState};
use crate::rng::{Channel, RngStream};

const PEER_TIERS: [Tier; 5] = [Tier::Noble, Tier::Noble, Tier::Minor, Tier::Minor, Tier::Minor];
const PEER_PROXIMITY: [u8; 5] = [0, 1, 0, 1, 2];

/// Spread of opening relationship scores around the baselines.
const RELATION_SPREAD: i32 = 10;

struct Founding {
    label: String,
    tier: Tier,
    proximity: u8,
    is_player: bool,
    head_age: RangeInclusive<u32>,
    children: RangeInclusive<u32>,
    max_child_age: u32,
}

/// Build the opening world for `seed`.
pub fn genesis(seed: u64, balance: &Balance, content: &Content) -> SimResult<WorldState> {
    let mut world = WorldState::new(seed);
    let stream = RngStream::new(seed, Channel::WorldGeneration, 0);
    let names = &content.names;
    let mut taken = Vec::new();

    let player = found_house(
        &mut world,
        &stream,
        names,
        &mut taken,
        Founding {
            label: "player".into(),
            tier: Tier::Minor,
            proximity: 0,
            is_player: true,
            head_age: 30..=38,
            children: 1..=3,
            max_child_age: 12,
        },
    )?;
    world.player_house = player;

    world.liege_house = found_house(
        &mut world,
        &stream,
        names,
        &mut taken,
        Founding {
            label: "liege".into(),
            tier: Tier::Great,
            proximity: 1,
            is_player: false,
            head_age: 45..=60,
            children: 1..=3,
            max_child_age: 25,
        },
    )?;

    for (i, (tier, proximity)) in PEER_TIERS.into_iter().zip(PEER_PROXIMITY).enumerate() {
        found_house(
            &mut world,
            &stream,
            names,
            &mut taken,
            Founding {
                label: format!("peer:{i}"),
                tier,
                proximity,
                is_player: false,
                head_age: 35..=58,
                children: 0..=4,
                max_child_age: 25,
            },
        )?;
    }

    for post in OfficerPost::ALL {
        appoint(&mut world, &stream, names, *post)?;
    }
    seed_relationships(&mut world, &stream, balance)?;

    kinship::sync_household(&mut world)?;
    household::recompute_heirs(&mut world)?;
    KinshipGraph::of(&world).assert_spouse_exclusivity()?;
    info!(
        seed,
        houses = world.houses.len(),
        persons = world.persons.len(),
        "world generated"
    );
    Ok(world)
}

fn found_house(
    world: &mut WorldState,
    stream: &RngStream,
    names: &NamePools,
    taken: &mut Vec<String>,
    plan: Founding,
) -> SimResult<HouseId> {
    let mut rng = stream.fork(format!("house:{}", plan.label));
    let surname = names.house_name(&mut rng, taken);
    taken.push(surname.clone());

    let mut house = House::new(HouseId(0), surname.clone(), plan.tier);
    house.proximity = plan.proximity;
    house.is_player = plan.is_player;
    let id = world.add_house(house);

    let head_sex = if plan.is_player || rng.chance(0.75) {
        Sex::Male
    } else {
        Sex::Female
    };
    let head_age = rng.random_range(plan.head_age.clone());
    let head = spawn(world, &mut rng, names, &surname, id, head_sex, head_age);
    world.house_mut(id)?.head = Some(head);

    let wed = plan.is_player || rng.chance(0.8);
    if !wed {
        return Ok(id);
    }
    let spouse_age = head_age.saturating_sub(rng.random_range(0..=8)).max(18);
    let spouse = spawn(world, &mut rng, names, &surname, id, head_sex.opposite(), spouse_age);
    kinship::add_spouse(world, head, spouse)?;
    world.house_mut(id)?.spouse = Some(spouse);

    let mother_age = if head_sex == Sex::Female { head_age } else { spouse_age };
    let oldest = plan.max_child_age.min(mother_age.saturating_sub(18));
    let count = rng.random_range(plan.children.clone());
    for _ in 0..count {
        let sex = if rng.chance(0.5) { Sex::Male } else { Sex::Female };
        let age = rng.random_range(0..=oldest);
        let child = spawn(world, &mut rng, names, &surname, id, sex, age);
        kinship::add_parent(world, head, child);
        kinship::add_parent(world, spouse, child);
        let record = world.house_mut(id)?;
        record.children.push(child);
        record.children.sort();
    }
    Ok(id)
}

fn spawn(
    world: &mut WorldState,
    rng: &mut RngStream,
    names: &NamePools,
    surname: &str,
    house: HouseId,
    sex: Sex,
    age: u32,
) -> PersonId {
    let name = names.person_name(rng, sex, surname);
    let person = Person::new(PersonId(0), name, sex, age)
        .with_house(house)
        .with_traits(roll_traits(rng));
    world.add_person(person)
}

fn appoint(
    world: &mut WorldState,
    stream: &RngStream,
    names: &NamePools,
    post: OfficerPost,
) -> SimResult<()> {
    let mut rng = stream.fork(format!("officer:{post}"));
    let officer = household::recruit_officer(&mut rng, post, names);
    let id = world.add_person(officer);
    world.player_mut()?.officers.insert(post, id);
    Ok(())
}

/// Edges in both directions between the player head and every other head.
fn seed_relationships(
    world: &mut WorldState,
    stream: &RngStream,
    balance: &Balance,
) -> SimResult<()> {
    let Some(player_head) = world.player()?.head else {
        return Ok(());
    };
    let (allegiance, respect, threat) = balance.relations.baseline();
    let heads: Vec<PersonId> = world
        .houses
        .values()
        .filter(|h| !h.is_player)
        .filter_map(|h| h.head)
        .collect();
    for other in heads {
        for (from, to) in [(player_head, other), (other, player_head)] {
            let mut rng = stream.fork(format!("relation:{from}:{to}"));
            let mut spread = || rng.random_range(-RELATION_SPREAD..=RELATION_SPREAD);
            let mut edge = RelationshipEdge::new(
                from,
                to,
                allegiance + spread(),
                respect + spread(),
                threat + spread(),
            );
            edge.clamp();
            world.relationships.push(edge);
        }
    }
    Ok(())
}
