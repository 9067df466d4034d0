//! Shared test utilities for unit and integration tests.
//!
//! Hand-built worlds with known shapes, so tests can assert on exact
//! people and houses instead of whatever genesis rolled.

use crate::config::Balance;
use crate::household;
use crate::id::{HouseId, PersonId};
use crate::kinship;
use crate::model::{House, OfficerPost, Person, RelationshipEdge, Sex, Tier, Traits, WorldState};
use crate::sim::TurnEngine;

// ---------------------------------------------------------------------------
// World builders
// ---------------------------------------------------------------------------

/// Player house: Aldric (35) married to Mira (30) with their son Tomas
/// (10), a full set of officers and a steward with stewardship 4. A great
/// liege house and two peer houses (noble, minor) whose heads each have an
/// unmarried adult son and daughter.
pub fn small_world(seed: u64) -> WorldState {
    let mut world = WorldState::new(seed);
    let player = player_house(&mut world, "Vane");
    let head = head_of(&world, player);
    let wife = add_member(&mut world, player, "Mira Vane", Sex::Female, 30);
    wed_head(&mut world, player, wife);
    let son = add_person(&mut world, player, "Tomas Vane", Sex::Male, 10);
    adopt_as_child(&mut world, player, son);

    appoint(&mut world, OfficerPost::Steward, "Osric Hale", 4);
    appoint(&mut world, OfficerPost::Marshal, "Brand Kell", 3);
    appoint(&mut world, OfficerPost::Chaplain, "Anselm Roe", 3);

    liege_house(&mut world);
    peer_house(&mut world, "Corbet", Tier::Noble, 1);
    peer_house(&mut world, "Dunmore", Tier::Minor, 0);

    relate_to_every_head(&mut world, head);
    finish(&mut world);
    world
}

/// Player house with a lone, unmarried head (Aldric, 35) and no children:
/// no heir, so an inheritance claim can be offered. Liege and one minor
/// peer house with adult children.
pub fn bare_world(seed: u64) -> WorldState {
    let mut world = WorldState::new(seed);
    let player = player_house(&mut world, "Vane");
    let head = head_of(&world, player);

    liege_house(&mut world);
    peer_house(&mut world, "Dunmore", Tier::Minor, 0);

    relate_to_every_head(&mut world, head);
    finish(&mut world);
    world
}

/// A shipped-balance engine with the standard content.
pub fn engine() -> TurnEngine {
    TurnEngine::new(Balance::default())
}

// ---------------------------------------------------------------------------
// Household helpers
// ---------------------------------------------------------------------------

/// Add a living person to `house`'s court.
pub fn add_member(
    world: &mut WorldState,
    house: HouseId,
    name: &str,
    sex: Sex,
    age: u32,
) -> PersonId {
    let id = add_person(world, house, name, sex, age);
    if let Some(record) = world.houses.get_mut(&house) {
        record.retain_in_court(id);
    }
    id
}

/// An unmarried son of the player head (and spouse, if any).
pub fn unmarried_son(world: &mut WorldState, age: u32) -> PersonId {
    player_child(world, "Edric Vane", Sex::Male, age)
}

/// An unmarried daughter of the player head (and spouse, if any).
pub fn unmarried_daughter(world: &mut WorldState, age: u32) -> PersonId {
    player_child(world, "Elsa Vane", Sex::Female, age)
}

fn player_child(world: &mut WorldState, name: &str, sex: Sex, age: u32) -> PersonId {
    let house = world.player_house;
    let child = add_person(world, house, name, sex, age);
    adopt_as_child(world, house, child);
    household::recompute_heirs(world).ok();
    child
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn add_person(world: &mut WorldState, house: HouseId, name: &str, sex: Sex, age: u32) -> PersonId {
    world.add_person(Person::new(PersonId(0), name, sex, age).with_house(house))
}

fn head_of(world: &WorldState, house: HouseId) -> PersonId {
    world
        .houses
        .get(&house)
        .and_then(|h| h.head)
        .unwrap_or(PersonId(0))
}

fn found(world: &mut WorldState, name: &str, tier: Tier, proximity: u8, head_age: u32) -> HouseId {
    let mut house = House::new(HouseId(0), name, tier);
    house.proximity = proximity;
    let id = world.add_house(house);
    let head = add_person(world, id, &format!("Lord {name}"), Sex::Male, head_age);
    if let Some(record) = world.houses.get_mut(&id) {
        record.head = Some(head);
    }
    id
}

fn player_house(world: &mut WorldState, name: &str) -> HouseId {
    let id = found(world, name, Tier::Minor, 0, 35);
    if let Some(record) = world.houses.get_mut(&id) {
        record.is_player = true;
    }
    let head = head_of(world, id);
    if let Some(person) = world.persons.get_mut(&head) {
        person.name = format!("Aldric {name}");
    }
    world.player_house = id;
    id
}

fn liege_house(world: &mut WorldState) -> HouseId {
    let id = found(world, "Corve", Tier::Great, 1, 52);
    let wife = add_member(world, id, "Lady Corve", Sex::Female, 48);
    wed_head(world, id, wife);
    world.liege_house = id;
    id
}

fn peer_house(world: &mut WorldState, name: &str, tier: Tier, proximity: u8) -> HouseId {
    let id = found(world, name, tier, proximity, 45);
    let wife = add_member(world, id, &format!("Lady {name}"), Sex::Female, 42);
    wed_head(world, id, wife);
    let son = add_person(world, id, &format!("Gerold {name}"), Sex::Male, 21);
    adopt_as_child(world, id, son);
    let daughter = add_person(world, id, &format!("Rosa {name}"), Sex::Female, 19);
    adopt_as_child(world, id, daughter);
    id
}

/// Marry the head of `house` to `spouse`, who already lives there.
fn wed_head(world: &mut WorldState, house: HouseId, spouse: PersonId) {
    let head = head_of(world, house);
    if kinship::add_spouse(world, head, spouse).is_ok()
        && let Some(record) = world.houses.get_mut(&house)
    {
        record.court.retain(|c| *c != spouse);
        record.spouse = Some(spouse);
    }
}

/// List `child` under the head of `house` with parent edges from the head
/// and the head's spouse.
fn adopt_as_child(world: &mut WorldState, house: HouseId, child: PersonId) {
    let Some(record) = world.houses.get(&house) else {
        return;
    };
    let parents: Vec<PersonId> = record.head.iter().chain(record.spouse.iter()).copied().collect();
    for parent in parents {
        kinship::add_parent(world, parent, child);
    }
    if let Some(record) = world.houses.get_mut(&house) {
        record.children.push(child);
        record.children.sort();
    }
}

fn appoint(world: &mut WorldState, post: OfficerPost, name: &str, skill: u8) {
    let mut traits = Traits::default();
    match post {
        OfficerPost::Steward => traits.stewardship = skill,
        OfficerPost::Marshal => traits.martial = skill,
        OfficerPost::Chaplain => traits.piety = skill,
    }
    let id = world.add_person(Person::new(PersonId(0), name, Sex::Male, 40).with_traits(traits));
    if let Ok(player) = world.player_mut() {
        player.officers.insert(post, id);
    }
}

/// Baseline edges in both directions between `head` and every other head.
fn relate_to_every_head(world: &mut WorldState, head: PersonId) {
    let others: Vec<PersonId> = world
        .houses
        .values()
        .filter_map(|h| h.head)
        .filter(|h| *h != head)
        .collect();
    for other in others {
        world.relationships.push(RelationshipEdge::new(head, other, 50, 50, 20));
        world.relationships.push(RelationshipEdge::new(other, head, 50, 50, 20));
    }
}

fn finish(world: &mut WorldState) {
    kinship::sync_household(world).ok();
    household::recompute_heirs(world).ok();
}
