//! Age curves and the birth/death rolls that apply them.
//!
//! The two curves are pure. The rolls mutate a world, drawing one forked
//! sub-stream per person (`death:<id>`) or per mother (`birth:<id>`) so a
//! roll never depends on how many other rolls happened first.

use rand::Rng;
use tracing::debug;

use crate::config::Balance;
use crate::content::{NamePools, surname_of};
use crate::error::SimResult;
use crate::id::{HouseId, PersonId};
use crate::kinship::{self, KinshipGraph};
use crate::model::{Person, Sex, TRAIT_MAX, TRAIT_MIN, Traits, TuningFlags, WorldState};
use crate::rng::RngStream;

/// Relative fertility by age, peaking at 1.0 between 27 and 35.
pub fn fertility_multiplier(age: u32) -> f64 {
    match age {
        0..=15 => 0.01,
        16..=26 => 0.4 + 0.6 * f64::from(age - 16) / 11.0,
        27..=35 => 1.0,
        36..=47 => 1.0 - f64::from(age - 35) / 13.0,
        _ => 0.0,
    }
}

/// Annual mortality hazard by age.
pub fn mortality_hazard(age: u32) -> f64 {
    match age {
        0..=4 => 0.03,
        5..=14 => 0.008,
        15..=39 => 0.006,
        40..=64 => 0.006 + 0.0008 * f64::from(age - 40),
        _ => 0.025 * (0.11 * f64::from(age - 65)).exp(),
    }
}

/// Probability of at least one event over a turn of `turn_years`.
pub fn turn_probability(annual_hazard: f64, turn_years: u32) -> f64 {
    1.0 - (-annual_hazard * f64::from(turn_years)).exp()
}

/// Chance a person of `age` dies this turn. Certain at or past `max_age`.
pub fn death_chance(age: u32, balance: &Balance, flags: &TuningFlags) -> f64 {
    if age >= balance.household.max_age {
        return 1.0;
    }
    let base = turn_probability(mortality_hazard(age), balance.calendar.turn_years);
    (base * flags.mortality_mult).clamp(0.0, 1.0)
}

/// Chance a married woman of `age` bears a child this turn. Girls under the
/// coming-of-age threshold never do.
pub fn birth_chance(mother_age: u32, balance: &Balance, flags: &TuningFlags) -> f64 {
    if mother_age < balance.household.coming_of_age {
        return 0.0;
    }
    let base = balance.household.base_birth_chance * fertility_multiplier(mother_age);
    (base * flags.fertility_mult).clamp(0.0, 1.0)
}

/// Age every living person in `scope` by one turn. Returns those who came
/// of age this turn.
pub fn age_persons(
    world: &mut WorldState,
    scope: &[PersonId],
    balance: &Balance,
) -> Vec<PersonId> {
    let years = balance.calendar.turn_years;
    let threshold = balance.household.coming_of_age;
    let mut came_of_age = Vec::new();
    for id in scope {
        if let Some(person) = world.persons.get_mut(id).filter(|p| p.alive) {
            let before = person.age;
            person.age += years;
            if before < threshold && person.age >= threshold {
                came_of_age.push(*id);
            }
        }
    }
    came_of_age
}

/// Roll mortality for every living person in `scope`, in id order.
pub fn roll_deaths(
    world: &mut WorldState,
    scope: &[PersonId],
    stream: &RngStream,
    balance: &Balance,
) -> Vec<PersonId> {
    let mut ids = scope.to_vec();
    ids.sort();
    ids.dedup();

    let turn = world.turn;
    let mut died = Vec::new();
    for id in ids {
        let Some(person) = world.persons.get(&id).filter(|p| p.alive) else {
            continue;
        };
        let p = death_chance(person.age, balance, &world.flags);
        let mut rng = stream.fork(format!("death:{id}"));
        if rng.chance(p) {
            if let Some(person) = world.persons.get_mut(&id) {
                person.mark_dead(turn);
            }
            died.push(id);
        }
    }
    if !died.is_empty() {
        debug!(channel = %stream.channel(), deaths = died.len(), "mortality rolled");
    }
    died
}

/// Uniform traits in `1..=5`.
pub fn roll_traits<R: Rng + ?Sized>(rng: &mut R) -> Traits {
    Traits {
        stewardship: rng.random_range(TRAIT_MIN..=TRAIT_MAX),
        martial: rng.random_range(TRAIT_MIN..=TRAIT_MAX),
        diplomacy: rng.random_range(TRAIT_MIN..=TRAIT_MAX),
        intrigue: rng.random_range(TRAIT_MIN..=TRAIT_MAX),
        piety: rng.random_range(TRAIT_MIN..=TRAIT_MAX),
    }
}

/// Roll a birth for the head couple of `house`. The child joins the house,
/// gains `parent_of` edges from both parents and is listed under the head.
pub fn roll_birth(
    world: &mut WorldState,
    house: HouseId,
    stream: &RngStream,
    balance: &Balance,
    names: &NamePools,
) -> SimResult<Option<PersonId>> {
    let record = world.house(house)?;
    let Some(head) = record.head.filter(|h| world.is_alive(*h)) else {
        return Ok(None);
    };
    let surname = surname_of(&record.name).to_string();
    let Some(spouse) = KinshipGraph::of(world).spouse_of(head) else {
        return Ok(None);
    };
    let (head_sex, spouse_sex) = (world.person(head)?.sex, world.person(spouse)?.sex);
    let mother = match (head_sex, spouse_sex) {
        (Sex::Female, Sex::Male) => head,
        (Sex::Male, Sex::Female) => spouse,
        _ => return Ok(None),
    };
    let father = if mother == head { spouse } else { head };

    let p = birth_chance(world.person(mother)?.age, balance, &world.flags);
    let mut rng = stream.fork(format!("birth:{mother}"));
    if !rng.chance(p) {
        return Ok(None);
    }

    let sex = if rng.chance(0.5) { Sex::Male } else { Sex::Female };
    let name = names.person_name(&mut rng, sex, &surname);
    let traits = roll_traits(&mut rng);
    let mut child = Person::new(PersonId(0), name, sex, 0)
        .with_house(house)
        .with_traits(traits);
    child.born_turn = Some(world.turn);
    let child = world.add_person(child);

    kinship::add_parent(world, mother, child);
    kinship::add_parent(world, father, child);
    let record = world.house_mut(house)?;
    record.children.push(child);
    record.children.sort();
    Ok(Some(child))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Channel;
    use crate::testutil;

    #[test]
    fn fertility_curve_shape() {
        assert!(fertility_multiplier(12) < 0.05);
        assert!(fertility_multiplier(20) > fertility_multiplier(16));
        assert_eq!(fertility_multiplier(27), 1.0);
        assert_eq!(fertility_multiplier(35), 1.0);
        assert!(fertility_multiplier(42) < 1.0);
        assert_eq!(fertility_multiplier(48), 0.0);
        assert_eq!(fertility_multiplier(60), 0.0);
    }

    #[test]
    fn mortality_curve_shape() {
        assert!(mortality_hazard(2) > mortality_hazard(25));
        assert!(mortality_hazard(10) > mortality_hazard(25));
        assert!(mortality_hazard(50) > mortality_hazard(30));
        assert!(mortality_hazard(80) > 3.0 * mortality_hazard(65));
    }

    #[test]
    fn hazard_converts_over_turn_length() {
        let p = turn_probability(0.1, 3);
        assert!((p - (1.0 - (-0.3f64).exp())).abs() < 1e-12);
        assert_eq!(turn_probability(0.0, 3), 0.0);
    }

    #[test]
    fn multipliers_scale_never_replace() {
        let balance = Balance::default();
        let mut flags = TuningFlags::default();
        let base = death_chance(50, &balance, &flags);
        flags.mortality_mult = 2.0;
        assert!((death_chance(50, &balance, &flags) - 2.0 * base).abs() < 1e-12);
        flags.mortality_mult = 0.0;
        assert_eq!(death_chance(50, &balance, &flags), 0.0);
        assert_eq!(death_chance(95, &balance, &flags), 1.0);
    }

    #[test]
    fn no_births_to_children() {
        let balance = Balance::default();
        assert_eq!(birth_chance(12, &balance, &TuningFlags::default()), 0.0);
        assert!(birth_chance(28, &balance, &TuningFlags::default()) > 0.4);
    }

    #[test]
    fn ancient_people_always_die() {
        let mut world = testutil::small_world(5);
        let head = world.player().unwrap().head.unwrap();
        world.person_mut(head).unwrap().age = 99;
        let stream = RngStream::new(5, Channel::Household, 0);
        let died = roll_deaths(&mut world, &[head], &stream, &Balance::default());
        assert_eq!(died, vec![head]);
        assert!(!world.is_alive(head));
    }

    #[test]
    fn certain_birth_links_both_parents() {
        let mut world = testutil::small_world(5);
        world.flags.fertility_mult = 100.0;
        let house = world.player_house;
        let stream = RngStream::new(5, Channel::Household, 0);
        let names = NamePools::default();
        let child = roll_birth(&mut world, house, &stream, &Balance::default(), &names)
            .unwrap()
            .unwrap();
        let graph = KinshipGraph::of(&world);
        assert_eq!(graph.parents(child).len(), 2);
        assert!(world.player().unwrap().children.contains(&child));
        assert_eq!(world.person(child).unwrap().born_turn, Some(world.turn));
    }

    #[test]
    fn coming_of_age_detected() {
        let mut world = testutil::small_world(5);
        let house = world.player_house;
        let kid = testutil::add_member(&mut world, house, "Kid", Sex::Male, 14);
        let came = age_persons(&mut world, &[kid], &Balance::default());
        assert_eq!(came, vec![kid]);
        assert_eq!(world.person(kid).unwrap().age, 17);
    }
}
