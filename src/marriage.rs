//! Marriage market: who may marry whom, in what order, and what a match
//! does to household membership.

use std::cmp::Ordering;

use tracing::debug;

use crate::config::Balance;
use crate::error::{SimError, SimResult};
use crate::id::{HouseId, PersonId};
use crate::kinship::{self, KinshipGraph};
use crate::model::{CandidateRow, MarriageWindow, Person, Sex, Tier, WorldState};

/// Candidates shown in the marriage window; the rest are hidden.
pub const WINDOW_SIZE: usize = 3;

/// An eligible match, carrying the fields the ordering uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub person: PersonId,
    pub house: HouseId,
    pub tier: Tier,
    pub proximity: u8,
}

impl Candidate {
    fn sort_key(&self) -> (u8, u8, HouseId, PersonId) {
        (self.tier.rank(), self.proximity, self.house, self.person)
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Houses whose members `subject_house` may court: every other house that
/// takes part in world demography and sits within one tier.
pub fn marriage_scope(world: &WorldState, subject_house: HouseId) -> SimResult<Vec<HouseId>> {
    let tier = world.house(subject_house)?.tier;
    Ok(world
        .houses
        .values()
        .filter(|h| h.id != subject_house)
        .filter(|h| h.tier.in_world_demography() && tier.can_marry_into(h.tier))
        .map(|h| h.id)
        .collect())
}

/// Eligible partners for `subject` within `scope`, ordered by
/// (tier rank, proximity, house id, person id).
///
/// A candidate is living, of the opposite sex, inside the marriage age
/// band, has no living spouse, is not a house head, is not close kin of the
/// subject, and is not reserved by an open offer.
pub fn list_eligible_candidates(
    world: &WorldState,
    subject: PersonId,
    scope: &[HouseId],
    balance: &Balance,
) -> SimResult<Vec<Candidate>> {
    let subject_person = world.person(subject)?;
    let graph = KinshipGraph::of(world);
    let band = balance.household.marriage_min_age..=balance.household.marriage_max_age;
    let mut close_kin = graph.parents(subject);
    close_kin.extend(graph.children(subject));
    close_kin.extend(graph.siblings(subject));

    let mut out = Vec::new();
    for house_id in scope {
        let Some(house) = world.houses.get(house_id) else {
            continue;
        };
        for person in world.persons.values() {
            if person.house != Some(*house_id) || !person.alive || person.id == subject {
                continue;
            }
            if person.sex != subject_person.sex.opposite() || !band.contains(&person.age) {
                continue;
            }
            if house.head == Some(person.id) || graph.spouse_of(person.id).is_some() {
                continue;
            }
            if close_kin.contains(&person.id)
                || world.reservations.is_reserved(person.id, world.turn)
            {
                continue;
            }
            out.push(Candidate {
                person: person.id,
                house: *house_id,
                tier: house.tier,
                proximity: house.proximity,
            });
        }
    }
    out.sort();
    Ok(out)
}

/// Succession order among `persons`: sons before daughters, then elder
/// before younger, then lower id.
pub fn primogeniture_order(persons: &mut [&Person]) {
    persons.sort_by(|a, b| {
        sex_rank(a)
            .cmp(&sex_rank(b))
            .then(b.age.cmp(&a.age))
            .then(a.id.cmp(&b.id))
    });
}

fn sex_rank(person: &Person) -> u8 {
    match person.sex {
        Sex::Male => 0,
        Sex::Female => 1,
    }
}

/// Who the player house is currently seeking a match for: the head if
/// unwed, otherwise the first unmarried adult child by primogeniture.
pub fn marriage_subject(world: &WorldState, balance: &Balance) -> SimResult<Option<PersonId>> {
    let house = world.player()?;
    let graph = KinshipGraph::of(world);
    let band = balance.household.marriage_min_age..=balance.household.marriage_max_age;
    let seeking = |p: &Person| {
        p.alive
            && p.house == Some(house.id)
            && band.contains(&p.age)
            && graph.spouse_of(p.id).is_none()
    };

    if let Some(head) = house.head.and_then(|h| world.persons.get(&h)) {
        if seeking(head) {
            return Ok(Some(head.id));
        }
    }
    let mut children: Vec<&Person> = house
        .children
        .iter()
        .filter_map(|c| world.persons.get(c))
        .filter(|p| seeking(*p))
        .collect();
    primogeniture_order(&mut children);
    Ok(children.first().map(|p| p.id))
}

/// Build the marriage window for the player house, or `None` when nobody
/// is seeking a match.
pub fn build_window(world: &WorldState, balance: &Balance) -> SimResult<Option<MarriageWindow>> {
    let Some(subject) = marriage_subject(world, balance)? else {
        return Ok(None);
    };
    let scope = marriage_scope(world, world.player_house)?;
    let candidates = list_eligible_candidates(world, subject, &scope, balance)?;
    let mut shown = Vec::new();
    let mut hidden = Vec::new();
    for (i, c) in candidates.iter().enumerate() {
        if i < WINDOW_SIZE {
            let person = world.person(c.person)?;
            shown.push(CandidateRow {
                person: c.person,
                name: person.name.clone(),
                age: person.age,
                house: c.house,
                tier: c.tier,
                proximity: c.proximity,
            });
        } else {
            hidden.push(c.person);
        }
    }
    Ok(Some(MarriageWindow {
        subject,
        shown,
        hidden,
    }))
}

/// Where the couple lives after a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub subject: PersonId,
    pub partner: PersonId,
    /// House the couple resides in.
    pub residence: HouseId,
    /// Person who changed house.
    pub moved: PersonId,
}

/// Marry `subject` to `partner` and apply patrilocal residency: a wife
/// joins her husband's house. A house head never leaves; their spouse
/// always joins them.
pub fn arrange_match(
    world: &mut WorldState,
    subject: PersonId,
    partner: PersonId,
) -> SimResult<Match> {
    let subject_house = world
        .person(subject)?
        .house
        .ok_or_else(|| SimError::invariant("match_has_house", format!("{subject} has no house")))?;
    let partner_house = world
        .person(partner)?
        .house
        .ok_or_else(|| SimError::invariant("match_has_house", format!("{partner} has no house")))?;

    kinship::add_spouse(world, subject, partner)?;

    let subject_is_head = world.house(subject_house)?.head == Some(subject);
    let partner_is_head = world.house(partner_house)?.head == Some(partner);
    let subject_is_husband = world.person(subject)?.sex == Sex::Male;

    let (residence, moved) = if subject_is_head || (!partner_is_head && subject_is_husband) {
        (subject_house, partner)
    } else {
        (partner_house, subject)
    };
    let origin = if moved == partner { partner_house } else { subject_house };
    let stays = if moved == partner { subject } else { partner };

    world.house_mut(origin)?.remove_member(moved);
    world.person_mut(moved)?.house = Some(residence);
    let home = world.house_mut(residence)?;
    if home.head == Some(stays) {
        home.spouse = Some(moved);
    } else {
        home.retain_in_court(moved);
    }
    debug!(%subject, %partner, %residence, "match arranged");
    Ok(Match {
        subject,
        partner,
        residence,
        moved,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    #[test]
    fn candidates_are_ordered_by_tier_proximity_house_person() {
        let world = testutil::small_world(1);
        let head = world.player().unwrap().head.unwrap();
        let scope = marriage_scope(&world, world.player_house).unwrap();
        let list = list_eligible_candidates(&world, head, &scope, &Balance::default()).unwrap();
        let keys: Vec<_> = list.iter().map(|c| c.sort_key()).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn reserved_candidates_are_excluded() {
        let mut world = testutil::small_world(1);
        let son = testutil::unmarried_son(&mut world, 20);
        let scope = marriage_scope(&world, world.player_house).unwrap();
        let before = list_eligible_candidates(&world, son, &scope, &Balance::default()).unwrap();
        assert!(!before.is_empty());
        let first = before[0].person;
        world
            .reservations
            .reserve(first, "marriage-t0".into(), world.turn + 2);
        let after = list_eligible_candidates(&world, son, &scope, &Balance::default()).unwrap();
        assert!(after.iter().all(|c| c.person != first));
        assert_eq!(after.len(), before.len() - 1);
    }

    #[test]
    fn house_heads_are_not_candidates() {
        let mut world = testutil::small_world(1);
        let daughter = testutil::unmarried_daughter(&mut world, 20);
        let dunmore = world
            .houses
            .values()
            .find(|h| h.name == "Dunmore")
            .cloned()
            .unwrap();
        let lord = dunmore.head.unwrap();
        world.persons.get_mut(&dunmore.spouse.unwrap()).unwrap().mark_dead(0);

        let scope = marriage_scope(&world, world.player_house).unwrap();
        let list = list_eligible_candidates(&world, daughter, &scope, &Balance::default()).unwrap();
        assert!(!list.is_empty());
        assert!(list.iter().all(|c| c.person != lord));
    }

    #[test]
    fn candidates_are_opposite_sex_and_single() {
        let mut world = testutil::small_world(1);
        let son = testutil::unmarried_son(&mut world, 20);
        let scope = marriage_scope(&world, world.player_house).unwrap();
        let list = list_eligible_candidates(&world, son, &scope, &Balance::default()).unwrap();
        let graph = KinshipGraph::of(&world);
        for c in list {
            let p = world.person(c.person).unwrap();
            assert_eq!(p.sex, Sex::Female);
            assert!(graph.spouse_of(c.person).is_none());
        }
    }

    #[test]
    fn son_brings_wife_home() {
        let mut world = testutil::small_world(1);
        let son = testutil::unmarried_son(&mut world, 20);
        let scope = marriage_scope(&world, world.player_house).unwrap();
        let bride = list_eligible_candidates(&world, son, &scope, &Balance::default()).unwrap()[0]
            .person;
        let m = arrange_match(&mut world, son, bride).unwrap();
        assert_eq!(m.residence, world.player_house);
        assert_eq!(m.moved, bride);
        assert_eq!(world.person(bride).unwrap().house, Some(world.player_house));
        assert!(world.player().unwrap().court.contains(&bride));
        assert_eq!(KinshipGraph::of(&world).spouse_of(son), Some(bride));
    }

    #[test]
    fn daughter_marries_out() {
        let mut world = testutil::small_world(1);
        let daughter = testutil::unmarried_daughter(&mut world, 19);
        let scope = marriage_scope(&world, world.player_house).unwrap();
        let groom = list_eligible_candidates(&world, daughter, &scope, &Balance::default())
            .unwrap()[0]
            .person;
        let groom_house = world.person(groom).unwrap().house.unwrap();
        let m = arrange_match(&mut world, daughter, groom).unwrap();
        assert_eq!(m.residence, groom_house);
        assert_eq!(world.person(daughter).unwrap().house, Some(groom_house));
        assert!(!world.player().unwrap().children.contains(&daughter));
    }

    #[test]
    fn primogeniture_prefers_sons_then_age_then_id() {
        let a = Person::new(PersonId(5), "A", Sex::Female, 30);
        let b = Person::new(PersonId(7), "B", Sex::Male, 20);
        let c = Person::new(PersonId(3), "C", Sex::Male, 20);
        let d = Person::new(PersonId(9), "D", Sex::Male, 25);
        let mut v = vec![&a, &b, &c, &d];
        primogeniture_order(&mut v);
        let ids: Vec<u64> = v.iter().map(|p| p.id.0).collect();
        assert_eq!(ids, vec![9, 3, 7, 5]);
    }
}
