//! Heir designation and head-of-household succession.

use rand::Rng;
use tracing::info;

use crate::content::NamePools;
use crate::demography::roll_traits;
use crate::error::SimResult;
use crate::id::{HouseId, PersonId};
use crate::kinship::KinshipGraph;
use crate::marriage::primogeniture_order;
use crate::model::{
    GameOver, LifeEvent, LifeEventKind, OfficerPost, Person, RelationshipEdge, Sex, WorldState,
};
use crate::rng::RngStream;

/// A new officer for `post`, unaffiliated with any house and at least
/// competent in the post's trait.
pub fn recruit_officer(rng: &mut RngStream, post: OfficerPost, names: &NamePools) -> Person {
    let sex = if rng.chance(0.5) { Sex::Male } else { Sex::Female };
    let surname = names.house_name(rng, &[]);
    let name = names.person_name(rng, sex, &surname);
    let mut traits = roll_traits(rng);
    match post {
        OfficerPost::Steward => traits.stewardship = traits.stewardship.max(3),
        OfficerPost::Marshal => traits.martial = traits.martial.max(3),
        OfficerPost::Chaplain => traits.piety = traits.piety.max(3),
    }
    let age = rng.random_range(25..=45);
    Person::new(PersonId(0), name, sex, age).with_traits(traits)
}

/// The heir of `house`: the head's eldest living son in the house, else
/// eldest daughter, ties by id; failing that, a living adopted heir.
pub fn designate_heir(world: &WorldState, house: HouseId) -> SimResult<Option<PersonId>> {
    let record = world.house(house)?;
    let Some(head) = record.head else {
        return Ok(None);
    };
    let graph = KinshipGraph::of(world);
    let mut children: Vec<&Person> = graph
        .children(head)
        .into_iter()
        .filter_map(|c| world.persons.get(&c))
        .filter(|p| p.alive && p.house == Some(house))
        .collect();
    primogeniture_order(&mut children);
    if let Some(first) = children.first() {
        return Ok(Some(first.id));
    }
    Ok(record
        .adopted_heir
        .filter(|a| world.is_alive(*a) && Some(*a) != record.head))
}

/// Refresh `heir` on every house.
pub fn recompute_heirs(world: &mut WorldState) -> SimResult<()> {
    let ids: Vec<HouseId> = world.houses.keys().copied().collect();
    for id in ids {
        let heir = designate_heir(world, id)?;
        world.house_mut(id)?.heir = heir;
    }
    Ok(())
}

/// Drop dead members from the children and court lists and vacate posts
/// held by the dead. The head is left alone; succession handles it.
pub fn prune_dead(world: &mut WorldState, house: HouseId) -> SimResult<Vec<PersonId>> {
    let record = world.house(house)?;
    let dead: Vec<PersonId> = record
        .children
        .iter()
        .chain(record.court.iter())
        .chain(record.officers.values())
        .chain(record.spouse.iter())
        .copied()
        .filter(|p| !world.is_alive(*p))
        .collect();
    let record = world.house_mut(house)?;
    for id in &dead {
        record.remove_member(*id);
        record.officers.retain(|_, holder| *holder != *id);
    }
    Ok(dead)
}

/// Copy every relationship edge touching `from` onto `to`, skipping pairs
/// `to` already has. Existing edges are never altered.
pub fn inherit_relationships(world: &mut WorldState, from: PersonId, to: PersonId) -> usize {
    let mut inherited = Vec::new();
    for edge in &world.relationships {
        let (a, b) = if edge.from == from {
            (to, edge.to)
        } else if edge.to == from {
            (edge.from, to)
        } else {
            continue;
        };
        if a == b {
            continue;
        }
        let exists = world
            .relationships
            .iter()
            .chain(inherited.iter())
            .any(|e: &RelationshipEdge| e.from == a && e.to == b);
        if !exists {
            let mut copy = RelationshipEdge::new(a, b, edge.allegiance, edge.respect, edge.threat);
            copy.last_adjusted = edge.last_adjusted;
            inherited.push(copy);
        }
    }
    let count = inherited.len();
    world.relationships.extend(inherited);
    count
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Succession {
    /// The head is alive; nothing to do.
    Unchanged,
    Continued {
        previous: PersonId,
        head: PersonId,
    },
    /// Nobody could take over. Terminal for the player house.
    Extinct {
        previous: Option<PersonId>,
    },
}

/// Replace a dead head.
///
/// The heir becomes head and is marked married; the heir's living spouse
/// (from the kinship graph) becomes the house spouse; the previous spouse
/// stays on as a court member; relationships pass to the new head and the
/// heir is designated again. A non-player house without an heir falls to
/// its eldest living member; the player house goes extinct.
pub fn resolve_succession(
    world: &mut WorldState,
    house: HouseId,
) -> SimResult<(Succession, Vec<LifeEvent>)> {
    let turn = world.turn;
    let record = world.house(house)?;
    let previous = record.head;
    if previous.is_some_and(|h| world.is_alive(h)) {
        return Ok((Succession::Unchanged, Vec::new()));
    }
    if previous.is_none() && !record.is_player {
        return Ok((Succession::Unchanged, Vec::new()));
    }
    let is_player = record.is_player;
    let prior_spouse = record.spouse;

    let mut successor = designate_heir(world, house)?;
    if successor.is_none() && !is_player {
        successor = eldest_member(world, house);
    }
    let mut events = Vec::new();

    let Some(heir) = successor else {
        if is_player {
            world.game_over = Some(GameOver::Extinct);
            info!(%house, "player house extinct");
        } else {
            let record = world.house_mut(house)?;
            record.head = None;
            record.spouse = None;
            record.heir = None;
        }
        events.push(LifeEvent {
            turn,
            kind: LifeEventKind::Extinction,
            house: Some(house),
            person: previous,
            detail: "no living heir".into(),
        });
        return Ok((Succession::Extinct { previous }, events));
    };

    let new_spouse = KinshipGraph::of(world)
        .spouse_of(heir)
        .filter(|s| world.persons.get(s).is_some_and(|p| p.house == Some(house)));
    let heir_name = world.person(heir)?.name.clone();
    world.person_mut(heir)?.married = true;

    let retained: Vec<PersonId> = world
        .house(house)?
        .children
        .iter()
        .copied()
        .chain(prior_spouse)
        .filter(|m| *m != heir && Some(*m) != new_spouse && world.is_alive(*m))
        .collect();

    let record = world.house_mut(house)?;
    record.children.clear();
    record.remove_member(heir);
    record.head = Some(heir);
    record.spouse = new_spouse;
    if record.adopted_heir == Some(heir) {
        record.adopted_heir = None;
    }
    for member in retained {
        record.retain_in_court(member);
    }
    if let Some(spouse) = new_spouse {
        record.court.retain(|c| *c != spouse);
    }
    rebuild_children(world, house)?;

    if let Some(old) = previous {
        inherit_relationships(world, old, heir);
    }
    let heir_of_heir = designate_heir(world, house)?;
    world.house_mut(house)?.heir = heir_of_heir;

    events.push(LifeEvent {
        turn,
        kind: LifeEventKind::Succession,
        house: Some(house),
        person: Some(heir),
        detail: format!("{heir_name} succeeds as head"),
    });
    info!(%house, %heir, "succession");
    let previous = previous.unwrap_or(heir);
    Ok((Succession::Continued { previous, head: heir }, events))
}

/// Eldest living member of `house` who is not its head.
fn eldest_member(world: &WorldState, house: HouseId) -> Option<PersonId> {
    world
        .persons
        .values()
        .filter(|p| p.alive && p.house == Some(house))
        .max_by(|a, b| a.age.cmp(&b.age).then(b.id.cmp(&a.id)))
        .map(|p| p.id)
}

/// List the head's living children in the house under `children`, moving
/// them out of the court list.
fn rebuild_children(world: &mut WorldState, house: HouseId) -> SimResult<()> {
    let Some(head) = world.house(house)?.head else {
        return Ok(());
    };
    let children: Vec<PersonId> = KinshipGraph::of(world)
        .children(head)
        .into_iter()
        .filter(|c| {
            world
                .persons
                .get(c)
                .is_some_and(|p| p.alive && p.house == Some(house))
        })
        .collect();
    let record = world.house_mut(house)?;
    record.court.retain(|c| !children.contains(c));
    record.children = children;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sex;
    use crate::testutil;

    #[test]
    fn sons_before_daughters() {
        let mut world = testutil::small_world(2);
        let daughter = testutil::unmarried_daughter(&mut world, 19);
        let son = testutil::unmarried_son(&mut world, 17);
        let heir = designate_heir(&world, world.player_house).unwrap();
        assert_eq!(heir, Some(son));
        assert_ne!(heir, Some(daughter));
    }

    #[test]
    fn adopted_heir_is_fallback_only() {
        let mut world = testutil::bare_world(2);
        let house = world.player_house;
        let adopted = testutil::add_member(&mut world, house, "Claimant", Sex::Male, 22);
        world.house_mut(house).unwrap().adopted_heir = Some(adopted);
        assert_eq!(designate_heir(&world, house).unwrap(), Some(adopted));
    }

    #[test]
    fn succession_promotes_heir_and_keeps_dowager() {
        let mut world = testutil::small_world(2);
        let house = world.player_house;
        let old_head = world.player().unwrap().head.unwrap();
        let dowager = world.player().unwrap().spouse.unwrap();
        let son = testutil::unmarried_son(&mut world, 20);
        world.person_mut(old_head).unwrap().mark_dead(0);

        let (outcome, events) = resolve_succession(&mut world, house).unwrap();
        assert_eq!(
            outcome,
            Succession::Continued {
                previous: old_head,
                head: son
            }
        );
        let record = world.player().unwrap();
        assert_eq!(record.head, Some(son));
        assert!(record.court.contains(&dowager));
        assert_eq!(record.spouse, None);
        assert!(world.person(son).unwrap().married);
        assert_eq!(events[0].kind, LifeEventKind::Succession);
    }

    #[test]
    fn no_heir_ends_the_player_house() {
        let mut world = testutil::bare_world(2);
        let head = world.player().unwrap().head.unwrap();
        world.person_mut(head).unwrap().mark_dead(0);
        let house = world.player_house;
        let (outcome, _) = resolve_succession(&mut world, house).unwrap();
        assert_eq!(outcome, Succession::Extinct { previous: Some(head) });
        assert_eq!(world.game_over, Some(GameOver::Extinct));
    }

    #[test]
    fn relationships_pass_to_successor() {
        let mut world = testutil::small_world(2);
        let old_head = world.player().unwrap().head.unwrap();
        let son = testutil::unmarried_son(&mut world, 20);
        let before = world
            .relationships
            .iter()
            .filter(|e| e.from == old_head || e.to == old_head)
            .count();
        assert!(before > 0);
        let copied = inherit_relationships(&mut world, old_head, son);
        assert_eq!(copied, before);
        assert_eq!(inherit_relationships(&mut world, old_head, son), 0);
    }
}
