//! Read-only queries over the kinship edge list, the one hard invariant
//! check, and the append-only sync from household records.
//!
//! Every query returns ids sorted ascending so callers can depend on order.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::id::PersonId;
use crate::model::{KinshipEdge, KinshipKind, Person, WorldState};

/// Borrowed view over kinship edges and the person registry.
#[derive(Clone, Copy)]
pub struct KinshipGraph<'a> {
    edges: &'a [KinshipEdge],
    persons: &'a BTreeMap<PersonId, Person>,
}

impl<'a> KinshipGraph<'a> {
    pub fn new(edges: &'a [KinshipEdge], persons: &'a BTreeMap<PersonId, Person>) -> Self {
        Self { edges, persons }
    }

    pub fn of(world: &'a WorldState) -> Self {
        Self::new(&world.kinship, &world.persons)
    }

    fn is_alive(&self, id: PersonId) -> bool {
        self.persons.get(&id).is_some_and(|p| p.alive)
    }

    /// Every spouse ever recorded for `person`, living or not.
    pub fn spouses(&self, person: PersonId) -> Vec<PersonId> {
        let set: BTreeSet<PersonId> = self
            .edges
            .iter()
            .filter(|e| e.kind == KinshipKind::SpouseOf)
            .filter_map(|e| e.other(person))
            .collect();
        set.into_iter().collect()
    }

    /// The living spouse of a living person. A spousal edge is active only
    /// while both endpoints live.
    pub fn spouse_of(&self, person: PersonId) -> Option<PersonId> {
        if !self.is_alive(person) {
            return None;
        }
        self.spouses(person)
            .into_iter()
            .find(|s| self.is_alive(*s))
    }

    /// Married at least once and every recorded spouse is dead.
    pub fn is_widowed(&self, person: PersonId) -> bool {
        let spouses = self.spouses(person);
        !spouses.is_empty() && spouses.iter().all(|s| !self.is_alive(*s))
    }

    pub fn parents(&self, child: PersonId) -> Vec<PersonId> {
        let set: BTreeSet<PersonId> = self
            .edges
            .iter()
            .filter(|e| e.kind == KinshipKind::ParentOf && e.to == child)
            .map(|e| e.from)
            .collect();
        set.into_iter().collect()
    }

    pub fn children(&self, parent: PersonId) -> Vec<PersonId> {
        let set: BTreeSet<PersonId> = self
            .edges
            .iter()
            .filter(|e| e.kind == KinshipKind::ParentOf && e.from == parent)
            .map(|e| e.to)
            .collect();
        set.into_iter().collect()
    }

    /// Persons sharing at least one parent with `person`, excluding itself.
    pub fn siblings(&self, person: PersonId) -> Vec<PersonId> {
        let mut set = BTreeSet::new();
        for parent in self.parents(person) {
            set.extend(self.children(parent));
        }
        set.remove(&person);
        set.into_iter().collect()
    }

    pub fn has_parent(&self, child: PersonId) -> bool {
        self.edges
            .iter()
            .any(|e| e.kind == KinshipKind::ParentOf && e.to == child)
    }

    /// Fail when any living person has more than one active spousal edge.
    /// Never corrects anything.
    pub fn assert_spouse_exclusivity(&self) -> SimResult<()> {
        let mut active: BTreeMap<PersonId, BTreeSet<PersonId>> = BTreeMap::new();
        for edge in self.edges.iter().filter(|e| e.kind == KinshipKind::SpouseOf) {
            if edge.from == edge.to {
                return Err(SimError::invariant(
                    "spouse_exclusivity",
                    format!("{} is recorded as their own spouse", edge.from),
                ));
            }
            if self.is_alive(edge.from) && self.is_alive(edge.to) {
                active.entry(edge.from).or_default().insert(edge.to);
                active.entry(edge.to).or_default().insert(edge.from);
            }
        }
        if let Some((person, spouses)) = active.iter().find(|(_, s)| s.len() > 1) {
            let list: Vec<String> = spouses.iter().map(|s| s.to_string()).collect();
            return Err(SimError::invariant(
                "spouse_exclusivity",
                format!("{person} has living spouses {}", list.join(", ")),
            ));
        }
        Ok(())
    }
}

/// Record a marriage. Fails without touching the graph if either side
/// already has a living spouse.
pub fn add_spouse(world: &mut WorldState, a: PersonId, b: PersonId) -> SimResult<()> {
    let graph = KinshipGraph::of(world);
    if a == b {
        return Err(SimError::invariant(
            "spouse_exclusivity",
            format!("{a} cannot marry themselves"),
        ));
    }
    for (p, other) in [(a, b), (b, a)] {
        if let Some(existing) = graph.spouse_of(p) {
            return Err(SimError::invariant(
                "spouse_exclusivity",
                format!("{p} is already married to {existing}, cannot marry {other}"),
            ));
        }
    }
    let turn = world.turn;
    world.kinship.push(KinshipEdge::spouse_of(a, b, turn));
    world.person_mut(a)?.married = true;
    world.person_mut(b)?.married = true;
    Ok(())
}

/// Record parentage. Only used at birth; never called for a child whose
/// parentage is already on record.
pub fn add_parent(world: &mut WorldState, parent: PersonId, child: PersonId) {
    let exists = world
        .kinship
        .iter()
        .any(|e| e.kind == KinshipKind::ParentOf && e.from == parent && e.to == child);
    if !exists {
        let turn = world.turn;
        world.kinship.push(KinshipEdge::parent_of(parent, child, turn));
    }
}

/// Bring the kinship registry in line with household records without
/// rewriting history.
///
/// For every house, children listed under the head gain `parent_of` edges
/// from the head and spouse only if they have no recorded parent at all;
/// a head/spouse pair with no spousal edge gains one if that keeps spouse
/// exclusivity. Existing edges are never removed or changed. Returns the
/// number of edges added.
pub fn sync_household(world: &mut WorldState) -> SimResult<usize> {
    let mut added = Vec::new();
    {
        let graph = KinshipGraph::of(world);
        for house in world.houses.values() {
            let Some(head) = house.head else { continue };
            let mut parents = vec![head];
            if let Some(spouse) = house.spouse {
                parents.push(spouse);
            }
            for child in &house.children {
                if !world.persons.contains_key(child) || graph.has_parent(*child) {
                    continue;
                }
                for parent in &parents {
                    added.push(KinshipEdge::parent_of(*parent, *child, world.turn));
                }
            }
            if let Some(spouse) = house.spouse {
                let recorded = graph.spouses(head).contains(&spouse);
                let both_alive = world.is_alive(head) && world.is_alive(spouse);
                let free = graph.spouse_of(head).is_none() && graph.spouse_of(spouse).is_none();
                if !recorded && (!both_alive || free) {
                    added.push(KinshipEdge::spouse_of(head, spouse, world.turn));
                }
            }
        }
    }
    let count = added.len();
    if count > 0 {
        debug!(edges = count, "kinship sync added corrective edges");
        world.kinship.extend(added);
    }
    KinshipGraph::of(world).assert_spouse_exclusivity()?;
    Ok(count)
}
