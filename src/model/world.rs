use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::estate::Estate;
use super::flags::TuningFlags;
use super::house::House;
use super::kinship::KinshipEdge;
use super::log::TurnLogEntry;
use super::person::Person;
use super::prospect::ProspectBook;
use super::relationship::{RelationshipDelta, RelationshipEdge};
use super::reservation::ReservationLedger;
use crate::error::{SimError, SimResult};
use crate::id::{HouseId, IdGenerator, PersonId};

/// Current persisted layout. Older payloads go through `migrate` first.
pub const SCHEMA_VERSION: u32 = 2;

/// Terminal states. Once set, the run accepts no further turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum GameOver {
    /// The player house has no living heir.
    Extinct,
    /// Unrest reached its maximum.
    Dispossessed,
}

string_enum!(GameOver {
    Extinct => "extinct",
    Dispossessed => "dispossessed",
});

/// The single owned aggregate of durable run state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    pub schema_version: u32,
    pub seed: u64,
    /// Index of the next turn to resolve.
    pub turn: u32,
    pub ids: IdGenerator,
    pub persons: BTreeMap<PersonId, Person>,
    pub houses: BTreeMap<HouseId, House>,
    #[serde(default)]
    pub kinship: Vec<KinshipEdge>,
    #[serde(default)]
    pub relationships: Vec<RelationshipEdge>,
    pub estate: Estate,
    #[serde(default)]
    pub flags: TuningFlags,
    #[serde(default)]
    pub reservations: ReservationLedger,
    #[serde(default)]
    pub prospects: ProspectBook,
    pub player_house: HouseId,
    pub liege_house: HouseId,
    #[serde(default)]
    pub game_over: Option<GameOver>,
    #[serde(default)]
    pub log: Vec<TurnLogEntry>,
}

impl WorldState {
    /// Empty world. Houses and persons are added by genesis or by hand.
    pub fn new(seed: u64) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            seed,
            turn: 0,
            ids: IdGenerator::new(),
            persons: BTreeMap::new(),
            houses: BTreeMap::new(),
            kinship: Vec::new(),
            relationships: Vec::new(),
            estate: Estate::default(),
            flags: TuningFlags::default(),
            reservations: ReservationLedger::default(),
            prospects: ProspectBook::default(),
            player_house: HouseId(0),
            liege_house: HouseId(0),
            game_over: None,
            log: Vec::new(),
        }
    }

    /// Working copy for a preview or commit. Shares nothing with `self`.
    pub fn projection(&self) -> WorldState {
        self.clone()
    }

    pub fn is_over(&self) -> bool {
        self.game_over.is_some()
    }

    pub fn person(&self, id: PersonId) -> SimResult<&Person> {
        self.persons.get(&id).ok_or(SimError::UnknownPerson(id))
    }

    pub fn person_mut(&mut self, id: PersonId) -> SimResult<&mut Person> {
        self.persons.get_mut(&id).ok_or(SimError::UnknownPerson(id))
    }

    pub fn house(&self, id: HouseId) -> SimResult<&House> {
        self.houses.get(&id).ok_or(SimError::UnknownHouse(id))
    }

    pub fn house_mut(&mut self, id: HouseId) -> SimResult<&mut House> {
        self.houses.get_mut(&id).ok_or(SimError::UnknownHouse(id))
    }

    pub fn player(&self) -> SimResult<&House> {
        self.house(self.player_house)
    }

    pub fn player_mut(&mut self) -> SimResult<&mut House> {
        let id = self.player_house;
        self.house_mut(id)
    }

    pub fn is_alive(&self, id: PersonId) -> bool {
        self.persons.get(&id).is_some_and(|p| p.alive)
    }

    /// Register a person, allocating an id when it is still unset (0).
    pub fn add_person(&mut self, mut person: Person) -> PersonId {
        if person.id.0 == 0 {
            person.id = self.ids.next_person();
        } else {
            self.ids.bump_past(person.id.0);
        }
        let id = person.id;
        self.persons.insert(id, person);
        id
    }

    pub fn add_house(&mut self, mut house: House) -> HouseId {
        if house.id.0 == 0 {
            house.id = self.ids.next_house();
        } else {
            self.ids.bump_past(house.id.0);
        }
        let id = house.id;
        self.houses.insert(id, house);
        id
    }

    /// Head of the liege house, if living.
    pub fn liege_head(&self) -> Option<PersonId> {
        self.houses
            .get(&self.liege_house)
            .and_then(|h| h.head)
            .filter(|id| self.is_alive(*id))
    }

    pub fn relationship(&self, from: PersonId, to: PersonId) -> Option<&RelationshipEdge> {
        self.relationships
            .iter()
            .find(|e| e.from == from && e.to == to)
    }

    /// Apply an explicit adjustment, creating the edge at baseline when absent.
    pub fn adjust_relationship(
        &mut self,
        from: PersonId,
        to: PersonId,
        delta: RelationshipDelta,
        baseline: (i32, i32, i32),
    ) {
        let turn = self.turn;
        if let Some(edge) = self
            .relationships
            .iter_mut()
            .find(|e| e.from == from && e.to == to)
        {
            edge.adjust(delta, turn);
            return;
        }
        let mut edge = RelationshipEdge::new(from, to, baseline.0, baseline.1, baseline.2);
        edge.adjust(delta, turn);
        self.relationships.push(edge);
    }

    /// Living persons affiliated with `house`, in id order.
    pub fn living_in_house(&self, house: HouseId) -> Vec<PersonId> {
        self.persons
            .values()
            .filter(|p| p.alive && p.house == Some(house))
            .map(|p| p.id)
            .collect()
    }
}
