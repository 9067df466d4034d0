use serde::{Deserialize, Serialize};

use crate::id::{HouseId, PersonId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Sex {
    Male,
    Female,
}

string_enum!(Sex {
    Male => "male",
    Female => "female",
});

impl Sex {
    pub fn opposite(self) -> Sex {
        match self {
            Sex::Male => Sex::Female,
            Sex::Female => Sex::Male,
        }
    }
}

pub const TRAIT_MIN: u8 = 1;
pub const TRAIT_MAX: u8 = 5;

/// Five bounded aptitudes, each `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Traits {
    pub stewardship: u8,
    pub martial: u8,
    pub diplomacy: u8,
    pub intrigue: u8,
    pub piety: u8,
}

impl Traits {
    pub fn uniform(value: u8) -> Self {
        let v = value.clamp(TRAIT_MIN, TRAIT_MAX);
        Self {
            stewardship: v,
            martial: v,
            diplomacy: v,
            intrigue: v,
            piety: v,
        }
    }

    /// Clamp every trait back into `1..=5`.
    pub fn clamp(&mut self) {
        for t in [
            &mut self.stewardship,
            &mut self.martial,
            &mut self.diplomacy,
            &mut self.intrigue,
            &mut self.piety,
        ] {
            *t = (*t).clamp(TRAIT_MIN, TRAIT_MAX);
        }
    }
}

impl Default for Traits {
    fn default() -> Self {
        Self::uniform(3)
    }
}

/// A person in the registry. Never deleted; death flips `alive`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub sex: Sex,
    pub age: u32,
    pub alive: bool,
    #[serde(default)]
    pub traits: Traits,
    #[serde(default)]
    pub married: bool,
    #[serde(default)]
    pub house: Option<HouseId>,
    #[serde(default)]
    pub born_turn: Option<u32>,
    #[serde(default)]
    pub died_turn: Option<u32>,
}

impl Person {
    pub fn new(id: PersonId, name: impl Into<String>, sex: Sex, age: u32) -> Self {
        Self {
            id,
            name: name.into(),
            sex,
            age,
            alive: true,
            traits: Traits::default(),
            married: false,
            house: None,
            born_turn: None,
            died_turn: None,
        }
    }

    pub fn with_house(mut self, house: HouseId) -> Self {
        self.house = Some(house);
        self
    }

    pub fn with_traits(mut self, traits: Traits) -> Self {
        self.traits = traits;
        self
    }

    pub fn is_adult(&self, coming_of_age: u32) -> bool {
        self.age >= coming_of_age
    }

    pub fn mark_dead(&mut self, turn: u32) {
        if self.alive {
            self.alive = false;
            self.died_turn = Some(turn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traits_clamp_into_range() {
        let mut t = Traits {
            stewardship: 0,
            martial: 9,
            diplomacy: 3,
            intrigue: 5,
            piety: 1,
        };
        t.clamp();
        assert_eq!(t.stewardship, 1);
        assert_eq!(t.martial, 5);
        assert_eq!(t.diplomacy, 3);
    }

    #[test]
    fn mark_dead_records_first_death_only() {
        let mut p = Person::new(PersonId(1), "Aldric", Sex::Male, 40);
        p.mark_dead(3);
        p.mark_dead(5);
        assert!(!p.alive);
        assert_eq!(p.died_turn, Some(3));
    }

    #[test]
    fn serializes_expected_shape() {
        let p = Person::new(PersonId(4), "Maren", Sex::Female, 22).with_house(HouseId(2));
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["id"], 4);
        assert_eq!(json["sex"], "female");
        assert_eq!(json["house"], 2);
        assert_eq!(json["traits"]["piety"], 3);
    }

    #[test]
    fn sex_rejects_unknown_strings() {
        assert!(serde_json::from_str::<Sex>("\"other\"").is_err());
        assert_eq!(Sex::Male.opposite(), Sex::Female);
    }
}
