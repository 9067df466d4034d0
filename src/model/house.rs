use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::id::{HouseId, PersonId};

/// Coarse standing of a house. Lower rank = higher standing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Tier {
    Great,
    Noble,
    Minor,
}

string_enum!(Tier {
    Great => "great",
    Noble => "noble",
    Minor => "minor",
});

impl Tier {
    pub fn rank(self) -> u8 {
        match self {
            Tier::Great => 0,
            Tier::Noble => 1,
            Tier::Minor => 2,
        }
    }

    /// Great houses stay off-stage: their members are never rolled by the
    /// world demography pass.
    pub fn in_world_demography(self) -> bool {
        !matches!(self, Tier::Great)
    }

    /// Houses within one rank of each other can exchange marriages.
    pub fn can_marry_into(self, other: Tier) -> bool {
        self.rank().abs_diff(other.rank()) <= 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum OfficerPost {
    Steward,
    Marshal,
    Chaplain,
}

string_enum!(OfficerPost {
    Steward => "steward",
    Marshal => "marshal",
    Chaplain => "chaplain",
});

/// Aggregate view of a household: who leads it and who lives under its roof.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct House {
    pub id: HouseId,
    pub name: String,
    pub tier: Tier,
    /// 0 = neighbouring, 1 = regional, 2 = distant.
    #[serde(default)]
    pub proximity: u8,
    #[serde(default)]
    pub is_player: bool,
    pub head: Option<PersonId>,
    #[serde(default)]
    pub spouse: Option<PersonId>,
    /// Children of the current head living in the house.
    #[serde(default)]
    pub children: Vec<PersonId>,
    #[serde(default)]
    pub heir: Option<PersonId>,
    /// Heir taken in through an accepted claim; used only when no child qualifies.
    #[serde(default)]
    pub adopted_heir: Option<PersonId>,
    /// Retained members who are neither head, spouse nor the head's children.
    #[serde(default)]
    pub court: Vec<PersonId>,
    #[serde(default)]
    pub officers: BTreeMap<OfficerPost, PersonId>,
}

impl House {
    pub fn new(id: HouseId, name: impl Into<String>, tier: Tier) -> Self {
        Self {
            id,
            name: name.into(),
            tier,
            proximity: 0,
            is_player: false,
            head: None,
            spouse: None,
            children: Vec::new(),
            heir: None,
            adopted_heir: None,
            court: Vec::new(),
            officers: BTreeMap::new(),
        }
    }

    /// Add a retained court member if not already listed.
    pub fn retain_in_court(&mut self, person: PersonId) {
        if Some(person) == self.head || Some(person) == self.spouse {
            return;
        }
        if !self.court.contains(&person) && !self.children.contains(&person) {
            self.court.push(person);
            self.court.sort();
        }
    }

    /// Drop a person from every membership list (head excepted).
    pub fn remove_member(&mut self, person: PersonId) {
        self.children.retain(|c| *c != person);
        self.court.retain(|c| *c != person);
        if self.spouse == Some(person) {
            self.spouse = None;
        }
        if self.heir == Some(person) {
            self.heir = None;
        }
        if self.adopted_heir == Some(person) {
            self.adopted_heir = None;
        }
    }

    /// Every person id this house record mentions, sorted and deduplicated.
    pub fn member_ids(&self) -> Vec<PersonId> {
        let mut ids: Vec<PersonId> = self
            .head
            .iter()
            .chain(self.spouse.iter())
            .chain(self.children.iter())
            .chain(self.court.iter())
            .copied()
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}
