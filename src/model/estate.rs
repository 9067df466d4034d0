use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub const UNREST_MAX: i32 = 100;

/// Dues in arrears, carried turn to turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Arrears {
    pub coin: i64,
    pub bushels: i64,
}

impl Arrears {
    pub fn is_clear(&self) -> bool {
        self.coin <= 0 && self.bushels <= 0
    }

    pub fn total(&self) -> i64 {
        self.coin.max(0) + self.bushels.max(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum WarLevyChoice {
    SendMen,
    PayCoin,
    Refuse,
}

string_enum!(WarLevyChoice {
    SendMen => "send_men",
    PayCoin => "pay_coin",
    Refuse => "refuse",
});

/// A war levy demanded by the liege this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevyDemand {
    pub men: u32,
    pub coin: i64,
}

/// What the liege expects this turn. Recomputed by the obligations stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dues {
    pub coin: i64,
    pub bushels: i64,
    #[serde(default)]
    pub war_levy: Option<LevyDemand>,
}

/// An improvement under construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub improvement: String,
    pub progress: u32,
}

/// Resource counters of the player estate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estate {
    pub coin: i64,
    pub bushels: i64,
    pub population: u32,
    pub farmers: u32,
    pub builders: u32,
    pub unrest: i32,
    #[serde(default)]
    pub arrears: Arrears,
    #[serde(default)]
    pub dues: Dues,
    #[serde(default)]
    pub project: Option<Project>,
    #[serde(default)]
    pub improvements: BTreeSet<String>,
    #[serde(default)]
    pub actions_remaining: u32,
}

impl Estate {
    pub fn has_improvement(&self, id: &str) -> bool {
        self.improvements.contains(id)
    }

    pub fn assigned_labor(&self) -> u32 {
        self.farmers + self.builders
    }

    /// Clamp bounded quantities: unrest into `0..=100`, stores non-negative.
    pub fn normalize(&mut self) {
        self.unrest = self.unrest.clamp(0, UNREST_MAX);
        self.coin = self.coin.max(0);
        self.bushels = self.bushels.max(0);
        self.arrears.coin = self.arrears.coin.max(0);
        self.arrears.bushels = self.arrears.bushels.max(0);
    }
}

impl Default for Estate {
    fn default() -> Self {
        Self {
            coin: 20,
            bushels: 150,
            population: 30,
            farmers: 20,
            builders: 4,
            unrest: 10,
            arrears: Arrears::default(),
            dues: Dues::default(),
            project: None,
            improvements: BTreeSet::new(),
            actions_remaining: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_clamps_bounds() {
        let mut e = Estate {
            unrest: 140,
            coin: -3,
            bushels: -1,
            ..Estate::default()
        };
        e.normalize();
        assert_eq!(e.unrest, 100);
        assert_eq!(e.coin, 0);
        assert_eq!(e.bushels, 0);
    }

    #[test]
    fn arrears_clear_and_total() {
        assert!(Arrears::default().is_clear());
        let a = Arrears {
            coin: 10,
            bushels: 4,
        };
        assert!(!a.is_clear());
        assert_eq!(a.total(), 14);
    }

    #[test]
    fn levy_choice_strings() {
        assert_eq!(WarLevyChoice::SendMen.as_str(), "send_men");
        let back: WarLevyChoice = serde_json::from_str("\"refuse\"").unwrap();
        assert_eq!(back, WarLevyChoice::Refuse);
    }
}
