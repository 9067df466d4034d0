use serde::{Deserialize, Serialize};

use crate::id::PersonId;

use super::estate::WarLevyChoice;
use super::prospect::{ProspectAction, ProspectId};

/// Requested labor allocation for the coming turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaborPlan {
    pub farmers: u32,
    pub builders: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ConstructionAction {
    #[default]
    None,
    Start {
        improvement: String,
    },
    Abandon,
}

/// What the player does with the marriage window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MarriageAction {
    #[default]
    Pass,
    Arrange {
        candidate: PersonId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProspectResolution {
    pub id: ProspectId,
    pub action: ProspectAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObligationPayment {
    #[serde(default)]
    pub coin: i64,
    #[serde(default)]
    pub bushels: i64,
    #[serde(default)]
    pub war_levy: Option<WarLevyChoice>,
}

/// The decisions payload for one committed turn.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Decisions {
    /// `None` keeps the current allocation.
    #[serde(default)]
    pub labor: Option<LaborPlan>,
    #[serde(default)]
    pub sell_bushels: i64,
    #[serde(default)]
    pub construction: ConstructionAction,
    #[serde(default)]
    pub marriage: MarriageAction,
    #[serde(default)]
    pub prospects: Vec<ProspectResolution>,
    #[serde(default)]
    pub obligations: ObligationPayment,
}

impl Decisions {
    pub fn with_labor(mut self, farmers: u32, builders: u32) -> Self {
        self.labor = Some(LaborPlan { farmers, builders });
        self
    }

    pub fn sell(mut self, bushels: i64) -> Self {
        self.sell_bushels = bushels;
        self
    }

    pub fn start_construction(mut self, improvement: impl Into<String>) -> Self {
        self.construction = ConstructionAction::Start {
            improvement: improvement.into(),
        };
        self
    }

    pub fn arrange_marriage(mut self, candidate: PersonId) -> Self {
        self.marriage = MarriageAction::Arrange { candidate };
        self
    }

    pub fn accept(mut self, id: impl Into<ProspectId>) -> Self {
        self.prospects.push(ProspectResolution {
            id: id.into(),
            action: ProspectAction::Accept,
        });
        self
    }

    pub fn reject(mut self, id: impl Into<ProspectId>) -> Self {
        self.prospects.push(ProspectResolution {
            id: id.into(),
            action: ProspectAction::Reject,
        });
        self
    }

    pub fn pay(mut self, coin: i64, bushels: i64) -> Self {
        self.obligations.coin = coin;
        self.obligations.bushels = bushels;
        self
    }

    pub fn levy(mut self, choice: WarLevyChoice) -> Self {
        self.obligations.war_levy = Some(choice);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_is_default() {
        let d: Decisions = serde_json::from_str("{}").unwrap();
        assert_eq!(d, Decisions::default());
        assert_eq!(d.construction, ConstructionAction::None);
    }

    #[test]
    fn tagged_actions_parse() {
        let d: Decisions = serde_json::from_str(
            r#"{
                "construction": {"action": "start", "improvement": "mill"},
                "marriage": {"action": "arrange", "candidate": 12},
                "prospects": [{"id": "grant-t3", "action": "accept"}],
                "obligations": {"coin": 6, "war_levy": "pay_coin"}
            }"#,
        )
        .unwrap();
        assert_eq!(
            d.construction,
            ConstructionAction::Start {
                improvement: "mill".into()
            }
        );
        assert_eq!(
            d.marriage,
            MarriageAction::Arrange {
                candidate: PersonId(12)
            }
        );
        assert_eq!(d.prospects[0].action, ProspectAction::Accept);
        assert_eq!(d.obligations.war_levy, Some(WarLevyChoice::PayCoin));
    }

    #[test]
    fn builder_methods_chain() {
        let d = Decisions::default()
            .with_labor(8, 2)
            .sell(20)
            .accept("grant-t1")
            .reject("marriage-t1")
            .pay(6, 30);
        assert_eq!(d.labor, Some(LaborPlan { farmers: 8, builders: 2 }));
        assert_eq!(d.prospects.len(), 2);
        assert_eq!(d.obligations.bushels, 30);
    }
}
