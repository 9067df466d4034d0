use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::{HouseId, PersonId};

use super::flags::StandingFlag;
use super::relationship::RelationshipDelta;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ProspectKind {
    Marriage,
    Grant,
    InheritanceClaim,
}

string_enum!(ProspectKind {
    Marriage => "marriage",
    Grant => "grant",
    InheritanceClaim => "inheritance_claim",
});

/// Offer identifier: `<kind>-t<turn>`. At most one offer of a kind is
/// generated per turn, so the pair is unique for the life of a run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProspectId(pub String);

impl ProspectId {
    pub fn new(kind: ProspectKind, turn: u32) -> Self {
        Self(format!("{kind}-t{turn}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProspectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProspectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ProspectAction {
    Accept,
    Reject,
}

string_enum!(ProspectAction {
    Accept => "accept",
    Reject => "reject",
});

/// How sure the court is that the predicted effects will land as stated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

string_enum!(Confidence {
    Low => "low",
    Medium => "medium",
    High => "high",
});

/// A relationship change applied when an offer is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipChange {
    pub from: PersonId,
    pub to: PersonId,
    pub delta: RelationshipDelta,
}

/// Everything accepting an offer does, applied atomically.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PredictedEffects {
    #[serde(default)]
    pub coin_delta: i64,
    #[serde(default)]
    pub bushels_delta: i64,
    #[serde(default)]
    pub unrest_delta: i32,
    #[serde(default)]
    pub relationships: Vec<RelationshipChange>,
    #[serde(default)]
    pub flags: Vec<StandingFlag>,
}

/// Preconditions checked at acceptance time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Requirements {
    #[serde(default)]
    pub min_coin: i64,
    #[serde(default)]
    pub actions: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prospect {
    pub id: ProspectId,
    pub kind: ProspectKind,
    pub generated_turn: u32,
    /// Last turn on which the offer can be resolved.
    pub expires_turn: u32,
    /// Counterparty house, if any.
    pub house: Option<HouseId>,
    /// Player-side person the offer concerns.
    pub subject: Option<PersonId>,
    /// Person offered to the player: a spouse or a claimant. Reserved while
    /// the offer is active.
    pub candidate: Option<PersonId>,
    pub summary: String,
    pub requirements: Requirements,
    /// Coin paid on acceptance.
    pub cost: i64,
    pub effects: PredictedEffects,
    pub confidence: Confidence,
    pub allowed: Vec<ProspectAction>,
}

impl Prospect {
    pub fn is_active(&self, turn: u32) -> bool {
        turn <= self.expires_turn
    }

    pub fn is_expired(&self, turn: u32) -> bool {
        self.expires_turn < turn
    }

    pub fn allows(&self, action: ProspectAction) -> bool {
        self.allowed.contains(&action)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ProspectOutcome {
    Accepted,
    Rejected,
    Expired,
}

string_enum!(ProspectOutcome {
    Accepted => "accepted",
    Rejected => "rejected",
    Expired => "expired",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecidedProspect {
    pub kind: ProspectKind,
    pub outcome: ProspectOutcome,
    pub turn: u32,
}

/// Open offers plus the record of every offer ever closed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProspectBook {
    /// Open offers in generation order.
    #[serde(default)]
    pub active: Vec<Prospect>,
    #[serde(default)]
    pub decided: BTreeMap<ProspectId, DecidedProspect>,
}

impl ProspectBook {
    pub fn get(&self, id: &ProspectId) -> Option<&Prospect> {
        self.active.iter().find(|p| &p.id == id)
    }

    pub fn has_active_kind(&self, kind: ProspectKind) -> bool {
        self.active.iter().any(|p| p.kind == kind)
    }

    pub fn is_decided(&self, id: &ProspectId) -> bool {
        self.decided.contains_key(id)
    }

    /// Move an offer from `active` to `decided`. Returns the closed offer, or
    /// `None` when it was not open.
    pub fn close(
        &mut self,
        id: &ProspectId,
        outcome: ProspectOutcome,
        turn: u32,
    ) -> Option<Prospect> {
        let idx = self.active.iter().position(|p| &p.id == id)?;
        let prospect = self.active.remove(idx);
        self.decided.insert(
            prospect.id.clone(),
            DecidedProspect {
                kind: prospect.kind,
                outcome,
                turn,
            },
        );
        Some(prospect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(turn: u32, ttl: u32) -> Prospect {
        Prospect {
            id: ProspectId::new(ProspectKind::Grant, turn),
            kind: ProspectKind::Grant,
            generated_turn: turn,
            expires_turn: turn + ttl,
            house: None,
            subject: None,
            candidate: None,
            summary: String::new(),
            requirements: Requirements::default(),
            cost: 0,
            effects: PredictedEffects::default(),
            confidence: Confidence::High,
            allowed: vec![ProspectAction::Accept, ProspectAction::Reject],
        }
    }

    #[test]
    fn id_format() {
        assert_eq!(
            ProspectId::new(ProspectKind::InheritanceClaim, 7).as_str(),
            "inheritance_claim-t7"
        );
    }

    #[test]
    fn active_through_expiry_turn() {
        let p = grant(3, 2);
        assert!(p.is_active(5));
        assert!(!p.is_expired(5));
        assert!(p.is_expired(6));
    }

    #[test]
    fn close_moves_to_decided_once() {
        let mut book = ProspectBook::default();
        let p = grant(1, 2);
        let id = p.id.clone();
        book.active.push(p);
        assert!(book.close(&id, ProspectOutcome::Accepted, 1).is_some());
        assert!(book.close(&id, ProspectOutcome::Rejected, 1).is_none());
        assert_eq!(book.decided[&id].outcome, ProspectOutcome::Accepted);
        assert!(book.active.is_empty());
    }
}
