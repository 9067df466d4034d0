use serde::{Deserialize, Serialize};

use crate::id::PersonId;

pub const SCORE_MIN: i32 = 0;
pub const SCORE_MAX: i32 = 100;

/// Directed attitude of `from` toward `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipEdge {
    pub from: PersonId,
    pub to: PersonId,
    pub allegiance: i32,
    pub respect: i32,
    pub threat: i32,
    /// Turn of the last explicit adjustment; drift skips recently touched edges.
    #[serde(default)]
    pub last_adjusted: Option<u32>,
}

/// Signed change to a relationship edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RelationshipDelta {
    pub allegiance: i32,
    pub respect: i32,
    pub threat: i32,
}

impl RelationshipDelta {
    pub fn new(allegiance: i32, respect: i32, threat: i32) -> Self {
        Self {
            allegiance,
            respect,
            threat,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.allegiance == 0 && self.respect == 0 && self.threat == 0
    }
}

impl RelationshipEdge {
    pub fn new(from: PersonId, to: PersonId, allegiance: i32, respect: i32, threat: i32) -> Self {
        Self {
            from,
            to,
            allegiance,
            respect,
            threat,
            last_adjusted: None,
        }
    }

    /// Apply an explicit adjustment, clamp, and stamp the turn.
    pub fn adjust(&mut self, delta: RelationshipDelta, turn: u32) {
        self.allegiance += delta.allegiance;
        self.respect += delta.respect;
        self.threat += delta.threat;
        self.clamp();
        self.last_adjusted = Some(turn);
    }

    pub fn clamp(&mut self) {
        self.allegiance = self.allegiance.clamp(SCORE_MIN, SCORE_MAX);
        self.respect = self.respect.clamp(SCORE_MIN, SCORE_MAX);
        self.threat = self.threat.clamp(SCORE_MIN, SCORE_MAX);
    }

    /// Adjusted this turn or the one before.
    pub fn recently_adjusted(&self, turn: u32) -> bool {
        self.last_adjusted.is_some_and(|t| t + 1 >= turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjust_clamps_and_stamps() {
        let mut e = RelationshipEdge::new(PersonId(1), PersonId(2), 95, 3, 50);
        e.adjust(RelationshipDelta::new(10, -5, 0), 4);
        assert_eq!(e.allegiance, 100);
        assert_eq!(e.respect, 0);
        assert_eq!(e.last_adjusted, Some(4));
    }

    #[test]
    fn recently_adjusted_window() {
        let mut e = RelationshipEdge::new(PersonId(1), PersonId(2), 50, 50, 20);
        assert!(!e.recently_adjusted(3));
        e.last_adjusted = Some(2);
        assert!(e.recently_adjusted(2));
        assert!(e.recently_adjusted(3));
        assert!(!e.recently_adjusted(4));
    }

    #[test]
    fn null_last_adjusted_deserializes_when_missing() {
        let json = r#"{"from":1,"to":2,"allegiance":50,"respect":40,"threat":10}"#;
        let e: RelationshipEdge = serde_json::from_str(json).unwrap();
        assert_eq!(e.last_adjusted, None);
    }
}
