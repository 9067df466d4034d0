use serde::{Deserialize, Serialize};

use crate::id::PersonId;

/// Kinship facts. Closed set: nothing else is a kinship edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum KinshipKind {
    /// Directed parent → child.
    ParentOf,
    /// Symmetric; stored once with `from < to`.
    SpouseOf,
}

string_enum!(KinshipKind {
    ParentOf => "parent_of",
    SpouseOf => "spouse_of",
});

/// An append-only kinship fact. Edges are never rewritten or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KinshipEdge {
    pub kind: KinshipKind,
    pub from: PersonId,
    pub to: PersonId,
    #[serde(default)]
    pub since_turn: u32,
}

impl KinshipEdge {
    pub fn parent_of(parent: PersonId, child: PersonId, since_turn: u32) -> Self {
        Self {
            kind: KinshipKind::ParentOf,
            from: parent,
            to: child,
            since_turn,
        }
    }

    /// Build a spousal edge with endpoints in canonical order.
    pub fn spouse_of(a: PersonId, b: PersonId, since_turn: u32) -> Self {
        let (from, to) = if a <= b { (a, b) } else { (b, a) };
        Self {
            kind: KinshipKind::SpouseOf,
            from,
            to,
            since_turn,
        }
    }

    pub fn involves(&self, person: PersonId) -> bool {
        self.from == person || self.to == person
    }

    /// The endpoint that is not `person`, if `person` is on this edge.
    pub fn other(&self, person: PersonId) -> Option<PersonId> {
        if self.from == person {
            Some(self.to)
        } else if self.to == person {
            Some(self.from)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spouse_edge_is_canonical() {
        let a = KinshipEdge::spouse_of(PersonId(9), PersonId(2), 0);
        let b = KinshipEdge::spouse_of(PersonId(2), PersonId(9), 0);
        assert_eq!(a, b);
        assert_eq!(a.from, PersonId(2));
    }

    #[test]
    fn other_endpoint() {
        let e = KinshipEdge::parent_of(PersonId(1), PersonId(4), 2);
        assert_eq!(e.other(PersonId(1)), Some(PersonId(4)));
        assert_eq!(e.other(PersonId(4)), Some(PersonId(1)));
        assert_eq!(e.other(PersonId(5)), None);
    }

    #[test]
    fn serializes_expected_shape() {
        let e = KinshipEdge::parent_of(PersonId(1), PersonId(2), 3);
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["kind"], "parent_of");
        assert_eq!(json["from"], 1);
        assert_eq!(json["to"], 2);
        assert_eq!(json["since_turn"], 3);
    }
}
