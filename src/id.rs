use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a person in the registry.
///
/// Numeric order is the canonical iteration order everywhere a decision
/// depends on ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub u64);

/// Stable identifier of a house.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HouseId(pub u64);

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

impl fmt::Display for HouseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{}", self.0)
    }
}

/// Monotonic ID generator shared by persons and houses.
/// Persisted with the world so ids are never reused across save/load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn starting_from(start: u64) -> Self {
        Self { next: start }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    pub fn next_person(&mut self) -> PersonId {
        PersonId(self.next_id())
    }

    pub fn next_house(&mut self) -> HouseId {
        HouseId(self.next_id())
    }

    /// Make sure future ids land above `floor`. Used after loading legacy
    /// payloads whose generator state was not recorded.
    pub fn bump_past(&mut self, floor: u64) {
        if self.next <= floor {
            self.next = floor + 1;
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids() {
        let mut id_gen = IdGenerator::new();
        assert_eq!(id_gen.next_id(), 1);
        assert_eq!(id_gen.next_person(), PersonId(2));
        assert_eq!(id_gen.next_house(), HouseId(3));
    }

    #[test]
    fn starting_from() {
        let mut id_gen = IdGenerator::starting_from(100);
        assert_eq!(id_gen.next_id(), 100);
        assert_eq!(id_gen.next_id(), 101);
    }

    #[test]
    fn bump_past_only_moves_forward() {
        let mut id_gen = IdGenerator::starting_from(50);
        id_gen.bump_past(10);
        assert_eq!(id_gen.next_id(), 50);
        id_gen.bump_past(70);
        assert_eq!(id_gen.next_id(), 71);
    }

    #[test]
    fn ids_serialize_as_bare_numbers() {
        assert_eq!(serde_json::to_string(&PersonId(7)).unwrap(), "7");
        let back: HouseId = serde_json::from_str("12").unwrap();
        assert_eq!(back, HouseId(12));
    }
}
