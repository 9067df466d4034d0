use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::id::PersonId;

use super::prospect::ProspectId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub offer: ProspectId,
    pub expires_turn: u32,
}

/// Short-lived locks keeping a marriage candidate or claimant in at most
/// one open offer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReservationLedger {
    #[serde(default)]
    entries: BTreeMap<PersonId, Reservation>,
    #[serde(default)]
    last_gc_turn: Option<u32>,
}

impl ReservationLedger {
    /// Last write wins.
    pub fn reserve(&mut self, candidate: PersonId, offer: ProspectId, expires_turn: u32) {
        self.entries.insert(
            candidate,
            Reservation {
                offer,
                expires_turn,
            },
        );
    }

    pub fn is_reserved(&self, candidate: PersonId, turn: u32) -> bool {
        self.entries
            .get(&candidate)
            .is_some_and(|r| turn <= r.expires_turn)
    }

    pub fn holder(&self, candidate: PersonId) -> Option<&Reservation> {
        self.entries.get(&candidate)
    }

    pub fn release(&mut self, candidate: PersonId) -> Option<Reservation> {
        self.entries.remove(&candidate)
    }

    /// Drop every reservation held by `offer`.
    pub fn release_offer(&mut self, offer: &ProspectId) -> Vec<PersonId> {
        let released: Vec<PersonId> = self
            .entries
            .iter()
            .filter(|(_, r)| &r.offer == offer)
            .map(|(id, _)| *id)
            .collect();
        for id in &released {
            self.entries.remove(id);
        }
        released
    }

    /// Remove all entries that expired before `turn`.
    ///
    /// Runs exactly once per turn, ahead of any offer window; a second call
    /// for the same turn is an invariant violation.
    pub fn gc(&mut self, turn: u32) -> SimResult<Vec<PersonId>> {
        if self.last_gc_turn.is_some_and(|t| t >= turn) {
            return Err(SimError::invariant(
                "reservation_gc_once_per_turn",
                format!("gc already ran for turn {turn}"),
            ));
        }
        let expired: Vec<PersonId> = self
            .entries
            .iter()
            .filter(|(_, r)| r.expires_turn < turn)
            .map(|(id, _)| *id)
            .collect();
        for id in &expired {
            self.entries.remove(id);
        }
        self.last_gc_turn = Some(turn);
        Ok(expired)
    }

    pub fn last_gc_turn(&self) -> Option<u32> {
        self.last_gc_turn
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PersonId, &Reservation)> {
        self.entries.iter()
    }
}
