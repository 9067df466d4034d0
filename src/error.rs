use thiserror::Error;

use crate::id::{HouseId, PersonId};

/// Failures surfaced by the turn engine and the persistence boundary.
///
/// Invalid player decisions are not errors: they become notes on the turn
/// report. Only broken invariants, missing registry records and I/O reach
/// this type.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invariant `{invariant}` violated: {detail}")]
    InvariantViolation {
        invariant: &'static str,
        detail: String,
    },

    #[error("unknown person {0}")]
    UnknownPerson(PersonId),

    #[error("unknown house {0}")]
    UnknownHouse(HouseId),

    #[error("the run has already ended")]
    RunEnded,

    #[error("cannot migrate world payload: {0}")]
    Migration(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] toml::de::Error),
}

impl SimError {
    pub fn invariant(invariant: &'static str, detail: impl Into<String>) -> Self {
        SimError::InvariantViolation {
            invariant,
            detail: detail.into(),
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
