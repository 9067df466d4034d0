#[macro_use]
mod macros;

pub mod config;
pub mod content;
pub mod demography;
pub mod error;
pub mod genesis;
pub mod household;
pub mod id;
pub mod kinship;
pub mod marriage;
pub mod migrate;
pub mod model;
pub mod persist;
pub mod prospects;
pub mod rng;
pub mod sim;
pub mod testutil;

pub use config::{Balance, SimConfig};
pub use error::{SimError, SimResult};
pub use genesis::genesis;
pub use id::{HouseId, IdGenerator, PersonId};
pub use model::{Decisions, TurnReport, WorldState};
pub use sim::{TurnEngine, TurnPreview, run_turns};
