//! The turn pipeline: a fixed sequence of stages over a projection of the
//! world, then decisions and turn close on commit.

mod close;
mod consumption;
mod context;
mod decisions;
mod demography;
mod drift;
mod engine;
mod environment;
mod events;
mod household;
mod labor;
mod normalize;
mod obligations;
mod production;
mod runner;
mod stage;
mod summary;
mod upkeep;
mod windows;

pub use close::close_turn;
pub use consumption::{Consumption, Shortage};
pub use context::TurnContext;
pub use decisions::{LEVY_REFUSAL_UNREST, apply_decisions};
pub use demography::WorldDemography;
pub use drift::{Drift, drift_toward};
pub use engine::{TurnEngine, TurnPreview};
pub use environment::Environment;
pub use events::Events;
pub use household::{Household, household_scope};
pub use labor::clamp_labor;
pub use normalize::Normalize;
pub use obligations::Obligations;
pub use production::{Production, steward_bonus};
pub use runner::run_turns;
pub use stage::TurnStage;
pub use summary::{MAX_DRIVERS, Summary, current_roles, top_drivers};
pub use upkeep::Upkeep;
pub use windows::Windows;
