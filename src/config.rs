//! Balance configuration.
//!
//! Every tunable number the turn pipeline reads lives here. Defaults are the
//! shipped balance; a `tuning.toml` may override any subset of fields.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SimResult;

/// Default tuning file path.
pub const DEFAULT_TUNING_PATH: &str = "tuning.toml";

/// Top-level balance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Balance {
    pub calendar: CalendarConfig,
    pub economy: EconomyConfig,
    pub obligations: ObligationConfig,
    pub household: HouseholdConfig,
    pub prospects: ProspectConfig,
    pub relations: RelationConfig,
}

/// Turn length and per-turn budgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Simulated years per turn.
    pub turn_years: u32,
    pub actions_per_turn: u32,
}

/// Production, consumption, storage and market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub bushels_per_farmer: u32,
    pub progress_per_builder: u32,
    pub peasant_ration: u32,
    pub court_ration: u32,
    pub spoilage_rate: f64,
    pub price_min: f64,
    pub price_max: f64,
    pub sell_cap_fraction: f64,
    pub market_depth: u32,
    /// Minimum per-turn labor shift cap; the cap is `max(this, population / 2)`.
    pub labor_shift_floor: u32,
    pub shortage_unrest_base: i32,
    pub shortage_unrest_scale: f64,
    pub stable_unrest_decay: i32,
}

/// Dues owed to the liege.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObligationConfig {
    pub base_coin_due: i64,
    pub bushels_due_per_head: f64,
    pub arrears_interest: f64,
    pub arrears_unrest: i32,
    /// A war levy is demanded when `turn % interval == interval - 1`.
    pub war_levy_interval: u32,
    pub war_levy_men: u32,
    pub war_levy_coin: i64,
}

/// Births, deaths and marriages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HouseholdConfig {
    pub base_birth_chance: f64,
    /// Nobody survives a turn at or past this age.
    pub max_age: u32,
    pub coming_of_age: u32,
    pub marriage_min_age: u32,
    pub marriage_max_age: u32,
    pub dowry: i64,
}

/// Time-boxed offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProspectConfig {
    /// Turns an offer stays open after the turn it was generated in.
    pub ttl_turns: u32,
    pub max_active: usize,
    pub claim_cost: i64,
    pub grant_min: i64,
    pub grant_max: i64,
}

/// Relationship baselines and drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationConfig {
    pub drift_rate: f64,
    pub baseline_allegiance: i32,
    pub baseline_respect: i32,
    pub baseline_threat: i32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            turn_years: 3,
            actions_per_turn: 2,
        }
    }
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            bushels_per_farmer: 10,
            progress_per_builder: 1,
            peasant_ration: 4,
            court_ration: 5,
            spoilage_rate: 0.05,
            price_min: 0.25,
            price_max: 0.45,
            sell_cap_fraction: 0.5,
            market_depth: 80,
            labor_shift_floor: 4,
            shortage_unrest_base: 8,
            shortage_unrest_scale: 20.0,
            stable_unrest_decay: 2,
        }
    }
}

impl Default for ObligationConfig {
    fn default() -> Self {
        Self {
            base_coin_due: 6,
            bushels_due_per_head: 1.0,
            arrears_interest: 0.10,
            arrears_unrest: 3,
            war_levy_interval: 4,
            war_levy_men: 2,
            war_levy_coin: 8,
        }
    }
}

impl Default for HouseholdConfig {
    fn default() -> Self {
        Self {
            base_birth_chance: 0.45,
            max_age: 95,
            coming_of_age: 16,
            marriage_min_age: 16,
            marriage_max_age: 45,
            dowry: 5,
        }
    }
}

impl Default for ProspectConfig {
    fn default() -> Self {
        Self {
            ttl_turns: 2,
            max_active: 3,
            claim_cost: 6,
            grant_min: 2,
            grant_max: 12,
        }
    }
}

impl Default for RelationConfig {
    fn default() -> Self {
        Self {
            drift_rate: 0.2,
            baseline_allegiance: 50,
            baseline_respect: 50,
            baseline_threat: 20,
        }
    }
}

impl RelationConfig {
    /// `(allegiance, respect, threat)` an edge drifts back toward.
    pub fn baseline(&self) -> (i32, i32, i32) {
        (
            self.baseline_allegiance,
            self.baseline_respect,
            self.baseline_threat,
        )
    }
}

impl Balance {
    /// Parse a (possibly partial) TOML document over the defaults.
    pub fn from_toml_str(text: &str) -> SimResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load balance from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Configuration for one simulated run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub seed: u64,
    pub balance: Balance,
}

impl SimConfig {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            balance: Balance::default(),
        }
    }

    pub fn with_balance(mut self, balance: Balance) -> Self {
        self.balance = balance;
        self
    }
}
