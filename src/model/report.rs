//! The structured turn report: what changed this turn and why.

use serde::{Deserialize, Serialize};

use crate::id::{HouseId, PersonId};

use super::estate::{Arrears, Dues, WarLevyChoice};
use super::house::{OfficerPost, Tier};
use super::person::Sex;
use super::prospect::{ProspectId, ProspectKind};
use super::world::GameOver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum WeatherKind {
    Blight,
    Poor,
    Fair,
    Bountiful,
}

string_enum!(WeatherKind {
    Blight => "blight",
    Poor => "poor",
    Fair => "fair",
    Bountiful => "bountiful",
});

impl WeatherKind {
    pub fn multiplier(self) -> f64 {
        match self {
            WeatherKind::Blight => 0.70,
            WeatherKind::Poor => 0.85,
            WeatherKind::Fair => 1.00,
            WeatherKind::Bountiful => 1.15,
        }
    }

    pub fn weight(self) -> f64 {
        match self {
            WeatherKind::Blight => 1.0,
            WeatherKind::Poor => 2.0,
            WeatherKind::Fair => 4.0,
            WeatherKind::Bountiful => 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub kind: WeatherKind,
    pub multiplier: f64,
}

impl Default for WeatherReport {
    fn default() -> Self {
        Self {
            kind: WeatherKind::Fair,
            multiplier: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MarketReport {
    /// Coin per bushel.
    pub price: f64,
    pub sell_cap: i64,
    #[serde(default)]
    pub sold: i64,
    #[serde(default)]
    pub income: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductionReport {
    pub farmers: u32,
    pub harvest: i64,
    pub bonus_mult: f64,
    pub construction_progress: u32,
    pub completed: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ShortageReport {
    pub deficit: i64,
    pub severity: f64,
    pub lost: u32,
    pub deaths: u32,
    pub fled: u32,
    pub unrest: i32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConsumptionReport {
    pub spoilage: i64,
    pub court_size: u32,
    pub population_need: i64,
    pub court_need: i64,
    pub consumed: i64,
    pub shortage: Option<ShortageReport>,
}

impl ConsumptionReport {
    pub fn total_need(&self) -> i64 {
        self.population_need + self.court_need
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObligationsReport {
    pub due: Dues,
    pub arrears_before: Arrears,
    pub interest: Arrears,
    pub paid_coin: i64,
    pub paid_bushels: i64,
    pub levy_choice: Option<WarLevyChoice>,
    pub arrears_after: Arrears,
    /// Set at close; `None` in a preview.
    pub compliant: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VitalsReport {
    pub household_births: u32,
    pub household_deaths: u32,
    pub world_births: u32,
    pub world_deaths: u32,
    pub peasant_deaths: u32,
    pub peasant_fled: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LaborReport {
    pub requested_farmers: u32,
    pub requested_builders: u32,
    pub available: u32,
    pub farmers: u32,
    pub builders: u32,
    pub was_oversubscribed: bool,
    pub auto_clamped: bool,
}

impl LaborReport {
    pub fn assigned(&self) -> u32 {
        self.farmers + self.builders
    }
}

/// One of the largest resource movements of the turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub label: String,
    /// Signed change in bushels-equivalent.
    pub impact: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum LifeEventKind {
    Birth,
    Death,
    Marriage,
    Widowed,
    Succession,
    ComingOfAge,
    OfficerAppointed,
    Extinction,
}

string_enum!(LifeEventKind {
    Birth => "birth",
    Death => "death",
    Marriage => "marriage",
    Widowed => "widowed",
    Succession => "succession",
    ComingOfAge => "coming_of_age",
    OfficerAppointed => "officer_appointed",
    Extinction => "extinction",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifeEvent {
    pub turn: u32,
    pub kind: LifeEventKind,
    pub house: Option<HouseId>,
    pub person: Option<PersonId>,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiredEvent {
    pub id: String,
    pub category: String,
    pub weight: f64,
    pub summary: String,
    /// Net coin and bushels the event moved.
    #[serde(default)]
    pub impact: i64,
    /// How the event came to fire: roll, weight, contributing conditions.
    pub why: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum UnrestSource {
    Arrears,
    Shortage,
    Event,
    Stability,
    Levy,
    Improvement,
}

string_enum!(UnrestSource {
    Arrears => "arrears",
    Shortage => "shortage",
    Event => "event",
    Stability => "stability",
    Levy => "levy",
    Improvement => "improvement",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnrestDelta {
    pub source: UnrestSource,
    pub amount: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Role {
    Head,
    Spouse,
    Heir,
    Child,
    Court,
    Officer,
}

string_enum!(Role {
    Head => "head",
    Spouse => "spouse",
    Heir => "heir",
    Child => "child",
    Court => "court",
    Officer => "officer",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Badge {
    Deceased,
    Widowed,
    Newborn,
    ComingOfAge,
    Married,
}

string_enum!(Badge {
    Deceased => "deceased",
    Widowed => "widowed",
    Newborn => "newborn",
    ComingOfAge => "coming_of_age",
    Married => "married",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRow {
    pub person: PersonId,
    pub name: String,
    pub sex: Sex,
    pub age: u32,
    pub role: Role,
    #[serde(default)]
    pub post: Option<OfficerPost>,
    #[serde(default)]
    pub badges: Vec<Badge>,
}

impl RosterRow {
    pub fn has_badge(&self, badge: Badge) -> bool {
        self.badges.contains(&badge)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRow {
    pub person: PersonId,
    pub name: String,
    pub age: u32,
    pub house: HouseId,
    pub tier: Tier,
    pub proximity: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarriageWindow {
    pub subject: PersonId,
    pub shown: Vec<CandidateRow>,
    pub hidden: Vec<PersonId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProspectRow {
    pub id: ProspectId,
    pub kind: ProspectKind,
    pub summary: String,
    pub expires_turn: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProspectsWindow {
    pub shown: Vec<ProspectRow>,
    pub hidden: Vec<ProspectId>,
    /// Offers generated, expired or resolved this turn, in order.
    #[serde(default)]
    pub log: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum DecisionKind {
    Labor,
    Sell,
    Construction,
    Marriage,
    Prospect,
    Obligations,
}

string_enum!(DecisionKind {
    Labor => "labor",
    Sell => "sell",
    Construction => "construction",
    Marriage => "marriage",
    Prospect => "prospect",
    Obligations => "obligations",
});

/// A decision that could not be applied as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionNote {
    pub decision: DecisionKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TurnReport {
    pub turn: u32,
    pub weather: WeatherReport,
    pub market: MarketReport,
    pub production: ProductionReport,
    pub consumption: ConsumptionReport,
    pub obligations: ObligationsReport,
    pub vitals: VitalsReport,
    pub labor: LaborReport,
    pub drivers: Vec<Driver>,
    pub life_events: Vec<LifeEvent>,
    pub fired_events: Vec<FiredEvent>,
    pub unrest_before: i32,
    pub unrest_after: i32,
    pub unrest: Vec<UnrestDelta>,
    pub household: Vec<RosterRow>,
    pub court: Vec<RosterRow>,
    pub marriage_window: Option<MarriageWindow>,
    pub prospects_window: Option<ProspectsWindow>,
    #[serde(default)]
    pub notes: Vec<DecisionNote>,
    #[serde(default)]
    pub game_over: Option<GameOver>,
}

impl TurnReport {
    pub fn new(turn: u32) -> Self {
        Self {
            turn,
            ..Self::default()
        }
    }

    pub fn note(&mut self, decision: DecisionKind, message: impl Into<String>) {
        self.notes.push(DecisionNote {
            decision,
            message: message.into(),
        });
    }

    pub fn add_unrest(&mut self, source: UnrestSource, amount: i32) {
        if amount != 0 {
            self.unrest.push(UnrestDelta { source, amount });
        }
    }

    pub fn unrest_total(&self) -> i32 {
        self.unrest.iter().map(|u| u.amount).sum()
    }

    pub fn roster_row(&self, person: PersonId) -> Option<&RosterRow> {
        self.household
            .iter()
            .chain(self.court.iter())
            .find(|r| r.person == person)
    }
}
