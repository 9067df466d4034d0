pub mod decisions;
pub mod estate;
pub mod flags;
pub mod house;
pub mod kinship;
pub mod log;
pub mod person;
pub mod prospect;
pub mod relationship;
pub mod report;
pub mod reservation;
pub mod world;

pub use decisions::{
    ConstructionAction, Decisions, LaborPlan, MarriageAction, ObligationPayment,
    ProspectResolution,
};
pub use estate::{Arrears, Dues, Estate, LevyDemand, Project, UNREST_MAX, WarLevyChoice};
pub use flags::{OneShot, StandingFlag, TuningFlags};
pub use house::{House, OfficerPost, Tier};
pub use kinship::{KinshipEdge, KinshipKind};
pub use log::{StateSnapshot, TurnLogEntry};
pub use person::{Person, Sex, TRAIT_MAX, TRAIT_MIN, Traits};
pub use prospect::{
    Confidence, DecidedProspect, PredictedEffects, Prospect, ProspectAction, ProspectBook,
    ProspectId, ProspectKind, ProspectOutcome, RelationshipChange, Requirements,
};
pub use relationship::{RelationshipDelta, RelationshipEdge, SCORE_MAX, SCORE_MIN};
pub use report::{
    Badge, CandidateRow, ConsumptionReport, DecisionKind, DecisionNote, Driver, FiredEvent,
    LaborReport, LifeEvent, LifeEventKind, MarketReport, MarriageWindow, ObligationsReport,
    ProductionReport, ProspectRow, ProspectsWindow, Role, RosterRow, ShortageReport, TurnReport,
    UnrestDelta, UnrestSource, VitalsReport, WeatherKind, WeatherReport,
};
pub use reservation::{Reservation, ReservationLedger};
pub use world::{GameOver, SCHEMA_VERSION, WorldState};
