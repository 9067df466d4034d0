use tracing::{debug, info, info_span};

use super::close::close_turn;
use super::consumption::{Consumption, Shortage};
use super::context::TurnContext;
use super::decisions::apply_decisions;
use super::demography::WorldDemography;
use super::drift::Drift;
use super::environment::Environment;
use super::events::Events;
use super::household::Household;
use super::normalize::Normalize;
use super::obligations::Obligations;
use super::production::Production;
use super::stage::TurnStage;
use super::summary::{Summary, summarize};
use super::upkeep::Upkeep;
use super::windows::Windows;
use crate::config::Balance;
use crate::content::Content;
use crate::error::{SimError, SimResult};
use crate::model::{Decisions, StateSnapshot, TurnLogEntry, TurnReport, WorldState};

/// Result of a preview: the report and the state the turn would leave
/// behind if committed without decisions. Never written back.
#[derive(Debug, Clone)]
pub struct TurnPreview {
    pub report: TurnReport,
    pub projected: WorldState,
}

/// Runs turns: a read-only preview, or a commit that applies decisions,
/// closes the turn and appends one log entry.
pub struct TurnEngine {
    balance: Balance,
    content: Content,
    stages: Vec<Box<dyn TurnStage>>,
}

impl TurnEngine {
    pub fn new(balance: Balance) -> Self {
        Self::with_content(balance, Content::standard())
    }

    pub fn with_content(balance: Balance, content: Content) -> Self {
        Self {
            balance,
            content,
            stages: Self::standard_stages(),
        }
    }

    /// The fixed stage order.
    pub fn standard_stages() -> Vec<Box<dyn TurnStage>> {
        vec![
            Box::new(Upkeep),
            Box::new(Environment),
            Box::new(Production),
            Box::new(Obligations),
            Box::new(Drift),
            Box::new(WorldDemography),
            Box::new(Household),
            Box::new(Consumption),
            Box::new(Shortage),
            Box::new(Events),
            Box::new(Normalize),
            Box::new(Windows),
            Box::new(Summary),
        ]
    }

    pub fn balance(&self) -> &Balance {
        &self.balance
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    fn run_stages(&self, ctx: &mut TurnContext) -> SimResult<()> {
        for stage in &self.stages {
            debug!(stage = stage.name(), "stage");
            stage.run(ctx)?;
        }
        Ok(())
    }

    /// Resolve the next turn on a projection. `world` is untouched.
    pub fn preview(&self, world: &WorldState) -> SimResult<TurnPreview> {
        if world.is_over() {
            return Err(SimError::RunEnded);
        }
        let _span = info_span!("preview", turn = world.turn).entered();
        let mut projected = world.projection();
        let mut ctx = TurnContext::new(&mut projected, &self.balance, &self.content);
        self.run_stages(&mut ctx)?;
        let report = ctx.report;
        Ok(TurnPreview { report, projected })
    }

    /// Resolve the next turn again from `world`, apply `decisions`, close
    /// the turn and append its log entry. On error `world` is unchanged.
    pub fn commit(&self, world: &mut WorldState, decisions: &Decisions) -> SimResult<TurnReport> {
        if world.is_over() {
            return Err(SimError::RunEnded);
        }
        let turn = world.turn;
        let _span = info_span!("commit", turn).entered();
        let before = StateSnapshot::capture(world);
        let mut projected = world.projection();

        let mut ctx = TurnContext::new(&mut projected, &self.balance, &self.content);
        self.run_stages(&mut ctx)?;
        apply_decisions(&mut ctx, decisions)?;
        close_turn(&mut ctx)?;
        summarize(&mut ctx)?;
        let report = ctx.report;

        let after = StateSnapshot::capture(&projected);
        projected.log.push(TurnLogEntry {
            turn,
            decisions: decisions.clone(),
            report: report.clone(),
            before,
            after,
        });
        if !projected.is_over() {
            projected.turn += 1;
        }
        info!(
            coin = projected.estate.coin,
            bushels = projected.estate.bushels,
            unrest = projected.estate.unrest,
            over = projected.is_over(),
            "turn committed"
        );
        *world = projected;
        Ok(report)
    }
}

impl Default for TurnEngine {
    fn default() -> Self {
        Self::new(Balance::default())
    }
}
