use std::collections::BTreeMap;

use crate::config::Balance;
use crate::content::Content;
use crate::id::PersonId;
use crate::model::{OfficerPost, Role, TurnReport, UnrestSource, WorldState};
use crate::rng::{Channel, RngStream, Streams};

/// Everything a stage may touch while resolving one turn.
///
/// `world` is always a projection, never the durable state.
pub struct TurnContext<'a> {
    pub world: &'a mut WorldState,
    pub balance: &'a Balance,
    pub content: &'a Content,
    pub streams: Streams,
    pub report: TurnReport,
    /// Roles held in the player house when the turn opened, so members who
    /// die mid-turn still get a roster row.
    pub start_roles: BTreeMap<PersonId, (Role, Option<OfficerPost>)>,
}

impl<'a> TurnContext<'a> {
    pub fn new(world: &'a mut WorldState, balance: &'a Balance, content: &'a Content) -> Self {
        let streams = Streams::new(world.seed, world.turn);
        let report = TurnReport::new(world.turn);
        Self {
            world,
            balance,
            content,
            streams,
            report,
            start_roles: BTreeMap::new(),
        }
    }

    pub fn stream(&self, channel: Channel) -> RngStream {
        self.streams.channel(channel)
    }

    /// Move unrest and record the contribution.
    pub fn add_unrest(&mut self, source: UnrestSource, amount: i32) {
        self.world.estate.unrest += amount;
        self.report.add_unrest(source, amount);
    }
}
