#![allow(dead_code)]

use estate_sim::model::{Decisions, WarLevyChoice, WorldState};
use estate_sim::{Balance, TurnEngine};

pub fn engine() -> TurnEngine {
    TurnEngine::new(Balance::default())
}

pub fn genesis(seed: u64) -> WorldState {
    let engine = engine();
    estate_sim::genesis(seed, engine.balance(), engine.content()).unwrap()
}

/// A plan that touches every decision kind over the first few turns.
pub fn varied_plan(turns: usize) -> Vec<Decisions> {
    (0..turns)
        .map(|t| match t % 4 {
            0 => Decisions::default().sell(10).pay(4, 10),
            1 => Decisions::default().with_labor(18, 4).levy(WarLevyChoice::PayCoin),
            2 => Decisions::default().start_construction("granary").pay(2, 5),
            _ => Decisions::default().levy(WarLevyChoice::SendMen),
        })
        .collect()
}
