//! Random event definitions. Weights read the world, effects mutate it.

use crate::config::Balance;
use crate::error::SimResult;
use crate::model::{OneShot, RelationshipDelta, StandingFlag, WorldState};
use crate::rng::RngStream;

use super::improvements::ImprovementEffects;

/// Weight of an event this turn plus the conditions that shaped it.
#[derive(Debug, Clone, PartialEq)]
pub struct EventWeight {
    pub value: f64,
    pub because: Vec<String>,
}

impl EventWeight {
    fn base(value: f64) -> Self {
        Self {
            value,
            because: Vec::new(),
        }
    }

    fn scale(mut self, factor: f64, reason: &str) -> Self {
        self.value *= factor;
        self.because.push(format!("{reason} (x{factor:.2})"));
        self
    }

    fn add(mut self, amount: f64, reason: &str) -> Self {
        self.value += amount;
        self.because.push(format!("{reason} (+{amount:.2})"));
        self
    }
}

/// What an event did, for the report.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventOutcome {
    pub summary: String,
    /// Applied by the event stage so it lands in the unrest breakdown.
    pub unrest: i32,
    pub bushels: i64,
    pub coin: i64,
}

pub type WeightFn = fn(&WorldState, &ImprovementEffects) -> EventWeight;
pub type EffectFn = fn(&mut WorldState, &mut RngStream, &Balance) -> SimResult<EventOutcome>;

pub struct EventDef {
    pub id: &'static str,
    pub category: &'static str,
    /// Turns before the event may fire again.
    pub cooldown: u32,
    pub weight: WeightFn,
    pub effect: EffectFn,
}

impl std::fmt::Debug for EventDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDef")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("cooldown", &self.cooldown)
            .finish()
    }
}

pub fn standard_events() -> Vec<EventDef> {
    vec![
        EventDef {
            id: "bandit_raid",
            category: "threat",
            cooldown: 3,
            weight: bandit_raid_weight,
            effect: bandit_raid,
        },
        EventDef {
            id: "fever",
            category: "health",
            cooldown: 4,
            weight: fever_weight,
            effect: fever,
        },
        EventDef {
            id: "pilgrims",
            category: "faith",
            cooldown: 3,
            weight: pilgrims_weight,
            effect: pilgrims,
        },
        EventDef {
            id: "gleaning",
            category: "harvest",
            cooldown: 2,
            weight: gleaning_weight,
            effect: gleaning,
        },
        EventDef {
            id: "festival",
            category: "court",
            cooldown: 3,
            weight: festival_weight,
            effect: festival,
        },
        EventDef {
            id: "liege_summons",
            category: "politics",
            cooldown: 4,
            weight: liege_summons_weight,
            effect: liege_summons,
        },
        EventDef {
            id: "storm",
            category: "weather",
            cooldown: 3,
            weight: storm_weight,
            effect: storm,
        },
    ]
}

fn bandit_raid_weight(world: &WorldState, built: &ImprovementEffects) -> EventWeight {
    let mut w = EventWeight::base(1.0);
    if built.raid_weight != 1.0 {
        w = w.scale(built.raid_weight, "walls deter raiders");
    }
    if world.estate.unrest > 50 {
        w = w.scale(1.5, "restless peasants shelter bandits");
    }
    if world.flags.has_standing(StandingFlag::AllianceForged) {
        w = w.scale(0.5, "allied riders patrol the roads");
    }
    w
}

fn bandit_raid(
    world: &mut WorldState,
    rng: &mut RngStream,
    _balance: &Balance,
) -> SimResult<EventOutcome> {
    let share = 0.05 + rng.unit() * 0.10;
    let lost = (world.estate.bushels as f64 * share).floor() as i64;
    world.estate.bushels -= lost;
    Ok(EventOutcome {
        summary: format!("Bandits carried off {lost} bushels"),
        unrest: 3,
        bushels: -lost,
        coin: 0,
    })
}

fn fever_weight(world: &WorldState, _built: &ImprovementEffects) -> EventWeight {
    if world.estate.population < 20 {
        return EventWeight::base(0.0);
    }
    let w = EventWeight::base(0.6);
    if world.estate.population > 40 {
        w.add(0.6, "crowded cottages")
    } else {
        w
    }
}

fn fever(
    world: &mut WorldState,
    _rng: &mut RngStream,
    _balance: &Balance,
) -> SimResult<EventOutcome> {
    let lost = ((world.estate.population as f64 * 0.05).round() as u32).max(1);
    let lost = lost.min(world.estate.population);
    world.estate.population -= lost;
    Ok(EventOutcome {
        summary: format!("Fever took {lost} villagers"),
        unrest: 2,
        bushels: 0,
        coin: 0,
    })
}

fn pilgrims_weight(_world: &WorldState, built: &ImprovementEffects) -> EventWeight {
    let w = EventWeight::base(0.5);
    if built.unrest_relief > 0 {
        w.add(0.5, "the chapel draws travellers")
    } else {
        w
    }
}

fn pilgrims(
    world: &mut WorldState,
    rng: &mut RngStream,
    _balance: &Balance,
) -> SimResult<EventOutcome> {
    let coin = 3 + (rng.unit() * 4.0).floor() as i64;
    world.estate.coin += coin;
    Ok(EventOutcome {
        summary: format!("Pilgrims left {coin} coin in alms"),
        unrest: 0,
        bushels: 0,
        coin,
    })
}

fn gleaning_weight(_world: &WorldState, _built: &ImprovementEffects) -> EventWeight {
    EventWeight::base(0.8)
}

fn gleaning(
    world: &mut WorldState,
    _rng: &mut RngStream,
    _balance: &Balance,
) -> SimResult<EventOutcome> {
    world.flags.grant_one_shot(OneShot::BlessedHarvest);
    Ok(EventOutcome {
        summary: "Gleaners promise a fuller harvest next season".into(),
        ..EventOutcome::default()
    })
}

fn festival_weight(world: &WorldState, _built: &ImprovementEffects) -> EventWeight {
    if world.estate.coin < 5 {
        return EventWeight::base(0.0);
    }
    let w = EventWeight::base(0.5);
    if world.flags.has_standing(StandingFlag::AllianceForged) {
        w.add(0.5, "a new alliance to celebrate")
    } else {
        w
    }
}

fn festival(
    world: &mut WorldState,
    _rng: &mut RngStream,
    _balance: &Balance,
) -> SimResult<EventOutcome> {
    let feast = world.flags.take_standing(StandingFlag::AllianceForged);
    world.estate.coin -= 3;
    let summary = if feast {
        "A wedding feast sealed the alliance"
    } else {
        "The village held a harvest festival"
    };
    Ok(EventOutcome {
        summary: summary.into(),
        unrest: -5,
        bushels: 0,
        coin: -3,
    })
}

fn liege_summons_weight(world: &WorldState, _built: &ImprovementEffects) -> EventWeight {
    let mut w = EventWeight::base(0.4);
    if world.flags.has_standing(StandingFlag::LiegeFavorOwed) {
        w = w.scale(3.0, "the liege is owed a favour");
    }
    if world.flags.has_standing(StandingFlag::ClaimPressed) {
        w = w.scale(2.0, "a pressed claim awaits judgement");
    }
    w
}

fn liege_summons(
    world: &mut WorldState,
    _rng: &mut RngStream,
    balance: &Balance,
) -> SimResult<EventOutcome> {
    let head = world.player()?.head;
    let liege = world.liege_head();
    let mut coin = 0;
    let summary = if world.flags.take_standing(StandingFlag::LiegeFavorOwed) {
        coin = -(world.estate.coin.min(5));
        world.estate.coin += coin;
        "The liege called in the favour owed".to_string()
    } else if world.flags.take_standing(StandingFlag::ClaimPressed) {
        "The liege heard the pressed claim and upheld it".to_string()
    } else {
        world.flags.grant_one_shot(OneShot::LiegeLeniency);
        "The liege granted leniency on next season's dues".to_string()
    };
    if let (Some(liege), Some(head)) = (liege, head) {
        world.adjust_relationship(
            liege,
            head,
            RelationshipDelta::new(0, 3, 0),
            balance.relations.baseline(),
        );
    }
    Ok(EventOutcome {
        summary,
        unrest: 0,
        bushels: 0,
        coin,
    })
}

fn storm_weight(_world: &WorldState, _built: &ImprovementEffects) -> EventWeight {
    EventWeight::base(0.6)
}

fn storm(
    world: &mut WorldState,
    _rng: &mut RngStream,
    _balance: &Balance,
) -> SimResult<EventOutcome> {
    if let Some(project) = world.estate.project.as_mut() {
        let lost = project.progress.min(3);
        project.progress -= lost;
        return Ok(EventOutcome {
            summary: format!(
                "A storm set back construction of the {} by {lost}",
                project.improvement
            ),
            unrest: 1,
            bushels: 0,
            coin: 0,
        });
    }
    let lost = (world.estate.bushels as f64 * 0.05).floor() as i64;
    world.estate.bushels -= lost;
    Ok(EventOutcome {
        summary: format!("A storm flooded the stores, ruining {lost} bushels"),
        unrest: 1,
        bushels: -lost,
        coin: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Channel;
    use crate::testutil;

    #[test]
    fn ids_are_unique() {
        let events = standard_events();
        let mut ids: Vec<&str> = events.iter().map(|e| e.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), events.len());
    }

    #[test]
    fn palisade_lowers_raid_weight() {
        let world = testutil::small_world(3);
        let open = bandit_raid_weight(&world, &ImprovementEffects::default());
        let walled = bandit_raid_weight(
            &world,
            &ImprovementEffects {
                raid_weight: 0.3,
                ..ImprovementEffects::default()
            },
        );
        assert!(walled.value < open.value);
        assert_eq!(walled.because.len(), 1);
    }

    #[test]
    fn fever_needs_a_crowd() {
        let mut world = testutil::small_world(3);
        world.estate.population = 10;
        assert_eq!(fever_weight(&world, &ImprovementEffects::default()).value, 0.0);
    }

    #[test]
    fn summons_consumes_favour() {
        let mut world = testutil::small_world(3);
        world.flags.standing.insert(StandingFlag::LiegeFavorOwed);
        let coin = world.estate.coin;
        let mut rng = RngStream::new(3, Channel::Events, 0);
        let outcome = liege_summons(&mut world, &mut rng, &Balance::default()).unwrap();
        assert!(!world.flags.has_standing(StandingFlag::LiegeFavorOwed));
        assert_eq!(world.estate.coin, coin + outcome.coin);
    }
}
