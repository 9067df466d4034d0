use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Modifiers that apply once and are then cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum OneShot {
    /// +10% on the next harvest.
    BlessedHarvest,
    /// Halves next turn's coin dues.
    LiegeLeniency,
}

string_enum!(OneShot {
    BlessedHarvest => "blessed_harvest",
    LiegeLeniency => "liege_leniency",
});

/// Standing set by accepted offers; random events read and consume them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum StandingFlag {
    LiegeFavorOwed,
    ClaimPressed,
    AllianceForged,
}

string_enum!(StandingFlag {
    LiegeFavorOwed => "liege_favor_owed",
    ClaimPressed => "claim_pressed",
    AllianceForged => "alliance_forged",
});

/// Typed replacement for a loose flags bag: persistent multipliers,
/// event cooldowns and one-shot modifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningFlags {
    /// Scales base birth probability; never replaces it.
    #[serde(default = "default_mult")]
    pub fertility_mult: f64,
    /// Scales base death probability; never replaces it.
    #[serde(default = "default_mult")]
    pub mortality_mult: f64,
    /// Turns remaining before an event definition may fire again.
    #[serde(default)]
    pub event_cooldowns: BTreeMap<String, u32>,
    #[serde(default)]
    pub one_shots: BTreeSet<OneShot>,
    #[serde(default)]
    pub standing: BTreeSet<StandingFlag>,
}

fn default_mult() -> f64 {
    1.0
}

impl Default for TuningFlags {
    fn default() -> Self {
        Self {
            fertility_mult: 1.0,
            mortality_mult: 1.0,
            event_cooldowns: BTreeMap::new(),
            one_shots: BTreeSet::new(),
            standing: BTreeSet::new(),
        }
    }
}

impl TuningFlags {
    pub fn grant_one_shot(&mut self, modifier: OneShot) {
        self.one_shots.insert(modifier);
    }

    /// Consume-and-clear. Returns whether the modifier was pending.
    pub fn take_one_shot(&mut self, modifier: OneShot) -> bool {
        self.one_shots.remove(&modifier)
    }

    pub fn has_standing(&self, flag: StandingFlag) -> bool {
        self.standing.contains(&flag)
    }

    pub fn take_standing(&mut self, flag: StandingFlag) -> bool {
        self.standing.remove(&flag)
    }

    pub fn on_cooldown(&self, event_id: &str) -> bool {
        self.event_cooldowns.get(event_id).is_some_and(|t| *t > 0)
    }

    pub fn start_cooldown(&mut self, event_id: &str, turns: u32) {
        if turns > 0 {
            self.event_cooldowns.insert(event_id.to_string(), turns);
        }
    }

    /// Count every cooldown down by one turn, dropping finished ones.
    pub fn tick_cooldowns(&mut self) {
        for remaining in self.event_cooldowns.values_mut() {
            *remaining = remaining.saturating_sub(1);
        }
        self.event_cooldowns.retain(|_, remaining| *remaining > 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_is_consumed_once() {
        let mut flags = TuningFlags::default();
        flags.grant_one_shot(OneShot::BlessedHarvest);
        assert!(flags.take_one_shot(OneShot::BlessedHarvest));
        assert!(!flags.take_one_shot(OneShot::BlessedHarvest));
    }

    #[test]
    fn cooldowns_tick_down_and_expire() {
        let mut flags = TuningFlags::default();
        flags.start_cooldown("fever", 2);
        assert!(flags.on_cooldown("fever"));
        flags.tick_cooldowns();
        assert!(flags.on_cooldown("fever"));
        flags.tick_cooldowns();
        assert!(!flags.on_cooldown("fever"));
        assert!(flags.event_cooldowns.is_empty());
    }

    #[test]
    fn missing_multipliers_default_to_one() {
        let flags: TuningFlags = serde_json::from_str("{}").unwrap();
        assert_eq!(flags.fertility_mult, 1.0);
        assert_eq!(flags.mortality_mult, 1.0);
    }
}
