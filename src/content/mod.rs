//! Static content tables: random events, improvements, name pools.
//! Read-only once built.

pub mod events;
pub mod improvements;
pub mod names;

pub use events::{EventDef, EventOutcome, EventWeight, standard_events};
pub use improvements::{ImprovementDef, ImprovementEffects, standard_improvements};
pub use names::{NamePools, surname_of};

use crate::model::Estate;

#[derive(Debug)]
pub struct Content {
    pub events: Vec<EventDef>,
    pub improvements: Vec<ImprovementDef>,
    pub names: NamePools,
}

impl Content {
    /// The shipped tables.
    pub fn standard() -> Self {
        Self {
            events: standard_events(),
            improvements: standard_improvements(),
            names: NamePools::default(),
        }
    }

    pub fn improvement(&self, id: &str) -> Option<&ImprovementDef> {
        self.improvements.iter().find(|i| i.id == id)
    }

    pub fn event(&self, id: &str) -> Option<&EventDef> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Combined standing effects of every improvement the estate has built.
    pub fn built_effects(&self, estate: &Estate) -> ImprovementEffects {
        let mut total = ImprovementEffects::default();
        for def in self
            .improvements
            .iter()
            .filter(|d| estate.has_improvement(d.id))
        {
            total.harvest_bonus += def.effects.harvest_bonus;
            total.spoilage_guard = total.spoilage_guard.max(def.effects.spoilage_guard);
            total.unrest_relief += def.effects.unrest_relief;
            total.raid_weight *= def.effects.raid_weight;
        }
        total
    }
}

impl Default for Content {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_built_is_neutral() {
        let content = Content::standard();
        let effects = content.built_effects(&Estate::default());
        assert_eq!(effects.harvest_bonus, 0.0);
        assert_eq!(effects.spoilage_guard, 0.0);
        assert_eq!(effects.raid_weight, 1.0);
    }

    #[test]
    fn built_effects_combine() {
        let content = Content::standard();
        let mut estate = Estate::default();
        estate.improvements.insert(improvements::MILL.to_string());
        estate.improvements.insert(improvements::PALISADE.to_string());
        estate.improvements.insert(improvements::GRANARY.to_string());
        let effects = content.built_effects(&estate);
        assert!((effects.harvest_bonus - 0.10).abs() < 1e-9);
        assert_eq!(effects.spoilage_guard, 0.5);
        assert!((effects.raid_weight - 0.3).abs() < 1e-9);
    }

    #[test]
    fn lookups() {
        let content = Content::standard();
        assert_eq!(content.improvement("chapel").map(|i| i.cost), Some(10));
        assert!(content.event("storm").is_some());
        assert!(content.improvement("moat").is_none());
    }
}
