/// A buildable estate improvement.
#[derive(Debug, Clone, PartialEq)]
pub struct ImprovementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub cost: i64,
    pub required_progress: u32,
    pub effects: ImprovementEffects,
}

/// Standing effects once built. The default is the open estate: nothing
/// added, raids at full weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImprovementEffects {
    /// Added to the harvest multiplier.
    pub harvest_bonus: f64,
    /// Fraction of spoilage prevented.
    pub spoilage_guard: f64,
    /// Unrest removed every turn.
    pub unrest_relief: i32,
    /// Multiplier on raid-type event weights.
    pub raid_weight: f64,
}

impl Default for ImprovementEffects {
    fn default() -> Self {
        Self {
            harvest_bonus: 0.0,
            spoilage_guard: 0.0,
            unrest_relief: 0,
            raid_weight: 1.0,
        }
    }
}

pub const GRANARY: &str = "granary";
pub const MILL: &str = "mill";
pub const CHAPEL: &str = "chapel";
pub const PALISADE: &str = "palisade";

pub fn standard_improvements() -> Vec<ImprovementDef> {
    vec![
        ImprovementDef {
            id: GRANARY,
            name: "Granary",
            cost: 12,
            required_progress: 8,
            effects: ImprovementEffects {
                spoilage_guard: 0.5,
                ..ImprovementEffects::default()
            },
        },
        ImprovementDef {
            id: MILL,
            name: "Mill",
            cost: 15,
            required_progress: 10,
            effects: ImprovementEffects {
                harvest_bonus: 0.10,
                ..ImprovementEffects::default()
            },
        },
        ImprovementDef {
            id: CHAPEL,
            name: "Chapel",
            cost: 10,
            required_progress: 6,
            effects: ImprovementEffects {
                unrest_relief: 1,
                ..ImprovementEffects::default()
            },
        },
        ImprovementDef {
            id: PALISADE,
            name: "Palisade",
            cost: 14,
            required_progress: 8,
            effects: ImprovementEffects {
                raid_weight: 0.3,
                ..ImprovementEffects::default()
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_effects_are_neutral() {
        let open = ImprovementEffects::default();
        assert_eq!(open.harvest_bonus, 0.0);
        assert_eq!(open.spoilage_guard, 0.0);
        assert_eq!(open.unrest_relief, 0);
        assert_eq!(open.raid_weight, 1.0);
    }

    #[test]
    fn only_the_palisade_deters_raids() {
        for def in standard_improvements() {
            let deters = def.effects.raid_weight < 1.0;
            assert_eq!(deters, def.id == PALISADE, "{}", def.id);
        }
    }
}
