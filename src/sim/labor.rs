use crate::model::{Estate, LaborReport};

/// Fit labor to the population, shedding builders before farmers.
/// Returns whether anything was cut.
pub fn clamp_labor(estate: &mut Estate) -> bool {
    let assigned = estate.assigned_labor();
    if assigned <= estate.population {
        return false;
    }
    let excess = assigned - estate.population;
    let from_builders = excess.min(estate.builders);
    estate.builders -= from_builders;
    estate.farmers -= excess - from_builders;
    true
}

/// Clamp and fold the result into the labor report.
pub fn clamp_and_report(estate: &mut Estate, report: &mut LaborReport) {
    let clamped = clamp_labor(estate);
    report.available = estate.population;
    report.farmers = estate.farmers;
    report.builders = estate.builders;
    if clamped {
        report.was_oversubscribed = true;
        report.auto_clamped = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estate(population: u32, farmers: u32, builders: u32) -> Estate {
        Estate {
            population,
            farmers,
            builders,
            ..Estate::default()
        }
    }

    #[test]
    fn builders_go_first() {
        let mut e = estate(10, 10, 10);
        assert!(clamp_labor(&mut e));
        assert_eq!((e.farmers, e.builders), (10, 0));
    }

    #[test]
    fn farmers_cut_only_after_builders() {
        let mut e = estate(6, 8, 3);
        assert!(clamp_labor(&mut e));
        assert_eq!((e.farmers, e.builders), (6, 0));
    }

    #[test]
    fn partial_builder_cut() {
        let mut e = estate(20, 15, 8);
        clamp_labor(&mut e);
        assert_eq!((e.farmers, e.builders), (15, 5));
    }

    #[test]
    fn fitting_labor_is_untouched() {
        let mut e = estate(30, 20, 4);
        assert!(!clamp_labor(&mut e));
        assert_eq!((e.farmers, e.builders), (20, 4));
    }

    #[test]
    fn report_flags_only_set_on_clamp() {
        let mut e = estate(30, 20, 4);
        let mut report = LaborReport::default();
        clamp_and_report(&mut e, &mut report);
        assert!(!report.was_oversubscribed);
        assert_eq!(report.available, 30);

        let mut e = estate(5, 4, 4);
        clamp_and_report(&mut e, &mut report);
        assert!(report.auto_clamped);
        assert_eq!(report.assigned(), 5);
    }
}
