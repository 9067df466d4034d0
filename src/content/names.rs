use rand::Rng;
use rand::RngCore;

use crate::model::Sex;

const MALE_PREFIXES: &[&str] = &[
    "Al", "Ar", "Bal", "Bor", "Cal", "Dar", "Ed", "Gar", "Hal", "Os",
    "Ral", "Ro", "Tor", "Wil", "Wy",
];

const MALE_SUFFIXES: &[&str] = &["ric", "mund", "win", "bert", "fric", "helm", "stan", "wald"];

const FEMALE_PREFIXES: &[&str] = &[
    "Ad", "Al", "Ber", "Cyn", "Ed", "El", "Gis", "Hild", "Ma", "Ros",
    "Sib", "Wen",
];

const FEMALE_SUFFIXES: &[&str] = &["ith", "gyth", "wyn", "a", "eline", "burga", "ild", "ette"];

const HOUSE_NAMES: &[&str] = &[
    "Ashford", "Blackthorn", "Brightwater", "Coldwell", "Dunmere",
    "Fairwind", "Greymoor", "Hartwood", "Kingsward", "Longbridge",
    "Mossbank", "Northgate", "Oakshield", "Pinehurst", "Ravencrest",
    "Stonemark", "Thornwall", "Whitevale",
];

/// Read-only name tables.
#[derive(Debug, Clone, Copy)]
pub struct NamePools {
    pub male_prefixes: &'static [&'static str],
    pub male_suffixes: &'static [&'static str],
    pub female_prefixes: &'static [&'static str],
    pub female_suffixes: &'static [&'static str],
    pub house_names: &'static [&'static str],
}

impl Default for NamePools {
    fn default() -> Self {
        Self {
            male_prefixes: MALE_PREFIXES,
            male_suffixes: MALE_SUFFIXES,
            female_prefixes: FEMALE_PREFIXES,
            female_suffixes: FEMALE_SUFFIXES,
            house_names: HOUSE_NAMES,
        }
    }
}

fn pick<'a>(rng: &mut dyn RngCore, pool: &'a [&'a str]) -> &'a str {
    if pool.is_empty() {
        return "";
    }
    pool[rng.random_range(0..pool.len())]
}

impl NamePools {
    /// A given name for `sex`.
    pub fn given_name(&self, rng: &mut dyn RngCore, sex: Sex) -> String {
        let (prefixes, suffixes) = match sex {
            Sex::Male => (self.male_prefixes, self.male_suffixes),
            Sex::Female => (self.female_prefixes, self.female_suffixes),
        };
        format!("{}{}", pick(rng, prefixes), pick(rng, suffixes))
    }

    /// Given name plus the house's surname.
    pub fn person_name(&self, rng: &mut dyn RngCore, sex: Sex, surname: &str) -> String {
        format!("{} {surname}", self.given_name(rng, sex))
    }

    /// A house name not in `taken`, falling back to a numbered variant once
    /// the pool is exhausted.
    pub fn house_name(&self, rng: &mut dyn RngCore, taken: &[String]) -> String {
        let free: Vec<&str> = self
            .house_names
            .iter()
            .copied()
            .filter(|n| !taken.iter().any(|t| t == n))
            .collect();
        if free.is_empty() {
            return format!("{} {}", pick(rng, self.house_names), taken.len() + 1);
        }
        free[rng.random_range(0..free.len())].to_string()
    }
}

/// Surname of a full name: everything after the first space.
pub fn surname_of(full_name: &str) -> &str {
    full_name.split_once(' ').map(|(_, s)| s).unwrap_or(full_name)
}
