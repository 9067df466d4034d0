//! Deterministic random streams.
//!
//! Nothing in the simulation may draw from a platform RNG. Every random
//! decision comes from an [`RngStream`] whose seed is derived from
//! `(root seed, channel, turn, sub-key path)`, so:
//!   - the same inputs yield the same draws on every machine,
//!   - adding draws to one channel never shifts another channel,
//!   - forked sub-streams never share entropy with their parent or siblings.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Domain tag mixed into every derivation. Changing it reseeds every run.
const DERIVATION_TAG: &[u8] = b"estate-sim/stream/v1";

/// Reserved random channels. Never reorder or rename: the string form is
/// part of every derived seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Channel {
    Weather,
    Events,
    Household,
    Marriage,
    Prospects,
    Court,
    Market,
    Demography,
    WorldGeneration,
}

string_enum!(Channel {
    Weather => "weather",
    Events => "events",
    Household => "household",
    Marriage => "marriage",
    Prospects => "prospects",
    Court => "court",
    Market => "market",
    Demography => "demography",
    WorldGeneration => "world_generation",
});

/// Hash the stream coordinates into a 256-bit ChaCha seed.
///
/// Each path label is length-prefixed so `["a/b"]` and `["a", "b"]` derive
/// different seeds.
pub fn derive_seed(root_seed: u64, channel: Channel, turn: u32, path: &[String]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(DERIVATION_TAG);
    hasher.update(root_seed.to_le_bytes());
    let channel_name = channel.as_str().as_bytes();
    hasher.update((channel_name.len() as u32).to_le_bytes());
    hasher.update(channel_name);
    hasher.update(turn.to_le_bytes());
    hasher.update((path.len() as u32).to_le_bytes());
    for label in path {
        hasher.update((label.len() as u32).to_le_bytes());
        hasher.update(label.as_bytes());
    }
    hasher.finalize().into()
}

/// A reproducible random sequence bound to one channel, turn and sub-key.
#[derive(Debug, Clone)]
pub struct RngStream {
    root_seed: u64,
    channel: Channel,
    turn: u32,
    path: Vec<String>,
    inner: ChaCha8Rng,
}

impl RngStream {
    pub fn new(root_seed: u64, channel: Channel, turn: u32) -> Self {
        Self::with_path(root_seed, channel, turn, Vec::new())
    }

    fn with_path(root_seed: u64, channel: Channel, turn: u32, path: Vec<String>) -> Self {
        let inner = ChaCha8Rng::from_seed(derive_seed(root_seed, channel, turn, &path));
        Self {
            root_seed,
            channel,
            turn,
            path,
            inner,
        }
    }

    /// Derive an independent stream by appending `label` to the sub-key.
    ///
    /// The result depends only on this stream's coordinates and `label`,
    /// never on how many values were already drawn from `self`.
    pub fn fork(&self, label: impl Into<String>) -> RngStream {
        let mut path = self.path.clone();
        path.push(label.into());
        Self::with_path(self.root_seed, self.channel, self.turn, path)
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Sub-key path joined with `/`, for logs and "why" trails.
    pub fn subkey(&self) -> String {
        self.path.join("/")
    }

    /// Uniform draw in `[0, 1)`.
    pub fn unit(&mut self) -> f64 {
        self.inner.random::<f64>()
    }

    /// Bernoulli trial. Probabilities outside `[0, 1]` are clamped.
    pub fn chance(&mut self, p: f64) -> bool {
        if p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.unit() < p
    }

    /// Pick an index with probability proportional to its weight.
    /// Non-positive weights are never picked; returns `None` when nothing can be.
    pub fn pick_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 {
            return None;
        }
        let roll = self.unit() * total;
        let mut cumulative = 0.0;
        let mut last_positive = None;
        for (i, &w) in weights.iter().enumerate() {
            if w <= 0.0 {
                continue;
            }
            cumulative += w;
            last_positive = Some(i);
            if roll < cumulative {
                return Some(i);
            }
        }
        last_positive
    }
}

impl RngCore for RngStream {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        self.inner.fill_bytes(dst)
    }
}

/// Stream factory for one turn of one run.
#[derive(Debug, Clone, Copy)]
pub struct Streams {
    pub seed: u64,
    pub turn: u32,
}

impl Streams {
    pub fn new(seed: u64, turn: u32) -> Self {
        Self { seed, turn }
    }

    pub fn channel(&self, channel: Channel) -> RngStream {
        RngStream::new(self.seed, channel, self.turn)
    }
}
