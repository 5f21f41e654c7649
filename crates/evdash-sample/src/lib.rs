//! Deterministic, seeded subsampling that bounds rendering cost.
//!
//! Uses ChaCha8 so a given `(len, target_size, seed)` picks the same positions
//! on every platform and release. Picked positions are kept in source order.
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::debug;

use evdash_core::{Error, Result};

pub const DEFAULT_TARGET_SIZE: usize = 5000;
pub const DEFAULT_SEED: u64 = 42;

/// Sample mode settings. `target_size` is always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSampleSettings")]
pub struct SampleSettings {
    enabled: bool,
    target_size: usize,
    seed: u64,
}

#[derive(Deserialize)]
#[serde(default)]
struct RawSampleSettings {
    enabled: bool,
    target_size: usize,
    seed: u64,
}

impl Default for RawSampleSettings {
    fn default() -> Self {
        let d = SampleSettings::default();
        Self { enabled: d.enabled, target_size: d.target_size, seed: d.seed }
    }
}

impl TryFrom<RawSampleSettings> for SampleSettings {
    type Error = Error;

    fn try_from(raw: RawSampleSettings) -> Result<Self> {
        SampleSettings::new(raw.enabled, raw.target_size, raw.seed)
    }
}

impl Default for SampleSettings {
    fn default() -> Self {
        Self { enabled: true, target_size: DEFAULT_TARGET_SIZE, seed: DEFAULT_SEED }
    }
}

impl SampleSettings {
    pub fn new(enabled: bool, target_size: usize, seed: u64) -> Result<Self> {
        if target_size == 0 {
            return Err(Error::InvalidSampleSize(target_size));
        }
        Ok(Self { enabled, target_size, seed })
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn target_size(&self) -> usize {
        self.target_size
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_target_size(&mut self, target_size: usize) -> Result<()> {
        *self = Self::new(self.enabled, target_size, self.seed)?;
        Ok(())
    }

    /// Whether a collection of `len` rows would be subsampled.
    pub fn applies_to(&self, len: usize) -> bool {
        self.enabled && len > self.target_size
    }
}

/// Ascending positions to keep out of `len` rows, or `None` when the rows are
/// displayed unchanged.
pub fn sample_positions(len: usize, settings: &SampleSettings) -> Option<Vec<usize>> {
    if !settings.applies_to(len) {
        return None;
    }
    let mut rng = ChaCha8Rng::seed_from_u64(settings.seed);
    let mut picked = rand::seq::index::sample(&mut rng, len, settings.target_size).into_vec();
    picked.sort_unstable();
    debug!(len, kept = picked.len(), seed = settings.seed, "sampled rows");
    Some(picked)
}

/// Borrowed input when no sampling applies; otherwise exactly
/// `target_size` rows drawn without replacement.
pub fn sample<'a, T: Clone>(rows: &'a [T], settings: &SampleSettings) -> Cow<'a, [T]> {
    match sample_positions(rows.len(), settings) {
        None => Cow::Borrowed(rows),
        Some(positions) => Cow::Owned(positions.into_iter().map(|p| rows[p].clone()).collect()),
    }
}
