//! Top-level world configuration.
//!
//! Typically loaded from a JSON file by the application crate and passed to
//! [`World::new`][crate::World::new].  Everything here is kernel mechanics;
//! economy policy tables live with their collaborators.

use cw_core::TimeDuration;
use cw_place::EncounterParams;

/// Fixed default seed: absent `--seed`, runs are still reproducible.
pub const DEFAULT_SEED: u64 = 0x00C0_FFEE;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Master RNG seed.  The same seed always produces identical traces.
    pub seed: u64,

    /// Dynamic-actor arrival rate for catch-up fabrication.
    pub arrivals_per_hour: f64,

    /// Mean fabricated-actor dwell, in seconds.
    pub lifetime_mean_secs: f64,

    /// Grace period on ultimatums, in seconds.
    pub ultimatum_timeout_secs: i64,

    /// Upper bound on a new place's uniform initial clock lag, in seconds.
    pub initial_offset_secs: i64,

    /// Idle-placeholder horizon: an empty place is re-visited this many
    /// seconds out so fabrication keeps breathing.
    pub max_idle_secs: i64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            seed: DEFAULT_SEED,
            arrivals_per_hour: 0.5,
            lifetime_mean_secs: 7_200.0,
            ultimatum_timeout_secs: 300,
            initial_offset_secs: 3_600,
            max_idle_secs: 86_400,
        }
    }
}

impl WorldConfig {
    /// The per-place parameter block derived from this config.
    pub fn encounter_params(&self) -> EncounterParams {
        EncounterParams {
            arrivals_per_hour: self.arrivals_per_hour,
            lifetime_mean_secs: self.lifetime_mean_secs,
            ultimatum_timeout: TimeDuration::secs(self.ultimatum_timeout_secs),
            initial_offset_secs: self.initial_offset_secs,
        }
    }
}
