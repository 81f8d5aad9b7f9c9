//! Tunables for encounters and catch-up.

use cw_core::TimeDuration;

/// Knobs the world layer hands to every place.
///
/// These are kernel mechanics parameters, not economy policy: rates and
/// windows, no prices.
#[derive(Clone, Debug)]
pub struct EncounterParams {
    /// Dynamic-actor arrival rate used by catch-up fabrication.
    pub arrivals_per_hour: f64,
    /// Mean fabricated-actor dwell time, in seconds (Poisson-distributed).
    pub lifetime_mean_secs: f64,
    /// Grace period stamped on a fresh ultimatum.
    pub ultimatum_timeout: TimeDuration,
    /// Upper bound on the uniform part of a new place's initial clock lag.
    pub initial_offset_secs: i64,
}

impl Default for EncounterParams {
    fn default() -> Self {
        EncounterParams {
            arrivals_per_hour: 0.5,
            lifetime_mean_secs: 7_200.0,
            ultimatum_timeout: TimeDuration::secs(300),
            initial_offset_secs: 3_600,
        }
    }
}
