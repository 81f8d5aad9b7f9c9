//! Retroactive fabrication of dynamic arrivals.
//!
//! A place discovered late owes itself the traffic that "happened" while
//! nobody was looking.  For each catch-up window the kernel draws an
//! arrival count, arrival instants, and dwell lifetimes from the place's
//! own stream, then admits only the arrivals that are both still present
//! and not behind the local clock.  The second filter is what keeps
//! monotonicity intact when catch-up runs mid-tick.

use cw_core::dist::poisson;
use cw_core::{Rng, TimeDuration, TimePoint};

use crate::params::EncounterParams;

/// One fabricated arrival that passed both admission filters.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct FabricatedArrival {
    pub at: TimePoint,
    pub lifetime: TimeDuration,
}

/// The dual admission filter.
///
/// Admit only if the actor would still be present (`arrival + lifetime >
/// now`) *and* its arrival is not behind the local clock
/// (`arrival >= encounter_time`).
pub fn admit_arrival(
    arrival: TimePoint,
    lifetime: TimeDuration,
    now: TimePoint,
    encounter_time: TimePoint,
) -> bool {
    arrival + lifetime > now && arrival >= encounter_time
}

/// Draw the arrivals for the window `[prev, now)`, filtered against
/// `encounter_time` and sorted by arrival time ascending.
///
/// Pure in `(rng state, arguments)`: the same stream and window always
/// fabricate the same history.
pub fn fabricate_window(
    rng: &mut Rng,
    prev: TimePoint,
    now: TimePoint,
    encounter_time: TimePoint,
    params: &EncounterParams,
) -> Vec<FabricatedArrival> {
    let elapsed = (now - prev).as_secs();
    if elapsed <= 0 {
        return Vec::new();
    }

    let lambda = params.arrivals_per_hour * elapsed as f64 / 3_600.0;
    let n = poisson(rng, lambda);

    let mut admitted = Vec::new();
    for _ in 0..n {
        let at = prev + TimeDuration::secs(rng.next_bounded(elapsed as u64) as i64);
        let lifetime = TimeDuration::secs(poisson(rng, params.lifetime_mean_secs) as i64);
        if admit_arrival(at, lifetime, now, encounter_time) {
            admitted.push(FabricatedArrival { at, lifetime });
        }
    }
    admitted.sort_by_key(|a| a.at);
    admitted
}
