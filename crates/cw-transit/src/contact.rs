//! Sign-crossing contact detection.
//!
//! Two movers on the same road make contact when their order along the road
//! flips between two observation instants.  Comparing pairwise difference
//! signs (rather than positions against a threshold) means a convoy sitting
//! at identical progress never self-triggers, and a genuine pass-by is
//! caught exactly once.  Zero is its own sign class: a pair separating from
//! an exact tie counts as a crossing in either direction, while a pair tied
//! at both instants does not.

use cw_core::{ActorId, RoadId, TimeDuration, TimePoint};

use crate::mover::Mover;
use crate::road::Road;

/// A detected mid-road meeting.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Contact {
    pub a: ActorId,
    pub b: ActorId,
    pub road: RoadId,
    /// Interpolated crossing position along the road, in `[0, 1]`.
    pub progress: f64,
    /// Interpolated crossing instant, in `[prev, now]`.
    pub time: TimePoint,
}

impl Contact {
    /// Progress quantized to 1e-3 — the key under which an ephemeral
    /// transit place is created for this meeting.
    pub fn progress_key(&self) -> i64 {
        (self.progress * 1_000.0).round() as i64
    }
}

/// Detect all crossings on one road over the step `(prev, now]`.
///
/// `movers` is the road's registry slice in registration order; output
/// pairs preserve that order, so the whole sweep is replayable.
pub fn detect_crossings(
    road: &Road,
    movers: &[&Mover],
    prev: TimePoint,
    now: TimePoint,
) -> Vec<Contact> {
    let mut contacts = Vec::new();
    for i in 0..movers.len() {
        for j in (i + 1)..movers.len() {
            let (a, b) = (movers[i], movers[j]);
            let d_prev = a.progress_at(prev, road) - b.progress_at(prev, road);
            let d_now = a.progress_at(now, road) - b.progress_at(now, road);

            // Identical positions at both instants: travelling together,
            // not a meeting.
            if d_prev == 0.0 && d_now == 0.0 {
                continue;
            }
            // Sign comparison with zero as its own class — `f64::signum`
            // maps +0.0 to 1.0 and would miss a tie separating positive.
            let same_sign = (d_prev > 0.0) == (d_now > 0.0) && (d_prev < 0.0) == (d_now < 0.0);
            if same_sign {
                continue;
            }

            // Interpolate the crossing fraction within the step.
            let f = d_prev / (d_prev - d_now);
            let time =
                prev + TimeDuration::secs(((now - prev).as_secs() as f64 * f).round() as i64);
            let progress = a.progress_at(time, road);
            contacts.push(Contact {
                a: a.actor,
                b: b.actor,
                road: road.id,
                progress,
                time,
            });
        }
    }
    contacts
}
