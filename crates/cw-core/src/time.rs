//! Simulation time model.
//!
//! # Design
//!
//! Time is a monotonically non-decreasing count of simulated seconds held in
//! a signed 64-bit integer.  All schedule arithmetic is exact (no
//! floating-point drift) and comparisons are O(1).  A signed representation
//! keeps subtraction total: `later - earlier` is always a valid
//! [`TimeDuration`], and a place's initial encounter time may legitimately
//! sit *before* zero during retroactive catch-up.
//!
//! "No value" is the explicit [`TimePoint::UNSET`] sentinel rather than an
//! `Option`, so it can live inside dense state structs (relation deadlines,
//! world enrollment mirrors) without doubling their size.

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};

// ── TimePoint ─────────────────────────────────────────────────────────────────

/// An absolute simulated instant, in whole seconds.
///
/// At one second resolution an `i64` outlasts any conceivable run.  The
/// kernel alone advances time; nothing in this crate reads a wall clock.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimePoint(pub i64);

impl TimePoint {
    pub const ZERO: TimePoint = TimePoint(0);

    /// Sentinel meaning "no time set".  Compares less than every real
    /// instant; arithmetic on it is a caller bug.
    pub const UNSET: TimePoint = TimePoint(i64::MIN);

    /// `true` unless this is the [`UNSET`][Self::UNSET] sentinel.
    #[inline]
    pub fn is_set(self) -> bool {
        self != Self::UNSET
    }

    /// Seconds elapsed from `earlier` to `self`.
    #[inline]
    pub fn since(self, earlier: TimePoint) -> TimeDuration {
        TimeDuration(self.0 - earlier.0)
    }

    /// The later of two instants.
    #[inline]
    pub fn max(self, other: TimePoint) -> TimePoint {
        if other.0 > self.0 { other } else { self }
    }

    /// Round down to the previous multiple of `step` seconds.
    ///
    /// Used to align periodic sweeps to fixed boundaries.
    #[inline]
    pub fn align_down(self, step: i64) -> TimePoint {
        TimePoint(self.0.div_euclid(step) * step)
    }
}

impl Add<TimeDuration> for TimePoint {
    type Output = TimePoint;
    #[inline]
    fn add(self, rhs: TimeDuration) -> TimePoint {
        TimePoint(self.0 + rhs.0)
    }
}

impl AddAssign<TimeDuration> for TimePoint {
    #[inline]
    fn add_assign(&mut self, rhs: TimeDuration) {
        self.0 += rhs.0;
    }
}

impl Sub<TimeDuration> for TimePoint {
    type Output = TimePoint;
    #[inline]
    fn sub(self, rhs: TimeDuration) -> TimePoint {
        TimePoint(self.0 - rhs.0)
    }
}

impl Sub for TimePoint {
    type Output = TimeDuration;
    #[inline]
    fn sub(self, rhs: TimePoint) -> TimeDuration {
        TimeDuration(self.0 - rhs.0)
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_set() {
            write!(f, "t{}", self.0)
        } else {
            write!(f, "t?")
        }
    }
}

// ── TimeDuration ──────────────────────────────────────────────────────────────

/// A signed span of simulated seconds.
///
/// Constructors convert from coarser units exactly; there is no fractional
/// second anywhere in scheduling.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeDuration(pub i64);

impl TimeDuration {
    pub const ZERO: TimeDuration = TimeDuration(0);

    #[inline]
    pub const fn secs(n: i64) -> TimeDuration {
        TimeDuration(n)
    }

    #[inline]
    pub const fn mins(n: i64) -> TimeDuration {
        TimeDuration(n * 60)
    }

    #[inline]
    pub const fn hours(n: i64) -> TimeDuration {
        TimeDuration(n * 3_600)
    }

    #[inline]
    pub const fn days(n: i64) -> TimeDuration {
        TimeDuration(n * 86_400)
    }

    /// Total whole seconds.
    #[inline]
    pub const fn as_secs(self) -> i64 {
        self.0
    }

    /// Duration as fractional hours.  For rate arithmetic (arrivals/hour),
    /// not for scheduling.
    #[inline]
    pub fn as_hours_f64(self) -> f64 {
        self.0 as f64 / 3_600.0
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl Add for TimeDuration {
    type Output = TimeDuration;
    #[inline]
    fn add(self, rhs: TimeDuration) -> TimeDuration {
        TimeDuration(self.0 + rhs.0)
    }
}

impl Sub for TimeDuration {
    type Output = TimeDuration;
    #[inline]
    fn sub(self, rhs: TimeDuration) -> TimeDuration {
        TimeDuration(self.0 - rhs.0)
    }
}

impl Neg for TimeDuration {
    type Output = TimeDuration;
    #[inline]
    fn neg(self) -> TimeDuration {
        TimeDuration(-self.0)
    }
}

impl fmt::Display for TimeDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}
