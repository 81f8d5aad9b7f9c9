//! Crawler segments.
//!
//! A segment is one module of a crawler's hull.  The taxonomy is a closed
//! tagged set with a common header (hits, maximum hits, online flag,
//! rating); per-kind behavior is a switched dispatch on [`SegmentKind`],
//! not a trait hierarchy.  Damage formulas are a collaborator concern — the
//! kernel only tracks hits and derives capability ratings.

use std::fmt;

// ── SegmentKind ───────────────────────────────────────────────────────────────

/// The segment taxonomy.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SegmentKind {
    Power,
    Traction,
    Offense,
    Defense,
    Industry,
    Storage,
    Harvest,
    Habitat,
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SegmentKind::Power => "power",
            SegmentKind::Traction => "traction",
            SegmentKind::Offense => "offense",
            SegmentKind::Defense => "defense",
            SegmentKind::Industry => "industry",
            SegmentKind::Storage => "storage",
            SegmentKind::Harvest => "harvest",
            SegmentKind::Habitat => "habitat",
        };
        f.write_str(name)
    }
}

// ── Segment ───────────────────────────────────────────────────────────────────

/// One hull segment: the common header shared by every kind.
///
/// `rating` is the kind-specific strength (offense punch, storage units,
/// traction km/h contribution).  `online` is runtime state — a segment at
/// zero hits is forced offline and stays there until repaired.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    pub kind: SegmentKind,
    pub hits: i32,
    pub max_hits: i32,
    pub online: bool,
    pub rating: i32,
}

impl Segment {
    pub fn new(kind: SegmentKind, max_hits: i32, rating: i32) -> Self {
        Segment {
            kind,
            hits: max_hits,
            max_hits,
            online: true,
            rating,
        }
    }

    /// `true` while the segment has hits left.
    #[inline]
    pub fn intact(&self) -> bool {
        self.hits > 0
    }

    /// Rating contributed right now: zero when offline or wrecked.
    #[inline]
    pub fn effective_rating(&self) -> i32 {
        if self.online && self.intact() {
            self.rating
        } else {
            0
        }
    }

    /// Absorb `damage` hits.  Returns the damage actually applied (capped
    /// at remaining hits).  A wrecked segment drops offline.
    pub fn apply_damage(&mut self, damage: i32) -> i32 {
        debug_assert!(damage >= 0);
        let applied = damage.min(self.hits);
        self.hits -= applied;
        if self.hits == 0 {
            self.online = false;
        }
        applied
    }
}

/// Sum of effective ratings for one kind across a hull.
pub fn rating_of(segments: &[Segment], kind: SegmentKind) -> i32 {
    segments
        .iter()
        .filter(|s| s.kind == kind)
        .map(Segment::effective_rating)
        .sum()
}

/// Total remaining hits across a hull.  Zero means destroyed.
pub fn total_hits(segments: &[Segment]) -> i32 {
    segments.iter().map(|s| s.hits).sum()
}
