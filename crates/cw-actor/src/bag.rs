//! Commodities and supply bags.

use std::fmt;

use crate::error::ActorError;

// ── Commodity ─────────────────────────────────────────────────────────────────

/// The tradeable commodity kinds.
///
/// A closed set: bags store quantities in a fixed array indexed by
/// [`Commodity::index`], so lookups never hash.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Commodity {
    Fuel,
    Water,
    Rations,
    Scrap,
    Parts,
}

impl Commodity {
    pub const COUNT: usize = 5;

    pub const ALL: [Commodity; Commodity::COUNT] = [
        Commodity::Fuel,
        Commodity::Water,
        Commodity::Rations,
        Commodity::Scrap,
        Commodity::Parts,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Flat per-unit appraisal used when no pricing collaborator is wired
    /// in.  Pricing curves are policy, not kernel.
    pub fn base_value(self) -> f64 {
        match self {
            Commodity::Fuel => 5.0,
            Commodity::Water => 3.0,
            Commodity::Rations => 4.0,
            Commodity::Scrap => 1.0,
            Commodity::Parts => 8.0,
        }
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Commodity::Fuel => "fuel",
            Commodity::Water => "water",
            Commodity::Rations => "rations",
            Commodity::Scrap => "scrap",
            Commodity::Parts => "parts",
        };
        f.write_str(name)
    }
}

// ── Bag ───────────────────────────────────────────────────────────────────────

/// A bag of commodity quantities.
///
/// Quantities are whole units and never negative.  An actor carries two
/// bags — `supplies` (working stock) and `cargo` (hold); the one-way
/// overdraw from supplies into cargo lives on the actor, not here.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bag {
    amounts: [i64; Commodity::COUNT],
}

impl Bag {
    pub fn new() -> Self {
        Bag::default()
    }

    /// Build from `(commodity, quantity)` pairs.
    pub fn with(contents: &[(Commodity, i64)]) -> Self {
        let mut bag = Bag::new();
        for &(c, n) in contents {
            bag.credit(c, n);
        }
        bag
    }

    #[inline]
    pub fn qty(&self, c: Commodity) -> i64 {
        self.amounts[c.index()]
    }

    /// Add `n` units (n ≥ 0).
    pub fn credit(&mut self, c: Commodity, n: i64) {
        debug_assert!(n >= 0, "credit of negative quantity");
        self.amounts[c.index()] += n;
    }

    /// Remove `n` units; errors without mutating on shortfall.
    pub fn debit(&mut self, c: Commodity, n: i64) -> Result<(), ActorError> {
        debug_assert!(n >= 0, "debit of negative quantity");
        let have = self.amounts[c.index()];
        if have < n {
            return Err(ActorError::Shortfall {
                commodity: c,
                need: n,
                have,
            });
        }
        self.amounts[c.index()] = have - n;
        Ok(())
    }

    /// Total units across all commodities.
    pub fn total(&self) -> i64 {
        self.amounts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.iter().all(|&n| n == 0)
    }

    /// Appraised value of the whole bag at base values.
    pub fn appraise(&self) -> f64 {
        Commodity::ALL
            .iter()
            .map(|&c| self.qty(c) as f64 * c.base_value())
            .sum()
    }
}
