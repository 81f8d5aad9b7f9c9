//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and
//! scheduler tags without ceremony.  The inner integer is `pub` for display
//! and persistence; callers should prefer the `.index()` helper when a
//! `usize` is needed.

use std::fmt;

use crate::rng::{Fnv1a, StreamKey};

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID" — equivalent to `u32::MAX`.
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        /// IDs are valid path keys: `&actor.rng / place_id` names the
        /// actor's sub-stream for that place.
        impl StreamKey for $name {
            fn feed(&self, h: &mut Fnv1a) {
                h.write(&[0x06]);
                h.write(stringify!($name).as_bytes());
                h.write(&(self.0 as u64).to_le_bytes());
            }
        }
    };
}

typed_id! {
    /// Identity of an actor (crawler, settlement, resource site).
    pub struct ActorId(u32);
}

typed_id! {
    /// Identity of a geographic place.
    pub struct PlaceId(u32);
}

typed_id! {
    /// Identity of a road between two places.
    pub struct RoadId(u32);
}

typed_id! {
    /// Identity of a convoy (a leader plus member actors travelling together).
    pub struct ConvoyId(u32);
}
