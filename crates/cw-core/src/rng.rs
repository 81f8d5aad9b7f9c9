//! Deterministic RNG lattice: xorshift* streams, path derivation, Gaussian.
//!
//! # Determinism strategy
//!
//! Every stochastic decision in the kernel draws from an [`Rng`] that is
//! reachable from the single root seed, either by *advancing* a stream
//! ([`Rng::seed`]) or by *branching* one ([`Rng::derive`], also spelled
//! `&rng / key`).  The two operations have different contracts:
//!
//! - `seed()` consumes one draw from the parent, so sibling children depend
//!   on creation order.  Use it where order is already fixed (world setup).
//! - `derive(key)` does **not** touch the parent.  The child is a pure
//!   function of `(parent_state, key)`, so `rng / "a"` and `rng / "b"` are
//!   the same streams no matter which is computed first.  Use it wherever
//!   call order is not part of the contract (per-weapon, per-place,
//!   per-purpose sub-streams).
//!
//! The stream itself is xorshift* (12/25/27 shift triplet, odd 64-bit
//! multiplier).  One word of state serializes losslessly, and restoring it
//! reproduces subsequent draws bit-exactly.

use std::ops::Div;

/// 64-bit fractional golden-ratio constant, standing in for the forbidden
/// all-zero state.
const GOLDEN: u64 = 0x9e37_79b9_7f4a_7c15;

/// xorshift* output multiplier.
const MULT: u64 = 0x2545_f491_4f6c_dd1d;

/// Finalizing bijective mix (splitmix64 finalizer).  Used by path
/// derivation to decorrelate the child state from the parent's.
#[inline]
fn mix64(mut z: u64) -> u64 {
    z ^= z >> 30;
    z = z.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z ^= z >> 27;
    z = z.wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

// ── Fnv1a ─────────────────────────────────────────────────────────────────────

/// Incremental FNV-1a hasher for path keys.
///
/// Not a general-purpose hasher: it exists so that [`StreamKey`] impls have
/// a stable, platform-independent byte-level hash that never changes between
/// runs or releases (the derived streams are part of saved state).
#[derive(Clone, Copy)]
pub struct Fnv1a(u64);

impl Fnv1a {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    #[inline]
    pub fn new() -> Self {
        Fnv1a(Self::OFFSET)
    }

    #[inline]
    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::PRIME);
        }
    }

    #[inline]
    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for Fnv1a {
    fn default() -> Self {
        Self::new()
    }
}

// ── StreamKey ─────────────────────────────────────────────────────────────────

/// A value usable as a path-derivation key: `rng / key`.
///
/// Each impl feeds a one-byte domain tag before its payload so keys of
/// different types never collide (`1u64` and `"1"` name distinct streams).
pub trait StreamKey {
    fn feed(&self, h: &mut Fnv1a);
}

impl StreamKey for &str {
    fn feed(&self, h: &mut Fnv1a) {
        h.write(&[0x01]);
        h.write(self.as_bytes());
    }
}

impl StreamKey for String {
    fn feed(&self, h: &mut Fnv1a) {
        self.as_str().feed(h);
    }
}

impl StreamKey for u64 {
    fn feed(&self, h: &mut Fnv1a) {
        h.write(&[0x02]);
        h.write(&self.to_le_bytes());
    }
}

impl StreamKey for u32 {
    fn feed(&self, h: &mut Fnv1a) {
        (*self as u64).feed(h);
    }
}

impl StreamKey for i64 {
    fn feed(&self, h: &mut Fnv1a) {
        h.write(&[0x03]);
        h.write(&self.to_le_bytes());
    }
}

impl StreamKey for i32 {
    fn feed(&self, h: &mut Fnv1a) {
        (*self as i64).feed(h);
    }
}

impl<A: StreamKey, B: StreamKey> StreamKey for (A, B) {
    fn feed(&self, h: &mut Fnv1a) {
        h.write(&[0x04]);
        self.0.feed(h);
        self.1.feed(h);
    }
}

impl<A: StreamKey, B: StreamKey, C: StreamKey> StreamKey for (A, B, C) {
    fn feed(&self, h: &mut Fnv1a) {
        h.write(&[0x05]);
        self.0.feed(h);
        self.1.feed(h);
        self.2.feed(h);
    }
}

impl<K: StreamKey + ?Sized> StreamKey for &K {
    fn feed(&self, h: &mut Fnv1a) {
        (**self).feed(h);
    }
}

// ── Rng ───────────────────────────────────────────────────────────────────────

/// A deterministic xorshift* stream.
///
/// One `u64` of state; cheap to create per actor, per place, per purpose.
/// Intentionally not `Copy` — an accidental state fork silently splits a
/// stream and breaks replay.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rng {
    state: u64,
}

impl Rng {
    /// Create a stream from `seed`.  The all-zero state is a fixed point of
    /// xorshift, so zero is coerced to a nonzero constant.
    pub fn new(seed: u64) -> Self {
        Rng {
            state: if seed == 0 { GOLDEN } else { seed },
        }
    }

    /// Raw state word, for persistence.
    #[inline]
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Rebuild from a persisted state word.  Restoring reproduces subsequent
    /// draws bit-exactly.
    #[inline]
    pub fn from_state(state: u64) -> Self {
        Rng::new(state)
    }

    /// Next raw 64-bit draw.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let mut s = self.state;
        s ^= s >> 12;
        s ^= s << 25;
        s ^= s >> 27;
        self.state = s;
        s.wrapping_mul(MULT)
    }

    /// Uniform `f32` in `[0, 1)` from the top 24 bits of one draw.
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / 16_777_216.0
    }

    /// Uniform `f64` in `[0, 1)` from the top 53 bits of one draw.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / 9_007_199_254_740_992.0
    }

    /// Uniform integer in `[0, n)`.  Rejection sampling: draws whose residue
    /// class is over-represented are discarded, so there is no modulo bias.
    ///
    /// # Panics
    /// Panics if `n == 0`.
    pub fn next_bounded(&mut self, n: u64) -> u64 {
        assert!(n > 0, "next_bounded(0)");
        let limit = u64::MAX - u64::MAX % n;
        loop {
            let x = self.next_u64();
            if x < limit {
                return x % n;
            }
        }
    }

    /// `true` with probability `p` (clamped to `[0, 1]`).
    #[inline]
    pub fn next_bool(&mut self, p: f32) -> bool {
        self.next_f32() < p.clamp(0.0, 1.0)
    }

    /// Advance this stream one step and spawn a child seeded by the emitted
    /// value.  Sibling children depend on creation order; see module docs.
    pub fn seed(&mut self) -> Rng {
        Rng::new(self.next_u64())
    }

    /// Branch a named sub-stream: a pure function of `(state, key)` that
    /// does **not** advance `self`.  `rng.derive(k)` computed twice, or in
    /// any order relative to other keys, yields the same stream.
    pub fn derive<K: StreamKey>(&self, key: K) -> Rng {
        let mut h = Fnv1a::new();
        key.feed(&mut h);
        Rng::new(mix64(self.state ^ h.finish()))
    }
}

/// Path operator sugar: `&rng / "combat"` ≡ `rng.derive("combat")`.
impl<K: StreamKey> Div<K> for &Rng {
    type Output = Rng;

    #[inline]
    fn div(self, key: K) -> Rng {
        self.derive(key)
    }
}

// ── Gaussian ──────────────────────────────────────────────────────────────────

/// A normal-variate source: an [`Rng`] plus a Box–Muller cache.
///
/// Box–Muller produces values in pairs; the second is cached and returned by
/// the next call.  The cache is part of serialized state — dropping it on a
/// save/load cycle would shift every subsequent draw by one.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gaussian {
    rng: Rng,
    primed: bool,
    cached: f32,
}

impl Gaussian {
    pub fn new(rng: Rng) -> Self {
        Gaussian {
            rng,
            primed: false,
            cached: 0.0,
        }
    }

    /// Rebuild from persisted `(state, primed, cached)`.
    pub fn from_parts(state: u64, primed: bool, cached: f32) -> Self {
        Gaussian {
            rng: Rng::from_state(state),
            primed,
            cached,
        }
    }

    /// `(state, primed, cached)` for persistence.
    pub fn parts(&self) -> (u64, bool, f32) {
        (self.rng.state(), self.primed, self.cached)
    }

    /// Next standard-normal variate.
    pub fn next(&mut self) -> f32 {
        if self.primed {
            self.primed = false;
            return self.cached;
        }
        // u1 in (0, 1]: ln(0) is -inf.
        let u1 = 1.0 - self.rng.next_f32();
        let u2 = self.rng.next_f32();
        let r = (-2.0 * u1.ln()).sqrt();
        let theta = std::f32::consts::TAU * u2;
        self.cached = r * theta.sin();
        self.primed = true;
        r * theta.cos()
    }

    /// Normal variate with the given mean and standard deviation.
    #[inline]
    pub fn sample(&mut self, mean: f32, sd: f32) -> f32 {
        mean + sd * self.next()
    }
}
