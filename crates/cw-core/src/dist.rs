//! Distribution helpers over [`Rng`].
//!
//! Free functions rather than `Rng` methods: the kernel's own draws stay on
//! the small fixed `Rng` surface (replay-auditable), while anything shaped
//! like a distribution lives here and composes from those primitives.

use crate::rng::Rng;

/// A uniformly chosen element of `items`, or `None` if empty.
pub fn choose<'a, T>(rng: &mut Rng, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    Some(&items[rng.next_bounded(items.len() as u64) as usize])
}

/// An element of `items` chosen with probability proportional to
/// `weight(item)`.  Non-positive weights are treated as zero; returns `None`
/// if `items` is empty or all weights are zero.
pub fn choose_weighted<'a, T, F>(rng: &mut Rng, items: &'a [T], weight: F) -> Option<&'a T>
where
    F: Fn(&T) -> f64,
{
    let total: f64 = items.iter().map(|it| weight(it).max(0.0)).sum();
    if total <= 0.0 {
        return None;
    }
    let mut target = rng.next_f64() * total;
    for it in items {
        target -= weight(it).max(0.0);
        if target < 0.0 {
            return Some(it);
        }
    }
    // Float round-off can leave a sliver; the last item absorbs it.
    items.last()
}

/// `k` distinct elements of `items`, in draw order (partial Fisher–Yates).
///
/// Returns fewer than `k` when `items` is shorter than `k`.
pub fn choose_k<'a, T>(rng: &mut Rng, items: &'a [T], k: usize) -> Vec<&'a T> {
    let n = items.len();
    let k = k.min(n);
    let mut idx: Vec<usize> = (0..n).collect();
    for i in 0..k {
        let j = i + rng.next_bounded((n - i) as u64) as usize;
        idx.swap(i, j);
    }
    idx[..k].iter().map(|&i| &items[i]).collect()
}

/// A Poisson variate with rate `lambda`.
///
/// Knuth's product-of-uniforms up to `lambda = 32` (cost O(lambda)); above
/// that a normal approximation, which at that scale is within the noise the
/// kernel cares about and costs two draws.  `lambda <= 0` yields 0.
pub fn poisson(rng: &mut Rng, lambda: f64) -> u64 {
    if lambda <= 0.0 {
        return 0;
    }
    if lambda > 32.0 {
        // Inline Box–Muller; u1 in (0, 1] keeps ln finite.
        let u1 = 1.0 - rng.next_f64();
        let u2 = rng.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
        return (lambda + lambda.sqrt() * z).round().max(0.0) as u64;
    }
    let limit = (-lambda).exp();
    let mut k: u64 = 0;
    let mut p = 1.0;
    loop {
        p *= rng.next_f64();
        if p <= limit {
            return k;
        }
        k += 1;
    }
}

/// The `p`-quantile of a Poisson(`lambda`) distribution: the smallest `k`
/// with `CDF(k) >= p`.  Deterministic — no rng involved.
pub fn poisson_quantile(lambda: f64, p: f64) -> u64 {
    if lambda <= 0.0 || p <= 0.0 {
        return 0;
    }
    let p = p.min(1.0 - 1e-12);
    let mut k: u64 = 0;
    let mut pmf = (-lambda).exp();
    let mut cdf = pmf;
    while cdf < p {
        k += 1;
        pmf *= lambda / k as f64;
        cdf += pmf;
        // lambda large enough to exhaust f64 precision is outside kernel use.
        if k > 1_000_000 {
            break;
        }
    }
    k
}

/// An exponential variate with the given mean, via inverse CDF.
pub fn exponential(rng: &mut Rng, mean: f64) -> f64 {
    if mean <= 0.0 {
        return 0.0;
    }
    // 1 - u in (0, 1]: ln(0) is -inf.
    -mean * (1.0 - rng.next_f64()).ln()
}
