//! Multiple importance sampling weights.

/// Power heuristic (beta = 2) weight for strategy `a` against strategy `b`.
///
/// Returns 0 when both densities are zero.
#[inline]
pub fn power_heuristic(a: f32, b: f32) -> f32 {
    if a.is_infinite() {
        return 1.0;
    }
    let a2 = a * a;
    let b2 = b * b;
    let sum = a2 + b2;
    if sum <= 0.0 {
        0.0
    } else {
        a2 / sum
    }
}

/// Balance heuristic weight for strategy `a` against strategy `b`.
#[inline]
pub fn balance_heuristic(a: f32, b: f32) -> f32 {
    if a.is_infinite() {
        return 1.0;
    }
    let sum = a + b;
    if sum <= 0.0 {
        0.0
    } else {
        a / sum
    }
}
