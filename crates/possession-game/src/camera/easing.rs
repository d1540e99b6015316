//! Transition easing
//!
//! `f(x) = x^a / (x^a + (1 - x)^a)` with `a = ease_factor + 1`. `a = 1` is
//! linear; larger exponents give a slow-fast-slow S-curve. `f(0.5) = 0.5`
//! for every exponent.

/// Remap linear progress `x` in `[0, 1]` onto the easing curve.
///
/// `ease_factor` is clamped to `[0, 2]`; the endpoints are returned directly
/// so `0^a` never has to be evaluated.
pub fn ease(x: f32, ease_factor: f32) -> f32 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let a = ease_factor.clamp(0.0, 2.0) + 1.0;
    let rise = x.powf(a);
    let fall = (1.0 - x).powf(a);
    rise / (rise + fall)
}
