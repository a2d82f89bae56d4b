//! Foundational, dependency-light primitives shared by every other crate in
//! the workspace: seed mixing, the process-wide gameplay RNG, and the
//! hashed-lattice noise functions the world generator builds on.

#![warn(missing_docs)]

pub mod noise;
pub mod rng;

pub use noise::{fractal_noise_2d, hash01_2d, value_noise_2d};
pub use rng::{FastRand, splitmix64};

/// Floor division, matching C's `div_floor` helper used throughout the
/// original world generator (Rust's `/` truncates toward zero instead).
#[must_use]
pub const fn div_floor(a: i32, b: i32) -> i32 {
    let q = a / b;
    let r = a % b;
    if (r != 0) && ((r < 0) != (b < 0)) { q - 1 } else { q }
}

/// Euclidean-style modulo that always returns a value in `0..b`.
#[must_use]
pub const fn mod_abs(a: i32, b: i32) -> i32 {
    let r = a % b;
    if r < 0 { r + b } else { r }
}

#[cfg(test)]
mod tests {
    use super::{div_floor, mod_abs};

    #[test]
    fn div_floor_rounds_toward_negative_infinity() {
        assert_eq!(div_floor(-1, 8), -1);
        assert_eq!(div_floor(-8, 8), -1);
        assert_eq!(div_floor(-9, 8), -2);
        assert_eq!(div_floor(7, 8), 0);
    }

    #[test]
    fn mod_abs_never_negative() {
        assert_eq!(mod_abs(-1, 8), 7);
        assert_eq!(mod_abs(-8, 8), 0);
        assert_eq!(mod_abs(9, 8), 1);
    }
}
