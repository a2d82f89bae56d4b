//! Hashed-lattice value noise used for terrain, climate and decoration
//! sampling. Every function here is a pure function of `(x, z, seed, salt)`
//! — nothing in this module holds state — so callers get the same terrain
//! for the same seed regardless of generation order.

use crate::{div_floor, mod_abs, splitmix64};

fn lerp01(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn smoothstep01(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Hashes an integer lattice point to a float in `[0, 1)`, salted by the
/// world seed and a caller-chosen constant so independent noise fields
/// (temperature vs. humidity, say) don't correlate.
#[must_use]
pub fn hash01_2d(x: i32, z: i32, salt: u64, world_seed: u64) -> f32 {
    let key = (u64::from(x as u32) << 32) | u64::from(z as u32);
    let h = splitmix64(key ^ salt ^ world_seed) as u32;
    (h & 0x00FF_FFFF) as f32 / 16_777_215.0
}

/// Bilinear value noise over a lattice with cell size `scale`, smoothed
/// with a cubic smoothstep so lattice seams don't show up as creases.
#[must_use]
pub fn value_noise_2d(x: i32, z: i32, scale: i32, salt: u64, world_seed: u64) -> f32 {
    let cell_x = div_floor(x, scale);
    let cell_z = div_floor(z, scale);
    let tx = smoothstep01(mod_abs(x, scale) as f32 / scale as f32);
    let tz = smoothstep01(mod_abs(z, scale) as f32 / scale as f32);

    let n00 = hash01_2d(cell_x, cell_z, salt, world_seed);
    let n10 = hash01_2d(cell_x + 1, cell_z, salt, world_seed);
    let n01 = hash01_2d(cell_x, cell_z + 1, salt, world_seed);
    let n11 = hash01_2d(cell_x + 1, cell_z + 1, salt, world_seed);

    let nx0 = lerp01(n00, n10, tx);
    let nx1 = lerp01(n01, n11, tx);
    lerp01(nx0, nx1, tz)
}

/// Three-octave value noise at fixed 48/24/12-block scales, weighted
/// 0.60/0.28/0.12. This is the "continents with local variation" stack used
/// for moisture and the rolling-hills relief term.
#[must_use]
pub fn fractal_noise_2d(x: i32, z: i32, salt: u64, world_seed: u64) -> f32 {
    let n0 = value_noise_2d(x, z, 48, salt ^ 0x9E37_79B9_7F4A_7C15, world_seed);
    let n1 = value_noise_2d(x, z, 24, salt ^ 0xD1B5_4A32_D192_ED03, world_seed);
    let n2 = value_noise_2d(x, z, 12, salt ^ 0x94D0_49BB_1331_11EB, world_seed);
    n0 * 0.60 + n1 * 0.28 + n2 * 0.12
}

/// Three-octave value noise at `scale`, `scale/2`, `scale/4`, weighted
/// 0.62/0.26/0.12 and remapped to `[-1, 1]`. Used for the climate axes
/// (temperature, humidity, continentalness, erosion, weirdness), where the
/// octave scale varies per axis instead of being fixed like
/// [`fractal_noise_2d`].
#[must_use]
pub fn climate_axis(qx: i32, qz: i32, scale: i32, salt: u64, world_seed: u64) -> f32 {
    let n0 = value_noise_2d(qx, qz, scale, salt ^ 0x9E37_79B9_7F4A_7C15, world_seed);
    let n1 = value_noise_2d(qx, qz, scale / 2, salt ^ 0xD1B5_4A32_D192_ED03, world_seed);
    let n2 = value_noise_2d(qx, qz, scale / 4, salt ^ 0x94D0_49BB_1331_11EB, world_seed);
    (n0 * 0.62 + n1 * 0.26 + n2 * 0.12) * 2.0 - 1.0
}

#[cfg(test)]
mod tests {
    use super::{climate_axis, fractal_noise_2d, hash01_2d, value_noise_2d};

    #[test]
    fn hash01_2d_is_deterministic() {
        let a = hash01_2d(10, -4, 0xABCD, 99);
        let b = hash01_2d(10, -4, 0xABCD, 99);
        assert_eq!(a, b);
    }

    #[test]
    fn hash01_2d_stays_in_unit_interval() {
        for x in -5..5 {
            for z in -5..5 {
                let v = hash01_2d(x, z, 7, 42);
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }

    #[test]
    fn value_noise_is_continuous_at_cell_boundaries() {
        let scale = 16;
        let left = value_noise_2d(31, 0, scale, 1, 1);
        let right = value_noise_2d(32, 0, scale, 1, 1);
        assert!((left - right).abs() < 0.25);
    }

    #[test]
    fn fractal_and_climate_noise_stay_bounded() {
        for seed in [0u64, 1, 99] {
            let f = fractal_noise_2d(12, -8, 3, seed);
            assert!((0.0..=1.0).contains(&f));
            let c = climate_axis(12, -8, 96, 3, seed);
            assert!((-1.0..=1.0).contains(&c));
        }
    }
}
