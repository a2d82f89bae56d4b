//! Per-chunk-anchor corner height and bilinear interpolation between
//! anchors.

use nethr_registry::Biome;
use nethr_utils::{fractal_noise_2d, value_noise_2d};

use crate::config::{CHUNK_SIZE, WORLDGEN_HEIGHT_CAP};
use crate::worldgen::climate::Climate;

const SEA_LEVEL: i32 = 63;
const MIN_HEIGHT: f32 = 48.0;

/// The deterministic terrain height at one chunk anchor, driven by the
/// climate axes already sampled there.
#[must_use]
pub fn corner_height(anchor_x: i32, anchor_z: i32, climate: Climate, world_seed: u64) -> i32 {
    if super::climate::classify(climate) == Biome::Beach {
        return 62;
    }

    let continentalness_term = climate.continentalness * 40.0;
    let erosion_term = -climate.erosion * 24.0;

    let rolling = value_noise_2d(anchor_x, anchor_z, 32, 0x10, world_seed);
    let hills = fractal_noise_2d(anchor_x, anchor_z, 0x11, world_seed);
    let biome_scale = if super::climate::classify(climate) == Biome::Desert { 6.0 } else { 12.0 };
    let rolling_term = (rolling - 0.5) * biome_scale;
    let hills_term = (hills - 0.5) * 10.0;

    let ridge = fractal_noise_2d(anchor_x, anchor_z, 0x12, world_seed) * 2.0 - 1.0;
    let fold = (-1.0 / 3.0 + (ridge.abs() - 2.0 / 3.0).abs()) * -3.0;
    let fold = fold.clamp(0.0, 1.0);
    let mountain_gate = climate.continentalness > 0.3 && climate.erosion < -0.2;
    let mountain_term = if mountain_gate { fold * 60.0 } else { 0.0 };

    let weirdness_term = climate.weirdness.abs().powf(1.5) * 20.0;

    let river_carve = if super::climate::is_river(climate) { -8.0 } else { 0.0 };

    let height = SEA_LEVEL as f32
        + continentalness_term
        + erosion_term
        + rolling_term
        + hills_term
        + mountain_term
        + weirdness_term
        + river_carve;

    height.clamp(MIN_HEIGHT, (WORLDGEN_HEIGHT_CAP - 2) as f32) as i32
}

/// Bilinear height at `(x, z)` over the four surrounding chunk-anchor
/// corners, with the vanilla "step down visually at the chunk origin"
/// special case.
#[must_use]
pub fn interpolated_height(
    x: i32,
    z: i32,
    sample: impl Fn(i32, i32) -> i32,
) -> i32 {
    let x0 = nethr_utils::div_floor(x, CHUNK_SIZE) * CHUNK_SIZE;
    let z0 = nethr_utils::div_floor(z, CHUNK_SIZE) * CHUNK_SIZE;
    let x1 = x0 + CHUNK_SIZE;
    let z1 = z0 + CHUNK_SIZE;

    let h00 = sample(x0, z0);
    if x == x0 && z == z0 && h00 > 67 {
        return h00 - 1;
    }

    let h10 = sample(x1, z0);
    let h01 = sample(x0, z1);
    let h11 = sample(x1, z1);

    let tx = (x - x0) as f32 / CHUNK_SIZE as f32;
    let tz = (z - z0) as f32 / CHUNK_SIZE as f32;

    let top = h00 as f32 * (1.0 - tx) + h10 as f32 * tx;
    let bottom = h01 as f32 * (1.0 - tx) + h11 as f32 * tx;
    (top * (1.0 - tz) + bottom * tz).round() as i32
}

#[cfg(test)]
mod tests {
    use super::interpolated_height;

    #[test]
    fn chunk_origin_with_high_corner_steps_down_by_one() {
        let height = interpolated_height(8, 8, |_, _| 70);
        assert_eq!(height, 69);
    }

    #[test]
    fn non_origin_flat_field_is_unaffected() {
        let height = interpolated_height(11, 13, |_, _| 70);
        assert_eq!(height, 70);
    }
}
