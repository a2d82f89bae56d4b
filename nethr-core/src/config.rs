//! Runtime configuration: compiled-in defaults overlaid by environment
//! variables, with an optional `nethr.json5` file in between.

use std::time::Duration;

use serde::Deserialize;

/// Server-wide capacity and tuning constants named throughout the rest of
/// the crate. These are not configurable — they size fixed-capacity arrays
/// and changing them would change the on-disk record layout.
pub const MAX_PLAYERS: usize = 16;
/// Default spot: `MAX_PLAYERS` / 2.
pub const MAX_MOBS: usize = MAX_PLAYERS / 2;
pub const MAX_BLOCK_CHANGES: usize = 20_000;
pub const CHUNK_BUCKET_COUNT: usize = 1024;
pub const VISITED_HISTORY: usize = 32;
pub const MAX_RECV_BUF_LEN: usize = 4096;
pub const NETWORK_TIMEOUT: Duration = Duration::from_secs(15);
pub const WORLDGEN_HEIGHT_CAP: i32 = 320;
pub const CHUNK_SIZE: i32 = 8;
pub const NETHER_ZONE_OFFSET: i32 = 100_000;
pub const MOB_DESPAWN_DISTANCE: i32 = 256;
pub const BIOME_CACHE_SIZE: usize = 4096;

/// File read once at startup, optional, overlaid by environment variables.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ConfigFile {
    pub port: Option<u16>,
    pub motd: Option<String>,
    pub view_distance: Option<i32>,
    pub world_seed_raw: Option<u32>,
    pub rng_seed_raw: Option<u32>,
    pub disk_sync_interval_secs: Option<u64>,
    pub sync_blocks_on_interval: Option<bool>,
    pub tick_interval_millis: Option<u64>,
    pub world_dir: Option<String>,
}

/// The resolved, read-only configuration the server runs with.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub motd: String,
    pub view_distance: i32,
    pub world_seed_raw: u32,
    pub rng_seed_raw: u32,
    pub disk_sync_interval: Duration,
    pub sync_blocks_on_interval: bool,
    pub tick_interval: Duration,
    pub world_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 25565,
            motd: String::from("A nethr server"),
            view_distance: 10,
            world_seed_raw: 0,
            rng_seed_raw: 0,
            disk_sync_interval: Duration::from_secs(15),
            sync_blocks_on_interval: false,
            tick_interval: Duration::from_millis(100),
            world_dir: String::from("."),
        }
    }
}

impl Config {
    /// Starts from [`Default`], overlays `file` (if any), then overlays
    /// `NETHR_*` environment variables, matching spec.md §6's named
    /// collaborators.
    #[must_use]
    pub fn resolve(file: Option<ConfigFile>) -> Self {
        let mut config = Self::default();

        if let Some(file) = file {
            if let Some(port) = file.port {
                config.port = port;
            }
            if let Some(motd) = file.motd {
                config.motd = motd;
            }
            if let Some(view_distance) = file.view_distance {
                config.view_distance = view_distance;
            }
            if let Some(seed) = file.world_seed_raw {
                config.world_seed_raw = seed;
            }
            if let Some(seed) = file.rng_seed_raw {
                config.rng_seed_raw = seed;
            }
            if let Some(secs) = file.disk_sync_interval_secs {
                config.disk_sync_interval = Duration::from_secs(secs);
            }
            if let Some(flag) = file.sync_blocks_on_interval {
                config.sync_blocks_on_interval = flag;
            }
            if let Some(millis) = file.tick_interval_millis {
                config.tick_interval = Duration::from_millis(millis);
            }
            if let Some(dir) = file.world_dir {
                config.world_dir = dir;
            }
        }

        if let Ok(seed) = std::env::var("NETHR_WORLD_SEED") {
            if let Ok(parsed) = seed.parse() {
                config.world_seed_raw = parsed;
            }
        }
        if let Ok(seed) = std::env::var("NETHR_RNG_SEED") {
            if let Ok(parsed) = seed.parse() {
                config.rng_seed_raw = parsed;
            }
        }
        if let Ok(view_distance) = std::env::var("NETHR_VIEW_DISTANCE") {
            if let Ok(parsed) = view_distance.parse::<i32>() {
                config.view_distance = parsed.clamp(2, 16);
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn defaults_are_sane() {
        let config = Config::resolve(None);
        assert_eq!(config.port, 25565);
        assert_eq!(config.view_distance, 10);
    }

    #[test]
    fn file_overlay_wins_over_default() {
        let file = super::ConfigFile {
            motd: Some("custom".to_string()),
            ..Default::default()
        };
        let config = Config::resolve(Some(file));
        assert_eq!(config.motd, "custom");
        assert_eq!(config.port, 25565);
    }
}
