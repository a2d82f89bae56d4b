//! Binary world persistence: `world.bin` (block changes + player records)
//! and `world.meta` (seeds + locked spawn, line-based UTF-8).
//!
//! Block-change records are little-endian on disk — an explicit choice
//! (the endianness Open Question, see `DESIGN.md`) rather than inherited
//! host byte order.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::blockchange::{BlockChangeStore, ItemStack};
use crate::config::MAX_BLOCK_CHANGES;
use crate::error::PersistenceError;

const META_HEADER: &str = "NETHR_META_V1";
const RECORD_SIZE: usize = 6; // x:i16 LE, z:i16 LE, y:u8, block:u8

/// World seeds and the locked spawn point, loaded from `world.meta`.
#[derive(Debug, Clone, Default)]
pub struct WorldMeta {
    pub world_seed_raw: u32,
    pub rng_seed_raw: u32,
    pub spawn: Option<(i16, u8, i16)>,
}

impl WorldMeta {
    /// Loads `path`, returning `Ok(None)` if the file is simply absent —
    /// a missing meta file is benign, not an error.
    pub fn load(path: &Path) -> Result<Option<Self>, PersistenceError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut lines = text.lines();
        match lines.next() {
            Some(header) if header.trim() == META_HEADER => {}
            _ => return Err(PersistenceError::MalformedMeta("missing header".into())),
        }

        let mut meta = Self::default();
        let mut spawn_x = None;
        let mut spawn_y = None;
        let mut spawn_z = None;

        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(PersistenceError::MalformedMeta(format!("bad line: {line}")));
            };
            let parse = |v: &str| -> Result<i64, PersistenceError> {
                v.parse().map_err(|_| PersistenceError::MalformedMeta(format!("bad value: {v}")))
            };
            match key {
                "WORLD_SEED" => meta.world_seed_raw = parse(value)? as u32,
                "RNG_SEED" => meta.rng_seed_raw = parse(value)? as u32,
                "SPAWN_X" => spawn_x = Some(parse(value)? as i16),
                "SPAWN_Y" => spawn_y = Some(parse(value)? as u8),
                "SPAWN_Z" => spawn_z = Some(parse(value)? as i16),
                _ => {}
            }
        }

        if let (Some(x), Some(y), Some(z)) = (spawn_x, spawn_y, spawn_z) {
            meta.spawn = Some((x, y, z));
        }

        Ok(Some(meta))
    }

    /// Writes the meta file; spawn lines are only emitted once a spawn has
    /// been locked.
    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        let mut out = String::new();
        out.push_str(META_HEADER);
        out.push('\n');
        out.push_str(&format!("WORLD_SEED={}\n", self.world_seed_raw));
        out.push_str(&format!("RNG_SEED={}\n", self.rng_seed_raw));
        if let Some((x, y, z)) = self.spawn {
            out.push_str(&format!("SPAWN_X={x}\nSPAWN_Y={y}\nSPAWN_Z={z}\n"));
        }
        fs::write(path, out)?;
        Ok(())
    }
}

/// One player record's fixed-width on-disk layout: identity, name,
/// position/orientation, vitals, and the full 41-slot inventory plus the
/// 8-slot crafting grid and its output. A disconnected player's open-chest
/// state is transient UI and isn't part of this layout; reconnecting always
/// comes back with the crafting buffer in its item-holding form.
#[derive(Debug, Clone, Copy)]
pub struct PlayerRecord {
    pub identity: [u8; 16],
    pub name: [u8; 16],
    pub x: i16,
    pub y: u8,
    pub z: i16,
    pub yaw: i8,
    pub pitch: i8,
    pub grounded_y: u8,
    pub health: f32,
    pub hunger: u8,
    pub saturation: f32,
    pub hotbar_index: u8,
    pub inventory: [ItemStack; 41],
    pub crafting_grid: [ItemStack; 8],
    pub output: ItemStack,
    pub flags: u8,
    pub attack_cooldown: u8,
    pub eating_timer: u16,
    pub client_loading_timer: u16,
}

impl Default for PlayerRecord {
    fn default() -> Self {
        Self {
            identity: [0; 16],
            name: [0; 16],
            x: 0,
            y: 0,
            z: 0,
            yaw: 0,
            pitch: 0,
            grounded_y: 0,
            health: 20.0,
            hunger: 20,
            saturation: 5.0,
            hotbar_index: 0,
            inventory: [ItemStack::default(); 41],
            crafting_grid: [ItemStack::default(); 8],
            output: ItemStack::default(),
            flags: 0,
            attack_cooldown: 0,
            eating_timer: 0,
            client_loading_timer: 0,
        }
    }
}

const PLAYER_RECORD_SIZE: usize =
    16 + 16 + 2 + 1 + 2 + 1 + 1 + 1 + 4 + 1 + 4 + 1 + 41 * 3 + 8 * 3 + 3 + 1 + 1 + 2 + 2;

impl PlayerRecord {
    /// Snapshots every field `WorldFile` persists out of a live player, so
    /// `server.rs` never has to copy them by hand.
    #[must_use]
    pub fn from_player(player: &crate::player::PlayerData) -> Self {
        let mut record = Self { identity: *player.identity.as_bytes(), ..Self::default() };
        let src = player.name.as_bytes();
        let n = src.len().min(16);
        record.name[..n].copy_from_slice(&src[..n]);
        record.x = player.x;
        record.y = player.y;
        record.z = player.z;
        record.yaw = player.yaw;
        record.pitch = player.pitch;
        record.grounded_y = player.grounded_y;
        record.health = player.health;
        record.hunger = player.hunger;
        record.saturation = player.saturation;
        record.hotbar_index = player.hotbar_index;
        record.inventory = player.inventory;
        if let crate::player::CraftingState::Items(grid) = player.crafting {
            record.crafting_grid = grid;
        }
        record.output = player.output;
        record.flags = player.flags.bits();
        record.attack_cooldown = player.attack_cooldown;
        record.eating_timer = player.eating_timer;
        record.client_loading_timer = player.client_loading_timer;
        record
    }

    /// Restores every field this record carries onto `player`, used when a
    /// returning player's identity matches a stored record.
    pub fn apply_to(&self, player: &mut crate::player::PlayerData) {
        player.x = self.x;
        player.y = self.y;
        player.z = self.z;
        player.yaw = self.yaw;
        player.pitch = self.pitch;
        player.grounded_y = self.grounded_y;
        player.health = self.health;
        player.hunger = self.hunger;
        player.saturation = self.saturation;
        player.hotbar_index = self.hotbar_index;
        player.inventory = self.inventory;
        player.crafting = crate::player::CraftingState::Items(self.crafting_grid);
        player.output = self.output;
        player.flags = crate::player::PlayerFlags::from_bits_truncate(self.flags);
        player.attack_cooldown = self.attack_cooldown;
        player.eating_timer = self.eating_timer;
        player.client_loading_timer = self.client_loading_timer;
    }

    fn write_to(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.identity);
        out.extend_from_slice(&self.name);
        out.extend_from_slice(&self.x.to_le_bytes());
        out.push(self.y);
        out.extend_from_slice(&self.z.to_le_bytes());
        out.push(self.yaw as u8);
        out.push(self.pitch as u8);
        out.push(self.grounded_y);
        out.extend_from_slice(&self.health.to_le_bytes());
        out.push(self.hunger);
        out.extend_from_slice(&self.saturation.to_le_bytes());
        out.push(self.hotbar_index);
        for stack in self.inventory {
            stack.write_to(out);
        }
        for stack in self.crafting_grid {
            stack.write_to(out);
        }
        self.output.write_to(out);
        out.push(self.flags);
        out.push(self.attack_cooldown);
        out.extend_from_slice(&self.eating_timer.to_le_bytes());
        out.extend_from_slice(&self.client_loading_timer.to_le_bytes());
    }

    fn read_from(bytes: &[u8]) -> Self {
        let mut identity = [0u8; 16];
        identity.copy_from_slice(&bytes[0..16]);
        let mut name = [0u8; 16];
        name.copy_from_slice(&bytes[16..32]);
        let x = i16::from_le_bytes([bytes[32], bytes[33]]);
        let y = bytes[34];
        let z = i16::from_le_bytes([bytes[35], bytes[36]]);
        let yaw = bytes[37] as i8;
        let pitch = bytes[38] as i8;
        let grounded_y = bytes[39];
        let health = f32::from_le_bytes([bytes[40], bytes[41], bytes[42], bytes[43]]);
        let hunger = bytes[44];
        let saturation = f32::from_le_bytes([bytes[45], bytes[46], bytes[47], bytes[48]]);
        let hotbar_index = bytes[49];

        let mut offset = 50;
        let mut inventory = [ItemStack::default(); 41];
        for slot in &mut inventory {
            *slot = ItemStack::read_from(&bytes[offset..offset + 3]);
            offset += 3;
        }
        let mut crafting_grid = [ItemStack::default(); 8];
        for slot in &mut crafting_grid {
            *slot = ItemStack::read_from(&bytes[offset..offset + 3]);
            offset += 3;
        }
        let output = ItemStack::read_from(&bytes[offset..offset + 3]);
        offset += 3;
        let flags = bytes[offset];
        let attack_cooldown = bytes[offset + 1];
        let eating_timer = u16::from_le_bytes([bytes[offset + 2], bytes[offset + 3]]);
        let client_loading_timer = u16::from_le_bytes([bytes[offset + 4], bytes[offset + 5]]);

        Self {
            identity,
            name,
            x,
            y,
            z,
            yaw,
            pitch,
            grounded_y,
            health,
            hunger,
            saturation,
            hotbar_index,
            inventory,
            crafting_grid,
            output,
            flags,
            attack_cooldown,
            eating_timer,
            client_loading_timer,
        }
    }
}

/// Owns the path to `world.bin` for incremental per-record writes.
pub struct WorldFile {
    path: PathBuf,
    max_players: usize,
}

impl WorldFile {
    #[must_use]
    pub fn new(dir: &str, max_players: usize) -> Self {
        Self { path: Path::new(dir).join("world.bin"), max_players }
    }

    fn block_region_len(&self) -> usize {
        MAX_BLOCK_CHANGES * RECORD_SIZE
    }

    /// Loads the full file, creating a zero-filled one if absent. Returns
    /// the block-change store (with its count rebuilt from the scan) and
    /// the raw player records.
    pub fn load(&self) -> Result<(BlockChangeStore, Vec<PlayerRecord>), PersistenceError> {
        let total_len = self.block_region_len() + self.max_players * PLAYER_RECORD_SIZE;
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let zeroed = vec![0u8; total_len];
                fs::write(&self.path, &zeroed)?;
                zeroed
            }
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::with_capacity(MAX_BLOCK_CHANGES);
        for chunk in bytes[..self.block_region_len()].chunks_exact(RECORD_SIZE) {
            let x = i16::from_le_bytes([chunk[0], chunk[1]]);
            let z = i16::from_le_bytes([chunk[2], chunk[3]]);
            let y = chunk[4];
            let block = chunk[5];
            records.push((x, z, y, block));
        }
        let store = BlockChangeStore::from_records(&records);

        let mut players = Vec::with_capacity(self.max_players);
        let player_region = &bytes[self.block_region_len()..];
        for chunk in player_region.chunks_exact(PLAYER_RECORD_SIZE).take(self.max_players) {
            players.push(PlayerRecord::read_from(chunk));
        }

        Ok((store, players))
    }

    /// Rewrites the entire file from scratch: every block-change record and
    /// every player record, in order. Used on the disk-sync interval.
    pub fn save_all(&self, store: &BlockChangeStore, players: &[PlayerRecord]) -> Result<(), PersistenceError> {
        let mut out = Vec::with_capacity(self.block_region_len() + self.max_players * PLAYER_RECORD_SIZE);
        for (x, z, y, block) in store.iter_all_records() {
            out.extend_from_slice(&x.to_le_bytes());
            out.extend_from_slice(&z.to_le_bytes());
            out.push(y);
            out.push(block);
        }
        for i in 0..self.max_players {
            players.get(i).copied().unwrap_or_default().write_to(&mut out);
        }
        fs::write(&self.path, &out)?;
        Ok(())
    }

    /// Rewrites a single block-change record in place, avoiding a full
    /// rewrite on every mutation.
    pub fn save_one_record(&self, index: usize, x: i16, z: i16, y: u8, block: u8) -> Result<(), PersistenceError> {
        use std::io::Seek;
        let mut file = fs::OpenOptions::new().write(true).open(&self.path)?;
        file.seek(std::io::SeekFrom::Start((index * RECORD_SIZE) as u64))?;
        let mut buf = [0u8; RECORD_SIZE];
        buf[0..2].copy_from_slice(&x.to_le_bytes());
        buf[2..4].copy_from_slice(&z.to_le_bytes());
        buf[4] = y;
        buf[5] = block;
        file.write_all(&buf)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{PlayerRecord, WorldFile, WorldMeta};
    use std::io::Read;

    #[test]
    fn meta_round_trips_through_disk() {
        let dir = std::env::temp_dir().join(format!("nethr-meta-test-{:p}", &()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("world.meta");

        let mut meta = WorldMeta { world_seed_raw: 0xA103_DE6C, rng_seed_raw: 7, spawn: None };
        meta.save(&path).unwrap();
        let loaded = WorldMeta::load(&path).unwrap().unwrap();
        assert_eq!(loaded.world_seed_raw, 0xA103_DE6C);
        assert_eq!(loaded.spawn, None);

        meta.spawn = Some((8, 70, 8));
        meta.save(&path).unwrap();
        let loaded = WorldMeta::load(&path).unwrap().unwrap();
        assert_eq!(loaded.spawn, Some((8, 70, 8)));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_meta_file_is_not_an_error() {
        let path = std::env::temp_dir().join("nethr-definitely-absent.meta");
        let _ = std::fs::remove_file(&path);
        assert!(WorldMeta::load(&path).unwrap().is_none());
    }

    #[test]
    fn world_file_round_trips_block_changes_and_player_count() {
        let dir = std::env::temp_dir().join(format!("nethr-world-test-{:p}", &()));
        std::fs::create_dir_all(&dir).unwrap();

        let world_file = WorldFile::new(dir.to_str().unwrap(), 2);
        let (mut store, _players) = world_file.load().unwrap();
        store.make_block_change(1, 64, 1, 9, 0).unwrap();
        store.make_block_change(2, 64, 2, 10, 0).unwrap();

        let mut record = PlayerRecord::default();
        record.x = 5;
        record.y = 70;
        record.z = 5;
        world_file.save_all(&store, &[record]).unwrap();

        let (reloaded_store, reloaded_players) = world_file.load().unwrap();
        assert_eq!(reloaded_store.active_count(), 2);
        assert_eq!(reloaded_players[0].x, 5);

        let mut unused = Vec::new();
        let _ = std::fs::File::open(dir.join("world.bin")).unwrap().read_to_end(&mut unused);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
