//! The authoritative log of block overrides on top of the procedural
//! terrain, plus the chest inventories that piggyback on it.
//!
//! A chest occupies one head record plus 14 trailing records; the trailing
//! records are never linked into the bucket index, so a bucket walk only
//! ever sees head records — the "skip trailing records" rule falls out of
//! how insertion links records rather than needing an explicit check on
//! every walk.

use nethr_registry::Block;
use nethr_utils::splitmix64;
use rustc_hash::FxHashMap;

use crate::config::{CHUNK_BUCKET_COUNT, MAX_BLOCK_CHANGES};
use crate::error::BlockChangeError;

/// Marks a record slot as unused.
pub const SENTINEL_BLOCK: u8 = 0xFF;
/// One head record plus this many trailing records make up a chest.
pub const CHEST_TRAILING_RECORDS: usize = 14;
/// 27 inventory slots, packed two per trailing record (a record's four
/// fields hold two item ids and two counts).
pub const CHEST_SLOT_COUNT: usize = 27;
/// How many chest slots one trailing record's four fields hold.
const CHEST_SLOTS_PER_RECORD: usize = 2;

/// One (item id, count) pair. `count == 0` means the slot is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemStack {
    pub item_id: u16,
    pub count: u8,
}

impl ItemStack {
    /// Fixed 3-byte wire form: item id (LE) then count.
    pub(crate) fn write_to(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.item_id.to_le_bytes());
        out.push(self.count);
    }

    pub(crate) fn read_from(bytes: &[u8]) -> Self {
        Self { item_id: u16::from_le_bytes([bytes[0], bytes[1]]), count: bytes[2] }
    }
}

/// A chest's 27-slot inventory, addressed by the index of its head record
/// in the block-change log rather than by arithmetic into the raw record
/// bytes.
#[derive(Debug, Clone)]
pub struct Chest {
    pub slots: [ItemStack; CHEST_SLOT_COUNT],
}

impl Default for Chest {
    fn default() -> Self {
        Self { slots: [ItemStack::default(); CHEST_SLOT_COUNT] }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Record {
    x: i16,
    z: i16,
    y: u8,
    block: u8,
}

impl Record {
    const EMPTY: Self = Self { x: 0, z: 0, y: 0, block: SENTINEL_BLOCK };

    fn is_sentinel(self) -> bool {
        self.block == SENTINEL_BLOCK
    }

    fn matches(self, x: i32, y: i32, z: i32) -> bool {
        !self.is_sentinel()
            && i32::from(self.x) == x
            && i32::from(self.y) == y
            && i32::from(self.z) == z
    }
}

/// Packs two chest slots' worth of `ItemStack`s into one trailing record's
/// four fields: `x`/`y` carry the first slot's id/count, `z`/`block` the
/// second's. Missing slots (past `CHEST_SLOT_COUNT`) encode as empty.
fn encode_chest_trailing(chest: &Chest, offset: usize) -> Record {
    let slot_a = offset * CHEST_SLOTS_PER_RECORD;
    let slot_b = slot_a + 1;
    let a = chest.slots.get(slot_a).copied().unwrap_or_default();
    let b = chest.slots.get(slot_b).copied().unwrap_or_default();
    Record { x: a.item_id as i16, z: b.item_id as i16, y: a.count, block: b.count }
}

/// Inverse of [`encode_chest_trailing`].
fn decode_chest_trailing(chest: &mut Chest, offset: usize, record: Record) {
    let slot_a = offset * CHEST_SLOTS_PER_RECORD;
    let slot_b = slot_a + 1;
    if slot_a < CHEST_SLOT_COUNT {
        chest.slots[slot_a] = ItemStack { item_id: record.x as u16, count: record.y };
    }
    if slot_b < CHEST_SLOT_COUNT {
        chest.slots[slot_b] = ItemStack { item_id: record.z as u16, count: record.block };
    }
}

fn chunk_bucket(x: i32, z: i32) -> usize {
    let chunk_x = nethr_utils::div_floor(x, 16);
    let chunk_z = nethr_utils::div_floor(z, 16);
    let packed = (chunk_x as i64 as u64) ^ ((chunk_z as i64 as u64).rotate_left(32));
    (splitmix64(packed) as usize) % CHUNK_BUCKET_COUNT
}

/// Fixed-capacity ordered log of authoritative block overrides, indexed by
/// chunk bucket for sub-linear lookup.
pub struct BlockChangeStore {
    records: Vec<Record>,
    /// `next[i]` is the index following `i` within its bucket, or `-1`.
    next: Vec<i32>,
    buckets: [i32; CHUNK_BUCKET_COUNT],
    high_water: usize,
    dirty: bool,
    chests: FxHashMap<usize, Chest>,
}

impl BlockChangeStore {
    /// An empty store with room for `MAX_BLOCK_CHANGES` records.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: vec![Record::EMPTY; MAX_BLOCK_CHANGES],
            next: vec![-1; MAX_BLOCK_CHANGES],
            buckets: [-1; CHUNK_BUCKET_COUNT],
            high_water: 0,
            dirty: false,
            chests: FxHashMap::default(),
        }
    }

    /// Rebuilds the chunk-bucket index from the record array, skipping
    /// sentinel and chest-trailing slots. Only head records are linked.
    fn rebuild_index(&mut self) {
        self.buckets = [-1; CHUNK_BUCKET_COUNT];
        self.next.fill(-1);
        let mut i = 0usize;
        while i < self.high_water {
            let record = self.records[i];
            if record.is_sentinel() {
                i += 1;
                continue;
            }
            let is_chest_head = self.chests.contains_key(&i);
            let bucket = chunk_bucket(i32::from(record.x), i32::from(record.z));
            self.next[i] = self.buckets[bucket];
            self.buckets[bucket] = i as i32;
            i += if is_chest_head { 1 + CHEST_TRAILING_RECORDS } else { 1 };
        }
        self.dirty = false;
    }

    fn ensure_fresh(&mut self) {
        if self.dirty {
            self.rebuild_index();
        }
    }

    /// Walks the chunk bucket for `(x, y, z)` and returns the stored
    /// override, or `None` if there is no override at that cell.
    pub fn get_block_change(&mut self, x: i32, y: i32, z: i32) -> Option<u8> {
        self.ensure_fresh();
        let bucket = chunk_bucket(x, z);
        let mut index = self.buckets[bucket];
        while index >= 0 {
            let record = self.records[index as usize];
            if record.matches(x, y, z) {
                return Some(record.block);
            }
            index = self.next[index as usize];
        }
        None
    }

    fn find_existing(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        (0..self.high_water).find(|&i| self.records[i].matches(x, y, z))
    }

    fn clear_record(&mut self, index: usize) {
        if self.chests.remove(&index).is_some() {
            for offset in 1..=CHEST_TRAILING_RECORDS {
                self.records[index + offset] = Record::EMPTY;
            }
        }
        self.records[index] = Record::EMPTY;
    }

    /// Finds a run of `len` contiguous sentinel slots within the already
    /// allocated range, falling back to extending past `high_water` (up to
    /// capacity) if none exists inside it.
    fn find_free_span(&self, len: usize) -> Option<usize> {
        let search_limit = MAX_BLOCK_CHANGES.checked_sub(len)?;
        'outer: for start in 0..=search_limit {
            for offset in 0..len {
                if !self.records[start + offset].is_sentinel() {
                    continue 'outer;
                }
            }
            return Some(start);
        }
        None
    }

    /// Applies a block change at `(x, y, z)`. `base` is the procedural block
    /// id that would occupy this cell with no override. Returns `Ok(true)`
    /// if an override now exists, `Ok(false)` if the cell reverted to its
    /// procedural base (no override stored).
    ///
    /// # Errors
    /// Returns [`BlockChangeError::LogFull`] if a non-chest insertion has no
    /// room, or [`BlockChangeError::NoChestSpan`] if a chest placement can't
    /// find 15 contiguous free records.
    pub fn make_block_change(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        block: u8,
        base: u8,
    ) -> Result<bool, BlockChangeError> {
        if let Some(index) = self.find_existing(x, y, z) {
            self.clear_record(index);
            self.dirty = true;
        }

        if block == base {
            return Ok(false);
        }

        let is_chest = block == Block::Chest as u8;
        let span = if is_chest { 1 + CHEST_TRAILING_RECORDS } else { 1 };

        let index = match self.find_free_span(span) {
            Some(index) => index,
            None => {
                return Err(if is_chest {
                    BlockChangeError::NoChestSpan
                } else {
                    BlockChangeError::LogFull
                });
            }
        };

        self.records[index] = Record {
            x: x as i16,
            z: z as i16,
            y: y as u8,
            block,
        };
        if is_chest {
            let chest = Chest::default();
            for offset in 0..CHEST_TRAILING_RECORDS {
                self.records[index + 1 + offset] = encode_chest_trailing(&chest, offset);
            }
            self.chests.insert(index, chest);
        }
        self.high_water = self.high_water.max(index + span);
        self.dirty = true;
        Ok(true)
    }

    /// The chest inventory rooted at the head record at `(x, y, z)`, if one
    /// exists there.
    pub fn chest_at(&mut self, x: i32, y: i32, z: i32) -> Option<&mut Chest> {
        let index = self.find_existing(x, y, z)?;
        self.chests.get_mut(&index)
    }

    /// The number of occupied record slots, used when restoring the count
    /// from a fresh file scan.
    #[must_use]
    pub fn active_count(&self) -> usize {
        (0..self.high_water).filter(|&i| !self.records[i].is_sentinel()).count()
    }

    /// Raw record bytes for persistence: `(x, z, y, block)` for every slot
    /// up to capacity, little-endian on disk per the record layout. A
    /// chest's trailing records are re-encoded from its live `Chest` on
    /// every call rather than trusting whatever `self.records` holds, since
    /// slot mutations go through `chest_at` and never touch the record
    /// array directly.
    #[must_use]
    pub fn iter_all_records(&self) -> Vec<(i16, i16, u8, u8)> {
        let mut out = Vec::with_capacity(self.records.len());
        let mut i = 0usize;
        while i < self.records.len() {
            let record = self.records[i];
            out.push((record.x, record.z, record.y, record.block));
            if let Some(chest) = self.chests.get(&i) {
                for offset in 0..CHEST_TRAILING_RECORDS {
                    let trailing = encode_chest_trailing(chest, offset);
                    out.push((trailing.x, trailing.z, trailing.y, trailing.block));
                }
                i += 1 + CHEST_TRAILING_RECORDS;
            } else {
                i += 1;
            }
        }
        out
    }

    /// Restores the store from a full record array read off disk, rebuilding
    /// the high-water mark by scanning for the highest non-sentinel index,
    /// re-deriving chest membership from contiguous non-sentinel runs that
    /// start on a chest block id, and decoding each chest's slots back out
    /// of its trailing records' bytes.
    #[must_use]
    pub fn from_records(records: &[(i16, i16, u8, u8)]) -> Self {
        let mut store = Self::new();
        for (i, &(x, z, y, block)) in records.iter().enumerate().take(MAX_BLOCK_CHANGES) {
            store.records[i] = Record { x, z, y, block };
        }
        let mut highest = 0usize;
        let mut i = 0usize;
        while i < MAX_BLOCK_CHANGES {
            if !store.records[i].is_sentinel() {
                highest = i + 1;
                if store.records[i].block == Block::Chest as u8
                    && i + CHEST_TRAILING_RECORDS < MAX_BLOCK_CHANGES
                {
                    let mut chest = Chest::default();
                    for offset in 0..CHEST_TRAILING_RECORDS {
                        decode_chest_trailing(&mut chest, offset, store.records[i + 1 + offset]);
                    }
                    store.chests.insert(i, chest);
                    i += 1 + CHEST_TRAILING_RECORDS;
                    highest = highest.max(i);
                    continue;
                }
            }
            i += 1;
        }
        store.high_water = highest;
        store.dirty = true;
        store
    }
}

impl Default for BlockChangeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{BlockChangeStore, SENTINEL_BLOCK};

    #[test]
    fn revert_to_base_clears_the_record() {
        let mut store = BlockChangeStore::new();
        assert!(store.make_block_change(1, 64, 1, 5, 2).unwrap());
        assert_eq!(store.get_block_change(1, 64, 1), Some(5));
        assert!(!store.make_block_change(1, 64, 1, 2, 2).unwrap());
        assert_eq!(store.get_block_change(1, 64, 1), None);
    }

    #[test]
    fn distinct_coordinates_do_not_collide() {
        let mut store = BlockChangeStore::new();
        store.make_block_change(0, 64, 0, 9, 0).unwrap();
        store.make_block_change(0, 64, 16, 10, 0).unwrap();
        assert_eq!(store.get_block_change(0, 64, 0), Some(9));
        assert_eq!(store.get_block_change(0, 64, 16), Some(10));
    }

    #[test]
    fn chest_reserves_fifteen_records_and_is_addressable() {
        let mut store = BlockChangeStore::new();
        let chest_block = nethr_registry::Block::Chest as u8;
        store.make_block_change(10, 70, 10, chest_block, 0).unwrap();
        let chest = store.chest_at(10, 70, 10).expect("chest should exist");
        chest.slots[5].item_id = 42;
        chest.slots[5].count = 1;
        assert_eq!(store.active_count(), 15);
    }

    #[test]
    fn chest_contents_survive_a_record_round_trip() {
        let mut store = BlockChangeStore::new();
        let chest_block = nethr_registry::Block::Chest as u8;
        store.make_block_change(10, 70, 10, chest_block, 0).unwrap();
        {
            let chest = store.chest_at(10, 70, 10).unwrap();
            chest.slots[0] = super::ItemStack { item_id: 7, count: 3 };
            chest.slots[26] = super::ItemStack { item_id: 99, count: 12 };
        }

        let records = store.iter_all_records();
        let reloaded = BlockChangeStore::from_records(&records);
        let mut reloaded = reloaded;
        let chest = reloaded.chest_at(10, 70, 10).expect("chest should survive reload");
        assert_eq!(chest.slots[0], super::ItemStack { item_id: 7, count: 3 });
        assert_eq!(chest.slots[26], super::ItemStack { item_id: 99, count: 12 });
    }

    #[test]
    fn full_log_rejects_further_changes() {
        let mut store = BlockChangeStore::new();
        store.records = vec![
            super::Record { x: 0, z: 0, y: 0, block: 1 };
            crate::config::MAX_BLOCK_CHANGES
        ];
        store.high_water = crate::config::MAX_BLOCK_CHANGES;
        // every record pinned to (0,0,0) so (1,64,1) truly has no free span
        let result = store.make_block_change(1, 64, 1, 9, 0);
        assert!(result.is_err());
        assert_ne!(SENTINEL_BLOCK, 9);
    }
}
