//! Fluid spread, recomputed breadth-first from a changed cell rather than
//! ticked continuously. The flag this behavior sits behind is compiled in
//! rather than configurable, matching the always-on posture water and lava
//! ship with everywhere else in the simulation.

use std::collections::VecDeque;

use nethr_registry::Block;

use crate::blockchange::BlockChangeStore;
use crate::worldgen::WorldGenerator;

/// Caps one flood-fill's total propagated cells so a single break at the
/// edge of an ocean can't stall the tick loop.
const MAX_FLOW_STEPS: usize = 64;

fn block_here(generator: &mut WorldGenerator, changes: &mut BlockChangeStore, x: i32, y: i32, z: i32) -> Block {
    changes
        .get_block_change(x, y, z)
        .and_then(Block::from_u8)
        .unwrap_or_else(|| generator.block_at(x, y, z))
}

/// Recomputes fluid spread starting from `(x, y, z)`: any air cell adjacent
/// to a water or lava source (or an already-flowing cell) takes on the next
/// fluid level down, and the frontier keeps expanding until it runs dry or
/// hits the step cap.
pub fn flow_from(generator: &mut WorldGenerator, changes: &mut BlockChangeStore, x: i32, y: i32, z: i32) {
    let mut queue = VecDeque::new();
    queue.push_back((x, y, z));
    let mut steps = 0usize;

    while let Some((cx, cy, cz)) = queue.pop_front() {
        if steps >= MAX_FLOW_STEPS {
            return;
        }
        if block_here(generator, changes, cx, cy, cz) != Block::Air {
            continue;
        }

        let sides = [(cx - 1, cy, cz), (cx + 1, cy, cz), (cx, cy, cz - 1), (cx, cy, cz + 1), (cx, cy + 1, cz)];
        let Some(source) = sides.into_iter().map(|(nx, ny, nz)| block_here(generator, changes, nx, ny, nz)).find(|b| b.is_fluid()) else {
            continue;
        };

        let next_level = source.fluid_level().unwrap_or(0).saturating_add(1);
        let flowed = if source.is_water() { Block::water(next_level) } else { Block::lava(next_level) };
        let base = generator.block_at(cx, cy, cz) as u8;
        match changes.make_block_change(cx, cy, cz, flowed as u8, base) {
            Ok(true) => {
                steps += 1;
                for (nx, ny, nz) in [(cx - 1, cy, cz), (cx + 1, cy, cz), (cx, cy, cz - 1), (cx, cy, cz + 1), (cx, cy - 1, cz)] {
                    queue.push_back((nx, ny, nz));
                }
            }
            _ => continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::flow_from;
    use crate::blockchange::BlockChangeStore;
    use crate::worldgen::WorldGenerator;
    use nethr_registry::Block;

    #[test]
    fn water_spreads_into_an_adjacent_air_cell() {
        let mut generator = WorldGenerator::new(1);
        let mut changes = BlockChangeStore::new();
        let base = generator.block_at(0, 64, 0) as u8;
        changes.make_block_change(0, 64, 0, Block::water(0) as u8, base).unwrap();
        let air_base = generator.block_at(1, 64, 0) as u8;
        changes.make_block_change(1, 64, 0, Block::Air as u8, air_base).unwrap();

        flow_from(&mut generator, &mut changes, 1, 64, 0);

        let flowed = changes.get_block_change(1, 64, 0).and_then(Block::from_u8);
        assert!(flowed.is_some_and(|b| b.is_water()));
    }
}
