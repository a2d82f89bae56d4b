//! Player state, inventory, eating, mining, and damage resolution.

pub mod slots;

use std::collections::VecDeque;

use bitflags::bitflags;
use nethr_registry::{Block, Item, ToolKind, ToolMaterial};
use nethr_utils::FastRand;
use uuid::Uuid;

use crate::blockchange::ItemStack;
use crate::config::VISITED_HISTORY;

bitflags! {
    /// Boolean player state packed into one byte, mirroring the original's
    /// bitfield-over-two-scalars layout without the type punning.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PlayerFlags: u8 {
        const NOT_SPAWNED_YET = 0b0000_0001;
        const SNEAKING = 0b0000_0010;
        const SPRINTING = 0b0000_0100;
        const EATING = 0b0000_1000;
        const CLIENT_LOADING = 0b0001_0000;
        const MOVEMENT_UPDATE_COOLDOWN = 0b0010_0000;
    }
}

/// What the player's crafting buffer currently means. Replaces the
/// original's pointer-aliasing trick (a flag bit deciding whether the
/// buffer holds items or a raw pointer into the block-change log) with an
/// explicit tagged variant.
#[derive(Debug, Clone, Copy)]
pub enum CraftingState {
    /// The buffer holds up to 8 grid items plus whatever the output slot
    /// currently resolves to.
    Items([ItemStack; 8]),
    /// A chest is open; the buffer is not item-addressable while this
    /// variant is active.
    OpenChest { x: i32, y: i32, z: i32 },
}

impl Default for CraftingState {
    fn default() -> Self {
        Self::Items([ItemStack::default(); 8])
    }
}

/// One connected or previously-connected player.
pub struct PlayerData {
    pub identity: Uuid,
    pub name: String,
    pub connection_handle: Option<u32>,
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
    /// Flat slots 0-40: hotbar (0-8), main (9-35), armor (36-39), offhand (40).
    pub inventory: [ItemStack; 41],
    pub crafting: CraftingState,
    pub output: ItemStack,
    pub flags: PlayerFlags,
    pub attack_cooldown: u8,
    pub eating_timer: u16,
    pub client_loading_timer: u16,
    pub visited_chunks: VecDeque<(i32, i32)>,
}

impl PlayerData {
    #[must_use]
    pub fn new(identity: Uuid, name: String) -> Self {
        Self {
            identity,
            name,
            connection_handle: None,
            x: 0,
            y: 64,
            z: 0,
            yaw: 0,
            pitch: 0,
            grounded_y: 64,
            health: 20.0,
            hunger: 20,
            saturation: 5.0,
            hotbar_index: 0,
            inventory: [ItemStack::default(); 41],
            crafting: CraftingState::default(),
            output: ItemStack::default(),
            flags: PlayerFlags::NOT_SPAWNED_YET,
            attack_cooldown: 0,
            eating_timer: 0,
            client_loading_timer: 0,
            visited_chunks: VecDeque::with_capacity(VISITED_HISTORY),
        }
    }

    /// Records a chunk as sent, evicting the oldest entry once the ring is
    /// full.
    pub fn mark_chunk_visited(&mut self, chunk_x: i32, chunk_z: i32) {
        if self.visited_chunks.contains(&(chunk_x, chunk_z)) {
            return;
        }
        if self.visited_chunks.len() == VISITED_HISTORY {
            self.visited_chunks.pop_front();
        }
        self.visited_chunks.push_back((chunk_x, chunk_z));
    }

    #[must_use]
    pub fn has_visited(&self, chunk_x: i32, chunk_z: i32) -> bool {
        self.visited_chunks.contains(&(chunk_x, chunk_z))
    }

    const EATING_TICKS: u16 = 32; // 1.6s at 20 ticks/s

    /// Right-click on an edible item: starts the eating timer if the held
    /// item has a food value.
    pub fn start_eating(&mut self, held: Item) -> bool {
        if held.food_value().is_none() {
            return false;
        }
        self.flags.insert(PlayerFlags::EATING);
        self.eating_timer = Self::EATING_TICKS;
        true
    }

    /// Advances the eating timer by one tick; on expiry applies the food's
    /// hunger/saturation and consumes the item. Saturation is scaled 1:500
    /// against the item's raw saturation constant.
    pub fn tick_eating(&mut self, held: Item) {
        if !self.flags.contains(PlayerFlags::EATING) {
            return;
        }
        if self.eating_timer > 0 {
            self.eating_timer -= 1;
            return;
        }
        if let Some((food, saturation)) = held.food_value() {
            self.hunger = (self.hunger + food).min(20);
            self.saturation += f32::from(saturation) / 500.0;
        }
        self.finish_eating();
    }

    /// The serverbound "finish eating" action: clears the timer regardless
    /// of whether it had already reached zero.
    pub fn finish_eating(&mut self) {
        self.flags.remove(PlayerFlags::EATING);
        self.eating_timer = 0;
    }

    /// Fall damage: `grounded_y - current_y - 3`, zero or negative means no
    /// damage. Suppressed while swimming (caller checks that separately).
    #[must_use]
    pub fn fall_damage(&self) -> f32 {
        (i32::from(self.grounded_y) - i32::from(self.y) - 3).max(0) as f32
    }

    /// Pre-1.9-style integer armor reduction: `damage * (256 - defense*10) / 256`.
    #[must_use]
    pub fn apply_armor(&self, damage: f32, total_defense: u8) -> f32 {
        let factor = (256 - i32::from(total_defense) * 10).max(0);
        damage * factor as f32 / 256.0
    }

    /// Sums defense points across the four armor slots.
    #[must_use]
    pub fn total_defense(&self) -> u8 {
        [slots::ARMOR_HELMET, slots::ARMOR_CHESTPLATE, slots::ARMOR_LEGGINGS, slots::ARMOR_BOOTS]
            .iter()
            .filter_map(|&slot| armor_item_at(self, slot))
            .map(Item::defense_points)
            .sum()
    }

    /// The item currently in the hotbar slot the player has selected, or
    /// `None` if that slot is empty or its id doesn't resolve.
    #[must_use]
    pub fn held_item(&self) -> Option<Item> {
        let stack = self.inventory.get(usize::from(self.hotbar_index))?;
        if stack.count == 0 {
            return None;
        }
        Item::from_u16(stack.item_id)
    }

    /// Applies `raw_damage` after armor reduction, clamping health at zero.
    /// Returns the actual reduced amount taken.
    pub fn take_damage(&mut self, raw_damage: f32) -> f32 {
        let reduced = self.apply_armor(raw_damage, self.total_defense());
        self.health = (self.health - reduced).max(0.0);
        reduced
    }

    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

/// Reads whatever armor item (if any) occupies `slot`, resolving the flat
/// `item_id` back through the registry's id table.
fn armor_item_at(player: &PlayerData, slot: i16) -> Option<Item> {
    let stack = player.inventory.get(usize::try_from(slot).ok()?)?;
    if stack.count == 0 {
        return None;
    }
    Item::from_u16(stack.item_id)
}

/// Exact per-material Bernoulli break chance, rolled on every tool use.
#[must_use]
pub fn roll_tool_break(material: ToolMaterial, rng: &mut FastRand, fallback: u64) -> bool {
    rng.next_f32(fallback) < material.break_chance()
}

/// Whether `tool` can mine `block` at all (pickaxe/shovel/shears gating).
#[must_use]
pub fn can_mine(block: Block, tool: Option<(ToolMaterial, ToolKind)>) -> bool {
    let is_ore_family = matches!(
        block,
        Block::Stone
            | Block::Cobblestone
            | Block::CoalOre
            | Block::IronOre
            | Block::GoldOre
            | Block::DiamondOre
            | Block::RedstoneOre
            | Block::CopperOre
    );
    let needs_iron_plus = matches!(block, Block::GoldOre | Block::RedstoneOre | Block::DiamondOre);

    match tool {
        Some((material, ToolKind::Pickaxe)) if is_ore_family => {
            !needs_iron_plus || matches!(material, ToolMaterial::Iron | ToolMaterial::Golden | ToolMaterial::Diamond | ToolMaterial::Netherite)
        }
        Some((_, ToolKind::Shovel)) if block == Block::Snow || block == Block::SnowBlock => true,
        Some((_, ToolKind::Shears)) if block == Block::OakLeaves || block == Block::AzaleaLeaves => true,
        _ => !is_ore_family,
    }
}

/// What mining `block` with `tool` drops, or `None` for nothing. Only
/// covers the families with an item counterpart and an explicit
/// probability threshold; ore blocks are gated by [`can_mine`] but don't
/// have a drop item of their own yet.
#[must_use]
pub fn roll_drop(block: Block, tool: Option<(ToolMaterial, ToolKind)>, rng: &mut FastRand, fallback: u64) -> Option<Item> {
    match block {
        Block::OakLeaves | Block::AzaleaLeaves | Block::FloweringAzaleaLeaves => {
            if matches!(tool, Some((_, ToolKind::Shears))) {
                Some(Item::OakLeaves)
            } else if rng.next_bound(200, fallback) == 0 {
                Some(Item::Apple)
            } else if rng.next_bound(20, fallback) == 0 {
                Some(Item::OakSapling)
            } else {
                None
            }
        }
        Block::ShortGrass | Block::Fern => {
            if rng.next_bound(8, fallback) == 0 {
                Some(Item::WheatSeeds)
            } else {
                None
            }
        }
        Block::MossCarpet => Some(Item::MossCarpet),
        Block::LilyPad => Some(Item::LilyPad),
        Block::Cactus | Block::CactusFlower => Some(Item::Cactus),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{PlayerData, PlayerFlags};
    use nethr_registry::Item;
    use uuid::Uuid;

    #[test]
    fn fall_damage_is_zero_within_the_three_block_grace() {
        let mut player = PlayerData::new(Uuid::nil(), "Steve".into());
        player.grounded_y = 70;
        player.y = 68;
        assert_eq!(player.fall_damage(), 0.0);
        player.y = 64;
        assert_eq!(player.fall_damage(), 3.0);
    }

    #[test]
    fn eating_applies_food_value_on_expiry() {
        let mut player = PlayerData::new(Uuid::nil(), "Steve".into());
        player.hunger = 10;
        assert!(player.start_eating(Item::CookedBeef));
        for _ in 0..PlayerData::EATING_TICKS {
            player.tick_eating(Item::CookedBeef);
        }
        assert_eq!(player.hunger, 18);
        assert!(!player.flags.contains(PlayerFlags::EATING));
    }

    #[test]
    fn armor_reduction_matches_the_integer_formula() {
        let player = PlayerData::new(Uuid::nil(), "Steve".into());
        assert_eq!(player.apply_armor(10.0, 0), 10.0);
        assert!(player.apply_armor(10.0, 10) < 10.0);
    }

    #[test]
    fn worn_armor_reduces_total_defense_and_damage_taken() {
        use nethr_registry::{ArmorMaterial, ArmorSlot};

        let mut player = PlayerData::new(Uuid::nil(), "Steve".into());
        assert_eq!(player.total_defense(), 0);

        player.inventory[super::slots::ARMOR_CHESTPLATE as usize] =
            crate::blockchange::ItemStack { item_id: Item::Armor(ArmorMaterial::Iron, ArmorSlot::Chestplate).to_u16(), count: 1 };
        assert_eq!(player.total_defense(), 6);

        let taken = player.take_damage(10.0);
        assert!(taken < 10.0);
        assert_eq!(player.health, 20.0 - taken);
    }

    #[test]
    fn shears_always_drop_the_leaf_block_itself() {
        use nethr_registry::{Block, ToolKind, ToolMaterial};
        use nethr_utils::FastRand;

        let mut rng = FastRand::new(1);
        let drop = super::roll_drop(Block::OakLeaves, Some((ToolMaterial::Iron, ToolKind::Shears)), &mut rng, 7);
        assert_eq!(drop, Some(Item::OakLeaves));
    }

    #[test]
    fn lily_pad_always_drops_itself() {
        use nethr_registry::Block;
        use nethr_utils::FastRand;

        let mut rng = FastRand::new(1);
        assert_eq!(super::roll_drop(Block::LilyPad, None, &mut rng, 7), Some(Item::LilyPad));
    }
}
