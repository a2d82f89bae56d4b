/// A placed block. The water and lava families occupy contiguous ranges
/// (`Water0..=Water7`, `Lava0..=Lava3`) so a fluid level can be derived by
/// simple subtraction, matching how the block-change log stores fluid
/// level as an offset rather than a separate field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Block {
    Air = 0,
    Bedrock = 1,
    Stone = 2,
    Cobblestone = 3,
    CobblestoneSlab = 4,
    StoneSlab = 5,
    Dirt = 6,
    GrassBlock = 7,
    SnowyGrassBlock = 8,
    Sand = 9,
    Sandstone = 10,
    Mud = 11,
    Netherrack = 12,
    Ice = 13,
    Snow = 14,
    SnowBlock = 15,
    OakLog = 16,
    OakLeaves = 17,
    OakSapling = 18,
    AzaleaLeaves = 19,
    FloweringAzaleaLeaves = 20,
    ShortGrass = 21,
    Fern = 22,
    DeadBush = 23,
    MossCarpet = 24,
    LilyPad = 25,
    Cactus = 26,
    CactusFlower = 27,
    Dandelion = 28,
    Poppy = 29,
    Allium = 30,
    AzureBluet = 31,
    RedTulip = 32,
    OrangeTulip = 33,
    WhiteTulip = 34,
    PinkTulip = 35,
    OxeyeDaisy = 36,
    Cornflower = 37,
    LilyOfTheValley = 38,
    BrownMushroom = 39,
    RedMushroom = 40,
    Pumpkin = 41,
    Torch = 42,
    Chest = 43,
    CraftingTable = 44,
    Furnace = 45,
    Composter = 46,
    CoalOre = 47,
    CoalBlock = 48,
    IronOre = 49,
    IronBlock = 50,
    GoldOre = 51,
    GoldBlock = 52,
    DiamondOre = 53,
    DiamondBlock = 54,
    RedstoneOre = 55,
    RedstoneBlock = 56,
    CopperOre = 57,
    Water0 = 58,
    Water1 = 59,
    Water2 = 60,
    Water3 = 61,
    Water4 = 62,
    Water5 = 63,
    Water6 = 64,
    Water7 = 65,
    Lava0 = 66,
    Lava1 = 67,
    Lava2 = 68,
    Lava3 = 69,
}

impl Block {
    const WATER_START: u8 = Self::Water0 as u8;
    const LAVA_START: u8 = Self::Lava0 as u8;

    /// Builds a `Block` from its raw wire/storage id, returning `None` for
    /// unassigned ids rather than panicking — callers at the persistence
    /// boundary treat this as a corruption signal.
    #[must_use]
    #[allow(clippy::too_many_lines, reason = "flat id table, not control flow")]
    pub const fn from_u8(raw: u8) -> Option<Self> {
        Some(match raw {
            0 => Self::Air,
            1 => Self::Bedrock,
            2 => Self::Stone,
            3 => Self::Cobblestone,
            4 => Self::CobblestoneSlab,
            5 => Self::StoneSlab,
            6 => Self::Dirt,
            7 => Self::GrassBlock,
            8 => Self::SnowyGrassBlock,
            9 => Self::Sand,
            10 => Self::Sandstone,
            11 => Self::Mud,
            12 => Self::Netherrack,
            13 => Self::Ice,
            14 => Self::Snow,
            15 => Self::SnowBlock,
            16 => Self::OakLog,
            17 => Self::OakLeaves,
            18 => Self::OakSapling,
            19 => Self::AzaleaLeaves,
            20 => Self::FloweringAzaleaLeaves,
            21 => Self::ShortGrass,
            22 => Self::Fern,
            23 => Self::DeadBush,
            24 => Self::MossCarpet,
            25 => Self::LilyPad,
            26 => Self::Cactus,
            27 => Self::CactusFlower,
            28 => Self::Dandelion,
            29 => Self::Poppy,
            30 => Self::Allium,
            31 => Self::AzureBluet,
            32 => Self::RedTulip,
            33 => Self::OrangeTulip,
            34 => Self::WhiteTulip,
            35 => Self::PinkTulip,
            36 => Self::OxeyeDaisy,
            37 => Self::Cornflower,
            38 => Self::LilyOfTheValley,
            39 => Self::BrownMushroom,
            40 => Self::RedMushroom,
            41 => Self::Pumpkin,
            42 => Self::Torch,
            43 => Self::Chest,
            44 => Self::CraftingTable,
            45 => Self::Furnace,
            46 => Self::Composter,
            47 => Self::CoalOre,
            48 => Self::CoalBlock,
            49 => Self::IronOre,
            50 => Self::IronBlock,
            51 => Self::GoldOre,
            52 => Self::GoldBlock,
            53 => Self::DiamondOre,
            54 => Self::DiamondBlock,
            55 => Self::RedstoneOre,
            56 => Self::RedstoneBlock,
            57 => Self::CopperOre,
            58 => Self::Water0,
            59 => Self::Water1,
            60 => Self::Water2,
            61 => Self::Water3,
            62 => Self::Water4,
            63 => Self::Water5,
            64 => Self::Water6,
            65 => Self::Water7,
            66 => Self::Lava0,
            67 => Self::Lava1,
            68 => Self::Lava2,
            69 => Self::Lava3,
            _ => return None,
        })
    }

    /// Raw storage id, used by the block-change log and the wire codec.
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Builds the water block at `level` (0 = source/deepest, 7 = shallowest
    /// flowing edge), matching the original's `B_water + level` encoding.
    #[must_use]
    pub const fn water(level: u8) -> Self {
        let raw = Self::WATER_START + if level > 7 { 7 } else { level };
        match Self::from_u8(raw) {
            Some(b) => b,
            None => Self::Water0,
        }
    }

    /// Builds the lava block at `level` (0..=3), matching `B_lava + level`.
    #[must_use]
    pub const fn lava(level: u8) -> Self {
        let raw = Self::LAVA_START + if level > 3 { 3 } else { level };
        match Self::from_u8(raw) {
            Some(b) => b,
            None => Self::Lava0,
        }
    }

    /// Whether this is any of the 8 water levels.
    #[must_use]
    pub const fn is_water(self) -> bool {
        let raw = self as u8;
        raw >= Self::WATER_START && raw < Self::WATER_START + 8
    }

    /// Whether this is any of the 4 lava levels.
    #[must_use]
    pub const fn is_lava(self) -> bool {
        let raw = self as u8;
        raw >= Self::LAVA_START && raw < Self::LAVA_START + 4
    }

    /// Fluid level (0 = source) if this is water or lava, `None` otherwise.
    #[must_use]
    pub const fn fluid_level(self) -> Option<u8> {
        let raw = self as u8;
        if self.is_water() {
            Some(raw - Self::WATER_START)
        } else if self.is_lava() {
            Some(raw - Self::LAVA_START)
        } else {
            None
        }
    }

    /// Any fluid, source or flowing.
    #[must_use]
    pub const fn is_fluid(self) -> bool {
        self.is_water() || self.is_lava()
    }
}

#[cfg(test)]
mod tests {
    use super::Block;

    #[test]
    fn water_and_lava_roundtrip_through_level() {
        for level in 0..8 {
            let b = Block::water(level);
            assert!(b.is_water());
            assert_eq!(b.fluid_level(), Some(level));
        }
        for level in 0..4 {
            let b = Block::lava(level);
            assert!(b.is_lava());
            assert_eq!(b.fluid_level(), Some(level));
        }
    }

    #[test]
    fn from_u8_rejects_ids_past_the_fluid_table() {
        assert!(Block::from_u8(70).is_none());
        assert!(Block::from_u8(0).is_some());
        assert!(Block::from_u8(69).is_some());
    }

    #[test]
    fn solid_blocks_are_not_fluids() {
        assert!(!Block::Stone.is_fluid());
        assert!(!Block::Chest.is_fluid());
    }
}
