/// A tool's material tier, driving both mining speed gates and the
/// per-material break-chance used for durability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolMaterial {
    Wood,
    Stone,
    Iron,
    Golden,
    Diamond,
    Netherite,
}

impl ToolMaterial {
    /// Probability (0.0..1.0) that a single use breaks the tool, applied
    /// through the shared gameplay RNG on every tool-consuming action.
    #[must_use]
    pub const fn break_chance(self) -> f32 {
        match self {
            Self::Wood => 1.0 / 59.0,
            Self::Stone => 1.0 / 131.0,
            Self::Iron => 1.0 / 250.0,
            Self::Golden => 1.0 / 32.0,
            Self::Diamond => 1.0 / 1561.0,
            Self::Netherite => 1.0 / 2031.0,
        }
    }
}

/// What kind of tool an item is, independent of material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Pickaxe,
    Axe,
    Shovel,
    Sword,
    Hoe,
}

/// An armor piece's material tier. Distinct from [`ToolMaterial`]: armor
/// has no wood or stone tier, and adds leather in their place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArmorMaterial {
    Leather,
    Golden,
    Iron,
    Diamond,
    Netherite,
}

/// Which armor slot an armor item occupies, matching the server inventory's
/// fixed armor range (36 = boots .. 39 = helmet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArmorSlot {
    Boots,
    Leggings,
    Chestplate,
    Helmet,
}

impl ArmorSlot {
    /// Server inventory slot index for this armor piece.
    #[must_use]
    pub const fn inventory_slot(self) -> u8 {
        match self {
            Self::Boots => 36,
            Self::Leggings => 37,
            Self::Chestplate => 38,
            Self::Helmet => 39,
        }
    }
}

/// A held or stored item. Shears and every tool/shears variant stack to 1;
/// snowballs stack to 16; everything else stacks to 64 ([`Item::stack_size`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Item {
    IronIngot,
    Stick,
    Paper,
    Bookshelf,
    Leather,
    Feather,
    Emerald,
    BoneMeal,
    WheatSeeds,
    Wheat,
    SugarCane,
    WhiteWool,
    Apple,
    Bread,
    Chicken,
    CookedChicken,
    Beef,
    CookedBeef,
    Porkchop,
    CookedPorkchop,
    Mutton,
    CookedMutton,
    RottenFlesh,
    Snowball,
    Shears,
    OakSapling,
    OakLeaves,
    ShortGrass,
    MossCarpet,
    LilyPad,
    Cactus,
    Tool(ToolMaterial, ToolKind),
    Armor(ArmorMaterial, ArmorSlot),
}

impl Item {
    const TOOL_MATERIALS: [ToolMaterial; 6] = [
        ToolMaterial::Wood,
        ToolMaterial::Stone,
        ToolMaterial::Iron,
        ToolMaterial::Golden,
        ToolMaterial::Diamond,
        ToolMaterial::Netherite,
    ];
    const TOOL_KINDS: [ToolKind; 5] =
        [ToolKind::Pickaxe, ToolKind::Axe, ToolKind::Shovel, ToolKind::Sword, ToolKind::Hoe];
    const ARMOR_MATERIALS: [ArmorMaterial; 5] = [
        ArmorMaterial::Leather,
        ArmorMaterial::Golden,
        ArmorMaterial::Iron,
        ArmorMaterial::Diamond,
        ArmorMaterial::Netherite,
    ];
    const ARMOR_SLOTS: [ArmorSlot; 4] =
        [ArmorSlot::Boots, ArmorSlot::Leggings, ArmorSlot::Chestplate, ArmorSlot::Helmet];

    const TOOL_BASE: u16 = 100;
    const ARMOR_BASE: u16 = 200;

    /// The flat `u16` id an `ItemStack` carries on the wire and on disk.
    /// Plain items are a fixed small table; `Tool`/`Armor` are addressed by
    /// `base + material_index * variant_count + variant_index` so every
    /// material/kind or material/slot combination gets its own id without a
    /// combinatorial match arm.
    #[must_use]
    pub const fn to_u16(self) -> u16 {
        match self {
            Self::IronIngot => 0,
            Self::Stick => 1,
            Self::Paper => 2,
            Self::Bookshelf => 3,
            Self::Leather => 4,
            Self::Feather => 5,
            Self::Emerald => 6,
            Self::BoneMeal => 7,
            Self::WheatSeeds => 8,
            Self::Wheat => 9,
            Self::SugarCane => 10,
            Self::WhiteWool => 11,
            Self::Apple => 12,
            Self::Bread => 13,
            Self::Chicken => 14,
            Self::CookedChicken => 15,
            Self::Beef => 16,
            Self::CookedBeef => 17,
            Self::Porkchop => 18,
            Self::CookedPorkchop => 19,
            Self::Mutton => 20,
            Self::CookedMutton => 21,
            Self::RottenFlesh => 22,
            Self::Snowball => 23,
            Self::Shears => 24,
            Self::OakSapling => 25,
            Self::OakLeaves => 26,
            Self::ShortGrass => 27,
            Self::MossCarpet => 28,
            Self::LilyPad => 29,
            Self::Cactus => 30,
            Self::Tool(material, kind) => {
                let m = Self::index_of_tool_material(material) as u16;
                let k = Self::index_of_tool_kind(kind) as u16;
                Self::TOOL_BASE + m * Self::TOOL_KINDS.len() as u16 + k
            }
            Self::Armor(material, slot) => {
                let m = Self::index_of_armor_material(material) as u16;
                let s = Self::index_of_armor_slot(slot) as u16;
                Self::ARMOR_BASE + m * Self::ARMOR_SLOTS.len() as u16 + s
            }
        }
    }

    /// Inverse of [`Item::to_u16`]; `None` for an id past either table.
    #[must_use]
    pub const fn from_u16(id: u16) -> Option<Self> {
        Some(match id {
            0 => Self::IronIngot,
            1 => Self::Stick,
            2 => Self::Paper,
            3 => Self::Bookshelf,
            4 => Self::Leather,
            5 => Self::Feather,
            6 => Self::Emerald,
            7 => Self::BoneMeal,
            8 => Self::WheatSeeds,
            9 => Self::Wheat,
            10 => Self::SugarCane,
            11 => Self::WhiteWool,
            12 => Self::Apple,
            13 => Self::Bread,
            14 => Self::Chicken,
            15 => Self::CookedChicken,
            16 => Self::Beef,
            17 => Self::CookedBeef,
            18 => Self::Porkchop,
            19 => Self::CookedPorkchop,
            20 => Self::Mutton,
            21 => Self::CookedMutton,
            22 => Self::RottenFlesh,
            23 => Self::Snowball,
            24 => Self::Shears,
            25 => Self::OakSapling,
            26 => Self::OakLeaves,
            27 => Self::ShortGrass,
            28 => Self::MossCarpet,
            29 => Self::LilyPad,
            30 => Self::Cactus,
            _ if id >= Self::TOOL_BASE && id < Self::ARMOR_BASE => {
                let offset = id - Self::TOOL_BASE;
                let kinds = Self::TOOL_KINDS.len() as u16;
                let m = (offset / kinds) as usize;
                let k = (offset % kinds) as usize;
                if m >= Self::TOOL_MATERIALS.len() {
                    return None;
                }
                Self::Tool(Self::TOOL_MATERIALS[m], Self::TOOL_KINDS[k])
            }
            _ if id >= Self::ARMOR_BASE => {
                let offset = id - Self::ARMOR_BASE;
                let slots = Self::ARMOR_SLOTS.len() as u16;
                let m = (offset / slots) as usize;
                let s = (offset % slots) as usize;
                if m >= Self::ARMOR_MATERIALS.len() {
                    return None;
                }
                Self::Armor(Self::ARMOR_MATERIALS[m], Self::ARMOR_SLOTS[s])
            }
            _ => return None,
        })
    }

    const fn index_of_tool_material(material: ToolMaterial) -> usize {
        match material {
            ToolMaterial::Wood => 0,
            ToolMaterial::Stone => 1,
            ToolMaterial::Iron => 2,
            ToolMaterial::Golden => 3,
            ToolMaterial::Diamond => 4,
            ToolMaterial::Netherite => 5,
        }
    }

    const fn index_of_tool_kind(kind: ToolKind) -> usize {
        match kind {
            ToolKind::Pickaxe => 0,
            ToolKind::Axe => 1,
            ToolKind::Shovel => 2,
            ToolKind::Sword => 3,
            ToolKind::Hoe => 4,
        }
    }

    const fn index_of_armor_material(material: ArmorMaterial) -> usize {
        match material {
            ArmorMaterial::Leather => 0,
            ArmorMaterial::Golden => 1,
            ArmorMaterial::Iron => 2,
            ArmorMaterial::Diamond => 3,
            ArmorMaterial::Netherite => 4,
        }
    }

    const fn index_of_armor_slot(slot: ArmorSlot) -> usize {
        match slot {
            ArmorSlot::Boots => 0,
            ArmorSlot::Leggings => 1,
            ArmorSlot::Chestplate => 2,
            ArmorSlot::Helmet => 3,
        }
    }

    /// Max stack size: 1 for tools and shears, 16 for snowballs, 64 otherwise.
    #[must_use]
    pub const fn stack_size(self) -> u8 {
        match self {
            Self::Tool(..) | Self::Shears => 1,
            Self::Snowball => 16,
            _ => 64,
        }
    }

    /// `(food, saturation)` restored by eating this item, or `None` if it
    /// isn't food. Saturation is in the server's internal units, roughly
    /// 500 per vanilla saturation point.
    #[must_use]
    pub const fn food_value(self) -> Option<(u8, u16)> {
        match self {
            Self::Chicken => Some((2, 600)),
            Self::Beef => Some((3, 900)),
            Self::Porkchop => Some((3, 300)),
            Self::Mutton => Some((2, 600)),
            Self::CookedChicken => Some((6, 3600)),
            Self::CookedBeef | Self::CookedPorkchop => Some((8, 6400)),
            Self::CookedMutton => Some((6, 4800)),
            Self::RottenFlesh => Some((4, 0)),
            Self::Apple => Some((4, 1200)),
            _ => None,
        }
    }

    /// Defense points contributed while worn, 0 for everything else.
    #[must_use]
    pub const fn defense_points(self) -> u8 {
        match self {
            Self::Armor(material, slot) => match (slot, material) {
                (ArmorSlot::Helmet, ArmorMaterial::Leather) => 1,
                (ArmorSlot::Helmet, ArmorMaterial::Golden | ArmorMaterial::Iron) => 2,
                (ArmorSlot::Helmet, _) => 3,
                (ArmorSlot::Chestplate, ArmorMaterial::Leather) => 3,
                (ArmorSlot::Chestplate, ArmorMaterial::Golden) => 5,
                (ArmorSlot::Chestplate, ArmorMaterial::Iron) => 6,
                (ArmorSlot::Chestplate, _) => 8,
                (ArmorSlot::Leggings, ArmorMaterial::Leather) => 2,
                (ArmorSlot::Leggings, ArmorMaterial::Golden) => 3,
                (ArmorSlot::Leggings, ArmorMaterial::Iron) => 5,
                (ArmorSlot::Leggings, _) => 6,
                (ArmorSlot::Boots, ArmorMaterial::Leather | ArmorMaterial::Golden) => 1,
                (ArmorSlot::Boots, ArmorMaterial::Iron) => 2,
                (ArmorSlot::Boots, _) => 3,
            },
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ArmorMaterial, ArmorSlot, Item, ToolMaterial};

    #[test]
    fn diamond_and_netherite_armor_share_defense() {
        let diamond = Item::Armor(ArmorMaterial::Diamond, ArmorSlot::Chestplate);
        let netherite = Item::Armor(ArmorMaterial::Netherite, ArmorSlot::Chestplate);
        assert_eq!(diamond.defense_points(), netherite.defense_points());
        assert_eq!(diamond.defense_points(), 8);
    }

    #[test]
    fn tools_and_shears_stack_to_one() {
        assert_eq!(
            Item::Tool(ToolMaterial::Iron, super::ToolKind::Axe).stack_size(),
            1
        );
        assert_eq!(Item::Shears.stack_size(), 1);
        assert_eq!(Item::Snowball.stack_size(), 16);
        assert_eq!(Item::Apple.stack_size(), 64);
    }

    #[test]
    fn every_item_id_roundtrips() {
        let plain = [Item::Apple, Item::Bread, Item::Shears, Item::Cactus];
        for item in plain {
            assert_eq!(Item::from_u16(item.to_u16()), Some(item));
        }
        let tool = Item::Tool(ToolMaterial::Diamond, super::ToolKind::Pickaxe);
        assert_eq!(Item::from_u16(tool.to_u16()), Some(tool));
        let armor = Item::Armor(ArmorMaterial::Iron, ArmorSlot::Chestplate);
        assert_eq!(Item::from_u16(armor.to_u16()), Some(armor));
    }

    #[test]
    fn cooked_food_restores_more_than_raw() {
        let (raw_food, raw_sat) = Item::Beef.food_value().unwrap();
        let (cooked_food, cooked_sat) = Item::CookedBeef.food_value().unwrap();
        assert!(cooked_food > raw_food);
        assert!(cooked_sat > raw_sat);
    }
}
