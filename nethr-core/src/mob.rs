//! Mob slots and AI step: passive wander, hostile pathing, sunlight burn,
//! despawn.

use nethr_registry::Item;
use nethr_utils::FastRand;

use crate::config::{MAX_MOBS, MOB_DESPAWN_DISTANCE};

/// Job ids stored in [`MobData::villager_job`]: 0 means unemployed.
pub const JOB_FARMER: u8 = 1;
pub const JOB_LIBRARIAN: u8 = 2;
pub const JOB_TOOLSMITH: u8 = 3;

/// A mob's kind; `0` means the slot is unallocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MobType {
    None,
    Sheep,
    Villager,
    Zombie,
    Skeleton,
}

/// One allocated mob record, packing health/shear/panic into a single byte
/// the way the source does, but as named fields rather than raw bit math at
/// every call site.
#[derive(Debug, Clone, Copy)]
pub struct MobData {
    pub kind: MobType,
    pub x: i16,
    pub y: u8,
    pub z: i16,
    pub health: u8,
    pub sheared: bool,
    pub panic_timer: u8,
    pub villager_job: u8,
    pub villager_level: u8,
    pub villager_xp: u16,
}

impl MobData {
    #[must_use]
    pub fn unallocated() -> Self {
        Self {
            kind: MobType::None,
            x: 0,
            y: 0,
            z: 0,
            health: 0,
            sheared: false,
            panic_timer: 0,
            villager_job: 0,
            villager_level: 0,
            villager_xp: 0,
        }
    }

    #[must_use]
    pub fn is_allocated(&self) -> bool {
        self.kind != MobType::None
    }

    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.is_allocated() && self.health == 0
    }

    #[must_use]
    pub fn is_hostile(&self) -> bool {
        matches!(self.kind, MobType::Zombie | MobType::Skeleton)
    }
}

/// Fixed-capacity mob table.
pub struct MobTable {
    mobs: Vec<MobData>,
}

impl MobTable {
    #[must_use]
    pub fn new() -> Self {
        Self { mobs: vec![MobData::unallocated(); MAX_MOBS] }
    }

    /// Allocates the first free slot for a new mob, or `None` if full.
    pub fn spawn(&mut self, kind: MobType, x: i16, y: u8, z: i16, health: u8) -> Option<usize> {
        let slot = self.mobs.iter().position(|m| !m.is_allocated())?;
        self.mobs[slot] = MobData {
            kind,
            x,
            y,
            z,
            health,
            sheared: false,
            panic_timer: 0,
            villager_job: 0,
            villager_level: 0,
            villager_xp: 0,
        };
        Some(slot)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&MobData> {
        self.mobs.get(index)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MobData> {
        self.mobs.iter_mut()
    }

    pub fn despawn(&mut self, index: usize) {
        if let Some(mob) = self.mobs.get_mut(index) {
            *mob = MobData::unallocated();
        }
    }
}

impl Default for MobTable {
    fn default() -> Self {
        Self::new()
    }
}

fn manhattan(ax: i32, ay: i32, az: i32, bx: i32, by: i32, bz: i32) -> i32 {
    (ax - bx).abs() + (ay - by).abs() + (az - bz).abs()
}

/// One AI step outcome for a single mob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiOutcome {
    Idle,
    Moved { dx: i8, dz: i8 },
    AttackedPlayer,
    Despawned,
    Burned,
}

/// Runs one tick of AI for `mob` given the nearest player's position (if
/// any online). `world_time` gates sunlight burn; `rng` drives wander
/// direction and panic decay.
pub fn step(mob: &mut MobData, nearest_player: Option<(i32, i32, i32)>, world_time: u32, rng: &mut FastRand, fallback: u64) -> AiOutcome {
    if mob.is_dead() {
        return AiOutcome::Idle;
    }

    if let Some((px, py, pz)) = nearest_player {
        let distance = manhattan(i32::from(mob.x), i32::from(mob.y), i32::from(mob.z), px, py, pz);
        if distance > MOB_DESPAWN_DISTANCE {
            return AiOutcome::Despawned;
        }

        if mob.is_hostile() {
            let is_daylight = (0..13_000).contains(&world_time) || (23_460..24_000).contains(&world_time);
            if mob.y > 48 && is_daylight {
                mob.health = mob.health.saturating_sub(2);
                return AiOutcome::Burned;
            }

            if distance < 3 && (i32::from(mob.y) - py).abs() < 2 {
                return AiOutcome::AttackedPlayer;
            }

            let dx = (px - i32::from(mob.x)).signum() as i8;
            let dz = (pz - i32::from(mob.z)).signum() as i8;
            mob.x = mob.x.saturating_add(i16::from(dx));
            mob.z = mob.z.saturating_add(i16::from(dz));
            return AiOutcome::Moved { dx, dz };
        }
    }

    if mob.panic_timer > 0 {
        mob.panic_timer -= 1;
    }

    let step_chance = if mob.panic_timer > 0 { 4 } else { 1 };
    if rng.next_bound(20, fallback) >= step_chance {
        return AiOutcome::Idle;
    }

    let dx = (rng.next_bound(3, fallback) as i8) - 1;
    let dz = (rng.next_bound(3, fallback) as i8) - 1;
    mob.x = mob.x.saturating_add(i16::from(dx));
    mob.z = mob.z.saturating_add(i16::from(dz));
    AiOutcome::Moved { dx, dz }
}

/// Marks a mob as hit, resetting its panic timer to 3 seconds.
pub fn on_hit(mob: &mut MobData) {
    mob.panic_timer = 3;
}

/// Attempts a trade with a villager: `held` is the item and count the
/// player is offering. Returns the payment on success, `None` if the mob
/// isn't a working villager or `held` doesn't match this job's asking
/// price. XP accrues 2 per successful trade, promoting the villager's
/// level at the 4 and 10 thresholds.
pub fn trade(mob: &mut MobData, held: Option<(Item, u8)>) -> Option<(Item, u8)> {
    if mob.kind != MobType::Villager || mob.villager_job == 0 {
        return None;
    }
    let (want, want_count, pay) = match mob.villager_job {
        JOB_FARMER => (Item::Wheat, 20, (Item::Emerald, 1)),
        JOB_LIBRARIAN => (Item::Paper, 24, (Item::Emerald, 1)),
        JOB_TOOLSMITH => (Item::IronIngot, 4, (Item::Emerald, 1)),
        _ => return None,
    };
    let (held_item, held_count) = held?;
    if held_item != want || held_count < want_count {
        return None;
    }

    mob.villager_xp = mob.villager_xp.saturating_add(2);
    if mob.villager_xp >= 10 {
        mob.villager_level = mob.villager_level.max(3);
    } else if mob.villager_xp >= 4 {
        mob.villager_level = mob.villager_level.max(2);
    }
    Some(pay)
}

#[cfg(test)]
mod tests {
    use super::{AiOutcome, MobData, MobTable, MobType, step};
    use nethr_utils::FastRand;

    #[test]
    fn despawns_past_the_despawn_distance() {
        let mut mob = MobData { kind: MobType::Zombie, x: 0, y: 64, z: 0, health: 20, sheared: false, panic_timer: 0, villager_job: 0, villager_level: 0, villager_xp: 0 };
        let mut rng = FastRand::new(1);
        let outcome = step(&mut mob, Some((1000, 64, 0)), 6000, &mut rng, 7);
        assert_eq!(outcome, AiOutcome::Despawned);
    }

    #[test]
    fn adjacent_hostile_attacks_instead_of_moving() {
        let mut mob = MobData { kind: MobType::Zombie, x: 0, y: 64, z: 0, health: 20, sheared: false, panic_timer: 0, villager_job: 0, villager_level: 0, villager_xp: 0 };
        let mut rng = FastRand::new(1);
        let outcome = step(&mut mob, Some((1, 64, 0)), 6000, &mut rng, 7);
        assert_eq!(outcome, AiOutcome::AttackedPlayer);
    }

    #[test]
    fn spawn_and_despawn_round_trip() {
        let mut table = MobTable::new();
        let slot = table.spawn(MobType::Sheep, 0, 64, 0, 8).unwrap();
        assert!(table.get(slot).unwrap().is_allocated());
        table.despawn(slot);
        assert!(!table.get(slot).unwrap().is_allocated());
    }

    #[test]
    fn farmer_trades_wheat_for_an_emerald() {
        use nethr_registry::Item;

        let mut villager = MobData { villager_job: super::JOB_FARMER, kind: MobType::Villager, ..MobData::unallocated() };
        let payment = super::trade(&mut villager, Some((Item::Wheat, 20)));
        assert_eq!(payment, Some((Item::Emerald, 1)));
        assert_eq!(villager.villager_xp, 2);
    }

    #[test]
    fn wrong_item_does_not_trade() {
        use nethr_registry::Item;

        let mut villager = MobData { villager_job: super::JOB_FARMER, kind: MobType::Villager, ..MobData::unallocated() };
        assert_eq!(super::trade(&mut villager, Some((Item::Stick, 20))), None);
    }

    #[test]
    fn enough_trades_promote_the_villager() {
        use nethr_registry::Item;

        let mut villager = MobData { villager_job: super::JOB_FARMER, kind: MobType::Villager, ..MobData::unallocated() };
        for _ in 0..5 {
            super::trade(&mut villager, Some((Item::Wheat, 20)));
        }
        assert_eq!(villager.villager_xp, 10);
        assert_eq!(villager.villager_level, 3);
    }
}
