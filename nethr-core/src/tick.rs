//! The fixed-interval tick: world-time advance, per-player timers, mob AI,
//! and the persistence trigger. Driven by `server.rs`'s event loop, not by
//! its own thread — this module is pure state transition, no I/O.

use nethr_registry::Item;
use nethr_utils::FastRand;

use crate::mob::{self, MobTable};
use crate::player::PlayerData;

/// Game-day length in ticks, matching vanilla's 24000-tick day.
pub const TICKS_PER_DAY: u32 = 24_000;
/// Microseconds of world-time advance per elapsed microsecond of wall time.
const WORLD_TIME_DIVISOR: u64 = 50_000;
/// Health regenerates one point per this many saturation-points spent.
const SATURATION_PER_HEAL: f32 = 1.0 / 600.0;

/// One mob AI result paired with the slot it came from, handed back to the
/// caller so it can decide what packets to emit.
#[derive(Debug, Clone, Copy)]
pub struct MobTickEvent {
    pub slot: usize,
    pub outcome: mob::AiOutcome,
}

/// Advances `world_time` by `elapsed_micros`, wrapping at one game day.
#[must_use]
pub fn advance_world_time(world_time: u32, elapsed_micros: u64) -> u32 {
    let delta = (elapsed_micros / WORLD_TIME_DIVISOR) as u32;
    (world_time + delta) % TICKS_PER_DAY
}

/// Per-player per-tick bookkeeping: loading timer, attack cooldown, eating,
/// movement cooldown, and saturation-driven health regen. Returns `true`
/// once on the tick the player's client-loading timer expires (caller
/// finalizes the join).
pub fn tick_player(player: &mut PlayerData, held_food: Option<Item>) -> bool {
    let mut just_finished_loading = false;
    if player.client_loading_timer > 0 {
        player.client_loading_timer -= 1;
        if player.client_loading_timer == 0 {
            just_finished_loading = true;
        }
    }

    player.attack_cooldown = player.attack_cooldown.saturating_sub(1);

    if let Some(food) = held_food {
        player.tick_eating(food);
    }

    regen_health(player);

    just_finished_loading
}

fn regen_health(player: &mut PlayerData) {
    if player.health >= 20.0 {
        return;
    }
    if player.saturation > 0.0 {
        player.saturation = (player.saturation - SATURATION_PER_HEAL).max(0.0);
        player.health = (player.health + 1.0).min(20.0);
    } else if player.hunger >= 18 {
        player.hunger -= 1;
        player.health = (player.health + 1.0).min(20.0);
    }
}

/// Runs one AI step for every allocated, non-dead mob, returning the events
/// so the caller can broadcast movement/attack/burn packets. A mob whose
/// health already reached zero is freed immediately rather than lingering,
/// since `MobData` carries no separate death-animation timer.
pub fn tick_mobs(mobs: &mut MobTable, nearest_player: Option<(i32, i32, i32)>, world_time: u32, rng: &mut FastRand, fallback: u64) -> Vec<MobTickEvent> {
    let mut events = Vec::new();
    for slot in 0..crate::config::MAX_MOBS {
        let Some(snapshot) = mobs.get(slot).copied() else { continue };
        if !snapshot.is_allocated() {
            continue;
        }
        if snapshot.is_dead() {
            mobs.despawn(slot);
            events.push(MobTickEvent { slot, outcome: mob::AiOutcome::Despawned });
            continue;
        }

        let Some(mob) = mobs.iter_mut().nth(slot) else { continue };
        let outcome = mob::step(mob, nearest_player, world_time, rng, fallback);
        if outcome == mob::AiOutcome::Despawned {
            mobs.despawn(slot);
        }
        events.push(MobTickEvent { slot, outcome });
    }
    events
}

#[cfg(test)]
mod tests {
    use super::{TICKS_PER_DAY, advance_world_time, tick_player};
    use crate::player::PlayerData;
    use uuid::Uuid;

    #[test]
    fn world_time_wraps_at_one_day() {
        let advanced = advance_world_time(TICKS_PER_DAY - 1, 50_000);
        assert_eq!(advanced, 0);
    }

    #[test]
    fn loading_timer_fires_finalize_exactly_once() {
        let mut player = PlayerData::new(Uuid::nil(), "Steve".into());
        player.client_loading_timer = 2;
        assert!(!tick_player(&mut player, None));
        assert!(tick_player(&mut player, None));
        assert!(!tick_player(&mut player, None));
    }

    #[test]
    fn well_fed_players_regenerate_health() {
        let mut player = PlayerData::new(Uuid::nil(), "Steve".into());
        player.health = 10.0;
        player.hunger = 20;
        player.saturation = 0.0;
        tick_player(&mut player, None);
        assert!(player.health >= 10.0);
    }
}
