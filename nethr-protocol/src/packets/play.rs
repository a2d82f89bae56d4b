//! Play-phase packets. This is a representative catalog, not the full
//! vanilla set: every packet the simulation actually emits or consumes is
//! here, field-for-field, and nothing else.

use std::io::{Read, Write};

use crate::codec::{CodecError, ReadFrom, VarInt, WriteTo, pack_position, write_string};

/// The shared dimension/gamemode block appearing in both `PlayLogin` and
/// `Respawn`.
#[derive(Debug, Clone)]
pub struct CommonPlayerSpawnInfo {
    pub dimension_name: String,
    pub world_seed: i64,
    pub game_mode: u8,
    pub previous_game_mode: i8,
    pub is_debug: bool,
    pub is_flat: bool,
    pub portal_cooldown: i32,
    pub sea_level: i32,
}

impl WriteTo for CommonPlayerSpawnInfo {
    fn write(&self, writer: &mut impl Write) -> Result<(), CodecError> {
        VarInt(0).write(writer)?; // dimension type id
        write_string(writer, &self.dimension_name)?;
        self.world_seed.write(writer)?;
        self.game_mode.write(writer)?;
        self.previous_game_mode.write(writer)?;
        self.is_debug.write(writer)?;
        self.is_flat.write(writer)?;
        false.write(writer)?; // optional last-death: absent
        VarInt(self.portal_cooldown).write(writer)?;
        VarInt(self.sea_level).write(writer)?;
        Ok(())
    }
}

/// S→C, id 0x30. Sent once per connection on entering play.
#[derive(Debug, Clone)]
pub struct PlayLogin {
    /// The connection handle, reused as a stable entity id for the
    /// duration of the session.
    pub entity_id: u32,
    pub hardcore: bool,
    pub dimension_names: Vec<String>,
    pub max_players: i32,
    pub view_distance: i32,
    pub simulation_distance: i32,
    pub reduced_debug_info: bool,
    pub respawn_screen: bool,
    pub limited_crafting: bool,
    pub spawn_info: CommonPlayerSpawnInfo,
    pub enforces_secure_chat: bool,
}

impl WriteTo for PlayLogin {
    fn write(&self, writer: &mut impl Write) -> Result<(), CodecError> {
        self.entity_id.write(writer)?;
        self.hardcore.write(writer)?;
        VarInt(self.dimension_names.len() as i32).write(writer)?;
        for name in &self.dimension_names {
            write_string(writer, name)?;
        }
        VarInt(self.max_players).write(writer)?;
        VarInt(self.view_distance).write(writer)?;
        VarInt(self.simulation_distance).write(writer)?;
        self.reduced_debug_info.write(writer)?;
        self.respawn_screen.write(writer)?;
        self.limited_crafting.write(writer)?;
        self.spawn_info.write(writer)?;
        self.enforces_secure_chat.write(writer)?;
        Ok(())
    }
}

/// S→C, id 0x50. Reuses [`CommonPlayerSpawnInfo`] since vanilla defines the
/// two packets to share that block.
#[derive(Debug, Clone)]
pub struct Respawn {
    pub spawn_info: CommonPlayerSpawnInfo,
    pub copy_metadata: bool,
}

impl WriteTo for Respawn {
    fn write(&self, writer: &mut impl Write) -> Result<(), CodecError> {
        self.spawn_info.write(writer)?;
        self.copy_metadata.write(writer)
    }
}

/// S→C, id 0x08: a placed/broken block.
#[derive(Debug, Clone, Copy)]
pub struct BlockUpdate {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub block_state_id: i32,
}

impl WriteTo for BlockUpdate {
    fn write(&self, writer: &mut impl Write) -> Result<(), CodecError> {
        pack_position(self.x, self.y, self.z).write(writer)?;
        VarInt(self.block_state_id).write(writer)
    }
}

/// One slot change within a [`ClickContainer`].
#[derive(Debug, Clone, Copy)]
pub struct SlotChange {
    pub slot: i16,
    pub item: Option<(i32, u8)>,
}

/// C→S, id 0x11. Dispatch by `(window_id, mode, clicked_slot)`.
#[derive(Debug, Clone)]
pub struct ClickContainer {
    pub window_id: i32,
    pub clicked_slot: i16,
    pub button: u8,
    pub mode: i32,
    pub slot_changes: Vec<SlotChange>,
    pub cursor_item: Option<(i32, u8)>,
}

impl ReadFrom for ClickContainer {
    fn read(reader: &mut impl Read) -> Result<Self, CodecError> {
        let VarInt(window_id) = VarInt::read(reader)?;
        let VarInt(_state_id) = VarInt::read(reader)?;
        let clicked_slot = i16::read(reader)?;
        let button = u8::read(reader)?;
        let VarInt(mode) = VarInt::read(reader)?;

        let VarInt(change_count) = VarInt::read(reader)?;
        let mut slot_changes = Vec::with_capacity(change_count.max(0) as usize);
        for _ in 0..change_count.max(0) {
            let slot = i16::read(reader)?;
            let present = bool::read(reader)?;
            let item = if present {
                let VarInt(id) = VarInt::read(reader)?;
                let count = u8::read(reader)?;
                Some((id, count))
            } else {
                None
            };
            slot_changes.push(SlotChange { slot, item });
        }

        let cursor_present = bool::read(reader)?;
        let cursor_item = if cursor_present {
            let VarInt(id) = VarInt::read(reader)?;
            let count = u8::read(reader)?;
            Some((id, count))
        } else {
            None
        };

        Ok(Self {
            window_id,
            clicked_slot,
            button,
            mode,
            slot_changes,
            cursor_item,
        })
    }
}

/// S→C, id 0x77: a system-message chat line, framed as an NBT string tag
/// (tag type 8, u16 length, bytes) rather than the plain length-prefixed
/// strings every other packet uses.
#[derive(Debug, Clone)]
pub struct SystemChat {
    pub message: String,
    pub is_action_bar: bool,
}

impl WriteTo for SystemChat {
    fn write(&self, writer: &mut impl Write) -> Result<(), CodecError> {
        let bytes = self.message.as_bytes();
        8u8.write(writer)?;
        (bytes.len() as u16).write(writer)?;
        writer.write_all(bytes)?;
        self.is_action_bar.write(writer)
    }
}

/// S→C, id 0x66.
#[derive(Debug, Clone, Copy)]
pub struct SetHealth {
    pub health: f32,
    pub food: i32,
    pub food_saturation: f32,
}

impl WriteTo for SetHealth {
    fn write(&self, writer: &mut impl Write) -> Result<(), CodecError> {
        self.health.write(writer)?;
        VarInt(self.food).write(writer)?;
        self.food_saturation.write(writer)
    }
}

/// S→C, id 0x2B, and its C→S echo. Sent once a second.
#[derive(Debug, Clone, Copy)]
pub struct KeepAlive(pub i64);

impl WriteTo for KeepAlive {
    fn write(&self, writer: &mut impl Write) -> Result<(), CodecError> {
        self.0.write(writer)
    }
}

impl ReadFrom for KeepAlive {
    fn read(reader: &mut impl Read) -> Result<Self, CodecError> {
        Ok(Self(i64::read(reader)?))
    }
}

/// S→C, id 0x6F.
#[derive(Debug, Clone, Copy)]
pub struct SetTime {
    pub world_age: i64,
    pub time_of_day: i64,
}

impl WriteTo for SetTime {
    fn write(&self, writer: &mut impl Write) -> Result<(), CodecError> {
        self.world_age.write(writer)?;
        self.time_of_day.write(writer)
    }
}

/// S→C, id 0x5F.
#[derive(Debug, Clone, Copy)]
pub struct SetDefaultSpawnPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub angle: f32,
}

impl WriteTo for SetDefaultSpawnPosition {
    fn write(&self, writer: &mut impl Write) -> Result<(), CodecError> {
        pack_position(self.x, self.y, self.z).write(writer)?;
        self.angle.write(writer)
    }
}

/// S→C, id 0x5C: relocates the client's streamed chunk view.
#[derive(Debug, Clone, Copy)]
pub struct SetChunkCacheCenter {
    pub chunk_x: i32,
    pub chunk_z: i32,
}

impl WriteTo for SetChunkCacheCenter {
    fn write(&self, writer: &mut impl Write) -> Result<(), CodecError> {
        VarInt(self.chunk_x).write(writer)?;
        VarInt(self.chunk_z).write(writer)
    }
}

/// A fixed-length bit set, written as `VarInt` word count followed by that
/// many big-endian `i64` words. Empty masks here mean "no light data in
/// this packet" rather than "all zero" — the client falls back to its own
/// lighting engine, which is the simplification this server takes instead
/// of tracking a real lightmap.
fn write_empty_bitset(writer: &mut impl Write) -> Result<(), CodecError> {
    VarInt(0).write(writer)
}

/// S→C, id 0x2C. `sections` is the already-encoded chunk-section payload
/// (see `nethr-core`'s chunk encoder); this packet only frames it.
#[derive(Debug, Clone)]
pub struct LevelChunkWithLight {
    pub chunk_x: i32,
    pub chunk_z: i32,
    pub sections: Vec<u8>,
}

impl WriteTo for LevelChunkWithLight {
    fn write(&self, writer: &mut impl Write) -> Result<(), CodecError> {
        self.chunk_x.write(writer)?;
        self.chunk_z.write(writer)?;

        // Root heightmaps compound: empty (TAG_Compound, TAG_End), no name
        // per the network NBT convention used since the root-tag-name drop.
        writer.write_all(&[0x0A, 0x00]).map_err(CodecError::Io)?;

        VarInt(self.sections.len() as i32).write(writer)?;
        writer.write_all(&self.sections).map_err(CodecError::Io)?;

        VarInt(0).write(writer)?; // block entity count

        true.write(writer)?; // trust_edges
        write_empty_bitset(writer)?; // sky_light_mask
        write_empty_bitset(writer)?; // block_light_mask
        write_empty_bitset(writer)?; // empty_sky_light_mask
        write_empty_bitset(writer)?; // empty_block_light_mask
        VarInt(0).write(writer)?; // sky_light_arrays
        VarInt(0).write(writer) // block_light_arrays
    }
}

/// S→C, id 0x7B.
#[derive(Debug, Clone, Copy)]
pub struct TeleportEntity {
    pub entity_id: i32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub velocity_x: f64,
    pub velocity_y: f64,
    pub velocity_z: f64,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

impl WriteTo for TeleportEntity {
    fn write(&self, writer: &mut impl Write) -> Result<(), CodecError> {
        VarInt(self.entity_id).write(writer)?;
        self.x.write(writer)?;
        self.y.write(writer)?;
        self.z.write(writer)?;
        self.velocity_x.write(writer)?;
        self.velocity_y.write(writer)?;
        self.velocity_z.write(writer)?;
        self.yaw.write(writer)?;
        self.pitch.write(writer)?;
        self.on_ground.write(writer)
    }
}

/// S→C, id 0x36: incremental move + look, used once an entity has already
/// been placed by [`TeleportEntity`].
#[derive(Debug, Clone, Copy)]
pub struct MoveEntityRot {
    pub entity_id: i32,
    pub delta_x: i16,
    pub delta_y: i16,
    pub delta_z: i16,
    pub yaw: u8,
    pub pitch: u8,
    pub on_ground: bool,
}

impl WriteTo for MoveEntityRot {
    fn write(&self, writer: &mut impl Write) -> Result<(), CodecError> {
        VarInt(self.entity_id).write(writer)?;
        self.delta_x.write(writer)?;
        self.delta_y.write(writer)?;
        self.delta_z.write(writer)?;
        self.yaw.write(writer)?;
        self.pitch.write(writer)?;
        self.on_ground.write(writer)
    }
}

/// S→C, id 0x4B.
#[derive(Debug, Clone)]
pub struct RemoveEntities {
    pub entity_ids: Vec<i32>,
}

impl WriteTo for RemoveEntities {
    fn write(&self, writer: &mut impl Write) -> Result<(), CodecError> {
        VarInt(self.entity_ids.len() as i32).write(writer)?;
        for id in &self.entity_ids {
            VarInt(*id).write(writer)?;
        }
        Ok(())
    }
}

/// S→C, id 0x22: plays an animation or status effect tied to an entity,
/// e.g. the hurt flash.
#[derive(Debug, Clone, Copy)]
pub struct EntityEvent {
    pub entity_id: i32,
    pub event_id: i8,
}

impl WriteTo for EntityEvent {
    fn write(&self, writer: &mut impl Write) -> Result<(), CodecError> {
        self.entity_id.write(writer)?;
        self.event_id.write(writer)
    }
}

/// S→C, id 0x19.
#[derive(Debug, Clone, Copy)]
pub struct DamageEvent {
    pub entity_id: i32,
    pub source_type_id: i32,
    /// Entity id + 1 of whoever is responsible, 0 if none.
    pub source_cause_id: i32,
    /// Entity id + 1 of whoever directly dealt the damage, 0 if none.
    pub source_direct_id: i32,
    pub source_position: Option<(f64, f64, f64)>,
}

impl WriteTo for DamageEvent {
    fn write(&self, writer: &mut impl Write) -> Result<(), CodecError> {
        VarInt(self.entity_id).write(writer)?;
        VarInt(self.source_type_id).write(writer)?;
        VarInt(self.source_cause_id).write(writer)?;
        VarInt(self.source_direct_id).write(writer)?;
        match self.source_position {
            Some((x, y, z)) => {
                true.write(writer)?;
                x.write(writer)?;
                y.write(writer)?;
                z.write(writer)?;
            }
            None => false.write(writer)?,
        }
        Ok(())
    }
}

/// S→C, id 0x26: world-level events (rain, game mode change, respawn
/// countdown...).
#[derive(Debug, Clone, Copy)]
pub struct GameEvent {
    pub event: u8,
    pub value: f32,
}

impl WriteTo for GameEvent {
    fn write(&self, writer: &mut impl Write) -> Result<(), CodecError> {
        self.event.write(writer)?;
        self.value.write(writer)
    }
}

/// S→C, id 0x3E.
#[derive(Debug, Clone, Copy)]
pub struct PlayerAbilities {
    pub flags: u8,
    pub flying_speed: f32,
    pub field_of_view_modifier: f32,
}

impl WriteTo for PlayerAbilities {
    fn write(&self, writer: &mut impl Write) -> Result<(), CodecError> {
        self.flags.write(writer)?;
        self.flying_speed.write(writer)?;
        self.field_of_view_modifier.write(writer)
    }
}

/// S→C, id 0x39: opens a non-player-inventory window (chest, furnace,
/// crafting table).
#[derive(Debug, Clone)]
pub struct OpenScreen {
    pub window_id: i32,
    pub window_type: i32,
    pub title: String,
}

impl WriteTo for OpenScreen {
    fn write(&self, writer: &mut impl Write) -> Result<(), CodecError> {
        VarInt(self.window_id).write(writer)?;
        VarInt(self.window_type).write(writer)?;
        write_string(writer, &self.title)
    }
}

/// S→C, id 0x14: sets one slot's contents in an open window.
#[derive(Debug, Clone, Copy)]
pub struct SetContainerSlot {
    pub window_id: i32,
    pub state_id: i32,
    pub slot: i16,
    pub item: Option<(i32, u8)>,
}

impl WriteTo for SetContainerSlot {
    fn write(&self, writer: &mut impl Write) -> Result<(), CodecError> {
        VarInt(self.window_id).write(writer)?;
        VarInt(self.state_id).write(writer)?;
        self.slot.write(writer)?;
        match self.item {
            Some((id, count)) => {
                true.write(writer)?;
                VarInt(id).write(writer)?;
                count.write(writer)?;
            }
            None => false.write(writer)?,
        }
        Ok(())
    }
}

/// C→S, phase Play: mining (start/finish/cancel), swap-hands, and
/// drop-item all share this packet, distinguished by `status`.
#[derive(Debug, Clone, Copy)]
pub struct PlayerAction {
    pub status: i32,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub face: i8,
    pub sequence: i32,
}

impl ReadFrom for PlayerAction {
    fn read(reader: &mut impl Read) -> Result<Self, CodecError> {
        let VarInt(status) = VarInt::read(reader)?;
        let packed = u64::read(reader)?;
        let (x, y, z) = crate::codec::unpack_position(packed);
        let face = i8::read(reader)?;
        let VarInt(sequence) = VarInt::read(reader)?;
        Ok(Self { status, x, y, z, face, sequence })
    }
}

/// C→S: sets the hotbar slot the player is holding.
#[derive(Debug, Clone, Copy)]
pub struct SetHeldSlot {
    pub slot: i16,
}

impl ReadFrom for SetHeldSlot {
    fn read(reader: &mut impl Read) -> Result<Self, CodecError> {
        Ok(Self { slot: i16::read(reader)? })
    }
}

/// C→S, id 0x3D: right-click with the held item. `hand` is 0 for main hand,
/// 1 for offhand.
#[derive(Debug, Clone, Copy)]
pub struct UseItem {
    pub hand: i32,
    pub sequence: i32,
}

impl ReadFrom for UseItem {
    fn read(reader: &mut impl Read) -> Result<Self, CodecError> {
        let VarInt(hand) = VarInt::read(reader)?;
        let VarInt(sequence) = VarInt::read(reader)?;
        Ok(Self { hand, sequence })
    }
}

/// C→S, id 0x18: right-click on an entity. `kind` is 0 for interact
/// (villager trading), 1 for attack.
#[derive(Debug, Clone, Copy)]
pub struct InteractEntity {
    pub entity_id: i32,
    pub kind: i32,
    pub sneaking: bool,
}

impl ReadFrom for InteractEntity {
    fn read(reader: &mut impl Read) -> Result<Self, CodecError> {
        let VarInt(entity_id) = VarInt::read(reader)?;
        let VarInt(kind) = VarInt::read(reader)?;
        let sneaking = bool::read(reader)?;
        Ok(Self { entity_id, kind, sneaking })
    }
}

/// C→S: full position + rotation, the common case for normal walking.
#[derive(Debug, Clone, Copy)]
pub struct PlayerPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub on_ground: bool,
}

impl ReadFrom for PlayerPosition {
    fn read(reader: &mut impl Read) -> Result<Self, CodecError> {
        Ok(Self {
            x: f64::read(reader)?,
            y: f64::read(reader)?,
            z: f64::read(reader)?,
            on_ground: bool::read(reader)?,
        })
    }
}
