//! Packet IDs fixed by protocol revision 774. These are wire contract, not
//! design choices — every value here must match the client exactly.

/// Handshake phase.
pub mod handshake {
    /// C→S: protocol version, address, port, intent.
    pub const HANDSHAKE: i32 = 0x00;
}

/// Status (server list ping) phase.
pub mod status {
    /// C→S: request for a status response.
    pub const STATUS_REQUEST: i32 = 0x00;
    /// S→C: JSON status document.
    pub const STATUS_RESPONSE: i32 = 0x00;
    /// C→S / S→C: echoed ping payload.
    pub const PING_PONG: i32 = 0x01;
}

/// Login phase.
pub mod login {
    /// C→S: player name + identity.
    pub const LOGIN_START: i32 = 0x00;
    /// S→C: identity, name, zero properties (no authentication performed).
    pub const LOGIN_SUCCESS: i32 = 0x02;
    /// C→S: login acknowledged, advances phase to configuration.
    pub const LOGIN_ACK: i32 = 0x03;
}

/// Configuration phase.
pub mod configuration {
    /// S→C / C→S: known data pack negotiation.
    pub const KNOWN_PACKS: i32 = 0x07;
    /// S→C: one registry's data, part of the opaque registry/tags blob.
    pub const REGISTRY_DATA: i32 = 0x07;
    /// C→S: client finished configuration, advances phase to play.
    pub const FINISH_CONFIGURATION: i32 = 0x03;
    /// S→C: disables client-side features this server's catalog omits.
    pub const UPDATE_ENABLED_FEATURES: i32 = 0x0C;
}

/// Play phase. Field-for-field behavior is on the packet structs in
/// [`super::play`]; these are only the wire ids.
pub mod play {
    pub const BLOCK_UPDATE: i32 = 0x08;
    pub const UPDATE_ENABLED_FEATURES: i32 = 0x0C;
    pub const CLICK_CONTAINER: i32 = 0x11;
    pub const SET_CONTAINER_SLOT: i32 = 0x14;
    pub const DAMAGE_EVENT: i32 = 0x19;
    pub const ENTITY_EVENT: i32 = 0x22;
    pub const GAME_EVENT: i32 = 0x26;
    /// C→S: right-click an entity (attack, or open a trade with a villager).
    pub const INTERACT_ENTITY: i32 = 0x18;
    pub const KEEP_ALIVE: i32 = 0x2B;
    pub const LEVEL_CHUNK_WITH_LIGHT: i32 = 0x2C;
    pub const PLAY_LOGIN: i32 = 0x30;
    pub const MOVE_ENTITY_ROT: i32 = 0x36;
    pub const OPEN_SCREEN: i32 = 0x39;
    pub const PLAYER_ABILITIES: i32 = 0x3E;
    pub const PLAYER_ACTION: i32 = 0x1D;
    pub const PLAYER_INFO_UPDATE: i32 = 0x44;
    pub const PLAYER_POSITION: i32 = 0x46;
    pub const REMOVE_ENTITIES: i32 = 0x4B;
    pub const RESPAWN: i32 = 0x50;
    pub const ROTATE_HEAD: i32 = 0x51;
    pub const SET_CHUNK_CACHE_CENTER: i32 = 0x5C;
    pub const SET_CURSOR_ITEM: i32 = 0x5E;
    pub const SET_DEFAULT_SPAWN_POSITION: i32 = 0x5F;
    pub const SET_ENTITY_DATA: i32 = 0x61;
    pub const SET_HEALTH: i32 = 0x66;
    pub const SET_HELD_SLOT: i32 = 0x67;
    pub const SET_TIME: i32 = 0x6F;
    pub const SYSTEM_CHAT: i32 = 0x77;
    pub const TAKE_ITEM_ENTITY: i32 = 0x7A;
    pub const TELEPORT_ENTITY: i32 = 0x7B;
    /// C→S: right-click with the held item (eating, mainly).
    pub const USE_ITEM: i32 = 0x3D;

    /// A legacy server-list ping in disguise: length 254, id 122. Checked
    /// before normal dispatch in phase `None`; the connection is closed on
    /// a match rather than parsed as a real packet.
    pub const LEGACY_PING_ID: i32 = 122;
    /// The companion length check for [`LEGACY_PING_ID`].
    pub const LEGACY_PING_LENGTH: i32 = 254;
}
