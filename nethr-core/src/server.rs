//! The single-threaded event loop: accepts connections, advances each
//! connection's protocol phase, dispatches play packets into the
//! simulation, and runs the fixed-interval tick. No `Mutex`/`RwLock`
//! anywhere — every piece of mutable state (world, players, mobs) is owned
//! directly by [`Server`] and touched only from this loop.

use std::io::{Cursor, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use nethr_protocol::codec::{CodecError, ReadFrom, SendBuffer, VarInt, WriteTo};
use nethr_protocol::packets::{configuration, handshake, ids, login, play, status};
use nethr_protocol::phase::Phase;
use nethr_registry::{Block, Item, ToolKind, ToolMaterial};
use nethr_utils::{FastRand, splitmix64};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};
use uuid::Uuid;

use crate::blockchange::{BlockChangeStore, ItemStack};
use crate::chunk;
use crate::config::{Config, MAX_PLAYERS, MAX_RECV_BUF_LEN, NETWORK_TIMEOUT};
use crate::error::{BlockChangeError, StartupError};
use crate::mob::{self, MobTable, MobType};
use crate::persistence::{PlayerRecord, WorldFile, WorldMeta};
use crate::player::slots::{self, Window};
use crate::player::{can_mine, roll_drop, roll_tool_break, CraftingState, PlayerData};
use crate::tick;
use crate::worldgen::WorldGenerator;

/// Disconnect reasons, logged numerically per the policy table: a peer
/// closing cleanly is not the same event as a malformed varint, even
/// though both end in the same connection teardown.
pub mod disconnect {
    pub const PEER_CLOSED: i8 = 1;
    pub const BAD_LENGTH_VARINT: i8 = 2;
    pub const BAD_ID_VARINT: i8 = 3;
    pub const SOCKET_DEAD_AFTER_HANDLER: i8 = 4;
    pub const LEGACY_PING_REJECTED: i8 = 5;
    pub const DEV_DUMP_COMPLETE: i8 = 7;
    pub const STATUS_PING_CLEAN: i8 = 8;
    pub const IO_TIMEOUT: i8 = -1;
    pub const IO_OTHER: i8 = -2;
}

const MAX_PENDING_CONNECTIONS: usize = MAX_PLAYERS * 4;
/// Bounds how many chunk columns one movement packet will stream, so a
/// player crossing many chunks at once (teleport, first join) can't stall
/// the loop for everyone else.
const MAX_CHUNKS_PER_MOVE: usize = 25;
/// Mob entity ids live in a disjoint range above connection entity ids
/// (which start at 1 and grow by one per accepted socket), since mobs
/// aren't connections and have no id of their own otherwise.
const MOB_ENTITY_ID_BASE: u32 = 1_000_000;

fn codec_to_io(err: CodecError) -> std::io::Error {
    match err {
        CodecError::Io(io) => io,
        other => std::io::Error::other(other.to_string()),
    }
}

async fn write_all_nonblocking(stream: &mut TcpStream, mut buf: &[u8]) -> std::io::Result<()> {
    while !buf.is_empty() {
        match stream.try_write(buf) {
            Ok(0) => return Err(std::io::Error::new(ErrorKind::WriteZero, "write returned zero")),
            Ok(n) => buf = &buf[n..],
            Err(e) if e.kind() == ErrorKind::WouldBlock => stream.writable().await?,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Queues one framed packet into a connection's coalescing buffer. No I/O
/// happens here; the event loop's `flush_sends` pass does the actual
/// `try_write` once per iteration.
fn send_packet(buf: &mut SendBuffer, id: i32, packet: &impl WriteTo) -> std::io::Result<()> {
    buf.queue(id, packet).map_err(codec_to_io)
}

fn item_tool(item: Item) -> Option<(ToolMaterial, ToolKind)> {
    match item {
        Item::Tool(material, kind) => Some((material, kind)),
        _ => None,
    }
}

/// Pulls one complete `varint(length) payload[length]` frame off the front
/// of `buf`, or `Ok(None)` if the frame isn't fully buffered yet. `buf` is
/// left untouched on `Ok(None)` so the next read can append to it.
fn try_take_frame(buf: &mut Vec<u8>) -> Result<Option<Vec<u8>>, i8> {
    let mut cursor = Cursor::new(&buf[..]);
    let length = match VarInt::read(&mut cursor) {
        Ok(VarInt(v)) => v,
        Err(CodecError::Io(e)) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(_) => return Err(disconnect::BAD_LENGTH_VARINT),
    };
    if !(0..=MAX_RECV_BUF_LEN as i32).contains(&length) {
        return Err(disconnect::BAD_LENGTH_VARINT);
    }
    let header_len = cursor.position() as usize;
    let total = header_len + length as usize;
    if buf.len() < total {
        return Ok(None);
    }
    let payload = buf[header_len..total].to_vec();
    buf.drain(..total);
    Ok(Some(payload))
}

/// One accepted socket and the phase/identity state tied to it. Transient
/// connections (a status ping that never logs in) never get a player slot.
struct Connection {
    stream: TcpStream,
    phase: Phase,
    recv_buf: Vec<u8>,
    send_buf: SendBuffer,
    last_activity: Instant,
    entity_id: u32,
    identity: Option<Uuid>,
    name: Option<String>,
    player_slot: Option<usize>,
    last_chunk: Option<(i32, i32)>,
}

impl Connection {
    fn new(stream: TcpStream, entity_id: u32) -> Self {
        Self {
            stream,
            phase: Phase::None,
            recv_buf: Vec::with_capacity(MAX_RECV_BUF_LEN),
            send_buf: SendBuffer::new(),
            last_activity: Instant::now(),
            entity_id,
            identity: None,
            name: None,
            player_slot: None,
            last_chunk: None,
        }
    }
}

/// Owns every piece of server state and drives the cooperative loop.
pub struct Server {
    config: Config,
    listener: TcpListener,
    connections: Vec<Connection>,
    next_entity_id: u32,
    players: Vec<Option<PlayerData>>,
    returning_records: Vec<PlayerRecord>,
    generator: WorldGenerator,
    changes: BlockChangeStore,
    mobs: MobTable,
    world_file: WorldFile,
    meta_path: PathBuf,
    meta: WorldMeta,
    rng: FastRand,
    rng_fallback: u64,
    world_time: u32,
    last_tick: Instant,
    last_persist: Instant,
}

impl Server {
    /// Binds the listening socket and loads (or creates) world storage.
    /// Any failure here is startup-fatal per the error policy.
    pub async fn bind(config: Config) -> Result<Self, StartupError> {
        let listener = TcpListener::bind(("0.0.0.0", config.port))
            .await
            .map_err(|source| StartupError::Bind { port: config.port, source })?;

        let world_file = WorldFile::new(&config.world_dir, MAX_PLAYERS);
        let (changes, returning_records) = world_file.load()?;

        let meta_path = Path::new(&config.world_dir).join("world.meta");
        let mut meta = WorldMeta::load(&meta_path)?.unwrap_or(WorldMeta {
            world_seed_raw: config.world_seed_raw,
            rng_seed_raw: config.rng_seed_raw,
            spawn: None,
        });

        let mut generator = WorldGenerator::new(splitmix64(u64::from(meta.world_seed_raw)));
        let rng = FastRand::new(meta.rng_seed_raw);

        let spawn = crate::spawn::ensure_world_spawn(&mut generator, meta.spawn, meta.world_seed_raw, meta.rng_seed_raw);
        if meta.spawn != Some(spawn) {
            meta.spawn = Some(spawn);
            meta.save(&meta_path)?;
        }

        info!(port = config.port, world_seed = meta.world_seed_raw, ?spawn, "nethr server bound");

        let mobs = initial_mobs(spawn);

        Ok(Self {
            config,
            listener,
            connections: Vec::new(),
            next_entity_id: 1,
            players: (0..MAX_PLAYERS).map(|_| None).collect(),
            returning_records,
            generator,
            changes,
            mobs,
            world_file,
            meta_path,
            meta,
            rng,
            rng_fallback: 0x9E37_79B9_7F4A_7C15,
            world_time: 0,
            last_tick: Instant::now(),
            last_persist: Instant::now(),
        })
    }

    /// Runs until the process is killed; the only way out early is a
    /// startup-fatal error, which can't happen after `bind` succeeds.
    pub async fn run(&mut self) -> Result<(), StartupError> {
        loop {
            self.accept_one().await;
            self.service_connections().await;
            self.maybe_tick();
            self.flush_sends().await;
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    async fn accept_one(&mut self) {
        if self.connections.len() >= MAX_PENDING_CONNECTIONS {
            return;
        }
        match tokio::time::timeout(Duration::from_millis(0), self.listener.accept()).await {
            Ok(Ok((stream, addr))) => {
                let _ = stream.set_nodelay(true);
                let entity_id = self.next_entity_id;
                self.next_entity_id = self.next_entity_id.wrapping_add(1).max(1);
                info!(%addr, entity_id, "connection accepted");
                self.connections.push(Connection::new(stream, entity_id));
            }
            _ => {}
        }
    }

    async fn service_connections(&mut self) {
        let mut to_remove = Vec::new();
        for index in 0..self.connections.len() {
            if let Err(cause) = self.service_one(index).await {
                self.teardown(index, cause);
                to_remove.push(index);
            }
        }
        for index in to_remove.into_iter().rev() {
            self.connections.remove(index);
        }
    }

    async fn service_one(&mut self, index: usize) -> Result<(), i8> {
        let mut scratch = [0u8; MAX_RECV_BUF_LEN];
        loop {
            let read = self.connections[index].stream.try_read(&mut scratch);
            match read {
                Ok(0) => return Err(disconnect::PEER_CLOSED),
                Ok(n) => {
                    self.connections[index].recv_buf.extend_from_slice(&scratch[..n]);
                    self.connections[index].last_activity = Instant::now();
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(_) => return Err(disconnect::IO_OTHER),
            }
        }

        if self.connections[index].last_activity.elapsed() > NETWORK_TIMEOUT {
            return Err(disconnect::IO_TIMEOUT);
        }

        loop {
            let mut buf = std::mem::take(&mut self.connections[index].recv_buf);
            let outcome = try_take_frame(&mut buf);
            self.connections[index].recv_buf = buf;
            match outcome {
                Ok(None) => break,
                Ok(Some(frame)) => self.dispatch_frame(index, frame).await?,
                Err(cause) => return Err(cause),
            }
        }
        Ok(())
    }

    /// Drains every connection's coalesced send buffer with one
    /// `try_write` pass each. A flush failure tears the connection down
    /// the same way a failed read does; the bytes that didn't make it out
    /// are gone either way once the socket is unusable.
    async fn flush_sends(&mut self) {
        let mut to_remove = Vec::new();
        for index in 0..self.connections.len() {
            if self.connections[index].send_buf.is_empty() {
                continue;
            }
            let framed = self.connections[index].send_buf.take();
            if write_all_nonblocking(&mut self.connections[index].stream, &framed).await.is_err() {
                to_remove.push(index);
            }
        }
        for index in to_remove.into_iter().rev() {
            self.teardown(index, disconnect::IO_OTHER);
            self.connections.remove(index);
        }
    }

    fn teardown(&mut self, index: usize, cause: i8) {
        let connection = &self.connections[index];
        warn!(entity_id = connection.entity_id, cause, "connection closed");
        if let Some(slot) = connection.player_slot {
            if let Some(player) = self.players[slot].take() {
                self.remember_player(slot, &player);
                self.persist_all();
            }
        }
    }

    /// Folds a departing player's last-known position into
    /// `returning_records` so a reconnect (or the next periodic save)
    /// picks it up. `world.bin`'s player region only supports whole-file
    /// rewrites, so the disk write itself waits for `persist_all`.
    fn remember_player(&mut self, slot: usize, player: &PlayerData) {
        let record = PlayerRecord::from_player(player);
        if slot >= self.returning_records.len() {
            self.returning_records.resize(slot + 1, PlayerRecord::default());
        }
        self.returning_records[slot] = record;
    }

    async fn dispatch_frame(&mut self, index: usize, frame: Vec<u8>) -> Result<(), i8> {
        let phase = self.connections[index].phase;

        if phase.is_none() && frame.len() == ids::play::LEGACY_PING_LENGTH as usize {
            let mut cursor = Cursor::new(&frame[..]);
            if let Ok(VarInt(id)) = VarInt::read(&mut cursor) {
                if id == ids::play::LEGACY_PING_ID {
                    return Err(disconnect::LEGACY_PING_REJECTED);
                }
            }
        }

        let mut cursor = Cursor::new(&frame[..]);
        let VarInt(packet_id) = VarInt::read(&mut cursor).map_err(|_| disconnect::BAD_ID_VARINT)?;
        let body_start = cursor.position() as usize;
        let body = &frame[body_start..];

        let result = match phase {
            Phase::None => self.handle_none_packet(index, packet_id, body).await,
            Phase::Status => self.handle_status_packet(index, packet_id, body).await,
            Phase::Login => self.handle_login_packet(index, packet_id, body).await,
            Phase::Configuration => self.handle_configuration_packet(index, packet_id, body).await,
            Phase::Play => self.handle_play_packet(index, packet_id, body).await,
        };

        match result {
            Ok(()) => Ok(()),
            Err(ServerSideError::Io) => Err(disconnect::SOCKET_DEAD_AFTER_HANDLER),
            Err(ServerSideError::Logical) => Ok(()), // drain-and-ignore, already consumed via `body`
        }
    }

    async fn handle_none_packet(&mut self, index: usize, packet_id: i32, body: &[u8]) -> Result<(), ServerSideError> {
        if packet_id != ids::handshake::HANDSHAKE {
            return Ok(());
        }
        let mut cursor = Cursor::new(body);
        let handshake = handshake::Handshake::read(&mut cursor).map_err(|_| ServerSideError::Logical)?;
        self.connections[index].phase = match handshake.intent {
            handshake::Intent::Status => Phase::Status,
            handshake::Intent::Login => Phase::Login,
        };
        Ok(())
    }

    async fn handle_status_packet(&mut self, index: usize, packet_id: i32, body: &[u8]) -> Result<(), ServerSideError> {
        match packet_id {
            ids::status::STATUS_REQUEST => {
                let response = status::StatusResponse { motd: self.config.motd.clone() };
                send_packet(&mut self.connections[index].send_buf, ids::status::STATUS_RESPONSE, &response).map_err(|_| ServerSideError::Io)
            }
            ids::status::PING_PONG => {
                let mut cursor = Cursor::new(body);
                let payload = i64::read(&mut cursor).map_err(|_| ServerSideError::Logical)?;
                send_packet(&mut self.connections[index].send_buf, ids::status::PING_PONG, &status::PingPong(payload)).map_err(|_| ServerSideError::Io)
            }
            _ => Ok(()),
        }
    }

    async fn handle_login_packet(&mut self, index: usize, packet_id: i32, body: &[u8]) -> Result<(), ServerSideError> {
        match packet_id {
            ids::login::LOGIN_START => {
                let mut cursor = Cursor::new(body);
                let start = login::LoginStart::read(&mut cursor).map_err(|_| ServerSideError::Logical)?;
                self.connections[index].identity = Some(start.identity);
                self.connections[index].name = Some(start.name.clone());
                let response = login::LoginSuccess { identity: start.identity, name: start.name };
                send_packet(&mut self.connections[index].send_buf, ids::login::LOGIN_SUCCESS, &response).map_err(|_| ServerSideError::Io)
            }
            ids::login::LOGIN_ACK => {
                self.connections[index].phase = Phase::Configuration;
                self.send_configuration_start(index)
            }
            _ => Ok(()),
        }
    }

    fn send_configuration_start(&mut self, index: usize) -> Result<(), ServerSideError> {
        let pack = configuration::KnownPack {
            namespace: "minecraft".into(),
            id: "core".into(),
            version: "1.21".into(),
        };
        send_packet(&mut self.connections[index].send_buf, ids::configuration::KNOWN_PACKS, &pack).map_err(|_| ServerSideError::Io)?;
        self.connections[index].send_buf.queue_raw(configuration::REGISTRY_AND_TAGS_BLOB);
        let features = configuration::UpdateEnabledFeatures { feature_flags: vec!["minecraft:vanilla".into()] };
        send_packet(&mut self.connections[index].send_buf, ids::configuration::UPDATE_ENABLED_FEATURES, &features).map_err(|_| ServerSideError::Io)
    }

    async fn handle_configuration_packet(&mut self, index: usize, packet_id: i32, _body: &[u8]) -> Result<(), ServerSideError> {
        match packet_id {
            ids::configuration::KNOWN_PACKS => Ok(()), // client's echo; nothing further to do
            ids::configuration::FINISH_CONFIGURATION => {
                self.connections[index].phase = Phase::Play;
                self.enter_play(index).await
            }
            _ => Ok(()),
        }
    }

    async fn enter_play(&mut self, index: usize) -> Result<(), ServerSideError> {
        let Some(slot) = self.players.iter().position(Option::is_none) else {
            return Err(ServerSideError::Io); // server full; drop the connection
        };

        let identity = self.connections[index].identity.unwrap_or(Uuid::nil());
        let name = self.connections[index].name.clone().unwrap_or_else(|| "player".into());
        let mut player = PlayerData::new(identity, name);

        if let Some(record) = self.returning_records.iter().find(|r| r.identity == *identity.as_bytes() && r.identity != [0; 16]) {
            record.apply_to(&mut player);
        } else if let Some((x, y, z)) = self.meta.spawn {
            player.x = x;
            player.y = y;
            player.z = z;
            player.grounded_y = y;
        }

        self.connections[index].player_slot = Some(slot);

        let login_packet = play::PlayLogin {
            entity_id: self.connections[index].entity_id,
            hardcore: false,
            dimension_names: vec!["minecraft:overworld".into()],
            max_players: MAX_PLAYERS as i32,
            view_distance: self.config.view_distance,
            simulation_distance: self.config.view_distance,
            reduced_debug_info: false,
            respawn_screen: true,
            limited_crafting: false,
            spawn_info: play::CommonPlayerSpawnInfo {
                dimension_name: "minecraft:overworld".into(),
                world_seed: i64::from(self.meta.world_seed_raw),
                game_mode: 0,
                previous_game_mode: -1,
                is_debug: false,
                is_flat: false,
                portal_cooldown: 0,
                sea_level: 63,
            },
            enforces_secure_chat: false,
        };
        send_packet(&mut self.connections[index].send_buf, ids::play::PLAY_LOGIN, &login_packet).map_err(|_| ServerSideError::Io)?;

        let spawn = play::SetDefaultSpawnPosition { x: i32::from(player.x), y: i32::from(player.y), z: i32::from(player.z), angle: 0.0 };
        send_packet(&mut self.connections[index].send_buf, ids::play::SET_DEFAULT_SPAWN_POSITION, &spawn).map_err(|_| ServerSideError::Io)?;

        let time = play::SetTime { world_age: i64::from(self.world_time), time_of_day: i64::from(self.world_time) };
        send_packet(&mut self.connections[index].send_buf, ids::play::SET_TIME, &time).map_err(|_| ServerSideError::Io)?;

        self.players[slot] = Some(player);
        self.stream_chunks_around(index, slot).await
    }

    async fn stream_chunks_around(&mut self, index: usize, slot: usize) -> Result<(), ServerSideError> {
        let (chunk_x, chunk_z) = {
            let player = self.players[slot].as_ref().expect("slot just populated");
            (nethr_utils::div_floor(i32::from(player.x), 16), nethr_utils::div_floor(i32::from(player.z), 16))
        };

        if self.connections[index].last_chunk == Some((chunk_x, chunk_z)) {
            return Ok(());
        }
        self.connections[index].last_chunk = Some((chunk_x, chunk_z));

        let center = play::SetChunkCacheCenter { chunk_x, chunk_z };
        send_packet(&mut self.connections[index].send_buf, ids::play::SET_CHUNK_CACHE_CENTER, &center).map_err(|_| ServerSideError::Io)?;

        let view = self.config.view_distance;
        let mut sent = 0usize;
        for dz in -view..=view {
            for dx in -view..=view {
                if sent >= MAX_CHUNKS_PER_MOVE {
                    return Ok(());
                }
                let cx = chunk_x + dx;
                let cz = chunk_z + dz;
                let already_visited = self.players[slot].as_ref().is_some_and(|p| p.has_visited(cx, cz));
                if already_visited {
                    continue;
                }
                let sections = chunk::encode_chunk(&mut self.generator, &mut self.changes, cx, cz);
                let packet = play::LevelChunkWithLight { chunk_x: cx, chunk_z: cz, sections };
                send_packet(&mut self.connections[index].send_buf, ids::play::LEVEL_CHUNK_WITH_LIGHT, &packet).map_err(|_| ServerSideError::Io)?;
                if let Some(player) = self.players[slot].as_mut() {
                    player.mark_chunk_visited(cx, cz);
                }
                sent += 1;
                tokio::task::yield_now().await;
            }
        }
        Ok(())
    }

    async fn handle_play_packet(&mut self, index: usize, packet_id: i32, body: &[u8]) -> Result<(), ServerSideError> {
        let Some(slot) = self.connections[index].player_slot else { return Ok(()) };

        match packet_id {
            ids::play::KEEP_ALIVE => {
                let mut cursor = Cursor::new(body);
                let echoed = play::KeepAlive::read(&mut cursor).map_err(|_| ServerSideError::Logical)?;
                send_packet(&mut self.connections[index].send_buf, ids::play::KEEP_ALIVE, &echoed).map_err(|_| ServerSideError::Io)
            }
            ids::play::PLAYER_POSITION => {
                let mut cursor = Cursor::new(body);
                let position = play::PlayerPosition::read(&mut cursor).map_err(|_| ServerSideError::Logical)?;
                if let Some(damage_taken) = self.apply_player_position(slot, position) {
                    if damage_taken > 0.0 {
                        let _ = self.send_health_update(index, slot);
                    }
                }
                self.stream_chunks_around(index, slot).await
            }
            ids::play::SET_HELD_SLOT => {
                let mut cursor = Cursor::new(body);
                let held = play::SetHeldSlot::read(&mut cursor).map_err(|_| ServerSideError::Logical)?;
                if let Some(player) = self.players[slot].as_mut() {
                    player.hotbar_index = held.slot.clamp(0, 8) as u8;
                }
                Ok(())
            }
            ids::play::CLICK_CONTAINER => {
                let mut cursor = Cursor::new(body);
                let click = play::ClickContainer::read(&mut cursor).map_err(|_| ServerSideError::Logical)?;
                self.handle_click_container(slot, click);
                Ok(())
            }
            ids::play::USE_ITEM => {
                let mut cursor = Cursor::new(body);
                let _use_item = play::UseItem::read(&mut cursor).map_err(|_| ServerSideError::Logical)?;
                if let Some(player) = self.players[slot].as_mut() {
                    if let Some(held) = player.held_item() {
                        player.start_eating(held);
                    }
                }
                Ok(())
            }
            ids::play::INTERACT_ENTITY => {
                let mut cursor = Cursor::new(body);
                let interact = play::InteractEntity::read(&mut cursor).map_err(|_| ServerSideError::Logical)?;
                self.handle_interact_entity(index, slot, interact);
                Ok(())
            }
            ids::play::PLAYER_ACTION => {
                let mut cursor = Cursor::new(body);
                let action = play::PlayerAction::read(&mut cursor).map_err(|_| ServerSideError::Logical)?;
                self.handle_player_action(index, slot, action)
            }
            ids::play::GAME_EVENT | ids::play::DAMAGE_EVENT => Ok(()),
            _ => Ok(()), // unknown in this phase: bytes already consumed via `frame`, nothing to drain
        }
    }

    /// Updates position, and on landing resolves fall damage against the
    /// height last recorded as solid ground. Returns the damage actually
    /// taken so the caller knows whether a health update is worth sending.
    fn apply_player_position(&mut self, slot: usize, position: play::PlayerPosition) -> Option<f32> {
        let player = self.players[slot].as_mut()?;
        player.x = position.x as i16;
        player.z = position.z as i16;
        player.y = position.y as u8;
        if !position.on_ground {
            return None;
        }
        let fall = player.fall_damage();
        player.grounded_y = player.y;
        if fall <= 0.0 {
            return None;
        }
        Some(player.take_damage(fall))
    }

    fn send_health_update(&mut self, index: usize, slot: usize) -> Result<(), ServerSideError> {
        let Some(player) = self.players[slot].as_ref() else { return Ok(()) };
        let packet = play::SetHealth { health: player.health, food: i32::from(player.hunger), food_saturation: player.saturation };
        send_packet(&mut self.connections[index].send_buf, ids::play::SET_HEALTH, &packet).map_err(|_| ServerSideError::Io)
    }

    /// Applies every slot change in a container click to the player's flat
    /// inventory (or, with a chest open, straight into the chest's own
    /// slots), then resolves crafting/smelting against the output slot.
    fn handle_click_container(&mut self, slot: usize, click: play::ClickContainer) {
        let Some(player) = self.players[slot].as_ref() else { return };
        let open_chest = match player.crafting {
            CraftingState::OpenChest { x, y, z } => Some((x, y, z)),
            CraftingState::Items(_) => None,
        };
        let window = if click.window_id == 0 {
            Window::PlayerInventory
        } else if open_chest.is_some() {
            Window::Chest
        } else {
            Window::from_type_id(click.window_id).unwrap_or(Window::PlayerInventory)
        };

        for change in &click.slot_changes {
            let stack = change.item.map_or(ItemStack::default(), |(id, count)| ItemStack { item_id: id as u16, count });

            if window == Window::Chest && (0..27).contains(&change.slot) {
                if let Some((x, y, z)) = open_chest {
                    if let Some(chest) = self.changes.chest_at(x, y, z) {
                        if let Some(target) = chest.slots.get_mut(change.slot as usize) {
                            *target = stack;
                        }
                    }
                }
                continue;
            }

            if let Some(server_slot) = slots::client_to_server(window, change.slot) {
                self.apply_server_slot(slot, window, server_slot, stack);
            }
        }

        self.refresh_crafting_output(slot);
    }

    fn apply_server_slot(&mut self, slot: usize, window: Window, server_slot: i16, stack: ItemStack) {
        let Some(player) = self.players[slot].as_mut() else { return };

        if server_slot == slots::CRAFT_OUTPUT {
            if stack.count != 0 {
                return; // the client only ever clears this slot by taking the result
            }
            let crafted = match (window, player.crafting) {
                (Window::Furnace, CraftingState::Items(grid)) => slots::resolve_smelt(grid[0]),
                (_, CraftingState::Items(grid)) => slots::resolve_craft(&grid),
                _ => None,
            };
            if crafted.is_some() {
                player.crafting = CraftingState::Items([ItemStack::default(); 8]);
            }
            if let Some((item, count)) = crafted {
                if let Some(empty) = player.inventory.iter_mut().find(|s| s.count == 0) {
                    *empty = ItemStack { item_id: item.to_u16(), count };
                }
            }
            player.output = ItemStack::default();
            return;
        }

        if let Some(offset) = usize::try_from(server_slot - slots::CRAFT_GRID_START).ok().filter(|&o| o < 8) {
            if let CraftingState::Items(mut grid) = player.crafting {
                grid[offset] = stack;
                player.crafting = CraftingState::Items(grid);
            }
            return;
        }

        if let Some(inv_slot) = usize::try_from(server_slot).ok().filter(|&s| s < player.inventory.len()) {
            player.inventory[inv_slot] = stack;
        }
    }

    fn refresh_crafting_output(&mut self, slot: usize) {
        let Some(player) = self.players[slot].as_mut() else { return };
        if let CraftingState::Items(grid) = player.crafting {
            player.output = match slots::resolve_craft(&grid) {
                Some((item, count)) => ItemStack { item_id: item.to_u16(), count },
                None => ItemStack::default(),
            };
        }
    }

    /// Villager trading via right-click: `interact.kind == 0` is the
    /// interact action (attack uses `1` and isn't handled here). Consumes
    /// the player's whole held stack as payment rather than modeling
    /// partial-stack change, since nothing else in this inventory model
    /// tracks partial consumption either.
    fn handle_interact_entity(&mut self, index: usize, slot: usize, interact: play::InteractEntity) {
        if interact.kind != 0 {
            return;
        }
        let Some(mob_slot) = (interact.entity_id as u32).checked_sub(MOB_ENTITY_ID_BASE).and_then(|s| usize::try_from(s).ok()) else { return };

        let held = self.players[slot].as_ref().and_then(|player| {
            let item = player.held_item()?;
            let count = player.inventory[usize::from(player.hotbar_index)].count;
            Some((item, count))
        });

        let Some(mob) = self.mobs.iter_mut().nth(mob_slot) else { return };
        let Some((pay_item, pay_count)) = mob::trade(mob, held) else { return };

        if let Some(player) = self.players[slot].as_mut() {
            let hotbar = usize::from(player.hotbar_index);
            player.inventory[hotbar] = ItemStack::default();
            if let Some(target) = player.inventory.iter_mut().find(|s| s.count == 0) {
                *target = ItemStack { item_id: pay_item.to_u16(), count: pay_count };
            }
        }
        let chat = play::SystemChat { message: "Traded.".into(), is_action_bar: true };
        let _ = send_packet(&mut self.connections[index].send_buf, ids::play::SYSTEM_CHAT, &chat);
    }

    fn handle_player_action(&mut self, index: usize, slot: usize, action: play::PlayerAction) -> Result<(), ServerSideError> {
        const FINISH_DIGGING: i32 = 2;
        if action.status != FINISH_DIGGING {
            return Ok(());
        }

        let base = self.generator.block_at(action.x, action.y, action.z) as u8;
        let Some(base_block) = Block::from_u8(base) else { return Ok(()) };
        let tool = self.players[slot].as_ref().and_then(PlayerData::held_item).and_then(item_tool);
        if !can_mine(base_block, tool) {
            return Ok(());
        }

        match self.changes.make_block_change(action.x, action.y, action.z, Block::Air as u8, base) {
            Ok(_) => {
                // Per-mutation persistence writes the whole active range
                // rather than a single record: `BlockChangeStore` doesn't
                // hand back the index a change landed at, and guessing
                // wrong would corrupt an unrelated record.
                if !self.config.sync_blocks_on_interval {
                    self.persist_all();
                }

                if let Some((material, _)) = tool {
                    if roll_tool_break(material, &mut self.rng, self.rng_fallback) {
                        self.break_held_tool(slot);
                    }
                }
                if let Some(drop) = roll_drop(base_block, tool, &mut self.rng, self.rng_fallback) {
                    self.give_item(slot, drop, 1);
                }

                crate::fluid::flow_from(&mut self.generator, &mut self.changes, action.x, action.y, action.z);

                let update = play::BlockUpdate { x: action.x, y: action.y, z: action.z, block_state_id: i32::from(Block::Air as u8) };
                self.broadcast_to_players(ids::play::BLOCK_UPDATE, &update);

                if let Some(player) = self.players.get(slot).and_then(Option::as_ref) {
                    info!(player = %player.name, x = action.x, y = action.y, z = action.z, "block broken");
                }
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "block-change log rejected mutation");
                if matches!(e, BlockChangeError::LogFull) {
                    let revert = play::BlockUpdate { x: action.x, y: action.y, z: action.z, block_state_id: i32::from(base) };
                    self.broadcast_to_players(ids::play::BLOCK_UPDATE, &revert);
                    let chat = play::SystemChat { message: "Block changes limit exceeded, this change was not saved.".into(), is_action_bar: false };
                    let _ = send_packet(&mut self.connections[index].send_buf, ids::play::SYSTEM_CHAT, &chat);
                }
                Ok(())
            }
        }
    }

    fn break_held_tool(&mut self, slot: usize) {
        let Some(player) = self.players[slot].as_mut() else { return };
        let hotbar = usize::from(player.hotbar_index);
        if let Some(stack) = player.inventory.get_mut(hotbar) {
            *stack = ItemStack::default();
        }
    }

    fn give_item(&mut self, slot: usize, item: Item, count: u8) {
        let Some(player) = self.players[slot].as_mut() else { return };
        if let Some(target) = player.inventory.iter_mut().find(|s| s.count == 0) {
            *target = ItemStack { item_id: item.to_u16(), count };
        }
    }

    fn broadcast_to_players(&mut self, id: i32, packet: &impl WriteTo) {
        for index in 0..self.connections.len() {
            if self.connections[index].player_slot.is_some() {
                let _ = send_packet(&mut self.connections[index].send_buf, id, packet);
            }
        }
    }

    fn maybe_tick(&mut self) {
        let elapsed = self.last_tick.elapsed();
        if elapsed < self.config.tick_interval {
            return;
        }
        self.last_tick = Instant::now();
        self.world_time = tick::advance_world_time(self.world_time, elapsed.as_micros() as u64);

        for slot in 0..self.players.len() {
            let held = self.players[slot].as_ref().and_then(PlayerData::held_item);
            if let Some(player) = self.players[slot].as_mut() {
                tick::tick_player(player, held);
            }
        }
        self.apply_environmental_damage();

        let nearest_player = self
            .players
            .iter()
            .flatten()
            .next()
            .map(|p| (i32::from(p.x), i32::from(p.y), i32::from(p.z)));
        let events = tick::tick_mobs(&mut self.mobs, nearest_player, self.world_time, &mut self.rng, self.rng_fallback);
        self.broadcast_mob_events(&events);

        if self.last_persist.elapsed() >= self.config.disk_sync_interval {
            self.last_persist = Instant::now();
            self.persist_all();
        }
    }

    /// Lava and cactus tick damage: each player's feet block is checked
    /// once a tick against the live world, including any block-change
    /// override, rather than only the procedural base.
    fn apply_environmental_damage(&mut self) {
        for slot in 0..self.players.len() {
            let Some((x, y, z)) = self.players[slot].as_ref().map(|p| (i32::from(p.x), i32::from(p.y), i32::from(p.z))) else { continue };
            let damage = self.environmental_damage_at(x, y, z);
            if damage <= 0.0 {
                continue;
            }
            if let Some(player) = self.players[slot].as_mut() {
                player.take_damage(damage);
            }
            if let Some(index) = self.connections.iter().position(|c| c.player_slot == Some(slot)) {
                let _ = self.send_health_update(index, slot);
            }
        }
    }

    fn environmental_damage_at(&mut self, x: i32, y: i32, z: i32) -> f32 {
        let block = self.changes.get_block_change(x, y, z).and_then(Block::from_u8).unwrap_or_else(|| self.generator.block_at(x, y, z));
        if block.is_lava() {
            4.0
        } else if matches!(block, Block::Cactus | Block::CactusFlower) {
            1.0
        } else {
            0.0
        }
    }

    /// Broadcasts every mob AI outcome from one tick: movement as a
    /// teleport (simplest correct update given no per-tick delta tracking
    /// on the mob side), an attack as damage against the nearest online
    /// player, burn/despawn as an entity event followed by removal.
    fn broadcast_mob_events(&mut self, events: &[tick::MobTickEvent]) {
        for event in events {
            let Some(mob) = self.mobs.get(event.slot).copied() else { continue };
            let entity_id = i32::try_from(MOB_ENTITY_ID_BASE + event.slot as u32).unwrap_or(i32::MAX);

            match event.outcome {
                mob::AiOutcome::Moved { .. } => {
                    let packet = play::TeleportEntity {
                        entity_id,
                        x: f64::from(mob.x),
                        y: f64::from(mob.y),
                        z: f64::from(mob.z),
                        velocity_x: 0.0,
                        velocity_y: 0.0,
                        velocity_z: 0.0,
                        yaw: 0.0,
                        pitch: 0.0,
                        on_ground: true,
                    };
                    self.broadcast_to_players(ids::play::TELEPORT_ENTITY, &packet);
                }
                mob::AiOutcome::AttackedPlayer => {
                    let Some(slot) = self.players.iter().position(Option::is_some) else { continue };
                    if let Some(player) = self.players[slot].as_mut() {
                        player.take_damage(2.0);
                    }
                    let Some(index) = self.connections.iter().position(|c| c.player_slot == Some(slot)) else { continue };
                    let player_entity_id = self.connections[index].entity_id as i32;
                    let damage_packet = play::DamageEvent {
                        entity_id: player_entity_id,
                        source_type_id: 0,
                        source_cause_id: entity_id + 1,
                        source_direct_id: entity_id + 1,
                        source_position: None,
                    };
                    self.broadcast_to_players(ids::play::DAMAGE_EVENT, &damage_packet);
                    let _ = self.send_health_update(index, slot);
                }
                mob::AiOutcome::Burned => {
                    let packet = play::EntityEvent { entity_id, event_id: 2 };
                    self.broadcast_to_players(ids::play::ENTITY_EVENT, &packet);
                }
                mob::AiOutcome::Despawned => {
                    let packet = play::RemoveEntities { entity_ids: vec![entity_id] };
                    self.broadcast_to_players(ids::play::REMOVE_ENTITIES, &packet);
                }
                mob::AiOutcome::Idle => {}
            }
        }
    }

    fn persist_all(&mut self) {
        let records: Vec<PlayerRecord> = self
            .players
            .iter()
            .enumerate()
            .map(|(i, slot)| match slot {
                Some(player) => PlayerRecord::from_player(player),
                None => self.returning_records.get(i).copied().unwrap_or_default(),
            })
            .collect();

        if let Err(e) = self.world_file.save_all(&self.changes, &records) {
            warn!(error = %e, "periodic world save failed");
        }
        if let Err(e) = self.meta.save(&self.meta_path) {
            warn!(error = %e, "periodic meta save failed");
        }
    }
}

/// Populates the table with a starting handful of mobs near spawn so
/// there's something to fight and something to trade with on a fresh
/// world. A returning world's mobs aren't persisted yet (`MobTable` has no
/// disk form), so this runs unconditionally rather than only on first
/// creation.
fn initial_mobs(spawn: (i16, u8, i16)) -> MobTable {
    let (x, y, z) = spawn;
    let mut mobs = MobTable::new();
    mobs.spawn(MobType::Sheep, x.saturating_add(3), y, z, 8);
    if let Some(slot) = mobs.spawn(MobType::Villager, x.saturating_sub(3), y, z, 20) {
        if let Some(villager) = mobs.iter_mut().nth(slot) {
            villager.villager_job = mob::JOB_FARMER;
        }
    }
    mobs
}

/// Distinguishes a handler failure that should kill the connection (the
/// socket itself is unusable) from one that's just "ignore and keep
/// going" per the logical-error policy.
enum ServerSideError {
    Io,
    Logical,
}

#[cfg(test)]
mod tests {
    use super::try_take_frame;

    #[test]
    fn incomplete_frame_leaves_buffer_untouched() {
        let mut buf = vec![5u8]; // declares 5 payload bytes, none present yet
        assert_eq!(try_take_frame(&mut buf).unwrap(), None);
        assert_eq!(buf, vec![5u8]);
    }

    #[test]
    fn complete_frame_is_drained_from_the_buffer() {
        let mut buf = vec![3u8, 0xAA, 0xBB, 0xCC, 9u8]; // one 3-byte frame plus the start of another
        let frame = try_take_frame(&mut buf).unwrap().unwrap();
        assert_eq!(frame, vec![0xAA, 0xBB, 0xCC]);
        assert_eq!(buf, vec![9u8]);
    }

    #[test]
    fn oversize_length_is_rejected() {
        let mut buf = vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]; // i32::MAX-ish varint
        assert!(try_take_frame(&mut buf).is_err());
    }
}
