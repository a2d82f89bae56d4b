//! The game server proper: protocol phase handling, deterministic world
//! generation, player/mob simulation, and persistence. `nethr-protocol`
//! owns the wire format; this crate owns what happens once a packet has
//! been decoded.

pub mod blockchange;
pub mod chunk;
pub mod config;
pub mod error;
pub mod fluid;
pub mod mob;
pub mod persistence;
pub mod player;
pub mod server;
pub mod spawn;
pub mod tick;
pub mod worldgen;

pub use config::Config;
pub use error::StartupError;
pub use server::Server;
