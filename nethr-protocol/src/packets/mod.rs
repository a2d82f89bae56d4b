//! The packet catalog, grouped by phase the way the teacher lays its
//! `packets/` tree out (one module per phase, `game/` for play).

pub mod ids;

pub mod configuration;
pub mod handshake;
pub mod login;
pub mod play;
pub mod status;
