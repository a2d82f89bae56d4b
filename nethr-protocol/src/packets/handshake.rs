//! Handshake packet — the only packet ever read in phase `None`.

use std::io::Read;

use crate::codec::{CodecError, ReadFrom, VarInt, read_bounded_string};

/// What the client says it wants to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Server list ping follows.
    Status,
    /// Login follows.
    Login,
}

/// C→S, phase `None`, id 0x00.
#[derive(Debug, Clone)]
pub struct Handshake {
    /// The client's claimed protocol version; not validated against ours —
    /// a mismatched client still gets to try, and fails later if its packet
    /// shapes don't line up.
    pub protocol_version: i32,
    /// The address the client connected to, capped at 255 bytes.
    pub server_address: String,
    pub server_port: u16,
    pub intent: Intent,
}

impl ReadFrom for Handshake {
    fn read(reader: &mut impl Read) -> Result<Self, CodecError> {
        let VarInt(protocol_version) = VarInt::read(reader)?;
        let server_address = read_bounded_string(reader, 255)?;
        let server_port = u16::read(reader)?;
        let VarInt(intent_raw) = VarInt::read(reader)?;
        let intent = if intent_raw == 2 { Intent::Login } else { Intent::Status };
        Ok(Self {
            protocol_version,
            server_address,
            server_port,
            intent,
        })
    }
}
