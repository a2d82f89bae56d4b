//! Login phase packets. No authentication or encryption is performed —
//! the server trusts whatever identity the client presents.

use std::io::{Read, Write};

use uuid::Uuid;

use crate::codec::{CodecError, ReadFrom, VarInt, WriteTo, read_bounded_string, write_string};

/// C→S, id 0x00.
#[derive(Debug, Clone)]
pub struct LoginStart {
    /// Capped at 16 bytes, the vanilla username length limit.
    pub name: String,
    pub identity: Uuid,
}

impl ReadFrom for LoginStart {
    fn read(reader: &mut impl Read) -> Result<Self, CodecError> {
        let name = read_bounded_string(reader, 16)?;
        let mut identity_bytes = [0u8; 16];
        reader.read_exact(&mut identity_bytes)?;
        Ok(Self {
            name,
            identity: Uuid::from_bytes(identity_bytes),
        })
    }
}

/// S→C, id 0x02: identity, name, then zero properties.
#[derive(Debug, Clone)]
pub struct LoginSuccess {
    pub identity: Uuid,
    pub name: String,
}

impl WriteTo for LoginSuccess {
    fn write(&self, writer: &mut impl Write) -> Result<(), CodecError> {
        writer.write_all(self.identity.as_bytes())?;
        write_string(writer, &self.name)?;
        VarInt(0).write(writer)
    }
}

/// C→S, id 0x03: no payload, advances the connection's phase to
/// configuration.
#[derive(Debug, Clone, Copy)]
pub struct LoginAck;

impl ReadFrom for LoginAck {
    fn read(_reader: &mut impl Read) -> Result<Self, CodecError> {
        Ok(Self)
    }
}
