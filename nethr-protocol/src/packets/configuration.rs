//! Configuration phase: known-pack negotiation, the opaque registry/tags
//! blob, and the feature-disable packet.

use std::io::{Read, Write};

use crate::codec::{CodecError, ReadFrom, VarInt, WriteTo, read_bounded_string, write_string};

/// S→C and C→S, id 0x07. Both directions carry the same shape (namespace,
/// id, version triples); the server sends its one known pack and expects
/// the client to echo it back before the registry blob is streamed.
#[derive(Debug, Clone)]
pub struct KnownPack {
    pub namespace: String,
    pub id: String,
    pub version: String,
}

impl WriteTo for KnownPack {
    fn write(&self, writer: &mut impl Write) -> Result<(), CodecError> {
        write_string(writer, &self.namespace)?;
        write_string(writer, &self.id)?;
        write_string(writer, &self.version)
    }
}

impl ReadFrom for KnownPack {
    fn read(reader: &mut impl Read) -> Result<Self, CodecError> {
        Ok(Self {
            namespace: read_bounded_string(reader, 255)?,
            id: read_bounded_string(reader, 255)?,
            version: read_bounded_string(reader, 255)?,
        })
    }
}

/// The registry_data (0x07) and tags packets are streamed as a single
/// pre-captured byte blob — CORE only cares that it's present and how long
/// it is, never its contents, so it's carried as an opaque constant rather
/// than modeled packet-by-packet.
pub static REGISTRY_AND_TAGS_BLOB: &[u8] = include_bytes!("registry_blob.bin");

/// C→S, id 0x03: no payload, advances the connection's phase to play.
#[derive(Debug, Clone, Copy)]
pub struct FinishConfiguration;

impl ReadFrom for FinishConfiguration {
    fn read(_reader: &mut impl Read) -> Result<Self, CodecError> {
        Ok(Self)
    }
}

/// S→C, id 0x0C: disables client-side features (e.g. bundles, vaults) this
/// server's catalog never emits packets for.
#[derive(Debug, Clone)]
pub struct UpdateEnabledFeatures {
    pub feature_flags: Vec<String>,
}

impl WriteTo for UpdateEnabledFeatures {
    fn write(&self, writer: &mut impl Write) -> Result<(), CodecError> {
        VarInt(self.feature_flags.len() as i32).write(writer)?;
        for flag in &self.feature_flags {
            write_string(writer, flag)?;
        }
        Ok(())
    }
}
