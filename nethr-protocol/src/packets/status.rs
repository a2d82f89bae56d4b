//! Server list ping packets.

use std::io::Write;

use crate::codec::{CodecError, WriteTo, write_string};

/// S→C, phase `Status`, id 0x00. The client renders `description.text` as
/// the server list MOTD line.
#[derive(Debug, Clone)]
pub struct StatusResponse {
    pub motd: String,
}

impl WriteTo for StatusResponse {
    fn write(&self, writer: &mut impl Write) -> Result<(), CodecError> {
        let json = format!(
            "{{\"version\":{{\"name\":\"1.21.x\",\"protocol\":774}},\"description\":{{\"text\":\"{}\"}}}}",
            self.motd.replace('"', "\\\"")
        );
        write_string(writer, &json)
    }
}

/// Echoed verbatim both directions, id 0x01.
#[derive(Debug, Clone, Copy)]
pub struct PingPong(pub i64);

impl WriteTo for PingPong {
    fn write(&self, writer: &mut impl Write) -> Result<(), CodecError> {
        self.0.write(writer)
    }
}
