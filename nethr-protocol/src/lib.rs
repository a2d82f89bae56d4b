//! Wire codec, connection phase state machine, and the packet catalog for
//! protocol revision 774 ("1.21.x").

#![warn(missing_docs)]

pub mod codec;
pub mod phase;

pub mod packets;

pub use codec::{CodecError, ReadFrom, VarInt, VarLong, WriteTo};
pub use phase::Phase;
