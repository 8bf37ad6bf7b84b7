//! Inputs channel wire protocol: message shapes and their little-endian codec.

pub mod codec;
pub mod messages;

pub use codec::{decode_client_message, encode_server_message, ProtocolError};
pub use messages::{ClientMessage, ClientMessageType, ServerMessage};
