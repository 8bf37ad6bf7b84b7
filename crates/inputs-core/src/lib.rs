//! # inputs-core
//!
//! Wire protocol and the pure, collaborator-free domain logic of the SPICE
//! inputs channel: the client→server/server→client message shapes and their
//! little-endian codec, keyboard scancode tracking, mouse button-mask
//! conversions, and the bounded per-client cursor cache.
//!
//! Nothing in this crate touches a socket, a timer, or an OS input API —
//! those are collaborators the `inputs-channel` crate wires in at the edges.

pub mod domain;
pub mod protocol;

pub use domain::cursor_cache::{CursorCache, CursorItem, CursorPayload};
pub use domain::keyboard::KeyboardState;
pub use domain::mouse::{agent_mask, local_from_client, ButtonMask, MouseMode};
pub use protocol::codec::{decode_client_message, encode_server_message, ProtocolError};
pub use protocol::messages::{ClientMessage, ServerMessage};
