//! Error kinds the channel can raise (§7).
//!
//! Per-message errors are local to that message; the channel remains usable.
//! Only [`ChannelError`] tears the client down.

use inputs_core::ProtocolError;
use thiserror::Error;

/// Fatal, channel-closing errors: an oversize incoming message or a
/// malformed migration header.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChannelError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// `setsockopt(TCP_NODELAY)` failed with something other than
/// `ENOTSUP`/`ENOPROTOOPT`; the socket is rejected outright.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("failed to configure socket: {reason}")]
pub struct TransientBackendError {
    pub reason: String,
}

/// A routing invariant was violated (e.g. POSITION in CLIENT mode with
/// neither agent nor tablet available). Logged and aborts the handler;
/// callers may choose to escalate this to a fatal [`ChannelError`].
#[derive(Debug, Error, PartialEq, Eq)]
#[error("routing assertion violated: {0}")]
pub struct AssertionViolation(pub String);
