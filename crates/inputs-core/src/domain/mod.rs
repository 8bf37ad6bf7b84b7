//! Domain entities for the inputs channel.
//!
//! Pure business logic with no infrastructure dependencies: no sockets, no
//! timers, no OS input APIs. Code in `inputs-channel` depends on this module;
//! this module never depends on it.

/// Per-client XT scancode-set-1 tracker (C2).
pub mod keyboard;

/// Mouse button-mask conversions and the server-global mouse mode (part of C4).
pub mod mouse;

/// Bounded per-client cursor cache: hash-bucket lookup plus an intrusive LRU (C8).
pub mod cursor_cache;
