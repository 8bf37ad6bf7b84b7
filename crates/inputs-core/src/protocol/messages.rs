//! Client→server and server→client message shapes for the inputs channel.
//!
//! All integers on the wire are little-endian; see [`super::codec`] for the
//! byte layout of each variant.

/// Capability bit advertised by this channel (§6).
pub const INPUTS_CAP_KEY_SCANCODE: u32 = 1 << 0;

/// Migration flags advertised on channel registration (§6).
pub const MIGRATE_NEED_FLUSH: u32 = 1 << 0;
pub const MIGRATE_NEED_DATA_TRANSFER: u32 = 1 << 1;

/// Fixed-size migration payload header magic/version (§4.7).
pub const INPUTS_MIGRATE_MAGIC: u32 = 0x5350_4349; // "SPCI"
pub const INPUTS_MIGRATE_VERSION: u32 = 1;

/// Number of motion/position messages between flow-control acks (§4.5).
pub const ACK_BUNCH: u16 = 64;

/// Scancodes that arm the LED-reconcile timer on KEY_DOWN (§4.3, §4.6).
pub const SCANCODE_SCROLL_LOCK: u32 = 0x46;
pub const SCANCODE_NUM_LOCK: u32 = 0x45;
pub const SCANCODE_CAPS_LOCK: u32 = 0x3A;

/// Client→server message type codes, matching the SPICE_MSGC_INPUTS_* range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ClientMessageType {
    KeyDown = 101,
    KeyUp = 102,
    KeyModifiers = 103,
    MouseMotion = 111,
    MousePosition = 112,
    MousePress = 113,
    MouseRelease = 114,
    KeyScancode = 115,
    Disconnecting = 116,
}

impl TryFrom<u16> for ClientMessageType {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, u16> {
        Ok(match value {
            101 => Self::KeyDown,
            102 => Self::KeyUp,
            103 => Self::KeyModifiers,
            111 => Self::MouseMotion,
            112 => Self::MousePosition,
            113 => Self::MousePress,
            114 => Self::MouseRelease,
            115 => Self::KeyScancode,
            116 => Self::Disconnecting,
            other => return Err(other),
        })
    }
}

/// A fully decoded client→server message (§4.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    KeyDown { code: u32 },
    KeyUp { code: u32 },
    KeyScancode(Vec<u8>),
    MouseMotion { dx: i32, dy: i32, buttons: u8 },
    MousePosition { x: i32, y: i32, buttons: u8, display_id: u32 },
    MousePress { button: u8, buttons: u8 },
    MouseRelease { buttons: u8 },
    KeyModifiers { modifiers: u8 },
    Disconnecting,
}

/// A server→client pipe item payload (§6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    InputsInit { keyboard_modifiers: u8 },
    KeyModifiers { modifiers: u8 },
    MouseMotionAck,
    MigrateData { magic: u32, version: u32, motion_count: u16 },
}
