//! Mouse button-mask conversions and the server-global mouse mode.
//!
//! These are pure bit-level contracts (§4.4 of the governing spec): no
//! collaborator, no I/O, just the two fixed conversions between the wire
//! button mask a client sends and the two back-end encodings (native device
//! vs. vdagent).

/// SPICE wire button-mask bits, as sent by the client on every mouse message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonMask(pub u8);

impl ButtonMask {
    pub const LEFT: u8 = 0x01;
    pub const MIDDLE: u8 = 0x02;
    pub const RIGHT: u8 = 0x04;
    pub const UP: u8 = 0x08;
    pub const DOWN: u8 = 0x10;
}

/// Native device back-end button-mask bits (keyboard/mouse/tablet ioctl shape).
pub struct LocalButtonMask;
impl LocalButtonMask {
    pub const LEFT: u8 = 0x01;
    pub const MIDDLE: u8 = 0x02;
    pub const RIGHT: u8 = 0x04;
}

/// vdagent wire button-mask bits.
pub struct AgentButtonMask;
impl AgentButtonMask {
    pub const LBUTTON: u8 = 0x01;
    pub const MBUTTON: u8 = 0x02;
    pub const RBUTTON: u8 = 0x04;
    pub const UP_MASK: u8 = 0x08;
    pub const DOWN_MASK: u8 = 0x10;
}

/// Converts a client wire mask into the native device back-end encoding.
///
/// `local(state) = (state & LEFT) | ((state & MIDDLE) << 1) | ((state & RIGHT) >> 1)`
pub fn local_from_client(state: u8) -> u8 {
    (state & ButtonMask::LEFT)
        | ((state & ButtonMask::MIDDLE) << 1)
        | ((state & ButtonMask::RIGHT) >> 1)
}

/// Converts a client wire mask into the vdagent encoding. Any bits outside
/// LEFT/MIDDLE/RIGHT are ignored — this is a projection, not a bit copy.
pub fn agent_mask(state: u8) -> u8 {
    let mut mask = 0u8;
    if state & ButtonMask::LEFT != 0 {
        mask |= AgentButtonMask::LBUTTON;
    }
    if state & ButtonMask::MIDDLE != 0 {
        mask |= AgentButtonMask::MBUTTON;
    }
    if state & ButtonMask::RIGHT != 0 {
        mask |= AgentButtonMask::RBUTTON;
    }
    mask
}

/// Server-global pointer routing mode (§4.4). Obtained from the server
/// collaborator on every pointer message, never cached on the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseMode {
    /// The guest OS moves the cursor; the client only forwards relative deltas.
    Server,
    /// The client owns cursor position; routed to the agent or the tablet.
    Client,
}
