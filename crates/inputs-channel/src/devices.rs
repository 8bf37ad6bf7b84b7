//! Device-interface abstraction (C1): a polymorphic façade over the three
//! input back-ends the channel can drive. Each back-end is represented by
//! the *absence* of a handle when not bound, not by a null implementation.

use inputs_core::KeyboardState;
use thiserror::Error;

/// Keyboard back-end: receives raw scancode bytes, reports LED state.
/// `&self` with interior mutability, matching the donor's
/// `PlatformInputEmulator` convention — a real back-end is a thin wrapper
/// over OS calls or an ioctl, not owned mutable state.
pub trait Keyboard: Send {
    fn push_scan(&self, byte: u8);
    fn get_leds(&self) -> u8;
}

/// Relative-mouse back-end, driven in `MouseMode::Server`.
pub trait Mouse: Send {
    fn motion(&self, dx: i32, dy: i32, dz: i32, buttons: u8);
    fn buttons(&self, buttons: u8);
}

/// Absolute-position tablet back-end, driven in `MouseMode::Client` when no
/// vdagent is available.
pub trait Tablet: Send {
    fn position(&self, x: i32, y: i32, buttons: u8);
    fn wheel(&self, dz: i32, buttons: u8);
    fn buttons(&self, buttons: u8);
    fn set_logical_size(&self, x_res: i32, y_res: i32);
}

/// Errors raised while attaching a device back-end to a [`DeviceSlots`].
/// A single-variant enum rather than a bare struct so the attach surface
/// can grow other rejection reasons without a breaking signature change.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttachError {
    #[error("a device of this type is already bound")]
    AlreadyBound,
}

/// Keyboard back-end plus the scancode tracker state owned alongside it,
/// created on attach and destroyed on detach (§4.1).
pub struct KeyboardHandle {
    pub backend: Box<dyn Keyboard>,
    pub state: KeyboardState,
}

/// The channel's at-most-one-of-each device handles.
#[derive(Default)]
pub struct DeviceSlots {
    pub keyboard: Option<KeyboardHandle>,
    pub mouse: Option<Box<dyn Mouse>>,
    pub tablet: Option<Box<dyn Tablet>>,
}

impl DeviceSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach_keyboard(&mut self, backend: Box<dyn Keyboard>) -> Result<(), AttachError> {
        if self.keyboard.is_some() {
            return Err(AttachError::AlreadyBound);
        }
        self.keyboard = Some(KeyboardHandle {
            backend,
            state: KeyboardState::new(),
        });
        Ok(())
    }

    pub fn attach_mouse(&mut self, backend: Box<dyn Mouse>) -> Result<(), AttachError> {
        if self.mouse.is_some() {
            return Err(AttachError::AlreadyBound);
        }
        self.mouse = Some(backend);
        Ok(())
    }

    /// Idempotent: re-attaching after a detach succeeds.
    pub fn attach_tablet(&mut self, backend: Box<dyn Tablet>) -> Result<(), AttachError> {
        if self.tablet.is_some() {
            return Err(AttachError::AlreadyBound);
        }
        self.tablet = Some(backend);
        Ok(())
    }

    pub fn detach_keyboard(&mut self) {
        self.keyboard = None;
    }

    pub fn detach_mouse(&mut self) {
        self.mouse = None;
    }

    pub fn detach_tablet(&mut self) {
        self.tablet = None;
    }
}
