//! Test doubles for the device back-ends and server-side collaborators.
//! Kept behind `Mutex<Vec<_>>`/plain fields per the donor's
//! `RecordingTransmitter`/`RecordingCursorController` pattern in
//! `route_input.rs`, adapted to this crate's synchronous trait objects.

use std::sync::Mutex;

use inputs_core::MouseMode;

use crate::collaborators::{AgentMouseState, MainChannelNotifier, ServerHooks};
use crate::devices::{Keyboard, Mouse, Tablet};
use crate::error::TransientBackendError;

/// Records every byte pushed to it and reports a settable LED byte.
#[derive(Default)]
pub struct MockKeyboard {
    pub pushed: Mutex<Vec<u8>>,
    pub leds: Mutex<u8>,
}

impl Keyboard for MockKeyboard {
    fn push_scan(&self, byte: u8) {
        self.pushed.lock().unwrap().push(byte);
    }

    fn get_leds(&self) -> u8 {
        *self.leds.lock().unwrap()
    }
}

impl MockKeyboard {
    pub fn set_leds(&self, leds: u8) {
        *self.leds.lock().unwrap() = leds;
    }

    pub fn pushed_bytes(&self) -> Vec<u8> {
        self.pushed.lock().unwrap().clone()
    }
}

/// Records every relative-motion/button call.
#[derive(Default)]
pub struct MockMouse {
    pub motions: Mutex<Vec<(i32, i32, i32, u8)>>,
    pub button_calls: Mutex<Vec<u8>>,
}

impl Mouse for MockMouse {
    fn motion(&self, dx: i32, dy: i32, dz: i32, buttons: u8) {
        self.motions.lock().unwrap().push((dx, dy, dz, buttons));
    }

    fn buttons(&self, buttons: u8) {
        self.button_calls.lock().unwrap().push(buttons);
    }
}

/// Records every absolute-position/wheel/button/resize call.
#[derive(Default)]
pub struct MockTablet {
    pub positions: Mutex<Vec<(i32, i32, u8)>>,
    pub wheels: Mutex<Vec<(i32, u8)>>,
    pub button_calls: Mutex<Vec<u8>>,
    pub logical_sizes: Mutex<Vec<(i32, i32)>>,
}

impl Tablet for MockTablet {
    fn position(&self, x: i32, y: i32, buttons: u8) {
        self.positions.lock().unwrap().push((x, y, buttons));
    }

    fn wheel(&self, dz: i32, buttons: u8) {
        self.wheels.lock().unwrap().push((dz, buttons));
    }

    fn buttons(&self, buttons: u8) {
        self.button_calls.lock().unwrap().push(buttons);
    }

    fn set_logical_size(&self, x_res: i32, y_res: i32) {
        self.logical_sizes.lock().unwrap().push((x_res, y_res));
    }
}

/// Fixed-answer server hooks, with a recorder for agent mouse events.
pub struct MockServerHooks {
    pub mouse_mode: Mutex<MouseMode>,
    pub agent_mouse_enabled: Mutex<bool>,
    pub has_vdagent: Mutex<bool>,
    pub agent_events: Mutex<Vec<AgentMouseState>>,
}

impl Default for MockServerHooks {
    fn default() -> Self {
        Self {
            mouse_mode: Mutex::new(MouseMode::Server),
            agent_mouse_enabled: Mutex::new(false),
            has_vdagent: Mutex::new(false),
            agent_events: Mutex::new(Vec::new()),
        }
    }
}

impl ServerHooks for MockServerHooks {
    fn mouse_mode(&self) -> MouseMode {
        *self.mouse_mode.lock().unwrap()
    }

    fn agent_mouse_enabled(&self) -> bool {
        *self.agent_mouse_enabled.lock().unwrap()
    }

    fn has_vdagent(&self) -> bool {
        *self.has_vdagent.lock().unwrap()
    }

    fn handle_agent_mouse_event(&self, state: AgentMouseState) {
        self.agent_events.lock().unwrap().push(state);
    }
}

/// Records notify strings instead of pushing them to a real main channel.
#[derive(Default)]
pub struct MockMainChannelNotifier {
    pub notifications: Mutex<Vec<String>>,
}

impl MainChannelNotifier for MockMainChannelNotifier {
    fn push_notify(&self, message: &str) {
        self.notifications.lock().unwrap().push(message.to_string());
    }
}

/// Always-succeeds socket configurer; a second mock variant below injects a
/// failure for the `TransientBackendError` path.
#[derive(Default)]
pub struct MockSocketConfigurer {
    pub should_fail: bool,
}

impl crate::collaborators::SocketConfigurer for MockSocketConfigurer {
    fn configure(&self) -> Result<(), TransientBackendError> {
        if self.should_fail {
            return Err(TransientBackendError {
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}
