//! `ChannelClient`: one per connected viewer. Owns the message dispatcher
//! (C3), drives the mouse-mode router (C4) through the shared `Channel`'s
//! device slots, runs the motion-ack flow controller (C5), reconciles
//! keyboard LEDs (C6), and carries this client's side of migration (C7).

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

use inputs_core::domain::mouse::AgentButtonMask;
use inputs_core::protocol::codec::decode_migrate_data;
use inputs_core::protocol::messages::{
    ACK_BUNCH, INPUTS_MIGRATE_MAGIC, INPUTS_MIGRATE_VERSION, SCANCODE_CAPS_LOCK, SCANCODE_NUM_LOCK,
    SCANCODE_SCROLL_LOCK,
};
use inputs_core::{agent_mask, local_from_client, ClientMessage, MouseMode, ServerMessage};
use uuid::Uuid;

use crate::channel::Channel;
use crate::collaborators::{
    AgentMouseState, ConnectContext, MainChannelNotifier, ServerHooks, SocketConfigurer,
};
use crate::error::{AssertionViolation, ChannelError, TransientBackendError};
use crate::modifiers::modifiers_diff;

pub type ClientId = Uuid;

/// SPICE mouse button codes carried in a `MOUSE_PRESS` message's `button`
/// field, distinguishing which button this particular press event is for.
pub const BUTTON_LEFT: u8 = 1;
pub const BUTTON_MIDDLE: u8 = 2;
pub const BUTTON_RIGHT: u8 = 3;
pub const BUTTON_WHEEL_UP: u8 = 4;
pub const BUTTON_WHEEL_DOWN: u8 = 5;

fn is_lock_key(code: u32) -> bool {
    code == SCANCODE_SCROLL_LOCK as u32
        || code == SCANCODE_NUM_LOCK as u32
        || code == SCANCODE_CAPS_LOCK as u32
}

fn wheel_agent_bits(dz: i32) -> u8 {
    match dz {
        -1 => AgentButtonMask::UP_MASK,
        1 => AgentButtonMask::DOWN_MASK,
        _ => 0,
    }
}

fn current_leds(channel: &Rc<RefCell<Channel>>) -> u8 {
    channel
        .borrow()
        .devices
        .keyboard
        .as_ref()
        .map(|kb| kb.backend.get_leds())
        .unwrap_or(0)
}

/// One connected viewer's session state over the shared [`Channel`].
pub struct ChannelClient {
    pub id: ClientId,
    channel: Rc<RefCell<Channel>>,
    hooks: Arc<dyn ServerHooks>,
    notifier: Arc<dyn MainChannelNotifier>,
    motion_count: u16,
    pipe: VecDeque<ServerMessage>,
}

impl ChannelClient {
    /// Enqueues `INPUTS_INIT` carrying the current LED byte as the first
    /// pipe item, per §4.6.
    pub fn new(
        id: ClientId,
        channel: Rc<RefCell<Channel>>,
        hooks: Arc<dyn ServerHooks>,
        notifier: Arc<dyn MainChannelNotifier>,
    ) -> Self {
        let keyboard_modifiers = current_leds(&channel);
        let mut client = Self {
            id,
            channel,
            hooks,
            notifier,
            motion_count: 0,
            pipe: VecDeque::new(),
        };
        client
            .pipe
            .push_back(ServerMessage::InputsInit { keyboard_modifiers });
        client
    }

    /// Full connect-time setup (§7, SPEC_FULL §9.6): configures the
    /// newly-accepted socket and, if that succeeds, constructs the client
    /// and pushes an `InsecureTransportWarning` notification when the
    /// connection is plain TCP and not a migration target.
    ///
    /// A [`TransientBackendError`] from `configurer` rejects the client
    /// outright — no [`ChannelClient`] is constructed.
    pub fn connect(
        id: ClientId,
        channel: Rc<RefCell<Channel>>,
        hooks: Arc<dyn ServerHooks>,
        notifier: Arc<dyn MainChannelNotifier>,
        configurer: &dyn SocketConfigurer,
        ctx: ConnectContext,
    ) -> Result<Self, TransientBackendError> {
        configurer.configure()?;
        let client = Self::new(id, channel, hooks, notifier);
        if ctx.needs_insecure_transport_warning() {
            client
                .notifier
                .push_notify("client connected over an insecure (non-TLS) transport");
        }
        Ok(client)
    }

    pub fn motion_count(&self) -> u16 {
        self.motion_count
    }

    pub fn drain_pipe(&mut self) -> Vec<ServerMessage> {
        self.pipe.drain(..).collect()
    }

    /// Parses and applies one client→server message (§4.3).
    pub fn dispatch(&mut self, message: ClientMessage) -> Result<(), ChannelError> {
        match message {
            ClientMessage::KeyDown { code } => {
                // Intentional fall-through: KEY_DOWN arms the lock-key timer
                // then runs the exact same byte-emission logic as KEY_UP.
                if is_lock_key(code) {
                    self.channel.borrow().led.arm();
                }
                self.emit_code_bytes(code);
            }
            ClientMessage::KeyUp { code } => self.emit_code_bytes(code),
            ClientMessage::KeyScancode(bytes) => self.feed_scancode_bytes(&bytes),
            ClientMessage::MouseMotion { dx, dy, buttons } => {
                self.bump_motion_and_maybe_ack();
                self.route_motion(dx, dy, buttons);
            }
            ClientMessage::MousePosition {
                x,
                y,
                buttons,
                display_id,
            } => {
                self.bump_motion_and_maybe_ack();
                self.route_position(x, y, buttons, display_id);
            }
            ClientMessage::MousePress { button, buttons } => self.route_press(button, buttons),
            ClientMessage::MouseRelease { buttons } => self.route_release(buttons),
            ClientMessage::KeyModifiers { modifiers } => self.reconcile_modifiers(modifiers),
            ClientMessage::Disconnecting => {}
        }
        Ok(())
    }

    // ── C2 plumbing ──────────────────────────────────────────────────────

    /// KEY_UP's payload effect, also run for KEY_DOWN: emits up to 4 bytes
    /// `code & 0xFF`, `(code >> 8) & 0xFF`, ..., stopping at the first zero
    /// byte (§4.3).
    fn emit_code_bytes(&mut self, code: u32) {
        let mut bytes = Vec::with_capacity(4);
        for shift in [0, 8, 16, 24] {
            let byte = ((code >> shift) & 0xFF) as u8;
            if byte == 0 {
                break;
            }
            bytes.push(byte);
        }
        self.feed_scancode_bytes(&bytes);
    }

    fn feed_scancode_bytes(&mut self, bytes: &[u8]) {
        let mut channel = self.channel.borrow_mut();
        let Some(kb) = channel.devices.keyboard.as_mut() else {
            return; // no keyboard handle: silent drop (§3 invariant)
        };
        let leds_before = kb.backend.get_leds();
        let backend = &kb.backend;
        let state = &mut kb.state;
        for &byte in bytes {
            state.handle_byte(byte, |b| backend.push_scan(b));
        }
        let leds_after = kb.backend.get_leds();
        drop(channel);
        if leds_before != leds_after {
            self.push_current_leds();
        }
    }

    /// Synthetic release on disconnect (§4.2): releases every scancode
    /// position still held down.
    pub fn on_disconnect(&mut self) {
        let mut channel = self.channel.borrow_mut();
        if let Some(kb) = channel.devices.keyboard.as_mut() {
            let backend = &kb.backend;
            let state = &mut kb.state;
            state.release_all(|b| backend.push_scan(b));
        }
    }

    // ── C5: motion-ack flow control ──────────────────────────────────────

    fn bump_motion_and_maybe_ack(&mut self) {
        self.motion_count = self.motion_count.wrapping_add(1);
        if self.motion_count % ACK_BUNCH == 0 {
            if !self.channel.borrow().src_during_migrate {
                self.pipe.push_back(ServerMessage::MouseMotionAck);
            }
            self.motion_count = 0;
        }
    }

    // ── C4: mouse-mode router ────────────────────────────────────────────

    fn route_motion(&mut self, dx: i32, dy: i32, buttons: u8) {
        if self.hooks.mouse_mode() != MouseMode::Server {
            return;
        }
        let channel = self.channel.borrow();
        if let Some(mouse) = channel.devices.mouse.as_ref() {
            mouse.motion(dx, dy, 0, local_from_client(buttons));
        }
    }

    fn route_position(&mut self, x: i32, y: i32, buttons: u8, display_id: u32) {
        if self.hooks.mouse_mode() != MouseMode::Client {
            return; // §4.4: mode != CLIENT -> drop
        }
        if self.hooks.agent_mouse_enabled() && self.hooks.has_vdagent() {
            let state = AgentMouseState {
                x,
                y,
                buttons: agent_mask(buttons),
                display_id,
            };
            self.channel.borrow_mut().agent_mouse_state = Some(state);
            self.hooks.handle_agent_mouse_event(state);
            return;
        }
        let channel = self.channel.borrow();
        if let Some(tablet) = channel.devices.tablet.as_ref() {
            tablet.position(x, y, local_from_client(buttons));
            return;
        }
        drop(channel);
        let violation = AssertionViolation(format!(
            "client {}: POSITION routed in CLIENT mode with neither agent nor tablet available",
            self.id
        ));
        tracing::error!(%violation);
    }

    fn route_press(&mut self, button: u8, buttons: u8) {
        let dz = match button {
            BUTTON_WHEEL_UP => -1,
            BUTTON_WHEEL_DOWN => 1,
            _ => 0,
        };
        match self.hooks.mouse_mode() {
            MouseMode::Client => {
                if self.hooks.agent_mouse_enabled() && self.hooks.has_vdagent() {
                    self.post_agent_buttons(agent_mask(buttons) | wheel_agent_bits(dz));
                } else {
                    let channel = self.channel.borrow();
                    if let Some(tablet) = channel.devices.tablet.as_ref() {
                        tablet.wheel(dz, local_from_client(buttons));
                    }
                }
            }
            MouseMode::Server => {
                let channel = self.channel.borrow();
                if let Some(mouse) = channel.devices.mouse.as_ref() {
                    mouse.motion(0, 0, dz, local_from_client(buttons));
                }
            }
        }
    }

    fn route_release(&mut self, buttons: u8) {
        match self.hooks.mouse_mode() {
            MouseMode::Client => {
                if self.hooks.agent_mouse_enabled() && self.hooks.has_vdagent() {
                    self.post_agent_buttons(agent_mask(buttons));
                } else {
                    let channel = self.channel.borrow();
                    if let Some(tablet) = channel.devices.tablet.as_ref() {
                        tablet.buttons(local_from_client(buttons));
                    }
                }
            }
            MouseMode::Server => {
                let channel = self.channel.borrow();
                if let Some(mouse) = channel.devices.mouse.as_ref() {
                    mouse.buttons(local_from_client(buttons));
                }
            }
        }
    }

    fn post_agent_buttons(&mut self, buttons: u8) {
        let mut channel = self.channel.borrow_mut();
        let (x, y, display_id) = channel
            .agent_mouse_state
            .map(|s| (s.x, s.y, s.display_id))
            .unwrap_or_default();
        let state = AgentMouseState { x, y, buttons, display_id };
        channel.agent_mouse_state = Some(state);
        drop(channel);
        self.hooks.handle_agent_mouse_event(state);
    }

    // ── C6: LED/modifier reconciliation ──────────────────────────────────

    fn reconcile_modifiers(&mut self, requested: u8) {
        let current = current_leds(&self.channel);
        for (press, release) in modifiers_diff(requested, current) {
            self.feed_scancode_bytes(&[press, release]);
        }
        self.channel.borrow().led.arm();
    }

    fn push_current_leds(&mut self) {
        let modifiers = current_leds(&self.channel);
        self.pipe.push_back(ServerMessage::KeyModifiers { modifiers });
    }

    /// Called by the embedding event loop when the LED timer fires;
    /// suppressed if this client is the migration source (§4.6).
    pub fn on_led_timer_fire(&mut self) {
        if self.channel.borrow().src_during_migrate {
            return;
        }
        self.push_current_leds();
    }

    // ── C7: migration ─────────────────────────────────────────────────────

    /// Source side: a migrate-flush-mark arrived. Enqueues `MIGRATE_DATA`
    /// and marks this channel as the migration source until it is sent.
    pub fn on_flush_mark(&mut self) {
        self.channel.borrow_mut().src_during_migrate = true;
        self.pipe.push_back(ServerMessage::MigrateData {
            magic: INPUTS_MIGRATE_MAGIC,
            version: INPUTS_MIGRATE_VERSION,
            motion_count: self.motion_count,
        });
    }

    /// Source side: called once the framework has actually written
    /// `MIGRATE_DATA` to the wire.
    pub fn on_migrate_data_sent(&mut self) {
        self.channel.borrow_mut().src_during_migrate = false;
    }

    /// Destination side: validates and applies a received migration
    /// payload, pushes current LEDs, then replays the acks the source
    /// would have sent had it not been migrating (§4.7).
    pub fn receive_migrate_data(&mut self, payload: &[u8]) -> Result<(), ChannelError> {
        let mut motion_count = decode_migrate_data(payload)?;
        self.push_current_leds();
        while motion_count >= ACK_BUNCH {
            self.pipe.push_back(ServerMessage::MouseMotionAck);
            motion_count -= ACK_BUNCH;
        }
        self.motion_count = motion_count;
        Ok(())
    }
}
