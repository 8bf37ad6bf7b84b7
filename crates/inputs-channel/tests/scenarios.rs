//! End-to-end scenarios against the public `ChannelClient`/`Channel` API,
//! one per named scenario in the governing spec's worked examples (S1-S6).

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use inputs_channel::channel::{Channel, ChannelConfig};
use inputs_channel::client::ChannelClient;
use inputs_channel::collaborators::{MainChannelNotifier, ServerHooks};
use inputs_channel::devices::Keyboard;
use inputs_channel::mock::{MockKeyboard, MockMainChannelNotifier, MockMouse, MockServerHooks, MockTablet};
use inputs_channel::timer::TokioTimerDriver;
use inputs_core::{ClientMessage, MouseMode, ServerMessage};

/// Wraps a shared `MockKeyboard` so the test can both own the device slot
/// and keep observing pushed bytes after it has been boxed in.
struct SharedKeyboard(Arc<MockKeyboard>);
impl Keyboard for SharedKeyboard {
    fn push_scan(&self, byte: u8) {
        self.0.push_scan(byte);
    }
    fn get_leds(&self) -> u8 {
        self.0.get_leds()
    }
}

struct SharedMouse(Arc<MockMouse>);
impl inputs_channel::devices::Mouse for SharedMouse {
    fn motion(&self, dx: i32, dy: i32, dz: i32, buttons: u8) {
        self.0.motion(dx, dy, dz, buttons);
    }
    fn buttons(&self, buttons: u8) {
        self.0.buttons(buttons);
    }
}

struct SharedTablet(Arc<MockTablet>);
impl inputs_channel::devices::Tablet for SharedTablet {
    fn position(&self, x: i32, y: i32, buttons: u8) {
        self.0.position(x, y, buttons);
    }
    fn wheel(&self, dz: i32, buttons: u8) {
        self.0.wheel(dz, buttons);
    }
    fn buttons(&self, buttons: u8) {
        self.0.buttons(buttons);
    }
    fn set_logical_size(&self, x_res: i32, y_res: i32) {
        self.0.set_logical_size(x_res, y_res);
    }
}

fn harness() -> (ChannelClient, Rc<RefCell<Channel>>, Arc<MockServerHooks>) {
    let channel = Rc::new(RefCell::new(Channel::new(
        ChannelConfig::default(),
        Box::new(TokioTimerDriver::new()),
    )));
    let hooks = Arc::new(MockServerHooks::default());
    let notifier = Arc::new(MockMainChannelNotifier::default());
    let client = ChannelClient::new(
        uuid::Uuid::new_v4(),
        Rc::clone(&channel),
        hooks.clone() as Arc<dyn ServerHooks>,
        notifier as Arc<dyn MainChannelNotifier>,
    );
    (client, channel, hooks)
}

#[test]
fn s1_plain_scancode_stream_reaches_the_keyboard_in_order() {
    // Arrange
    let (mut client, channel, _hooks) = harness();
    let kb = Arc::new(MockKeyboard::default());
    channel
        .borrow_mut()
        .devices
        .attach_keyboard(Box::new(SharedKeyboard(Arc::clone(&kb))))
        .unwrap();
    client.drain_pipe();

    // Act: 'A' down then up
    client.dispatch(ClientMessage::KeyScancode(vec![0x1E, 0x9E])).unwrap();

    // Assert
    assert_eq!(kb.pushed_bytes(), vec![0x1E, 0x9E]);
}

#[test]
fn s2_extended_key_stream_preserves_the_0xe0_prefix() {
    let (mut client, channel, _hooks) = harness();
    let kb = Arc::new(MockKeyboard::default());
    channel
        .borrow_mut()
        .devices
        .attach_keyboard(Box::new(SharedKeyboard(Arc::clone(&kb))))
        .unwrap();

    // Right-ctrl down then up
    client
        .dispatch(ClientMessage::KeyScancode(vec![0xE0, 0x1D, 0xE0, 0x9D]))
        .unwrap();

    assert_eq!(kb.pushed_bytes(), vec![0xE0, 0x1D, 0xE0, 0x9D]);
}

#[test]
fn s3_sixty_four_motions_produce_exactly_one_ack() {
    // Arrange
    let (mut client, channel, hooks) = harness();
    *hooks.mouse_mode.lock().unwrap() = MouseMode::Server;
    let mouse = Arc::new(MockMouse::default());
    channel
        .borrow_mut()
        .devices
        .attach_mouse(Box::new(SharedMouse(Arc::clone(&mouse))))
        .unwrap();
    client.drain_pipe();

    // Act
    for _ in 0..64 {
        client
            .dispatch(ClientMessage::MouseMotion { dx: 1, dy: -1, buttons: 0 })
            .unwrap();
    }

    // Assert
    assert_eq!(client.drain_pipe(), vec![ServerMessage::MouseMotionAck]);
    assert_eq!(client.motion_count(), 0);
    assert_eq!(mouse.motions.lock().unwrap().len(), 64);
}

#[test]
fn s4_client_mode_position_routes_to_tablet_without_agent() {
    // Arrange
    let (mut client, channel, hooks) = harness();
    *hooks.mouse_mode.lock().unwrap() = MouseMode::Client;
    let tablet = Arc::new(MockTablet::default());
    channel
        .borrow_mut()
        .devices
        .attach_tablet(Box::new(SharedTablet(Arc::clone(&tablet))))
        .unwrap();

    // Act
    client
        .dispatch(ClientMessage::MousePosition {
            x: 640,
            y: 480,
            buttons: 0,
            display_id: 0,
        })
        .unwrap();

    // Assert
    assert_eq!(tablet.positions.lock().unwrap()[0], (640, 480, 0));
    assert!(hooks.agent_events.lock().unwrap().is_empty());
}

#[test]
fn s5_requesting_caps_lock_injects_press_release_and_acks_leds() {
    // Arrange
    let (mut client, channel, _hooks) = harness();
    let kb = Arc::new(MockKeyboard::default());
    channel
        .borrow_mut()
        .devices
        .attach_keyboard(Box::new(SharedKeyboard(Arc::clone(&kb))))
        .unwrap();
    client.drain_pipe();

    // Act: client asks for caps-lock on, LEDs currently all off
    client
        .dispatch(ClientMessage::KeyModifiers {
            modifiers: inputs_channel::modifiers::LED_CAPS,
        })
        .unwrap();

    // Assert: scroll/num unaffected, caps-lock press then release injected
    assert_eq!(kb.pushed_bytes(), vec![0x3A, 0xBA]);
}

#[test]
fn s6_migration_data_with_count_130_replays_two_acks_and_ends_at_2() {
    // Arrange: a MIGRATE_DATA payload as the source would emit it with
    // motion_count = 130 at the moment the flush-mark arrived.
    let payload = inputs_core::protocol::codec::encode_server_message(&ServerMessage::MigrateData {
        magic: inputs_core::protocol::messages::INPUTS_MIGRATE_MAGIC,
        version: inputs_core::protocol::messages::INPUTS_MIGRATE_VERSION,
        motion_count: 130,
    });

    let (mut dest, dest_channel, _hooks) = harness();
    dest_channel
        .borrow_mut()
        .devices
        .attach_keyboard(Box::new(SharedKeyboard(Arc::new(MockKeyboard::default()))))
        .unwrap();
    dest.drain_pipe();

    // Act
    dest.receive_migrate_data(&payload).unwrap();

    // Assert: KEY_MODIFIERS pushed first, then 130 / 64 = 2 replayed acks,
    // ending at the remainder motion_count = 2 (§4.7).
    let pipe = dest.drain_pipe();
    assert_eq!(
        pipe,
        vec![
            ServerMessage::KeyModifiers { modifiers: 0 },
            ServerMessage::MouseMotionAck,
            ServerMessage::MouseMotionAck,
        ]
    );
    assert_eq!(dest.motion_count(), 2);
}

#[test]
fn migration_source_suppresses_acks_until_migrate_data_is_sent() {
    // Arrange
    let (mut source, source_channel, hooks) = harness();
    *hooks.mouse_mode.lock().unwrap() = MouseMode::Server;
    let mouse = Arc::new(MockMouse::default());
    source_channel
        .borrow_mut()
        .devices
        .attach_mouse(Box::new(SharedMouse(Arc::clone(&mouse))))
        .unwrap();
    source.drain_pipe();

    // Act: flush-mark arrives, then a full bunch of motions follows before
    // MIGRATE_DATA is actually flushed to the wire
    source.on_flush_mark();
    source.drain_pipe();
    for _ in 0..64 {
        source
            .dispatch(ClientMessage::MouseMotion { dx: 0, dy: 0, buttons: 0 })
            .unwrap();
    }

    // Assert: the bunch boundary still resets motion_count, but no
    // MOUSE_MOTION_ACK is enqueued while acting as the migration source
    assert_eq!(source.motion_count(), 0);
    assert!(source.drain_pipe().is_empty());

    source.on_migrate_data_sent();
    assert!(!source_channel.borrow().src_during_migrate);
}
