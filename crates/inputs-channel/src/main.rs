//! Inputs channel demo entry point.
//!
//! This is not a full SPICE server: it wires up structured logging and a
//! single [`Channel`]/[`ChannelClient`] pair against stub device back-ends so
//! the crate can be exercised standalone. In a full server this module's
//! role is played by the framework's per-client connection handler, which
//! owns the socket read loop and calls into [`ChannelClient::dispatch`] as
//! messages arrive.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use inputs_channel::channel::{Channel, ChannelConfig};
use inputs_channel::client::ChannelClient;
use inputs_channel::collaborators::{AgentMouseState, MainChannelNotifier, ServerHooks};
use inputs_channel::timer::TokioTimerDriver;
use inputs_core::{ClientMessage, MouseMode};

/// Minimal `ServerHooks` for the demo: always `SERVER` mode, no vdagent.
struct StaticServerHooks;

impl ServerHooks for StaticServerHooks {
    fn mouse_mode(&self) -> MouseMode {
        MouseMode::Server
    }

    fn agent_mouse_enabled(&self) -> bool {
        false
    }

    fn has_vdagent(&self) -> bool {
        false
    }

    fn handle_agent_mouse_event(&self, _state: AgentMouseState) {}
}

struct LoggingMainChannelNotifier;

impl MainChannelNotifier for LoggingMainChannelNotifier {
    fn push_notify(&self, message: &str) {
        info!(%message, "main channel notify");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("inputs channel demo starting");

    let channel = Rc::new(RefCell::new(Channel::new(
        ChannelConfig::default(),
        Box::new(TokioTimerDriver::new()),
    )));

    let mut client = ChannelClient::new(
        uuid::Uuid::new_v4(),
        Rc::clone(&channel),
        Arc::new(StaticServerHooks) as Arc<dyn ServerHooks>,
        Arc::new(LoggingMainChannelNotifier) as Arc<dyn MainChannelNotifier>,
    );

    for item in client.drain_pipe() {
        info!(?item, "outbound pipe item");
    }

    client.dispatch(ClientMessage::KeyScancode(vec![0x1E, 0x9E]))?;
    info!("dispatched a scancode stream with no keyboard bound; dropped silently");

    info!("inputs channel demo stopped");
    Ok(())
}
