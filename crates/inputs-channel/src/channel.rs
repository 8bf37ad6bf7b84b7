//! `Channel`: the process-wide per-server-instance state described in the
//! data model — bound device handles, the cached agent mouse state, the
//! receive-buffer size, and the migration-source flag shared by every
//! `ChannelClient` (§3).

use crate::collaborators::AgentMouseState;
use crate::devices::DeviceSlots;
use crate::modifiers::LedReconciler;
use crate::timer::TimerDriver;

/// Minimum receive-buffer size before accounting for the agent-data window
/// (§3: "≥ 4 KiB + agent-window × max-agent-data-size").
pub const MIN_RECV_BUFFER_SIZE: usize = 4096;

/// Number of motion/position messages between flow-control acks (§4.5).
pub const ACK_BUNCH: u16 = inputs_core::protocol::messages::ACK_BUNCH;

/// Values an embedding process must supply to construct a [`Channel`].
/// Constructed in-process and never (de)serialized — §6 explicitly rules out
/// a config file for this component, but the values themselves are still a
/// named, defaulted struct rather than scattered literals.
#[derive(Debug, Clone, Copy)]
pub struct ChannelConfig {
    pub recv_buffer_size: usize,
    pub cursor_cache_byte_budget: i64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            recv_buffer_size: MIN_RECV_BUFFER_SIZE,
            cursor_cache_byte_budget: 1024 * 1024,
        }
    }
}

/// The channel's shared, per-server-instance state.
pub struct Channel {
    pub config: ChannelConfig,
    pub devices: DeviceSlots,
    pub agent_mouse_state: Option<AgentMouseState>,
    pub src_during_migrate: bool,
    pub led: LedReconciler,
}

impl Channel {
    pub fn new(config: ChannelConfig, timer_driver: Box<dyn TimerDriver>) -> Self {
        Self {
            config,
            devices: DeviceSlots::new(),
            agent_mouse_state: None,
            src_during_migrate: false,
            led: LedReconciler::new(timer_driver),
        }
    }
}
