//! Narrow collaborator traits the channel consumes from the surrounding
//! server framework (§6). None of these are implemented here beyond mocks
//! (`crate::mock`) — production wiring is an external concern this crate
//! does not own. [`SocketConfigurer`] and [`ConnectContext`] are driven by
//! [`crate::client::ChannelClient::connect`].

use inputs_core::MouseMode;

use crate::error::TransientBackendError;

/// Cached agent mouse state posted to the vdagent on a routed POSITION
/// message (§3: "cached last-known agent mouse state").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentMouseState {
    pub x: i32,
    pub y: i32,
    pub buttons: u8,
    pub display_id: u32,
}

/// Server-wide hooks the mouse-mode router (C4) consults on every pointer
/// message. Mirrors `reds_get_mouse_mode`/`reds_get_agent_mouse`/
/// `reds_has_vdagent`/`reds_handle_agent_mouse_event` (§6).
pub trait ServerHooks: Send + Sync {
    fn mouse_mode(&self) -> MouseMode;
    fn agent_mouse_enabled(&self) -> bool;
    fn has_vdagent(&self) -> bool;
    fn handle_agent_mouse_event(&self, state: AgentMouseState);
}

/// Pushes a non-fatal notification string to the main channel of the same
/// client (`main_channel_client_push_notify`), used for
/// `InsecureTransportWarning`.
pub trait MainChannelNotifier: Send + Sync {
    fn push_notify(&self, message: &str);
}

/// Configures the newly-accepted socket (`setsockopt(TCP_NODELAY)` and
/// friends). Modeled as a trait so the connect path is testable without a
/// real socket. A `TransientBackendError` rejects the client outright (§7).
pub trait SocketConfigurer: Send + Sync {
    fn configure(&self) -> Result<(), TransientBackendError>;
}

/// Connection-time context needed to decide whether an
/// `InsecureTransportWarning` notification is due (§9.6): non-TLS *and* not
/// currently a migration target.
#[derive(Debug, Clone, Copy)]
pub struct ConnectContext {
    pub is_tls: bool,
    pub is_migration_target: bool,
}

impl ConnectContext {
    pub fn needs_insecure_transport_warning(&self) -> bool {
        !self.is_tls && !self.is_migration_target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_fires_only_for_plain_tcp_outside_migration() {
        assert!(ConnectContext {
            is_tls: false,
            is_migration_target: false,
        }
        .needs_insecure_transport_warning());

        assert!(!ConnectContext {
            is_tls: true,
            is_migration_target: false,
        }
        .needs_insecure_transport_warning());

        assert!(!ConnectContext {
            is_tls: false,
            is_migration_target: true,
        }
        .needs_insecure_transport_warning());
    }
}
