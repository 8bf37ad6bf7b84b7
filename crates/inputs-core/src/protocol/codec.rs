//! Little-endian codec for the inputs channel wire protocol.

use thiserror::Error;

use super::messages::{
    ClientMessage, ClientMessageType, ServerMessage, INPUTS_MIGRATE_MAGIC, INPUTS_MIGRATE_VERSION,
};

/// Decode/encode failures. [`ProtocolError::Oversize`] and
/// [`ProtocolError::BadMigrationHeader`] are the two fatal channel-level
/// errors named in §7; the others surface parsing bugs in a malformed or
/// truncated payload and are likewise treated as fatal by the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("declared message size {declared} exceeds receive buffer of {max} bytes")]
    Oversize { declared: usize, max: usize },
    #[error("unknown client message type {0}")]
    UnknownMessageType(u16),
    #[error("payload for message type {msg_type:?} too short: expected at least {expected} bytes, got {got}")]
    Truncated {
        msg_type: ClientMessageType,
        expected: usize,
        got: usize,
    },
    #[error("bad migration header: magic={magic:#010x} version={version}")]
    BadMigrationHeader { magic: u32, version: u32 },
}

/// Rejects a message whose declared size does not fit in the channel's
/// receive buffer (§4.3: "oversize is a fatal channel-level error").
pub fn check_size(declared: usize, recv_buf_capacity: usize) -> Result<(), ProtocolError> {
    if declared > recv_buf_capacity {
        return Err(ProtocolError::Oversize {
            declared,
            max: recv_buf_capacity,
        });
    }
    Ok(())
}

fn need(msg_type: ClientMessageType, payload: &[u8], expected: usize) -> Result<(), ProtocolError> {
    if payload.len() < expected {
        return Err(ProtocolError::Truncated {
            msg_type,
            expected,
            got: payload.len(),
        });
    }
    Ok(())
}

fn read_u32(payload: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(payload[at..at + 4].try_into().unwrap())
}

fn read_i32(payload: &[u8], at: usize) -> i32 {
    i32::from_le_bytes(payload[at..at + 4].try_into().unwrap())
}

/// Parses a client→server message given its type code and raw payload bytes.
pub fn decode_client_message(msg_type: u16, payload: &[u8]) -> Result<ClientMessage, ProtocolError> {
    let msg_type =
        ClientMessageType::try_from(msg_type).map_err(ProtocolError::UnknownMessageType)?;

    Ok(match msg_type {
        ClientMessageType::KeyDown => {
            need(msg_type, payload, 4)?;
            ClientMessage::KeyDown {
                code: read_u32(payload, 0),
            }
        }
        ClientMessageType::KeyUp => {
            need(msg_type, payload, 4)?;
            ClientMessage::KeyUp {
                code: read_u32(payload, 0),
            }
        }
        ClientMessageType::KeyScancode => ClientMessage::KeyScancode(payload.to_vec()),
        ClientMessageType::MouseMotion => {
            need(msg_type, payload, 9)?;
            ClientMessage::MouseMotion {
                dx: read_i32(payload, 0),
                dy: read_i32(payload, 4),
                buttons: payload[8],
            }
        }
        ClientMessageType::MousePosition => {
            need(msg_type, payload, 13)?;
            ClientMessage::MousePosition {
                x: read_i32(payload, 0),
                y: read_i32(payload, 4),
                buttons: payload[8],
                display_id: read_u32(payload, 9),
            }
        }
        ClientMessageType::MousePress => {
            need(msg_type, payload, 2)?;
            ClientMessage::MousePress {
                button: payload[0],
                buttons: payload[1],
            }
        }
        ClientMessageType::MouseRelease => {
            need(msg_type, payload, 1)?;
            ClientMessage::MouseRelease { buttons: payload[0] }
        }
        ClientMessageType::KeyModifiers => {
            need(msg_type, payload, 1)?;
            ClientMessage::KeyModifiers { modifiers: payload[0] }
        }
        ClientMessageType::Disconnecting => ClientMessage::Disconnecting,
    })
}

/// Serializes a server→client pipe item payload.
pub fn encode_server_message(message: &ServerMessage) -> Vec<u8> {
    match message {
        ServerMessage::InputsInit { keyboard_modifiers } => vec![*keyboard_modifiers],
        ServerMessage::KeyModifiers { modifiers } => vec![*modifiers],
        ServerMessage::MouseMotionAck => Vec::new(),
        ServerMessage::MigrateData {
            magic,
            version,
            motion_count,
        } => {
            let mut bytes = Vec::with_capacity(10);
            bytes.extend_from_slice(&magic.to_le_bytes());
            bytes.extend_from_slice(&version.to_le_bytes());
            bytes.extend_from_slice(&motion_count.to_le_bytes());
            bytes
        }
    }
}

/// Parses a received migration payload, validating the header (§4.7).
pub fn decode_migrate_data(payload: &[u8]) -> Result<u16, ProtocolError> {
    if payload.len() < 10 {
        return Err(ProtocolError::Truncated {
            msg_type: ClientMessageType::Disconnecting, // no dedicated variant; header is server-originated
            expected: 10,
            got: payload.len(),
        });
    }
    let magic = read_u32(payload, 0);
    let version = read_u32(payload, 4);
    if magic != INPUTS_MIGRATE_MAGIC || version != INPUTS_MIGRATE_VERSION {
        return Err(ProtocolError::BadMigrationHeader { magic, version });
    }
    Ok(u16::from_le_bytes(payload[8..10].try_into().unwrap()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversize_declared_length_is_rejected() {
        assert_eq!(
            check_size(5000, 4096),
            Err(ProtocolError::Oversize {
                declared: 5000,
                max: 4096
            })
        );
        assert!(check_size(100, 4096).is_ok());
    }

    #[test]
    fn decodes_key_down_and_up() {
        let payload = 0x46u32.to_le_bytes();
        assert_eq!(
            decode_client_message(101, &payload).unwrap(),
            ClientMessage::KeyDown { code: 0x46 }
        );
        assert_eq!(
            decode_client_message(102, &payload).unwrap(),
            ClientMessage::KeyUp { code: 0x46 }
        );
    }

    #[test]
    fn decodes_mouse_position() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&100i32.to_le_bytes());
        payload.extend_from_slice(&200i32.to_le_bytes());
        payload.push(0x01);
        payload.extend_from_slice(&3u32.to_le_bytes());

        assert_eq!(
            decode_client_message(112, &payload).unwrap(),
            ClientMessage::MousePosition {
                x: 100,
                y: 200,
                buttons: 0x01,
                display_id: 3,
            }
        );
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let err = decode_client_message(111, &[0, 0]).unwrap_err();
        assert!(matches!(err, ProtocolError::Truncated { .. }));
    }

    #[test]
    fn unknown_message_type_is_rejected() {
        assert_eq!(
            decode_client_message(9999, &[]).unwrap_err(),
            ProtocolError::UnknownMessageType(9999)
        );
    }

    #[test]
    fn migrate_data_round_trips() {
        let msg = ServerMessage::MigrateData {
            magic: INPUTS_MIGRATE_MAGIC,
            version: INPUTS_MIGRATE_VERSION,
            motion_count: 130,
        };
        let bytes = encode_server_message(&msg);
        assert_eq!(decode_migrate_data(&bytes).unwrap(), 130);
    }

    #[test]
    fn migrate_data_bad_magic_is_fatal() {
        let bytes = encode_server_message(&ServerMessage::MigrateData {
            magic: 0xDEAD_BEEF,
            version: INPUTS_MIGRATE_VERSION,
            motion_count: 0,
        });
        assert!(matches!(
            decode_migrate_data(&bytes),
            Err(ProtocolError::BadMigrationHeader { .. })
        ));
    }
}
