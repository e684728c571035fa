//! Unified error type for the Gemhall server.

use gemhall_protocol::ProtocolError;
use gemhall_room::RoomError;
use gemhall_transport::TransportError;

use crate::ErrorCode;

/// Top-level error wrapping every crate-specific error.
///
/// Room errors and [`NotAttached`](Self::NotAttached) are refusals the
/// client hears about; the rest end the connection.
#[derive(Debug, thiserror::Error)]
pub enum GemhallError {
    /// A transport-level error (bind, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error, including rule violations from the engine.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The connection has no seat yet.
    #[error("not attached to a room")]
    NotAttached,
}

impl GemhallError {
    /// The code to report to the client, or `None` if the error is not
    /// the client's to hear about.
    pub fn client_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Room(err) => Some(ErrorCode::from(err)),
            Self::NotAttached => Some(ErrorCode::NotAttached),
            Self::Transport(_) | Self::Protocol(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err: GemhallError = TransportError::ConnectionClosed("gone".into()).into();
        assert!(matches!(err, GemhallError::Transport(_)));
        assert!(err.to_string().contains("gone"));
        assert_eq!(err.client_code(), None);
    }

    #[test]
    fn test_from_protocol_error() {
        let err: GemhallError = ProtocolError::InvalidMessage("bad".into()).into();
        assert!(matches!(err, GemhallError::Protocol(_)));
    }

    #[test]
    fn test_from_room_error_keeps_message() {
        let err: GemhallError = RoomError::OnlyHostCanStart.into();
        assert_eq!(err.to_string(), "only host can start");
        assert_eq!(err.client_code(), Some(ErrorCode::OnlyHostCanStart));
    }

    #[test]
    fn test_not_attached_code() {
        assert_eq!(
            GemhallError::NotAttached.client_code(),
            Some(ErrorCode::NotAttached)
        );
    }
}
