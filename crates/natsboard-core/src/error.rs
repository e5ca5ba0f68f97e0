// ── Core error types ──
//
// Errors that escape the engine to its host. Node-scoped fetch failures
// never appear here -- they are classified and attached to the node
// (see `classify`). What remains is lookup failures and the few places
// where a whole operation cannot proceed at all.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Node not found: {id}")]
    NodeNotFound { id: String },

    #[error("Stream node {id} has no parent account in the tree")]
    ParentAccountMissing { id: String },

    #[error("Cannot reach control plane: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Control plane request timed out")]
    Timeout,

    #[error("Control plane error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<natsboard_api::Error> for CoreError {
    fn from(err: natsboard_api::Error) -> Self {
        match err {
            natsboard_api::Error::Authentication { message }
            | natsboard_api::Error::PermissionDenied { message } => {
                CoreError::AuthenticationFailed { message }
            }
            natsboard_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            natsboard_api::Error::InvalidUrl(e) => CoreError::Internal(format!("invalid URL: {e}")),
            natsboard_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                reason: format!("TLS error: {msg}"),
            },
            natsboard_api::Error::Api { message, status } => CoreError::Api {
                message,
                status: Some(status),
            },
            natsboard_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use natsboard_api::Error as ApiError;

    #[test]
    fn rejected_token_maps_to_authentication_failed() {
        let err = CoreError::from(ApiError::Authentication {
            message: "token expired".into(),
        });
        assert!(matches!(
            err,
            CoreError::AuthenticationFailed { ref message } if message == "token expired"
        ));
    }

    #[test]
    fn permission_denied_maps_to_authentication_failed() {
        let err = CoreError::from(ApiError::PermissionDenied {
            message: "read-only token".into(),
        });
        assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    }

    #[test]
    fn structured_api_error_keeps_status() {
        let err = CoreError::from(ApiError::Api {
            message: "account not found".into(),
            status: 404,
        });
        assert!(matches!(
            err,
            CoreError::Api { status: Some(404), ref message } if message == "account not found"
        ));
    }

    #[test]
    fn tls_failure_maps_to_connection_failed() {
        let err = CoreError::from(ApiError::Tls("bad certificate".into()));
        assert!(matches!(
            err,
            CoreError::ConnectionFailed { ref reason } if reason.contains("bad certificate")
        ));
    }

    #[test]
    fn malformed_payloads_are_internal_errors() {
        let err = CoreError::from(ApiError::Deserialization {
            message: "expected a sequence".into(),
            body: "{}".into(),
        });
        assert!(matches!(err, CoreError::Internal(_)));
    }
}
