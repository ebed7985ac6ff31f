//! Error taxonomy for the ocean tile services.

use thiserror::Error;

/// Result type alias using OceanError.
pub type OceanResult<T> = Result<T, OceanError>;

/// Primary error type shared across the workspace.
#[derive(Debug, Error)]
pub enum OceanError {
    // === Request errors (rejected at the API boundary) ===
    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    #[error("Invalid geometry: {0}")]
    Geometry(String),

    #[error("Invalid tile coordinate: {0}")]
    InvalidTile(String),

    // === Data errors ===
    /// Upstream reachable but has nothing for this time/place.
    /// Expected and common; never logged as an error.
    #[error("No data available: {0}")]
    NoDataAvailable(String),

    /// Upstream misbehaved: non-2xx, timeout, malformed payload.
    #[error("Upstream error (status {status:?}): {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    // === Infrastructure errors ===
    /// Missing URL template or credentials. Fatal at startup, never per-request.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OceanError {
    /// HTTP status for surfacing this error from the analyze endpoint.
    /// The tile proxy never surfaces errors at all (it degrades to a
    /// transparent tile), so only the JSON paths consult this.
    pub fn http_status_code(&self) -> u16 {
        match self {
            OceanError::InvalidParameter { .. }
            | OceanError::Geometry(_)
            | OceanError::InvalidTile(_) => 400,

            OceanError::LayerNotFound(_) | OceanError::NoDataAvailable(_) => 404,

            OceanError::Upstream { .. } => 502,

            OceanError::Config(_) | OceanError::Internal(_) => 500,
        }
    }

    /// Whether a failed upstream call with this error may be retried once.
    /// Definitive 4xx answers are never retried.
    pub fn is_transient(&self) -> bool {
        match self {
            OceanError::Upstream { status, .. } => match status {
                Some(code) => *code >= 500,
                // No status at all means timeout / connection failure
                None => true,
            },
            _ => false,
        }
    }
}

impl From<serde_json::Error> for OceanError {
    fn from(err: serde_json::Error) -> Self {
        OceanError::Internal(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(OceanError::Geometry("bad".into()).http_status_code(), 400);
        assert_eq!(OceanError::LayerNotFound("x".into()).http_status_code(), 404);
        assert_eq!(
            OceanError::Upstream {
                status: Some(503),
                message: "unavailable".into()
            }
            .http_status_code(),
            502
        );
        assert_eq!(OceanError::Config("missing".into()).http_status_code(), 500);
    }

    #[test]
    fn test_transient_classification() {
        let timeout = OceanError::Upstream {
            status: None,
            message: "timed out".into(),
        };
        assert!(timeout.is_transient());

        let server_err = OceanError::Upstream {
            status: Some(502),
            message: "bad gateway".into(),
        };
        assert!(server_err.is_transient());

        let client_err = OceanError::Upstream {
            status: Some(403),
            message: "forbidden".into(),
        };
        assert!(!client_err.is_transient());

        assert!(!OceanError::NoDataAvailable("x".into()).is_transient());
    }
}
