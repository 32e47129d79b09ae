//! Normalized gateway error.
//!
//! Callers never see transport-level shapes. Every failure is reduced to a
//! displayable message: the backend's own `message` when one came back,
//! otherwise the fixed per-operation fallback.

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend answered with a failure status.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    /// No usable response arrived. The original error is logged, not shown.
    #[error("{message}")]
    Transport { message: String },
}

impl ApiError {
    /// The user-facing message, regardless of variant.
    pub fn message(&self) -> &str {
        match self {
            Self::Rejected { message, .. } | Self::Transport { message } => message,
        }
    }

    /// Whether the backend explicitly refused the credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Rejected { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_the_normalized_message() {
        let err = ApiError::Rejected {
            status: StatusCode::BAD_REQUEST,
            message: "Invalid credentials".into(),
        };
        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(err.message(), "Invalid credentials");

        let err = ApiError::Transport {
            message: "Upload failed".into(),
        };
        assert_eq!(err.to_string(), "Upload failed");
    }

    #[test]
    fn unauthorized_detection() {
        let err = ApiError::Rejected {
            status: StatusCode::UNAUTHORIZED,
            message: "Token expired".into(),
        };
        assert!(err.is_unauthorized());
        let err = ApiError::Transport {
            message: "Search failed".into(),
        };
        assert!(!err.is_unauthorized());
    }
}
