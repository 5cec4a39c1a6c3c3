use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PanelError {
    #[error("validation failed: {message}")]
    Validation { message: String },
    #[error("a generation request is already in flight")]
    Busy,
    #[error("generation service request timed out")]
    Timeout,
    #[error("generation service returned an invalid response: {message}")]
    InvalidResponse { message: String },
    #[error("generation service returned HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("generation service transport failed: {message}")]
    Transport { message: String },
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl PanelError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True for failures caused by what the user entered rather than by the service.
    pub fn is_user_input(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message } => format!("Please review the panel input: {message}"),
            Self::Busy => "A generation request is already running. Wait for it to finish."
                .to_string(),
            Self::Timeout => "The generation service did not respond in time.".to_string(),
            Self::InvalidResponse { message } => {
                format!("The generation service returned an unexpected response: {message}")
            }
            Self::Http { status, message } => {
                format!("The generation service rejected the request (HTTP {status}): {message}")
            }
            Self::Transport { message } => {
                format!("Could not reach the generation service: {message}")
            }
            Self::Internal { message } => {
                format!("An internal error occurred in the panel: {message}")
            }
        }
    }
}
