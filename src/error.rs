//! Failures reported by a [`TaskSource`](crate::traits::TaskSource)

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Why a call to the task service failed
#[derive(Clone, Debug, PartialEq)]
pub enum ApiError {
    /// The request never got a response (server down, DNS, refused connection...)
    Connectivity(String),
    /// The server refused the credentials or the session token.
    /// On an authorized call this means the session is over (forced logout)
    Unauthorized(String),
    /// The server answered with a non-success status and (usually) a message meant for the user
    Rejected { status: u16, message: String },
    /// The server answered successfully, but with a body that cannot be understood
    InvalidResponse(String),
    /// The request could not even be built, e.g. because the configured server URL is unusable
    InvalidRequest(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, ApiError::Connectivity(_))
    }

    /// The text to show next to the form or view that triggered the call
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Connectivity(_) => "Network error. Please try again.".to_string(),
            ApiError::Unauthorized(message) => message.clone(),
            ApiError::Rejected { message, .. } => message.clone(),
            ApiError::InvalidResponse(_) => "Unexpected answer from the server. Please try again.".to_string(),
            ApiError::InvalidRequest(_) => "Invalid request. Please check the server address.".to_string(),
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            ApiError::Connectivity(details) => write!(f, "connectivity error: {}", details),
            ApiError::Unauthorized(message) => write!(f, "unauthorized: {}", message),
            ApiError::Rejected { status, message } => write!(f, "rejected with HTTP status {}: {}", status, message),
            ApiError::InvalidResponse(details) => write!(f, "invalid response: {}", details),
            ApiError::InvalidRequest(details) => write!(f, "invalid request: {}", details),
        }
    }
}

impl Error for ApiError {}
