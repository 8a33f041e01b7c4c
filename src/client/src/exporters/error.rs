use std::fmt;

/// Errors that can occur while delivering to a side channel
#[derive(Debug)]
pub enum DispatchError {
    /// Network request failed
    Network(reqwest::Error),

    /// Endpoint returned non-2XX status code
    Server { status: u16, body: String },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Network(e) => write!(f, "Network request failed: {}", e),
            DispatchError::Server { status, body } => {
                write!(f, "Server error {}: {}", status, body)
            }
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::Network(e) => Some(e),
            DispatchError::Server { .. } => None,
        }
    }
}

impl From<reqwest::Error> for DispatchError {
    fn from(err: reqwest::Error) -> Self {
        DispatchError::Network(err)
    }
}

impl DispatchError {
    pub fn server_error(status: u16, body: String) -> Self {
        DispatchError::Server { status, body }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            DispatchError::Network(_) => "Could not reach the delivery endpoint".to_string(),
            DispatchError::Server { status, .. } => {
                format!("Delivery endpoint rejected the payload with status {}", status)
            }
        }
    }
}

pub type DispatchResult<T> = Result<T, DispatchError>;
