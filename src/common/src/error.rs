use std::fmt;

/// Errors raised while setting up a client. These are returned synchronously
/// from construction and are never routed through the alert pipeline.
#[derive(Debug)]
pub enum WatiosError {
    /// The supplied access credential does not match the configured one
    InvalidCredential,

    /// No expected credential is configured, so nothing can be validated
    MissingCredential,

    /// The configured base URL could not be parsed
    InvalidBaseUrl { url: String, source: url::ParseError },

    /// Loading configuration failed
    Config(config::ConfigError),

    /// The underlying HTTP client could not be built
    Client(reqwest::Error),
}

impl fmt::Display for WatiosError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatiosError::InvalidCredential => write!(f, "Invalid passkey provided"),
            WatiosError::MissingCredential => write!(
                f,
                "No passkey configured; set the PASSKEY environment variable"
            ),
            WatiosError::InvalidBaseUrl { url, source } => {
                write!(f, "Invalid base URL {}: {}", url, source)
            }
            WatiosError::Config(e) => write!(f, "Failed to load configuration: {}", e),
            WatiosError::Client(e) => write!(f, "Failed to build HTTP client: {}", e),
        }
    }
}

impl std::error::Error for WatiosError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WatiosError::InvalidCredential | WatiosError::MissingCredential => None,
            WatiosError::InvalidBaseUrl { source, .. } => Some(source),
            WatiosError::Config(e) => Some(e),
            WatiosError::Client(e) => Some(e),
        }
    }
}

impl From<config::ConfigError> for WatiosError {
    fn from(err: config::ConfigError) -> Self {
        WatiosError::Config(err)
    }
}

impl From<reqwest::Error> for WatiosError {
    fn from(err: reqwest::Error) -> Self {
        WatiosError::Client(err)
    }
}

impl WatiosError {
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            WatiosError::InvalidCredential | WatiosError::MissingCredential
        )
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            WatiosError::InvalidCredential => "The passkey was rejected".to_string(),
            WatiosError::MissingCredential => {
                "No passkey is configured for this process".to_string()
            }
            WatiosError::InvalidBaseUrl { url, .. } => format!("'{}' is not a valid URL", url),
            WatiosError::Config(_) => "The configuration could not be loaded".to_string(),
            WatiosError::Client(_) => "The HTTP client could not be created".to_string(),
        }
    }
}

pub type WatiosResult<T> = Result<T, WatiosError>;
