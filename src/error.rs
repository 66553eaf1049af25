use thiserror::Error;

pub const MISSING_API_KEY: &str = "MISSING_API_KEY";
pub const TIMEOUT: &str = "TIMEOUT";
pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
pub const REQUEST_FAILED: &str = "REQUEST_FAILED";

/// Failure of a single screening call, or of client construction.
///
/// Every variant maps onto a machine-readable [`code`](ScreeningError::code). Only
/// [`ScreeningError::Api`] carries an HTTP status, since it is the only failure where
/// the service actually answered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScreeningError {
    #[error("API key is required")]
    MissingApiKey,

    #[error("Request timed out")]
    Timeout,

    #[error("{0}")]
    Network(String),

    #[error("{message}")]
    Api {
        code: String,
        message: String,
        status_code: u16,
    },
}

pub type Result<T> = std::result::Result<T, ScreeningError>;

impl ScreeningError {
    pub fn code(&self) -> &str {
        match self {
            ScreeningError::MissingApiKey => MISSING_API_KEY,
            ScreeningError::Timeout => TIMEOUT,
            ScreeningError::Network(_) => NETWORK_ERROR,
            ScreeningError::Api { code, .. } => code,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ScreeningError::Api { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Hint for callers that implement their own retry policy.
    ///
    /// Timeouts, transport failures, rate limiting and 5xx answers may succeed on a later
    /// attempt; everything else will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            ScreeningError::Timeout | ScreeningError::Network(_) => true,
            ScreeningError::Api { status_code, .. } => {
                *status_code == 429 || (500..600).contains(status_code)
            }
            ScreeningError::MissingApiKey => false,
        }
    }
}
