use thiserror::Error;

#[derive(Debug, Error)]
pub enum RulepinError {
    #[error("required setting {0} is not set")]
    MissingSetting(&'static str),

    #[error("CHECK_INTERVAL must be a valid integer (seconds): '{0}'")]
    InvalidInterval(String),

    #[error("CHECK_INTERVAL must be greater than 0, got {0}")]
    NonPositiveInterval(i64),

    #[error("CHECK_INTERVAL must be at most {max} seconds, got {seconds}")]
    IntervalTooLong { seconds: i64, max: i64 },

    #[error("HEALTH_PORT must be a port number (0-65535): '{0}'")]
    InvalidPort(String),

    #[error("ADGUARD_URL is not a valid URL: '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("WRITE_FORMAT must be 'json' or 'text': '{0}'")]
    InvalidWriteFormat(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status code {status} from {endpoint}: {body}")]
    UnexpectedStatus {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Coarse classification used for logging and exit handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid setting; fatal at startup.
    Config,
    /// Connection-level failure; recovered per cycle.
    Transport,
    /// Non-success status or undecodable body; recovered per cycle.
    Protocol,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Config => "config",
            ErrorKind::Transport => "transport",
            ErrorKind::Protocol => "protocol",
        }
    }
}

impl RulepinError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RulepinError::MissingSetting(_)
            | RulepinError::InvalidInterval(_)
            | RulepinError::NonPositiveInterval(_)
            | RulepinError::IntervalTooLong { .. }
            | RulepinError::InvalidPort(_)
            | RulepinError::InvalidUrl { .. }
            | RulepinError::InvalidWriteFormat(_)
            | RulepinError::HttpClient(_) => ErrorKind::Config,
            RulepinError::Transport { .. } => ErrorKind::Transport,
            RulepinError::UnexpectedStatus { .. }
            | RulepinError::Decode { .. }
            | RulepinError::Json(_) => ErrorKind::Protocol,
        }
    }
}

pub type Result<T> = std::result::Result<T, RulepinError>;
