use thiserror::Error;

/// Failure of a call through the API gateway client.
///
/// The variant carries the kind so callers never have to inspect message
/// text to tell "offline" from "rejected".
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{operation} requires a signed-in session")]
    Unauthenticated { operation: &'static str },

    #[error("{message}")]
    Rejected {
        operation: &'static str,
        status: u16,
        message: String,
    },

    #[error("Failed to reach fraud analysis service during {operation}: {cause}")]
    Transport {
        operation: &'static str,
        cause: String,
    },

    #[error("Unexpected response from {operation}: {cause}")]
    InvalidResponse {
        operation: &'static str,
        cause: String,
    },

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Expected {expected} V values, got {got}")]
    InvalidFeatures { expected: usize, got: usize },

    /// The HTTP client could not be built; nothing was sent.
    #[error("Failed to set up HTTP client: {0}")]
    ClientSetup(String),
}

impl ApiError {
    /// HTTP status of a server rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::Rejected { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport { .. })
    }
}

/// Failure reading or writing persisted session state.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session storage is corrupt: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Failed to replace session file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Keychain error: {0}")]
    Keychain(String),

    #[error("No data directory available for session storage")]
    NoDataDir,

    #[error("Session storage lock poisoned")]
    Poisoned,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A sign-in or sign-out happened while the request was in flight; its
    /// result was dropped rather than applied to the newer session.
    #[error("Session changed during {operation}, result discarded")]
    Superseded { operation: &'static str },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl From<ApiError> for String {
    fn from(err: ApiError) -> Self {
        err.to_string()
    }
}

impl From<SessionError> for String {
    fn from(err: SessionError) -> Self {
        err.to_string()
    }
}
