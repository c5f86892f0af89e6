use thiserror::Error;

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const CONFIG_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Missing required configuration: {}", .0.join("/"))]
    Config(Vec<&'static str>),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid config file {path}: {message}")]
    ConfigFile { path: String, message: String },

    #[error("{operation} failed with HTTP {status}: {body}")]
    Transport {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode {what}: {message}")]
    Decode { what: String, message: String },

    #[error("Relation to collection {target} not found in schema: {reason}")]
    SchemaResolution { target: String, reason: String },
}

impl SyncError {
    pub fn exit_code(&self) -> i32 {
        match self {
            SyncError::Config(_)
            | SyncError::InvalidConfig(_)
            | SyncError::ConfigFile { .. } => exit_codes::CONFIG_ERROR,
            _ => exit_codes::OPERATION_FAILED,
        }
    }

    /// True for every failure that came from talking to the remote API.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SyncError::Transport { .. } | SyncError::Http(_) | SyncError::Decode { .. }
        )
    }
}

pub type Result<T, E = SyncError> = std::result::Result<T, E>;
