//! Error types for registry persistence

use std::fmt;
use std::time::Duration;

/// Result type alias for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors that can occur while loading or persisting the service registry
#[derive(Debug)]
pub enum RegistryError {
    /// I/O error (file access, rename, etc.)
    IoError(std::io::Error),

    /// The registry file could not be encoded or decoded
    SerializationError(String),

    /// The backend did not finish a write in time
    Timeout(Duration),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::IoError(err) => write!(f, "registry I/O error: {}", err),
            RegistryError::SerializationError(msg) => {
                write!(f, "registry serialization error: {}", msg)
            }
            RegistryError::Timeout(after) => {
                write!(f, "registry write timed out after {}ms", after.as_millis())
            }
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RegistryError {
    fn from(err: std::io::Error) -> Self {
        RegistryError::IoError(err)
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::SerializationError(err.to_string())
    }
}
