//! Error types for depot
//!
//! All modules use `DepotResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for depot operations
pub type DepotResult<T> = Result<T, DepotError>;

/// All errors that can occur in depot
#[derive(Error, Debug)]
pub enum DepotError {
    // Execution errors
    #[error("Capture and streamed execution are mutually exclusive")]
    ModeConflict,

    #[error("Command failed to start: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command exited with status {code}: {command}")]
    CommandExit { command: String, code: i32 },

    #[error("Command terminated by signal {signal}: {command}")]
    CommandSignaled { command: String, signal: i32 },

    // Declaration errors
    #[error("Invalid dependency declaration for {name}: {reason}")]
    Manifest { name: String, reason: String },

    #[error("Manifest file not found: {0}")]
    ManifestNotFound(PathBuf),

    // Resolution errors
    #[error("Cannot resolve revision for {name}: {reason}")]
    Resolve { name: String, reason: String },

    // Build errors
    #[error("Unsupported build system: {0}")]
    UnsupportedBuildSystem(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // General errors
    #[error("{0}")]
    User(String),
}

impl DepotError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a manifest error naming the offending dependency
    pub fn manifest(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Manifest {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a resolution error naming the offending dependency
    pub fn resolve(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolve {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ManifestNotFound(_) => Some("Run: depot init"),
            Self::UnsupportedBuildSystem(_) => Some("Supported build systems: cmake, make, meson"),
            Self::CommandFailed { .. } => Some("Check that git and your build tools are on PATH"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DepotError::UnsupportedBuildSystem("ninja".to_string());
        assert!(err.to_string().contains("ninja"));
    }

    #[test]
    fn error_hint() {
        let err = DepotError::UnsupportedBuildSystem("scons".to_string());
        assert_eq!(err.hint(), Some("Supported build systems: cmake, make, meson"));
        assert_eq!(DepotError::ModeConflict.hint(), None);
    }

    #[test]
    fn error_names_dependency() {
        let err = DepotError::resolve("owner/project", "no ref matched");
        assert!(err.to_string().contains("owner/project"));
    }
}
