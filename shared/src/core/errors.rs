//! Core error types for the anco_env probe.
//!
//! Errors are split by who is allowed to see them: platform access errors
//! stay inside the probe and degrade to absent/false values, channel errors
//! are reported back to the host as an error code.

use thiserror::Error;

/// Failures while talking to the operating system
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlatformError {
    /// The facility does not exist on the running platform
    #[error("Operation not supported on this platform")]
    Unsupported,

    /// A system property could not be read
    #[error("Property unavailable: {key}")]
    PropertyUnavailable { key: String },

    /// General I/O failure
    #[error("I/O error: {message}")]
    Io { message: String },

    /// An external command could not be run or its output could not be read
    #[error("Command '{command}' failed: {message}")]
    Command { command: String, message: String },

    /// A call into the Java VM failed
    #[error("JNI error: {message}")]
    Jni { message: String },

    /// The application context has not been attached
    #[error("Application context unavailable")]
    ContextUnavailable,

    /// The package registry has no such package
    #[error("Package not found: {package}")]
    PackageNotFound { package: String },
}

/// Errors reported to the caller of a channel method
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChannelError {
    /// A required argument is missing or has the wrong type
    #[error("{message}")]
    InvalidArgument { message: String },

    /// The method name is not known to this plugin
    #[error("Method not implemented: {method}")]
    NotImplemented { method: String },

    /// The request or response could not be (de)serialized
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl ChannelError {
    /// Wire code reported to the host
    pub fn code(&self) -> &'static str {
        match self {
            ChannelError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            ChannelError::NotImplemented { .. } => "NOT_IMPLEMENTED",
            ChannelError::Serialization { .. } => "SERIALIZATION_ERROR",
        }
    }
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    NotFound { path: String },

    #[error("Configuration parsing failed: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("Configuration I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for platform access
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Result type for channel methods
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Result type for configuration handling
pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<std::io::Error> for PlatformError {
    fn from(err: std::io::Error) -> Self {
        PlatformError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ChannelError {
    fn from(err: serde_json::Error) -> Self {
        ChannelError::Serialization {
            message: err.to_string(),
        }
    }
}
