//! anco_env Shared Library
//!
//! Native core of the `anco_env` plugin. It answers four method-channel
//! calls about the Android device it runs on: the platform version, a
//! heuristic check for Huawei's HarmonyOS-derived Android environment
//! ("Anco"), a bulk environment dump, and single system-property lookups.
//!
//! # Features
//!
//! - **Environment Probe**: Build metadata, runtime and system properties,
//!   file and package presence checks
//! - **Method Channel**: JSON request/response dispatch for the host
//! - **Platform Seams**: Traits over every OS facility, with a mock for tests
//! - **C API**: Handle-based FFI for the Android host (`c-api` feature)
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use anco_env_shared::channel::{AncoEnvPlugin, MethodCall, MethodResponse};
//! use anco_env_shared::config::ProbeConfig;
//! use anco_env_shared::core::{MockPlatform, ProbeContext};
//!
//! let platform = MockPlatform::new()
//!     .with_property("ro.build.version.release", "12")
//!     .with_property("ro.product.os.dist.anco.apiversion", "1");
//! let plugin = AncoEnvPlugin::new(
//!     ProbeContext::from_platform(Arc::new(platform)),
//!     ProbeConfig::default(),
//! );
//!
//! let response = plugin.on_method_call(&MethodCall::new("isHarmonyAnco"));
//! assert_eq!(
//!     response,
//!     MethodResponse::Success { result: serde_json::Value::Bool(true) }
//! );
//! ```

pub mod channel;
pub mod config;
pub mod core;
pub mod logging;
pub mod platform;

// C FFI module for mobile platform integration
#[cfg(feature = "c-api")]
pub mod ffi;

use std::path::Path;

// Re-export commonly used types for convenience
pub use channel::{AncoEnvPlugin, MethodCall, MethodResponse, CHANNEL_NAME};
pub use config::ProbeConfig;
pub use core::{
    AppBindings, ChannelError, ConfigError, EnvironmentProbe, EnvironmentReport, PlatformError,
    ProbeContext,
};

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types used throughout the library
pub mod error {
    use thiserror::Error;

    use crate::core::errors::{ChannelError, ConfigError, PlatformError};

    /// Common error type for shared library operations
    #[derive(Error, Debug)]
    pub enum SharedError {
        #[error("Platform error: {0}")]
        Platform(#[from] PlatformError),

        #[error("Channel error: {0}")]
        Channel(#[from] ChannelError),

        #[error("Configuration error: {0}")]
        Config(#[from] ConfigError),

        #[error("Internal error: {message}")]
        Internal { message: String },
    }

    impl From<anyhow::Error> for SharedError {
        fn from(error: anyhow::Error) -> Self {
            SharedError::Internal {
                message: error.to_string(),
            }
        }
    }

    /// Result type alias for shared library operations
    pub type SharedResult<T> = Result<T, SharedError>;
}

pub use error::{SharedError, SharedResult};

/// Load the probe configuration
///
/// An explicit path must exist. Without one, the default location is used
/// when a file is there, and the built-in defaults otherwise.
pub fn load_config(path: Option<&Path>) -> SharedResult<ProbeConfig> {
    if let Some(path) = path {
        return Ok(ProbeConfig::load(path)?);
    }

    match config::default_config_path() {
        Some(default_path) if default_path.exists() => Ok(ProbeConfig::load(&default_path)?),
        _ => Ok(ProbeConfig::default()),
    }
}

/// Plugin backed by the running system and the given configuration file
pub fn native_plugin(config_path: Option<&Path>) -> SharedResult<AncoEnvPlugin> {
    let config = load_config(config_path)?;
    Ok(AncoEnvPlugin::native().with_config(config))
}
