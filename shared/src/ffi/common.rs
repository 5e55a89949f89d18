//! Common FFI utilities and error handling for anco_env
//!
//! Error code conversion, string handling, and the library-level entry
//! points (version, logging).

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use crate::core::errors::{ChannelError, PlatformError};

/// FFI-compatible error codes
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AncoEnvError {
    /// Operation completed successfully
    Success = 0,
    /// Invalid parameter passed to function
    InvalidParameter = 1,
    /// Plugin is not attached to an application
    NotAttached = 2,
    /// Serialization/deserialization error
    SerializationError = 3,
    /// Internal error
    InternalError = 99,
}

impl From<PlatformError> for AncoEnvError {
    fn from(error: PlatformError) -> Self {
        match error {
            PlatformError::ContextUnavailable => AncoEnvError::NotAttached,
            PlatformError::PropertyUnavailable { .. } | PlatformError::PackageNotFound { .. } => {
                AncoEnvError::InvalidParameter
            }
            PlatformError::Unsupported
            | PlatformError::Io { .. }
            | PlatformError::Command { .. }
            | PlatformError::Jni { .. } => AncoEnvError::InternalError,
        }
    }
}

impl From<ChannelError> for AncoEnvError {
    fn from(error: ChannelError) -> Self {
        match error {
            ChannelError::InvalidArgument { .. } => AncoEnvError::InvalidParameter,
            ChannelError::NotImplemented { .. } => AncoEnvError::InvalidParameter,
            ChannelError::Serialization { .. } => AncoEnvError::SerializationError,
        }
    }
}

/// Convert a Rust string to a C string
///
/// Returns a pointer to a null-terminated C string that must be freed
/// with `anco_env_free_string`. Returns null if the string contains a
/// NUL byte.
pub fn rust_string_to_c(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(c_string) => c_string.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Convert a C string to a Rust string
///
/// Returns None if the pointer is null or the string is not valid UTF-8
pub fn c_string_to_rust(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }

    unsafe { CStr::from_ptr(ptr).to_str().ok().map(str::to_string) }
}

/// Free a string allocated by the library
///
/// # Safety
/// The pointer must have been returned by this library and not freed yet.
#[no_mangle]
pub unsafe extern "C" fn anco_env_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        let _ = CString::from_raw(ptr);
    }
}

/// Return the error code of a failed operation from an FFI function
#[macro_export]
macro_rules! ffi_try {
    ($operation:expr) => {
        match $operation {
            Ok(value) => value,
            Err(error) => {
                let error_code: $crate::ffi::common::AncoEnvError = error.into();
                return error_code;
            }
        }
    };
}

/// Version information structure for FFI
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionInfo {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl VersionInfo {
    /// Create version info from version string
    pub fn from_version_string(version: &str) -> Self {
        let mut parts = version.split('.').map(|s| s.parse().unwrap_or(0));

        Self {
            major: parts.next().unwrap_or(0),
            minor: parts.next().unwrap_or(0),
            patch: parts.next().unwrap_or(0),
        }
    }
}

/// Get library version information
#[no_mangle]
pub extern "C" fn anco_env_get_version() -> VersionInfo {
    VersionInfo::from_version_string(crate::VERSION)
}

/// Log level constants for FFI
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FfiLogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl From<FfiLogLevel> for tracing::Level {
    fn from(level: FfiLogLevel) -> Self {
        match level {
            FfiLogLevel::Error => tracing::Level::ERROR,
            FfiLogLevel::Warn => tracing::Level::WARN,
            FfiLogLevel::Info => tracing::Level::INFO,
            FfiLogLevel::Debug => tracing::Level::DEBUG,
            FfiLogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Initialize logging to logcat (stderr off Android)
#[no_mangle]
pub extern "C" fn anco_env_init_logging() -> AncoEnvError {
    match crate::logging::init_logging() {
        Ok(()) => AncoEnvError::Success,
        Err(_) => AncoEnvError::InternalError,
    }
}

/// Set logging level
#[no_mangle]
pub extern "C" fn anco_env_set_log_level(level: FfiLogLevel) -> AncoEnvError {
    let config = crate::logging::LoggingConfig {
        debug_enabled: level >= FfiLogLevel::Debug,
        level: level.into(),
        ..crate::logging::get_config()
    };

    match crate::logging::configure_logging(config) {
        Ok(()) => AncoEnvError::Success,
        Err(_) => AncoEnvError::InternalError,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let ffi_error: AncoEnvError = PlatformError::ContextUnavailable.into();
        assert_eq!(ffi_error, AncoEnvError::NotAttached);

        let ffi_error: AncoEnvError = PlatformError::Jni {
            message: "boom".to_string(),
        }
        .into();
        assert_eq!(ffi_error, AncoEnvError::InternalError);

        let ffi_error: AncoEnvError = ChannelError::Serialization {
            message: "bad".to_string(),
        }
        .into();
        assert_eq!(ffi_error, AncoEnvError::SerializationError);
    }

    #[test]
    fn test_string_conversion() {
        let rust_string = "Android 12".to_string();
        let c_ptr = rust_string_to_c(rust_string.clone());
        assert!(!c_ptr.is_null());

        let converted_back = c_string_to_rust(c_ptr);
        assert_eq!(converted_back, Some(rust_string));

        unsafe {
            anco_env_free_string(c_ptr);
        }
    }

    #[test]
    fn test_null_and_nul_strings() {
        assert_eq!(c_string_to_rust(std::ptr::null()), None);
        assert!(rust_string_to_c("a\0b".to_string()).is_null());
    }

    #[test]
    fn test_version_info_parsing() {
        let version = VersionInfo::from_version_string("1.2.3");
        assert_eq!(
            version,
            VersionInfo {
                major: 1,
                minor: 2,
                patch: 3
            }
        );

        let partial = VersionInfo::from_version_string("2");
        assert_eq!(partial.major, 2);
        assert_eq!(partial.minor, 0);
        assert_eq!(partial.patch, 0);
    }

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(tracing::Level::from(FfiLogLevel::Warn), tracing::Level::WARN);
        assert!(FfiLogLevel::Trace > FfiLogLevel::Debug);
        assert!(FfiLogLevel::Info < FfiLogLevel::Debug);
    }
}
