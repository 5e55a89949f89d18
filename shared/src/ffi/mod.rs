//! Foreign Function Interface (FFI) modules for anco_env
//!
//! The C ABI the host application's channel glue links against. Enabled
//! by the `c-api` feature.

pub mod common;
pub mod mobile;

// Re-export common functionality
pub use common::{
    anco_env_free_string, anco_env_get_version, anco_env_init_logging, anco_env_set_log_level,
    c_string_to_rust, rust_string_to_c, AncoEnvError, FfiLogLevel, VersionInfo,
};
pub use mobile::{
    anco_env_plugin_attach, anco_env_plugin_create, anco_env_plugin_destroy,
    anco_env_plugin_detach, anco_env_plugin_handle_call, anco_env_plugin_is_attached,
    PluginHandle, PluginInstance,
};

/// Check if this is a mobile platform build
pub const fn is_mobile_build() -> bool {
    cfg!(any(target_os = "android", target_os = "ios"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_functions() {
        let version = anco_env_get_version();
        assert_eq!(version, VersionInfo::from_version_string(crate::VERSION));
        assert!(version.major < 100);
    }

    #[test]
    fn test_build_flags() {
        assert_eq!(is_mobile_build(), crate::platform::is_android() || cfg!(target_os = "ios"));
    }
}
