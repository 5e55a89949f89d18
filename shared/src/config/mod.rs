//! Configuration management for anco_env
//!
//! Mobile hosts normally run with the built-in defaults. The CLI can point
//! at a YAML file to widen or narrow what the probe inspects.

pub mod probe_config;

pub use probe_config::*;

use std::path::PathBuf;

/// Default location of the probe configuration file
///
/// `<config_dir>/anco_env/probe.yml` where a per-user config directory
/// exists, `None` otherwise (always the case on Android).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push("anco_env");
        path.push("probe.yml");
        path
    })
}
