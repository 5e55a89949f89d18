//! Probe configuration
//!
//! Lists what the environment probe inspects. The defaults are the lists the
//! plugin ships with; a YAML file may override any of them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::core::errors::{ConfigError, ConfigResult};

/// Runtime properties reported under `systemProperties`
pub const DEFAULT_RUNTIME_PROPERTY_KEYS: [&str; 9] = [
    "os.name",
    "os.arch",
    "os.version",
    "java.vendor",
    "java.version",
    "java.home",
    "user.language",
    "user.region",
    "http.agent",
];

/// Paths reported under `files`
pub const DEFAULT_FILES_TO_CHECK: [&str; 6] = [
    "/system/lib/libohos.so",
    "/system/framework/hw.jar",
    "/system/build.prop",
    "/proc/version",
    "/system/bin/su",
    "/system/xbin/su",
];

/// Packages reported under `packages`
pub const DEFAULT_PACKAGES_TO_CHECK: [&str; 6] = [
    "com.huawei.system",
    "com.zhard.s",
    "com.android.vending",
    "com.google.android.gms",
    "com.huawei.hwid",
    "com.huawei.android.launcher",
];

/// Command whose output fills `systemProps`
pub const DEFAULT_PROPERTY_DUMP_COMMAND: &str = "getprop";

/// Key substrings retained from the property dump
pub const DEFAULT_PROPERTY_DUMP_FILTERS: [&str; 5] = ["ro.build", "hw", "harmony", "zy", "product"];

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// What the environment probe looks at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Runtime property names
    pub runtime_property_keys: Vec<String>,

    /// Absolute paths whose existence is reported
    pub files_to_check: Vec<String>,

    /// Package identifiers whose installation state is reported
    pub packages_to_check: Vec<String>,

    /// Property dump command, run without arguments
    pub property_dump_command: String,

    /// A dumped key is kept when it contains any of these
    pub property_dump_filters: Vec<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            runtime_property_keys: to_strings(&DEFAULT_RUNTIME_PROPERTY_KEYS),
            files_to_check: to_strings(&DEFAULT_FILES_TO_CHECK),
            packages_to_check: to_strings(&DEFAULT_PACKAGES_TO_CHECK),
            property_dump_command: DEFAULT_PROPERTY_DUMP_COMMAND.to_string(),
            property_dump_filters: to_strings(&DEFAULT_PROPERTY_DUMP_FILTERS),
        }
    }
}

impl ProbeConfig {
    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading probe configuration from: {:?}", path);

        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?;
        config.validate()?;

        tracing::info!("Probe configuration loaded from: {:?}", path);
        Ok(config)
    }

    /// Parse configuration from YAML text; omitted fields keep their defaults
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Serialize configuration to YAML
    pub fn to_yaml_string(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, self.to_yaml_string()?)?;
        tracing::info!("Probe configuration saved to: {:?}", path);
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.property_dump_command.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "property_dump_command".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        check_entries("runtime_property_keys", &self.runtime_property_keys)?;
        check_entries("files_to_check", &self.files_to_check)?;
        check_entries("packages_to_check", &self.packages_to_check)?;
        check_entries("property_dump_filters", &self.property_dump_filters)?;

        for path in &self.files_to_check {
            if !path.starts_with('/') {
                return Err(ConfigError::Invalid {
                    field: "files_to_check".to_string(),
                    reason: format!("'{path}' is not an absolute path"),
                });
            }
        }

        Ok(())
    }
}

fn check_entries(field: &str, entries: &[String]) -> ConfigResult<()> {
    let mut seen = HashSet::new();

    for entry in entries {
        if entry.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: field.to_string(),
                reason: "contains an empty entry".to_string(),
            });
        }
        if !seen.insert(entry.as_str()) {
            return Err(ConfigError::Invalid {
                field: field.to_string(),
                reason: format!("duplicate entry '{entry}'"),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_default_config() {
        let config = ProbeConfig::default();
        assert_eq!(config.runtime_property_keys.len(), 9);
        assert_eq!(config.files_to_check.len(), 6);
        assert_eq!(config.packages_to_check.len(), 6);
        assert_eq!(config.property_dump_command, "getprop");
        assert_eq!(config.property_dump_filters.len(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "packages_to_check:\n  - com.example.app\n";
        let config = ProbeConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.packages_to_check, vec!["com.example.app"]);
        assert_eq!(config.files_to_check.len(), 6);
        assert_eq!(config.property_dump_command, "getprop");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(
            ProbeConfig::from_yaml_str("  \n").unwrap(),
            ProbeConfig::default()
        );
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = ProbeConfig::default();
        let yaml = config.to_yaml_string().unwrap();
        assert_eq!(ProbeConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn test_invalid_yaml() {
        assert_matches!(
            ProbeConfig::from_yaml_str("files_to_check: [unclosed"),
            Err(ConfigError::Parse(_))
        );
    }

    #[test]
    fn test_validation_failures() {
        let mut config = ProbeConfig::default();
        config.property_dump_command = " ".to_string();
        assert_matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "property_dump_command");

        let mut config = ProbeConfig::default();
        config.packages_to_check.push("com.huawei.hwid".to_string());
        assert_matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "packages_to_check");

        let mut config = ProbeConfig::default();
        config.files_to_check.push("relative/path".to_string());
        assert_matches!(config.validate(), Err(ConfigError::Invalid { .. }));

        let mut config = ProbeConfig::default();
        config.property_dump_filters.push(String::new());
        assert_matches!(config.validate(), Err(ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_load_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("probe.yml");

        let mut config = ProbeConfig::default();
        config.property_dump_filters = vec!["ro.product".to_string()];
        config.save(&path).unwrap();

        let loaded = ProbeConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_matches!(
            ProbeConfig::load(dir.path().join("missing.yml")),
            Err(ConfigError::NotFound { .. })
        );
    }
}
