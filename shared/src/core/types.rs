//! Core types for the anco_env probe

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named string facts (build fields, properties)
pub type FactMap = BTreeMap<String, String>;

/// Named presence checks (files, packages)
pub type PresenceMap = BTreeMap<String, bool>;

/// Category names of an [`EnvironmentReport`], in report order
pub const REPORT_CATEGORIES: [&str; 6] = [
    "build",
    "systemProperties",
    "files",
    "packages",
    "systemProps",
    "isHarmonyAnco",
];

/// Snapshot of the device environment
///
/// Every category is always present. A category whose underlying query
/// failed is empty, except `system_props`, which then holds a single
/// `error` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentReport {
    /// Build metadata fields, plus `VERSION.*` entries
    pub build: FactMap,

    /// Runtime system properties (`os.name`, `java.version`, ...)
    pub system_properties: FactMap,

    /// Existence of each configured path
    pub files: PresenceMap,

    /// Installation state of each configured package
    pub packages: PresenceMap,

    /// Filtered output of the property dump command
    pub system_props: FactMap,

    /// Result of the Harmony (Anco) heuristic
    pub is_harmony_anco: bool,
}

impl EnvironmentReport {
    /// Names of the top-level categories as they appear on the wire
    pub fn category_names() -> &'static [&'static str] {
        &REPORT_CATEGORIES
    }

    /// Convert to a JSON value for the method channel
    pub fn to_json_value(&self) -> serde_json::Value {
        // Maps of strings and booleans always serialize
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Total number of facts across the map categories
    pub fn fact_count(&self) -> usize {
        self.build.len()
            + self.system_properties.len()
            + self.files.len()
            + self.packages.len()
            + self.system_props.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_has_all_categories() {
        let report = EnvironmentReport::default();
        let value = report.to_json_value();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), REPORT_CATEGORIES.len());
        for name in EnvironmentReport::category_names() {
            assert!(object.contains_key(*name), "missing category {name}");
        }
        assert_eq!(object["isHarmonyAnco"], serde_json::Value::Bool(false));
    }

    #[test]
    fn test_report_json_shape() {
        let mut report = EnvironmentReport::default();
        report
            .build
            .insert("MODEL".to_string(), "ALN-AL00".to_string());
        report
            .files
            .insert("/system/build.prop".to_string(), true);
        report.is_harmony_anco = true;

        let value = report.to_json_value();
        assert_eq!(value["build"]["MODEL"], "ALN-AL00");
        assert_eq!(value["files"]["/system/build.prop"], true);
        assert_eq!(value["isHarmonyAnco"], true);
        assert_eq!(report.fact_count(), 2);
    }
}
