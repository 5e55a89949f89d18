//! Environment probe
//!
//! Answers the four questions the plugin exposes: the platform version, a
//! single system property, whether the device is a HarmonyOS-derived
//! ("Anco") Android build, and a full environment report.
//!
//! Platform failures never escape the probe. Each report category is
//! gathered on its own and a failing query only empties (or, for the
//! property dump, annotates) its own category.

use crate::config::ProbeConfig;
use crate::core::build_info::{collect_build_facts, VersionField};
use crate::core::context::ProbeContext;
use crate::core::errors::PlatformError;
use crate::core::types::{EnvironmentReport, FactMap, PresenceMap};

/// Device name property; contains "anco" on Anco builds
pub const ANCO_DEVICE_PROPERTY: &str = "ro.product.product.device";

/// Only defined on Anco builds
pub const ANCO_API_VERSION_PROPERTY: &str = "ro.product.os.dist.anco.apiversion";

/// Build flavor property; contains "anco" on Anco builds
pub const BUILD_FLAVOR_PROPERTY: &str = "ro.build.flavor";

/// Marker substring looked for in the device and flavor properties
pub const ANCO_MARKER: &str = "anco";

/// Key of the single entry recorded when the property dump fails
pub const PROPERTY_DUMP_ERROR_KEY: &str = "error";

/// Stateless view over a context and a configuration
#[derive(Debug, Clone, Copy)]
pub struct EnvironmentProbe<'a> {
    context: &'a ProbeContext,
    config: &'a ProbeConfig,
}

impl<'a> EnvironmentProbe<'a> {
    pub fn new(context: &'a ProbeContext, config: &'a ProbeConfig) -> Self {
        Self { context, config }
    }

    /// Human readable OS version, e.g. `Android 12`
    pub fn platform_version(&self) -> String {
        match VersionField::Release.read(self.context.properties()) {
            Ok(release) if !release.is_empty() => format!("Android {release}"),
            Ok(_) => "Android unknown".to_string(),
            Err(e) => {
                crate::log_debug!("Release version unavailable: {}", e);
                "Android unknown".to_string()
            }
        }
    }

    /// Look up a system property
    ///
    /// Returns `None` when the property is unset, empty, or the property
    /// store cannot be read. Never returns an empty string.
    pub fn get_property(&self, key: &str) -> Option<String> {
        match self.context.properties().read_property(key) {
            Ok(value) if value.is_empty() => None,
            Ok(value) => Some(value),
            Err(e) => {
                crate::log_debug!("Property {} unavailable: {}", key, e);
                None
            }
        }
    }

    /// Heuristic check for a HarmonyOS-derived Android build
    pub fn is_harmony_variant(&self) -> bool {
        let device = self.get_property(ANCO_DEVICE_PROPERTY);
        let anco_api = self.get_property(ANCO_API_VERSION_PROPERTY);
        let build_flavor = self.get_property(BUILD_FLAVOR_PROPERTY);

        let is_anco = device.is_some_and(|d| d.contains(ANCO_MARKER))
            || anco_api.is_some()
            || build_flavor.is_some_and(|f| f.contains(ANCO_MARKER));

        crate::log_debug!("Harmony variant check: {}", is_anco);
        is_anco
    }

    /// Build metadata and `VERSION.*` fields
    pub fn collect_build_info(&self) -> FactMap {
        collect_build_facts(self.context.properties())
    }

    /// Configured runtime properties; undefined ones are omitted
    pub fn collect_runtime_properties(&self) -> FactMap {
        let source = self.context.runtime_properties();

        self.config
            .runtime_property_keys
            .iter()
            .filter_map(|key| source.runtime_property(key).map(|v| (key.clone(), v)))
            .collect()
    }

    /// One entry per configured path; a failed check counts as absent
    pub fn check_files(&self) -> PresenceMap {
        let paths = self.context.paths();

        self.config
            .files_to_check
            .iter()
            .map(|path| {
                let exists = paths.path_exists(path).unwrap_or_else(|e| {
                    crate::log_debug!("Existence check for {} failed: {}", path, e);
                    false
                });
                (path.clone(), exists)
            })
            .collect()
    }

    /// One entry per configured package, or nothing when no application
    /// context is attached
    pub fn check_packages(&self) -> PresenceMap {
        let Some(registry) = self.context.package_registry() else {
            crate::log_debug!("No application context attached, skipping package checks");
            return PresenceMap::new();
        };

        self.config
            .packages_to_check
            .iter()
            .map(|package| {
                let installed = match registry.is_package_installed(package) {
                    Ok(installed) => installed,
                    Err(PlatformError::PackageNotFound { .. }) => false,
                    Err(e) => {
                        crate::log_debug!("Package lookup for {} failed: {}", package, e);
                        false
                    }
                };
                (package.clone(), installed)
            })
            .collect()
    }

    /// Filtered property dump, or a single `error` entry if the dump failed
    pub fn collect_property_dump(&self) -> FactMap {
        let command = &self.config.property_dump_command;

        match self.context.commands().run_command(command) {
            Ok(lines) => parse_property_dump(&lines, &self.config.property_dump_filters),
            Err(e) => {
                crate::log_warn!("Property dump via {} failed: {}", command, e);
                let message = match e {
                    PlatformError::Command { message, .. } => message,
                    other => other.to_string(),
                };
                FactMap::from([(PROPERTY_DUMP_ERROR_KEY.to_string(), message)])
            }
        }
    }

    /// Gather every category into a fresh report
    pub fn environment_info(&self) -> EnvironmentReport {
        let report = EnvironmentReport {
            build: self.collect_build_info(),
            system_properties: self.collect_runtime_properties(),
            files: self.check_files(),
            packages: self.check_packages(),
            system_props: self.collect_property_dump(),
            is_harmony_anco: self.is_harmony_variant(),
        };

        crate::log_info!(
            "Environment report collected: {} facts, harmony={}",
            report.fact_count(),
            report.is_harmony_anco
        );
        report
    }
}

/// Parse `getprop`-style output (`[key]: [value]`)
///
/// Each line is split on `": "`; the first two parts have their square
/// brackets trimmed and become key and value. Lines without a separator
/// are ignored, and only keys containing one of `filters` are kept. A
/// repeated key keeps its last value.
pub fn parse_property_dump<S: AsRef<str>>(lines: &[S], filters: &[String]) -> FactMap {
    let mut facts = FactMap::new();

    for line in lines {
        let mut parts = line.as_ref().split(": ");
        let (Some(raw_key), Some(raw_value)) = (parts.next(), parts.next()) else {
            continue;
        };

        let key = trim_brackets(raw_key);
        if filters.iter().any(|filter| key.contains(filter.as_str())) {
            facts.insert(key.to_string(), trim_brackets(raw_value).to_string());
        }
    }

    facts
}

fn trim_brackets(s: &str) -> &str {
    s.trim_matches(|c| c == '[' || c == ']')
}
