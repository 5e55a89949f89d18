//! Environment Report Integration Test
//!
//! Drives the probe against a simulated HarmonyOS (Anco) device and against
//! a platform where every query fails, and checks the shape of the report
//! the host receives.

use std::collections::HashMap;
use std::sync::Arc;

use anco_env_shared::config::ProbeConfig;
use anco_env_shared::core::{
    CommandRunner, EnvironmentProbe, MockPlatform, PackageRegistry, PathProbe, PlatformError,
    PlatformResult, ProbeContext, RuntimePropertySource, SystemPropertySource, REPORT_CATEGORIES,
};
use anco_env_shared::AppBindings;

/// A device image with a fixed property store and `getprop` output
#[derive(Debug, Clone)]
struct AncoDevice {
    properties: HashMap<String, String>,
    files: Vec<String>,
    packages: Vec<String>,
}

impl AncoDevice {
    fn new() -> Self {
        let properties = [
            ("ro.build.version.release", "12"),
            ("ro.build.version.sdk", "31"),
            ("ro.build.version.codename", "REL"),
            ("ro.build.version.incremental", "104.2.0.168"),
            ("ro.product.manufacturer", "HUAWEI"),
            ("ro.product.brand", "HUAWEI"),
            ("ro.product.model", "ALN-AL00"),
            ("ro.product.product.device", "anco_arm64"),
            ("ro.product.os.dist.anco.apiversion", "12"),
            ("ro.build.flavor", "anco_arm64-user"),
            ("ro.build.date.utc", "1700000000"),
            ("ro.debuggable", "0"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            properties,
            files: vec!["/proc/version".to_string(), "/system/build.prop".to_string()],
            packages: vec!["com.huawei.hwid".to_string()],
        }
    }

    fn getprop_output(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.properties.keys().collect();
        keys.sort();
        keys.into_iter()
            .map(|k| format!("[{}]: [{}]", k, self.properties[k]))
            .chain(["[persist.sys.locale]: [zh-CN]".to_string()])
            .collect()
    }
}

impl SystemPropertySource for AncoDevice {
    fn read_property(&self, key: &str) -> PlatformResult<String> {
        Ok(self.properties.get(key).cloned().unwrap_or_default())
    }
}

impl RuntimePropertySource for AncoDevice {
    fn runtime_property(&self, key: &str) -> Option<String> {
        match key {
            "os.name" => Some("Linux".to_string()),
            "os.arch" => Some("aarch64".to_string()),
            "java.vendor" => Some("The Android Project".to_string()),
            _ => None,
        }
    }
}

impl PathProbe for AncoDevice {
    fn path_exists(&self, path: &str) -> PlatformResult<bool> {
        Ok(self.files.iter().any(|f| f == path))
    }
}

impl CommandRunner for AncoDevice {
    fn run_command(&self, name: &str) -> PlatformResult<Vec<String>> {
        if name != "getprop" {
            return Err(PlatformError::Command {
                command: name.to_string(),
                message: format!("{name}: not found"),
            });
        }
        Ok(self.getprop_output())
    }
}

impl PackageRegistry for AncoDevice {
    fn is_package_installed(&self, package: &str) -> PlatformResult<bool> {
        if self.packages.iter().any(|p| p == package) {
            Ok(true)
        } else {
            Err(PlatformError::PackageNotFound {
                package: package.to_string(),
            })
        }
    }
}

fn attached_device_context() -> ProbeContext {
    let device = Arc::new(AncoDevice::new());
    let mut context = ProbeContext::from_platform(device.clone());
    context.attach(AppBindings::new(device));
    context
}

#[test]
fn test_anco_device_report() {
    let context = attached_device_context();
    let config = ProbeConfig::default();
    let probe = EnvironmentProbe::new(&context, &config);

    assert_eq!(probe.platform_version(), "Android 12");
    assert!(probe.is_harmony_variant());

    let report = probe.environment_info();

    assert_eq!(report.build["MANUFACTURER"], "HUAWEI");
    assert_eq!(report.build["TIME"], "1700000000000");
    assert_eq!(report.build["IS_DEBUGGABLE"], "false");
    assert_eq!(report.build["VERSION.RELEASE"], "12");
    assert_eq!(report.build["VERSION.SDK_INT"], "31");
    assert_eq!(report.build["VERSION.RELEASE_OR_CODENAME"], "12");

    assert_eq!(report.system_properties.len(), 3);
    assert_eq!(report.system_properties["os.arch"], "aarch64");
    assert!(!report.system_properties.contains_key("http.agent"));

    assert_eq!(report.files.len(), config.files_to_check.len());
    assert_eq!(report.files["/proc/version"], true);
    assert_eq!(report.files["/system/bin/su"], false);

    assert_eq!(report.packages.len(), config.packages_to_check.len());
    assert_eq!(report.packages["com.huawei.hwid"], true);
    assert_eq!(report.packages["com.android.vending"], false);

    assert_eq!(report.system_props["ro.build.flavor"], "anco_arm64-user");
    assert_eq!(report.system_props["ro.product.model"], "ALN-AL00");
    assert!(!report.system_props.contains_key("persist.sys.locale"));
    assert!(!report.system_props.contains_key("ro.debuggable"));

    assert!(report.is_harmony_anco);
}

#[test]
fn test_report_wire_shape() {
    let context = attached_device_context();
    let config = ProbeConfig::default();
    let value = EnvironmentProbe::new(&context, &config)
        .environment_info()
        .to_json_value();

    let object = value.as_object().unwrap();
    assert_eq!(object.len(), REPORT_CATEGORIES.len());
    for category in REPORT_CATEGORIES {
        assert!(object.contains_key(category), "missing {category}");
    }

    assert!(value["build"]["MODEL"].is_string());
    assert!(value["files"]["/proc/version"].is_boolean());
    assert_eq!(value["isHarmonyAnco"], serde_json::Value::Bool(true));
}

#[test]
fn test_total_failure_still_reports_every_category() {
    let config = ProbeConfig::default();
    let mut platform = MockPlatform::new()
        .with_properties_unavailable()
        .with_command_failure("getprop: inaccessible or not found");
    for path in &config.files_to_check {
        platform = platform.with_failing_path(path);
    }
    for package in &config.packages_to_check {
        platform = platform.with_failing_package(package);
    }

    let platform = Arc::new(platform);
    let mut context = ProbeContext::from_platform(platform.clone());
    context.attach(AppBindings::new(platform));

    let probe = EnvironmentProbe::new(&context, &config);
    assert_eq!(probe.platform_version(), "Android unknown");

    let report = probe.environment_info();
    assert!(report.build.is_empty());
    assert!(report.system_properties.is_empty());
    assert!(report.files.values().all(|exists| !exists));
    assert!(report.packages.values().all(|installed| !installed));
    assert_eq!(report.system_props.len(), 1);
    assert_eq!(
        report.system_props["error"],
        "getprop: inaccessible or not found"
    );
    assert!(!report.is_harmony_anco);

    let value = report.to_json_value();
    for category in REPORT_CATEGORIES {
        assert!(value.get(category).is_some(), "missing {category}");
    }
}

#[test]
fn test_report_is_idempotent() {
    let context = attached_device_context();
    let config = ProbeConfig::default();
    let probe = EnvironmentProbe::new(&context, &config);

    let first = probe.environment_info();
    let second = probe.environment_info();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_harmony_predicate_cases() {
    let config = ProbeConfig::default();
    let cases: [(&[(&str, &str)], bool); 6] = [
        (&[("ro.product.product.device", "anco_phone")], true),
        (
            &[
                ("ro.product.product.device", "pixel"),
                ("ro.build.flavor", "user"),
            ],
            false,
        ),
        (&[("ro.product.os.dist.anco.apiversion", "")], false),
        (&[("ro.product.os.dist.anco.apiversion", "1")], true),
        (&[("ro.build.flavor", "anco_arm64-userdebug")], true),
        (&[], false),
    ];

    for (properties, expected) in cases {
        let platform = properties
            .iter()
            .fold(MockPlatform::new(), |p, (k, v)| p.with_property(k, v));
        let context = ProbeContext::from_platform(Arc::new(platform));
        let probe = EnvironmentProbe::new(&context, &config);

        assert_eq!(
            probe.is_harmony_variant(),
            expected,
            "properties: {properties:?}"
        );
    }
}

#[test]
fn test_unattached_context_skips_packages() {
    let context = ProbeContext::from_platform(Arc::new(AncoDevice::new()));
    let config = ProbeConfig::default();

    let report = EnvironmentProbe::new(&context, &config).environment_info();
    assert!(report.packages.is_empty());
    assert!(!report.files.is_empty());
}
