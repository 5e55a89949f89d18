//! Native platform implementations
//!
//! Implements the probe's platform seams against the running operating
//! system. Android-only services that need the Java VM live in
//! [`android`]; everything here works on any Unix-like system and
//! degrades to "unavailable" where the Android facility does not exist.

#[cfg(target_os = "android")]
pub mod android;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use crate::core::errors::{PlatformError, PlatformResult};
use crate::core::provider::{
    CommandRunner, PackageRegistry, PathProbe, RuntimePropertySource, SystemPropertySource,
};
use crate::core::ProbeContext;

/// Property file consulted when the native property store is missing
pub const BUILD_PROP_PATH: &str = "/system/build.prop";

/// Package manager command used without a Java VM
pub const PACKAGE_MANAGER_COMMAND: &str = "pm";

/// System property store of the running device
///
/// On Android this goes through bionic's property API. Elsewhere the
/// `build.prop` file is parsed, which normally does not exist and makes
/// every read fail.
#[derive(Debug, Clone)]
pub struct NativeSystemProperties {
    build_prop_path: PathBuf,
}

impl NativeSystemProperties {
    pub fn new() -> Self {
        Self::with_build_prop(BUILD_PROP_PATH)
    }

    /// Use a different `build.prop` file for the non-Android fallback
    pub fn with_build_prop<P: AsRef<Path>>(path: P) -> Self {
        Self {
            build_prop_path: path.as_ref().to_path_buf(),
        }
    }

    #[cfg_attr(target_os = "android", allow(dead_code))]
    fn read_build_prop(&self, key: &str) -> PlatformResult<Option<String>> {
        let contents = fs::read_to_string(&self.build_prop_path)?;

        let value = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .filter(|(k, _)| k.trim() == key)
            .map(|(_, v)| v.trim().to_string())
            .last();

        Ok(value)
    }
}

impl Default for NativeSystemProperties {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemPropertySource for NativeSystemProperties {
    #[cfg(target_os = "android")]
    fn read_property(&self, key: &str) -> PlatformResult<String> {
        let properties = android_system_properties::AndroidSystemProperties::new();
        Ok(properties.get(key).unwrap_or_default())
    }

    #[cfg(not(target_os = "android"))]
    fn read_property(&self, key: &str) -> PlatformResult<String> {
        let unavailable = || PlatformError::PropertyUnavailable {
            key: key.to_string(),
        };

        match self.read_build_prop(key) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(unavailable()),
            Err(e) => {
                crate::log_debug!("build.prop lookup for {} failed: {}", key, e);
                Err(unavailable())
            }
        }
    }
}

/// Filesystem existence checks
#[derive(Debug, Clone, Copy, Default)]
pub struct NativePathProbe;

impl PathProbe for NativePathProbe {
    fn path_exists(&self, path: &str) -> PlatformResult<bool> {
        Ok(Path::new(path).try_exists()?)
    }
}

/// Runs commands as child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessCommandRunner;

impl CommandRunner for ProcessCommandRunner {
    fn run_command(&self, name: &str) -> PlatformResult<Vec<String>> {
        let output = Command::new(name)
            .output()
            .map_err(|e| PlatformError::Command {
                command: name.to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            crate::log_debug!("{} exited with {}", name, output.status);
        }

        // Only a failed spawn is an error; the exit status is not
        let text = String::from_utf8_lossy(&output.stdout);
        Ok(text.lines().map(str::to_string).collect())
    }
}

/// Runtime properties derived from the process environment
///
/// Mirrors what a JVM on the same system would report for the `os.*` and
/// `user.*` keys. Keys that only a JVM defines are absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostRuntimeProperties;

impl HostRuntimeProperties {
    fn os_name() -> Option<String> {
        match std::env::consts::OS {
            "linux" | "android" => Some("Linux".to_string()),
            "macos" => Some("Mac OS X".to_string()),
            "windows" => Some("Windows".to_string()),
            "" => None,
            other => Some(other.to_string()),
        }
    }

    fn os_version() -> Option<String> {
        fs::read_to_string("/proc/sys/kernel/osrelease")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Split `LANG` (`zh_CN.UTF-8`) into language and region
    fn locale() -> (Option<String>, Option<String>) {
        let Some(lang) = std::env::var("LANG").ok().filter(|l| !l.is_empty()) else {
            return (None, None);
        };
        parse_locale(&lang)
    }
}

fn parse_locale(lang: &str) -> (Option<String>, Option<String>) {
    let base = lang.split(['.', '@']).next().unwrap_or_default();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return (None, None);
    }

    let mut parts = base.split(['_', '-']);
    let language = parts.next().filter(|l| !l.is_empty()).map(str::to_string);
    let region = parts.next().filter(|r| !r.is_empty()).map(str::to_string);
    (language, region)
}

impl RuntimePropertySource for HostRuntimeProperties {
    fn runtime_property(&self, key: &str) -> Option<String> {
        match key {
            "os.name" => Self::os_name(),
            "os.arch" => Some(std::env::consts::ARCH.to_string()),
            "os.version" => Self::os_version(),
            "user.language" => Self::locale().0,
            "user.region" => Self::locale().1,
            _ => None,
        }
    }
}

/// Package lookups through the `pm` shell command
///
/// Used when the library runs outside an application process, e.g. from
/// `adb shell`.
#[derive(Debug, Clone)]
pub struct ShellPackageRegistry {
    command: String,
}

impl ShellPackageRegistry {
    pub fn new() -> Self {
        Self {
            command: PACKAGE_MANAGER_COMMAND.to_string(),
        }
    }
}

impl Default for ShellPackageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageRegistry for ShellPackageRegistry {
    fn is_package_installed(&self, package: &str) -> PlatformResult<bool> {
        let output = Command::new(&self.command)
            .args(["path", package])
            .output()
            .map_err(|e| PlatformError::Command {
                command: self.command.clone(),
                message: e.to_string(),
            })?;

        let text = String::from_utf8_lossy(&output.stdout);
        if output.status.success() && text.lines().any(|l| l.starts_with("package:")) {
            Ok(true)
        } else {
            Err(PlatformError::PackageNotFound {
                package: package.to_string(),
            })
        }
    }
}

/// Build an unattached context backed by this system
pub fn native_context() -> ProbeContext {
    ProbeContext::new(
        Arc::new(NativeSystemProperties::new()),
        Arc::new(HostRuntimeProperties),
        Arc::new(NativePathProbe),
        Arc::new(ProcessCommandRunner),
    )
}

/// Check if running on Android
pub const fn is_android() -> bool {
    cfg!(target_os = "android")
}

/// Get platform identifier string
pub fn platform_name() -> &'static str {
    match std::env::consts::OS {
        "android" => "Android",
        "ios" => "iOS",
        "linux" => "Linux",
        "windows" => "Windows",
        "macos" => "macOS",
        _ => "Unknown",
    }
}

/// Log platform information for debugging
pub fn log_platform_info() {
    crate::log_info!("=== Platform ===");
    crate::log_info!("Platform: {}", platform_name());
    crate::log_info!("Architecture: {}", std::env::consts::ARCH);
    crate::log_debug!(
        "build.prop present: {}",
        Path::new(BUILD_PROP_PATH).exists()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_build_prop_fallback() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# begin build properties").unwrap();
        writeln!(file, "ro.build.flavor=anco_arm64-user").unwrap();
        writeln!(file, "ro.product.model = ALN-AL00").unwrap();
        writeln!(file, "ro.build.flavor=override").unwrap();

        let props = NativeSystemProperties::with_build_prop(file.path());
        assert_eq!(
            props.read_build_prop("ro.build.flavor").unwrap().as_deref(),
            Some("override")
        );
        assert_eq!(
            props.read_build_prop("ro.product.model").unwrap().as_deref(),
            Some("ALN-AL00")
        );
        assert_eq!(props.read_build_prop("ro.unset").unwrap(), None);
    }

    #[cfg(not(target_os = "android"))]
    #[test]
    fn test_missing_build_prop_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let props = NativeSystemProperties::with_build_prop(dir.path().join("build.prop"));

        assert_eq!(
            props.read_property("ro.build.flavor"),
            Err(PlatformError::PropertyUnavailable {
                key: "ro.build.flavor".to_string()
            })
        );
    }

    #[test]
    fn test_path_probe() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_string_lossy().to_string();

        assert_eq!(NativePathProbe.path_exists(&path), Ok(true));
        assert_eq!(
            NativePathProbe.path_exists("/definitely/not/here/anco"),
            Ok(false)
        );
    }

    #[test]
    fn test_missing_command_fails() {
        let result = ProcessCommandRunner.run_command("anco-env-no-such-command");
        assert!(matches!(result, Err(PlatformError::Command { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_output_lines() {
        let lines = ProcessCommandRunner.run_command("pwd").unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with('/'));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_exit_status_yields_no_lines() {
        let lines = ProcessCommandRunner.run_command("false").unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn test_host_runtime_properties() {
        let props = HostRuntimeProperties;
        assert_eq!(
            props.runtime_property("os.arch").as_deref(),
            Some(std::env::consts::ARCH)
        );
        assert_eq!(props.runtime_property("java.home"), None);
        assert_eq!(props.runtime_property("http.agent"), None);
    }

    #[test]
    fn test_parse_locale() {
        assert_eq!(
            parse_locale("zh_CN.UTF-8"),
            (Some("zh".to_string()), Some("CN".to_string()))
        );
        assert_eq!(parse_locale("en"), (Some("en".to_string()), None));
        assert_eq!(parse_locale("C.UTF-8"), (None, None));
        assert_eq!(parse_locale("POSIX"), (None, None));
    }

    #[test]
    fn test_platform_name() {
        assert!(!platform_name().is_empty());
        assert_eq!(is_android(), cfg!(target_os = "android"));
    }
}
