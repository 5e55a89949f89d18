//! Platform access interfaces for the environment probe
//!
//! The probe never touches the operating system directly. Every fact it
//! reports is obtained through one of the narrow traits below, so the same
//! probe logic runs against the real device or against [`MockPlatform`].

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::errors::{PlatformError, PlatformResult};

/// Read access to the global system property store (`ro.*`, `persist.*`, ...)
pub trait SystemPropertySource: Send + Sync {
    /// Read a property
    ///
    /// # Returns
    /// * `Ok(String)` - The stored value, possibly empty
    /// * `Err(PlatformError)` - If the property store cannot be queried
    fn read_property(&self, key: &str) -> PlatformResult<String>;
}

/// Runtime (VM/process level) properties such as `os.arch` or `java.version`
pub trait RuntimePropertySource: Send + Sync {
    /// Returns `None` when the runtime does not define the property
    fn runtime_property(&self, key: &str) -> Option<String>;
}

/// Filesystem existence checks
pub trait PathProbe: Send + Sync {
    fn path_exists(&self, path: &str) -> PlatformResult<bool>;
}

/// Runs an external command and hands back its standard output lines
pub trait CommandRunner: Send + Sync {
    /// Run `name` without arguments and collect its stdout
    ///
    /// Blocks until the process exits; no timeout is applied.
    fn run_command(&self, name: &str) -> PlatformResult<Vec<String>>;
}

/// Installed-package lookups
///
/// Only available once an application context has been attached.
pub trait PackageRegistry: Send + Sync {
    /// # Returns
    /// * `Ok(true)` - The package is installed
    /// * `Err(PlatformError)` - The lookup failed or the package is unknown
    fn is_package_installed(&self, package: &str) -> PlatformResult<bool>;
}

/// In-memory platform for tests
///
/// Implements all platform traits. Failure modes can be switched on to
/// exercise the probe's degradation paths.
#[derive(Debug, Default)]
pub struct MockPlatform {
    properties: HashMap<String, String>,
    properties_unavailable: bool,
    runtime_properties: HashMap<String, String>,
    existing_paths: HashSet<String>,
    failing_paths: HashSet<String>,
    command_output: Option<Vec<String>>,
    command_error: Option<String>,
    installed_packages: HashSet<String>,
    failing_packages: HashSet<String>,
    property_reads: AtomicUsize,
    command_runs: AtomicUsize,
}

impl MockPlatform {
    /// Create an empty mock platform
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }

    /// Make every system property read fail
    pub fn with_properties_unavailable(mut self) -> Self {
        self.properties_unavailable = true;
        self
    }

    pub fn with_runtime_property(mut self, key: &str, value: &str) -> Self {
        self.runtime_properties
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.existing_paths.insert(path.to_string());
        self
    }

    /// Make the existence check for `path` fail
    pub fn with_failing_path(mut self, path: &str) -> Self {
        self.failing_paths.insert(path.to_string());
        self
    }

    /// Output returned by every command run
    pub fn with_command_output(mut self, lines: &[&str]) -> Self {
        self.command_output = Some(lines.iter().map(|l| l.to_string()).collect());
        self.command_error = None;
        self
    }

    /// Make every command run fail with `message`
    pub fn with_command_failure(mut self, message: &str) -> Self {
        self.command_error = Some(message.to_string());
        self
    }

    pub fn with_package(mut self, package: &str) -> Self {
        self.installed_packages.insert(package.to_string());
        self
    }

    /// Make the lookup for `package` fail with an error other than "not found"
    pub fn with_failing_package(mut self, package: &str) -> Self {
        self.failing_packages.insert(package.to_string());
        self
    }

    /// Number of system property reads served so far
    pub fn property_reads(&self) -> usize {
        self.property_reads.load(Ordering::Relaxed)
    }

    /// Number of commands run so far
    pub fn command_runs(&self) -> usize {
        self.command_runs.load(Ordering::Relaxed)
    }
}

impl Clone for MockPlatform {
    fn clone(&self) -> Self {
        Self {
            properties: self.properties.clone(),
            properties_unavailable: self.properties_unavailable,
            runtime_properties: self.runtime_properties.clone(),
            existing_paths: self.existing_paths.clone(),
            failing_paths: self.failing_paths.clone(),
            command_output: self.command_output.clone(),
            command_error: self.command_error.clone(),
            installed_packages: self.installed_packages.clone(),
            failing_packages: self.failing_packages.clone(),
            property_reads: AtomicUsize::new(0),
            command_runs: AtomicUsize::new(0),
        }
    }
}

impl SystemPropertySource for MockPlatform {
    fn read_property(&self, key: &str) -> PlatformResult<String> {
        self.property_reads.fetch_add(1, Ordering::Relaxed);

        if self.properties_unavailable {
            return Err(PlatformError::Unsupported);
        }

        // Like the real store, unknown keys read as empty
        Ok(self.properties.get(key).cloned().unwrap_or_default())
    }
}

impl RuntimePropertySource for MockPlatform {
    fn runtime_property(&self, key: &str) -> Option<String> {
        self.runtime_properties.get(key).cloned()
    }
}

impl PathProbe for MockPlatform {
    fn path_exists(&self, path: &str) -> PlatformResult<bool> {
        if self.failing_paths.contains(path) {
            return Err(PlatformError::Io {
                message: format!("Permission denied: {path}"),
            });
        }
        Ok(self.existing_paths.contains(path))
    }
}

impl CommandRunner for MockPlatform {
    fn run_command(&self, name: &str) -> PlatformResult<Vec<String>> {
        self.command_runs.fetch_add(1, Ordering::Relaxed);

        if let Some(message) = &self.command_error {
            return Err(PlatformError::Command {
                command: name.to_string(),
                message: message.clone(),
            });
        }

        Ok(self.command_output.clone().unwrap_or_default())
    }
}

impl PackageRegistry for MockPlatform {
    fn is_package_installed(&self, package: &str) -> PlatformResult<bool> {
        if self.failing_packages.contains(package) {
            return Err(PlatformError::Jni {
                message: format!("Lookup for {package} threw"),
            });
        }

        if self.installed_packages.contains(package) {
            Ok(true)
        } else {
            Err(PlatformError::PackageNotFound {
                package: package.to_string(),
            })
        }
    }
}
