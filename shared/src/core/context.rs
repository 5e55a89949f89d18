//! Probe context and its attach/detach lifecycle
//!
//! The context bundles the platform seams the probe reads from. Services
//! that need a live application (package lookups, VM properties) are only
//! present between [`ProbeContext::attach`] and [`ProbeContext::detach`].

use std::sync::Arc;

use crate::core::provider::{
    CommandRunner, PackageRegistry, PathProbe, RuntimePropertySource, SystemPropertySource,
};

/// Services provided by an attached application
#[derive(Clone)]
pub struct AppBindings {
    /// Installed-package lookups
    pub package_registry: Arc<dyn PackageRegistry>,
    /// Runtime properties read from the application's VM, replacing the
    /// process-level ones while attached
    pub runtime_properties: Option<Arc<dyn RuntimePropertySource>>,
}

impl AppBindings {
    pub fn new(package_registry: Arc<dyn PackageRegistry>) -> Self {
        Self {
            package_registry,
            runtime_properties: None,
        }
    }

    pub fn with_runtime_properties(mut self, source: Arc<dyn RuntimePropertySource>) -> Self {
        self.runtime_properties = Some(source);
        self
    }
}

/// Platform services used by [`crate::core::EnvironmentProbe`]
#[derive(Clone)]
pub struct ProbeContext {
    properties: Arc<dyn SystemPropertySource>,
    runtime_properties: Arc<dyn RuntimePropertySource>,
    paths: Arc<dyn PathProbe>,
    commands: Arc<dyn CommandRunner>,
    app: Option<AppBindings>,
}

impl ProbeContext {
    /// Create an unattached context from individual services
    pub fn new(
        properties: Arc<dyn SystemPropertySource>,
        runtime_properties: Arc<dyn RuntimePropertySource>,
        paths: Arc<dyn PathProbe>,
        commands: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            properties,
            runtime_properties,
            paths,
            commands,
            app: None,
        }
    }

    /// Create an unattached context where one object serves every seam
    pub fn from_platform<P>(platform: Arc<P>) -> Self
    where
        P: SystemPropertySource
            + RuntimePropertySource
            + PathProbe
            + CommandRunner
            + 'static,
    {
        Self::new(
            platform.clone(),
            platform.clone(),
            platform.clone(),
            platform,
        )
    }

    /// Create an unattached context backed by the running operating system
    pub fn native() -> Self {
        crate::platform::native_context()
    }

    /// Attach application services, replacing any previous attachment
    pub fn attach(&mut self, app: AppBindings) {
        if self.app.is_some() {
            crate::log_debug!("Replacing existing application context");
        }
        self.app = Some(app);
    }

    /// Drop application services; package lookups report nothing afterwards
    pub fn detach(&mut self) {
        self.app = None;
    }

    pub fn is_attached(&self) -> bool {
        self.app.is_some()
    }

    pub fn properties(&self) -> &dyn SystemPropertySource {
        self.properties.as_ref()
    }

    /// Runtime properties, preferring the attached application's VM
    pub fn runtime_properties(&self) -> &dyn RuntimePropertySource {
        match self.app.as_ref().and_then(|app| app.runtime_properties.as_ref()) {
            Some(source) => source.as_ref(),
            None => self.runtime_properties.as_ref(),
        }
    }

    pub fn paths(&self) -> &dyn PathProbe {
        self.paths.as_ref()
    }

    pub fn commands(&self) -> &dyn CommandRunner {
        self.commands.as_ref()
    }

    /// `None` until an application is attached
    pub fn package_registry(&self) -> Option<&dyn PackageRegistry> {
        self.app.as_ref().map(|app| app.package_registry.as_ref())
    }
}

impl std::fmt::Debug for ProbeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeContext")
            .field("attached", &self.is_attached())
            .finish()
    }
}
