//! Core modules for the anco_env probe
//!
//! - Platform seams the probe reads through, with a mock implementation
//! - The probe context and its attach/detach lifecycle
//! - The build field catalogue
//! - The environment probe itself
//! - Error handling and report types

pub mod build_info;
pub mod context;
pub mod errors;
pub mod probe;
pub mod provider;
pub mod types;

// Re-export commonly used items
pub use build_info::{collect_build_facts, BuildField, VersionField};
pub use context::{AppBindings, ProbeContext};
pub use errors::{
    ChannelError, ChannelResult, ConfigError, ConfigResult, PlatformError, PlatformResult,
};
pub use probe::{
    parse_property_dump, EnvironmentProbe, ANCO_API_VERSION_PROPERTY, ANCO_DEVICE_PROPERTY,
    ANCO_MARKER, BUILD_FLAVOR_PROPERTY, PROPERTY_DUMP_ERROR_KEY,
};
pub use provider::{
    CommandRunner, MockPlatform, PackageRegistry, PathProbe, RuntimePropertySource,
    SystemPropertySource,
};
pub use types::{EnvironmentReport, FactMap, PresenceMap, REPORT_CATEGORIES};
