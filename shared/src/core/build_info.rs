//! Build metadata catalogue
//!
//! Android's `android.os.Build` constants are initialised from system
//! properties when the framework boots. Instead of enumerating them through
//! reflection, every field is listed here with the property that backs it,
//! and read through a [`SystemPropertySource`].

use crate::core::errors::{PlatformError, PlatformResult};
use crate::core::provider::SystemPropertySource;
use crate::core::types::FactMap;

/// Value `Build` reports for an empty string property
pub const UNKNOWN: &str = "unknown";

/// How the raw property value maps to the field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    /// Value used as-is, [`UNKNOWN`] when empty
    Verbatim,
    /// Property holds seconds since the epoch, field holds milliseconds
    SecondsToMillis,
    /// Property holds `1`/`0`, field holds a boolean
    Flag,
    /// Field is whether the property equals the given value
    Equals(&'static str),
}

/// Top-level `Build` fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildField {
    Board,
    Bootloader,
    Brand,
    CpuAbi,
    CpuAbi2,
    Device,
    Display,
    Fingerprint,
    Hardware,
    Host,
    Id,
    IsDebuggable,
    IsEmulator,
    IsEng,
    IsUser,
    IsUserdebug,
    Manufacturer,
    Model,
    OdmSku,
    Product,
    Radio,
    Serial,
    Sku,
    SocManufacturer,
    SocModel,
    Supported32BitAbis,
    Supported64BitAbis,
    SupportedAbis,
    Tags,
    Time,
    Type,
    User,
}

impl BuildField {
    /// All fields, in report order
    pub const ALL: [BuildField; 32] = [
        BuildField::Board,
        BuildField::Bootloader,
        BuildField::Brand,
        BuildField::CpuAbi,
        BuildField::CpuAbi2,
        BuildField::Device,
        BuildField::Display,
        BuildField::Fingerprint,
        BuildField::Hardware,
        BuildField::Host,
        BuildField::Id,
        BuildField::IsDebuggable,
        BuildField::IsEmulator,
        BuildField::IsEng,
        BuildField::IsUser,
        BuildField::IsUserdebug,
        BuildField::Manufacturer,
        BuildField::Model,
        BuildField::OdmSku,
        BuildField::Product,
        BuildField::Radio,
        BuildField::Serial,
        BuildField::Sku,
        BuildField::SocManufacturer,
        BuildField::SocModel,
        BuildField::Supported32BitAbis,
        BuildField::Supported64BitAbis,
        BuildField::SupportedAbis,
        BuildField::Tags,
        BuildField::Time,
        BuildField::Type,
        BuildField::User,
    ];

    /// Java field name
    pub fn name(&self) -> &'static str {
        match self {
            BuildField::Board => "BOARD",
            BuildField::Bootloader => "BOOTLOADER",
            BuildField::Brand => "BRAND",
            BuildField::CpuAbi => "CPU_ABI",
            BuildField::CpuAbi2 => "CPU_ABI2",
            BuildField::Device => "DEVICE",
            BuildField::Display => "DISPLAY",
            BuildField::Fingerprint => "FINGERPRINT",
            BuildField::Hardware => "HARDWARE",
            BuildField::Host => "HOST",
            BuildField::Id => "ID",
            BuildField::IsDebuggable => "IS_DEBUGGABLE",
            BuildField::IsEmulator => "IS_EMULATOR",
            BuildField::IsEng => "IS_ENG",
            BuildField::IsUser => "IS_USER",
            BuildField::IsUserdebug => "IS_USERDEBUG",
            BuildField::Manufacturer => "MANUFACTURER",
            BuildField::Model => "MODEL",
            BuildField::OdmSku => "ODM_SKU",
            BuildField::Product => "PRODUCT",
            BuildField::Radio => "RADIO",
            BuildField::Serial => "SERIAL",
            BuildField::Sku => "SKU",
            BuildField::SocManufacturer => "SOC_MANUFACTURER",
            BuildField::SocModel => "SOC_MODEL",
            BuildField::Supported32BitAbis => "SUPPORTED_32_BIT_ABIS",
            BuildField::Supported64BitAbis => "SUPPORTED_64_BIT_ABIS",
            BuildField::SupportedAbis => "SUPPORTED_ABIS",
            BuildField::Tags => "TAGS",
            BuildField::Time => "TIME",
            BuildField::Type => "TYPE",
            BuildField::User => "USER",
        }
    }

    /// System property the field is initialised from
    pub fn property_key(&self) -> &'static str {
        match self {
            BuildField::Board => "ro.product.board",
            BuildField::Bootloader => "ro.bootloader",
            BuildField::Brand => "ro.product.brand",
            BuildField::CpuAbi => "ro.product.cpu.abi",
            BuildField::CpuAbi2 => "ro.product.cpu.abi2",
            BuildField::Device => "ro.product.device",
            BuildField::Display => "ro.build.display.id",
            BuildField::Fingerprint => "ro.build.fingerprint",
            BuildField::Hardware => "ro.hardware",
            BuildField::Host => "ro.build.host",
            BuildField::Id => "ro.build.id",
            BuildField::IsDebuggable => "ro.debuggable",
            BuildField::IsEmulator => "ro.boot.qemu",
            BuildField::IsEng | BuildField::IsUser | BuildField::IsUserdebug => "ro.build.type",
            BuildField::Manufacturer => "ro.product.manufacturer",
            BuildField::Model => "ro.product.model",
            BuildField::OdmSku => "ro.boot.product.hardware.sku",
            BuildField::Product => "ro.product.name",
            BuildField::Radio => "gsm.version.baseband",
            BuildField::Serial => "ro.serialno",
            BuildField::Sku => "ro.boot.hardware.sku",
            BuildField::SocManufacturer => "ro.soc.manufacturer",
            BuildField::SocModel => "ro.soc.model",
            BuildField::Supported32BitAbis => "ro.product.cpu.abilist32",
            BuildField::Supported64BitAbis => "ro.product.cpu.abilist64",
            BuildField::SupportedAbis => "ro.product.cpu.abilist",
            BuildField::Tags => "ro.build.tags",
            BuildField::Time => "ro.build.date.utc",
            BuildField::Type => "ro.build.type",
            BuildField::User => "ro.build.user",
        }
    }

    fn conversion(&self) -> Conversion {
        match self {
            BuildField::Time => Conversion::SecondsToMillis,
            BuildField::IsDebuggable | BuildField::IsEmulator => Conversion::Flag,
            BuildField::IsEng => Conversion::Equals("eng"),
            BuildField::IsUser => Conversion::Equals("user"),
            BuildField::IsUserdebug => Conversion::Equals("userdebug"),
            _ => Conversion::Verbatim,
        }
    }

    /// Read the field value
    pub fn read(&self, source: &dyn SystemPropertySource) -> PlatformResult<String> {
        let raw = source.read_property(self.property_key())?;
        convert(self.conversion(), self.property_key(), raw)
    }
}

/// `Build.VERSION` fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionField {
    SdkInt,
    Release,
    Incremental,
    Codename,
    BaseOs,
    PreviewSdkInt,
    SecurityPatch,
    ReleaseOrCodename,
}

impl VersionField {
    pub const ALL: [VersionField; 8] = [
        VersionField::SdkInt,
        VersionField::Release,
        VersionField::Incremental,
        VersionField::Codename,
        VersionField::BaseOs,
        VersionField::PreviewSdkInt,
        VersionField::SecurityPatch,
        VersionField::ReleaseOrCodename,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            VersionField::SdkInt => "SDK_INT",
            VersionField::Release => "RELEASE",
            VersionField::Incremental => "INCREMENTAL",
            VersionField::Codename => "CODENAME",
            VersionField::BaseOs => "BASE_OS",
            VersionField::PreviewSdkInt => "PREVIEW_SDK_INT",
            VersionField::SecurityPatch => "SECURITY_PATCH",
            VersionField::ReleaseOrCodename => "RELEASE_OR_CODENAME",
        }
    }

    /// Key used in the `build` category, e.g. `VERSION.SDK_INT`
    pub fn report_key(&self) -> String {
        format!("VERSION.{}", self.name())
    }

    /// Backing property, `None` for derived fields
    pub fn property_key(&self) -> Option<&'static str> {
        match self {
            VersionField::SdkInt => Some("ro.build.version.sdk"),
            VersionField::Release => Some("ro.build.version.release"),
            VersionField::Incremental => Some("ro.build.version.incremental"),
            VersionField::Codename => Some("ro.build.version.codename"),
            VersionField::BaseOs => Some("ro.build.version.base_os"),
            VersionField::PreviewSdkInt => Some("ro.build.version.preview_sdk"),
            VersionField::SecurityPatch => Some("ro.build.version.security_patch"),
            VersionField::ReleaseOrCodename => None,
        }
    }

    /// Read the field value
    pub fn read(&self, source: &dyn SystemPropertySource) -> PlatformResult<String> {
        match self.property_key() {
            Some(key) => source.read_property(key),
            None => {
                // Released builds report codename "REL"
                let codename = VersionField::Codename.read(source)?;
                if codename == "REL" {
                    VersionField::Release.read(source)
                } else {
                    Ok(codename)
                }
            }
        }
    }
}

fn convert(conversion: Conversion, key: &str, raw: String) -> PlatformResult<String> {
    let unavailable = || PlatformError::PropertyUnavailable {
        key: key.to_string(),
    };

    match conversion {
        Conversion::Verbatim if raw.is_empty() => Ok(UNKNOWN.to_string()),
        Conversion::Verbatim => Ok(raw),
        Conversion::Flag => Ok((raw.trim() == "1").to_string()),
        Conversion::Equals(expected) => Ok((raw.trim() == expected).to_string()),
        Conversion::SecondsToMillis => raw
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|seconds| seconds.checked_mul(1000))
            .map(|millis| millis.to_string())
            .ok_or_else(unavailable),
    }
}

/// Read every build and version field into a fact map
///
/// Fields that cannot be read are skipped.
pub fn collect_build_facts(source: &dyn SystemPropertySource) -> FactMap {
    let mut facts = FactMap::new();

    for field in BuildField::ALL {
        match field.read(source) {
            Ok(value) => {
                facts.insert(field.name().to_string(), value);
            }
            Err(e) => crate::log_debug!("Skipping build field {}: {}", field.name(), e),
        }
    }

    for field in VersionField::ALL {
        match field.read(source) {
            Ok(value) => {
                facts.insert(field.report_key(), value);
            }
            Err(e) => crate::log_debug!("Skipping version field {}: {}", field.name(), e),
        }
    }

    facts
}
