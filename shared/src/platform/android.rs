//! Android services that go through the Java VM
//!
//! The host application hands over its `JavaVM` and application
//! `Context` when the plugin is attached. Both are registered with
//! `ndk-context`, which is where these lookups read them from.

use std::ffi::c_void;
use std::sync::atomic::{AtomicBool, Ordering};

use jni::objects::{JObject, JString, JValue};
use jni::{AttachGuard, JavaVM};

use crate::core::errors::{PlatformError, PlatformResult};
use crate::core::provider::{PackageRegistry, RuntimePropertySource};

/// Whether this library registered the current ndk context
static CONTEXT_INSTALLED: AtomicBool = AtomicBool::new(false);

fn jni_error(error: jni::errors::Error) -> PlatformError {
    PlatformError::Jni {
        message: error.to_string(),
    }
}

/// Register the host's Java VM and application context
///
/// # Safety
///
/// `java_vm` must point to a live `JavaVM` and `context` must be a
/// global reference to an `android.content.Context`. Both must stay valid
/// until [`release_android_context`] is called.
pub unsafe fn install_android_context(
    java_vm: *mut c_void,
    context: *mut c_void,
) -> PlatformResult<()> {
    if java_vm.is_null() || context.is_null() {
        return Err(PlatformError::ContextUnavailable);
    }

    if CONTEXT_INSTALLED.swap(true, Ordering::SeqCst) {
        ndk_context::release_android_context();
    }
    ndk_context::initialize_android_context(java_vm, context);

    crate::log_debug!("Android context registered");
    Ok(())
}

/// Drop the context registered by [`install_android_context`]
pub fn release_android_context() {
    if CONTEXT_INSTALLED.swap(false, Ordering::SeqCst) {
        // SAFETY: only releases the context this module initialized
        unsafe { ndk_context::release_android_context() };
        crate::log_debug!("Android context released");
    }
}

/// Check if a Java VM is available for lookups
pub fn has_android_context() -> bool {
    CONTEXT_INSTALLED.load(Ordering::SeqCst)
}

fn vm() -> PlatformResult<JavaVM> {
    if !has_android_context() {
        return Err(PlatformError::ContextUnavailable);
    }

    // SAFETY: the pointer was validated when the context was installed
    unsafe { JavaVM::from_raw(ndk_context::android_context().vm().cast()) }.map_err(jni_error)
}

fn app_context<'a>() -> JObject<'a> {
    // SAFETY: the context is a global reference owned by the host
    unsafe { JObject::from_raw(ndk_context::android_context().context().cast()) }
}

fn clear_pending_exception(env: &mut AttachGuard<'_>) {
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_clear();
    }
}

/// `java.lang.System.getProperty` of the host process
#[derive(Debug, Clone, Copy, Default)]
pub struct JniRuntimeProperties;

impl JniRuntimeProperties {
    fn system_property(key: &str) -> PlatformResult<Option<String>> {
        let vm = vm()?;
        let mut env = vm.attach_current_thread().map_err(jni_error)?;

        let jkey = env.new_string(key).map_err(jni_error)?;
        let value = env
            .call_static_method(
                "java/lang/System",
                "getProperty",
                "(Ljava/lang/String;)Ljava/lang/String;",
                &[JValue::Object(&jkey)],
            )
            .and_then(|v| v.l());

        let value = match value {
            Ok(value) => value,
            Err(e) => {
                clear_pending_exception(&mut env);
                return Err(jni_error(e));
            }
        };

        if value.is_null() {
            return Ok(None);
        }

        let jvalue = JString::from(value);
        let text: String = env.get_string(&jvalue).map_err(jni_error)?.into();
        Ok(Some(text))
    }
}

impl RuntimePropertySource for JniRuntimeProperties {
    fn runtime_property(&self, key: &str) -> Option<String> {
        match Self::system_property(key) {
            Ok(value) => value,
            Err(e) => {
                crate::log_debug!("System.getProperty({}) failed: {}", key, e);
                None
            }
        }
    }
}

/// Installed package lookups through `PackageManager.getPackageInfo`
#[derive(Debug, Clone, Copy, Default)]
pub struct JniPackageRegistry;

impl PackageRegistry for JniPackageRegistry {
    fn is_package_installed(&self, package: &str) -> PlatformResult<bool> {
        let vm = vm()?;
        let mut env = vm.attach_current_thread().map_err(jni_error)?;
        let context = app_context();

        let package_manager = env
            .call_method(
                &context,
                "getPackageManager",
                "()Landroid/content/pm/PackageManager;",
                &[],
            )
            .and_then(|v| v.l());
        let package_manager = match package_manager {
            Ok(pm) => pm,
            Err(e) => {
                clear_pending_exception(&mut env);
                return Err(jni_error(e));
            }
        };

        let jpackage = env.new_string(package).map_err(jni_error)?;
        let info = env.call_method(
            &package_manager,
            "getPackageInfo",
            "(Ljava/lang/String;I)Landroid/content/pm/PackageInfo;",
            &[JValue::Object(&jpackage), JValue::Int(0)],
        );

        match info {
            Ok(_) => Ok(true),
            // NameNotFoundException
            Err(jni::errors::Error::JavaException) => {
                clear_pending_exception(&mut env);
                Err(PlatformError::PackageNotFound {
                    package: package.to_string(),
                })
            }
            Err(e) => {
                clear_pending_exception(&mut env);
                Err(jni_error(e))
            }
        }
    }
}
