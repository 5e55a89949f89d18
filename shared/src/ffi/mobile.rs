//! Mobile FFI interface for anco_env
//!
//! The native half of the Android plugin. The host's channel glue owns a
//! plugin handle for the lifetime of its engine attachment and forwards
//! every channel call as a JSON request.
//!
//! # Usage Pattern
//!
//! 1. `anco_env_plugin_create` when the plugin is registered
//! 2. `anco_env_plugin_attach` with the `JavaVM` and application `Context`
//! 3. `anco_env_plugin_handle_call` per method call; the returned JSON
//!    envelope is freed with `anco_env_free_string`
//! 4. `anco_env_plugin_detach`, then `anco_env_plugin_destroy`
//!
//! Requests look like `{"method":"getProp","arguments":{"key":"ro.build.flavor"}}`.
//! Responses are `{"status":"success","result":...}`,
//! `{"status":"error","code":...,"message":...}` or
//! `{"status":"not_implemented"}`.

use std::ffi::c_void;
use std::os::raw::c_char;
use std::ptr;
use std::sync::{Arc, Mutex};

use crate::channel::AncoEnvPlugin;
use crate::core::errors::PlatformResult;
use crate::core::AppBindings;
use crate::ffi::common::{c_string_to_rust, rust_string_to_c, AncoEnvError};
use crate::platform::ShellPackageRegistry;

/// Handle type for plugin instances
pub type PluginHandle = *mut PluginInstance;

/// Internal plugin instance
pub struct PluginInstance {
    plugin: Mutex<AncoEnvPlugin>,
}

impl PluginInstance {
    fn new() -> Self {
        Self {
            plugin: Mutex::new(AncoEnvPlugin::native()),
        }
    }
}

/// Services bound on attach
///
/// With a VM and context the lookups go through JNI. Without them the
/// `pm` command answers package queries.
fn app_bindings(java_vm: *mut c_void, context: *mut c_void) -> PlatformResult<AppBindings> {
    #[cfg(target_os = "android")]
    {
        use crate::platform::android;

        if !java_vm.is_null() && !context.is_null() {
            unsafe { android::install_android_context(java_vm, context)? };
            return Ok(AppBindings::new(Arc::new(android::JniPackageRegistry))
                .with_runtime_properties(Arc::new(android::JniRuntimeProperties)));
        }
    }

    let _ = (java_vm, context);
    Ok(AppBindings::new(Arc::new(ShellPackageRegistry::new())))
}

/// Create a new plugin instance
///
/// # Safety
/// The returned handle must be freed with `anco_env_plugin_destroy`
#[no_mangle]
pub extern "C" fn anco_env_plugin_create() -> PluginHandle {
    let instance = Box::new(PluginInstance::new());
    crate::log_debug!("Plugin instance created");
    Box::into_raw(instance)
}

/// Destroy a plugin instance
///
/// # Safety
/// Handle must be valid and not used after this call
#[no_mangle]
pub unsafe extern "C" fn anco_env_plugin_destroy(handle: PluginHandle) {
    if handle.is_null() {
        return;
    }

    let instance = Box::from_raw(handle);

    #[cfg(target_os = "android")]
    {
        let attached = instance
            .plugin
            .lock()
            .map(|plugin| plugin.is_attached())
            .unwrap_or(false);
        if attached {
            crate::platform::android::release_android_context();
        }
    }

    drop(instance);
}

/// Attach the plugin to the host application
///
/// # Arguments
/// * `handle` - Plugin handle
/// * `java_vm` - The host's `JavaVM*`, or null
/// * `context` - Global reference to the application `Context`, or null
///
/// # Returns
/// * `AncoEnvError::Success` on success
/// * `AncoEnvError::InvalidParameter` if handle is null
///
/// # Safety
/// Non-null `java_vm` and `context` must stay valid until detach.
#[no_mangle]
pub unsafe extern "C" fn anco_env_plugin_attach(
    handle: PluginHandle,
    java_vm: *mut c_void,
    context: *mut c_void,
) -> AncoEnvError {
    if handle.is_null() {
        return AncoEnvError::InvalidParameter;
    }

    let instance = &*handle;
    let mut plugin = match instance.plugin.lock() {
        Ok(plugin) => plugin,
        Err(_) => return AncoEnvError::InternalError,
    };

    let bindings = crate::ffi_try!(app_bindings(java_vm, context));
    plugin.on_attached(bindings);
    AncoEnvError::Success
}

/// Detach the plugin from the host application
///
/// # Returns
/// * `AncoEnvError::Success` on success
/// * `AncoEnvError::InvalidParameter` if handle is null
/// * `AncoEnvError::NotAttached` if the plugin was not attached
///
/// # Safety
/// Handle must be valid
#[no_mangle]
pub unsafe extern "C" fn anco_env_plugin_detach(handle: PluginHandle) -> AncoEnvError {
    if handle.is_null() {
        return AncoEnvError::InvalidParameter;
    }

    let instance = &*handle;
    let mut plugin = match instance.plugin.lock() {
        Ok(plugin) => plugin,
        Err(_) => return AncoEnvError::InternalError,
    };

    if !plugin.is_attached() {
        return AncoEnvError::NotAttached;
    }

    plugin.on_detached();
    #[cfg(target_os = "android")]
    crate::platform::android::release_android_context();

    AncoEnvError::Success
}

/// Check if the plugin is attached
///
/// # Safety
/// Handle must be valid or null
#[no_mangle]
pub unsafe extern "C" fn anco_env_plugin_is_attached(handle: PluginHandle) -> bool {
    if handle.is_null() {
        return false;
    }

    let instance = &*handle;
    instance
        .plugin
        .lock()
        .map(|plugin| plugin.is_attached())
        .unwrap_or(false)
}

/// Handle one channel call
///
/// # Arguments
/// * `handle` - Plugin handle
/// * `request_json` - NUL-terminated UTF-8 request
///
/// # Returns
/// * JSON response envelope on success (must be freed with `anco_env_free_string`)
/// * Null if the handle or request is invalid
///
/// # Safety
/// Handle must be valid and `request_json` a valid C string or null
#[no_mangle]
pub unsafe extern "C" fn anco_env_plugin_handle_call(
    handle: PluginHandle,
    request_json: *const c_char,
) -> *mut c_char {
    if handle.is_null() {
        return ptr::null_mut();
    }

    let Some(request) = c_string_to_rust(request_json) else {
        return ptr::null_mut();
    };

    let instance = &*handle;
    let plugin = match instance.plugin.lock() {
        Ok(plugin) => plugin,
        Err(_) => {
            crate::log_error!("Plugin state lock poisoned");
            return ptr::null_mut();
        }
    };

    rust_string_to_c(plugin.handle_json(&request))
}
