use crate::config::{ConfigParam, ConfigValues};

/// Current ABI version. Host checks this against the plugin's
/// `sf_abi_version()` before loading anything else.
pub const SF_ABI_VERSION: u32 = 1;

/// FFI return struct from `sf_create_*` functions.
#[repr(C)]
pub struct PluginCreateResult {
    /// Pointer to the created plugin object (Box<Box<dyn Trait>>).
    /// Null if creation failed.
    pub plugin_ptr: *mut (),
    /// Pointer to a heap-allocated error string.
    /// Null if creation succeeded.
    pub error_ptr: *mut u8,
    /// Length of the error string.
    pub error_len: usize,
}

/// Type signature for the `sf_abi_version` symbol.
pub type AbiVersionFn = unsafe extern "C" fn() -> u32;

/// Type signature for the `sf_config_params` symbol.
/// Returns a pointer to a boxed `Vec<ConfigParam>`. Caller takes ownership.
pub type ConfigParamsFn = unsafe extern "C" fn() -> *mut ();

/// Type signature for `sf_create_*` symbols.
/// Takes a pointer to engine-owned `ConfigValues` (plugin borrows, does not own).
pub type CreatePluginFn = unsafe extern "C" fn(*const ()) -> PluginCreateResult;

/// Type signature for `sf_destroy_*` symbols.
pub type DestroyPluginFn = unsafe extern "C" fn(*mut ());

/// Helper: create a successful `PluginCreateResult` from a trait object.
pub fn plugin_ok<T: ?Sized>(plugin: Box<Box<T>>) -> PluginCreateResult {
    PluginCreateResult {
        plugin_ptr: Box::into_raw(plugin) as *mut (),
        error_ptr: std::ptr::null_mut(),
        error_len: 0,
    }
}

/// Helper: create a failed `PluginCreateResult` from an error message.
pub fn plugin_err(msg: &str) -> PluginCreateResult {
    let bytes = msg.as_bytes().to_vec();
    let len = bytes.len();
    let ptr = Box::into_raw(bytes.into_boxed_slice()) as *mut u8;
    PluginCreateResult {
        plugin_ptr: std::ptr::null_mut(),
        error_ptr: ptr,
        error_len: len,
    }
}

/// Helper: return config params from plugin to engine.
/// Engine reconstructs as `Box<Vec<ConfigParam>>` and takes ownership.
pub fn config_params_ok(params: Vec<ConfigParam>) -> *mut () {
    Box::into_raw(Box::new(params)) as *mut ()
}

/// Cast an FFI config pointer to a `&ConfigValues` reference.
///
/// # Safety
///
/// `ptr` must be a valid pointer to a `ConfigValues` value owned by the engine.
pub unsafe fn config_from_ptr<'a>(ptr: *const ()) -> &'a ConfigValues {
    unsafe { &*(ptr as *const ConfigValues) }
}

/// Macro: export the `sf_abi_version` function.
#[macro_export]
macro_rules! sf_abi_version_fn {
    () => {
        #[unsafe(no_mangle)]
        pub extern "C" fn sf_abi_version() -> u32 {
            $crate::ffi::SF_ABI_VERSION
        }
    };
}

/// Macro: export the `sf_config_params` function.
///
/// Takes the parameter list inline; plugins with no parameters export an
/// empty list: `sf_config_params_fn!([])`.
#[macro_export]
macro_rules! sf_config_params_fn {
    ([$($param:expr),* $(,)?]) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn sf_config_params() -> *mut () {
            $crate::ffi::config_params_ok(vec![$($param),*])
        }
    };
}

/// Macro: export an `sf_destroy_*` function for a trait object.
#[macro_export]
macro_rules! sf_destroy_fn {
    ($name:ident, $trait_ty:path) => {
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $name(ptr: *mut ()) {
            if !ptr.is_null() {
                let _ = unsafe { Box::from_raw(ptr as *mut Box<dyn $trait_ty>) };
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_err_carries_the_message() {
        let result = plugin_err("invalid config JSON");
        assert!(result.plugin_ptr.is_null());
        assert!(!result.error_ptr.is_null());

        // Reconstruct the way the host does
        let msg = unsafe {
            let slice = std::slice::from_raw_parts(result.error_ptr, result.error_len);
            String::from_utf8_lossy(slice).into_owned()
        };
        assert_eq!(msg, "invalid config JSON");

        unsafe {
            let _ = Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                result.error_ptr,
                result.error_len,
            ));
        }
    }

    #[test]
    fn plugin_ok_round_trips_a_trait_object() {
        trait Named {
            fn name(&self) -> &'static str;
        }
        struct Probe;
        impl Named for Probe {
            fn name(&self) -> &'static str {
                "probe"
            }
        }

        let result = plugin_ok(Box::new(Box::new(Probe) as Box<dyn Named>));
        assert!(result.error_ptr.is_null());

        let plugin = unsafe { Box::from_raw(result.plugin_ptr as *mut Box<dyn Named>) };
        assert_eq!(plugin.name(), "probe");
    }
}
