//! C ABI entry points the vib host resolves when it loads the plugin
//!
//! The host calls `PlugInfo` once to learn what kind of plugin this is and
//! `BuildModule` once per cargo module in a recipe. Every returned string is
//! owned by this library and must be handed back to `FreeString`.

use std::ffi::{CStr, CString, c_char};
use vib_cargo_core::{
    FsSourceFetcher, ModuleResolver, SourceFetcher, describe_plugin, plugin::ERROR_PREFIX,
    wire_result,
};

/// JSON description of this plugin
pub fn plug_info() -> String {
    describe_plugin().to_json()
}

/// Builds a module with the filesystem fetcher and default settings
pub fn build_module(module_json: &str, recipe_json: &str, arch: &str) -> String {
    build_module_with(FsSourceFetcher, module_json, recipe_json, arch)
}

pub fn build_module_with<F: SourceFetcher>(
    fetcher: F,
    module_json: &str,
    recipe_json: &str,
    arch: &str,
) -> String {
    let resolver = ModuleResolver::new(fetcher);
    wire_result(resolver.build_command(module_json, recipe_json, arch))
}

fn into_c_string(value: String) -> *mut c_char {
    let value = CString::new(value.replace('\0', "")).unwrap_or_default();
    value.into_raw()
}

/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that stays valid
/// for the returned lifetime.
unsafe fn read_c_str<'a>(ptr: *const c_char, what: &str) -> Result<&'a str, String> {
    if ptr.is_null() {
        return Err(format!("{ERROR_PREFIX}{what} is a null pointer"));
    }
    let raw = unsafe { CStr::from_ptr(ptr) };
    raw.to_str()
        .map_err(|e| format!("{ERROR_PREFIX}{what} is not valid UTF-8: {e}"))
}

#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub extern "C" fn PlugInfo() -> *mut c_char {
    into_c_string(plug_info())
}

/// # Safety
///
/// Each argument must be null or a valid NUL-terminated string. The result
/// must be released with [`FreeString`].
#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn BuildModule(
    module: *const c_char,
    recipe: *const c_char,
    arch: *const c_char,
) -> *mut c_char {
    let inputs = unsafe {
        read_c_str(module, "module").and_then(|module| {
            let recipe = read_c_str(recipe, "recipe")?;
            let arch = read_c_str(arch, "arch")?;
            Ok((module, recipe, arch))
        })
    };

    let result = match inputs {
        Ok((module, recipe, arch)) => build_module(module, recipe, arch),
        Err(message) => message,
    };
    tracing::debug!("BuildModule returning {} bytes", result.len());
    into_c_string(result)
}

/// # Safety
///
/// `ptr` must be null or a pointer previously returned by [`PlugInfo`] or
/// [`BuildModule`] that has not been freed yet.
#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn FreeString(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}
