// MysticMovies Mobile Core
// Copyright (C) 2025 MysticMovies contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! JNI bridge for Android
//!
//! Kotlin (`com.mysticmovies.core.MysticCore`) → JNI → Rust. Each native
//! method takes one JSON parameter string and returns the same
//! `{ "success": bool, "data" | "error" }` envelope as the C bridge in
//! [`ffi`](crate::ffi); both dispatch to the same operations.
//!
//! ```kotlin
//! object MysticCore {
//!     init { System.loadLibrary("mystic_core") }
//!     external fun nativeInit(params: String): String
//!     external fun nativeLaunch(params: String): String
//!     external fun nativeFetchContent(params: String): String
//!     external fun nativeAccessOpen(params: String): String
//!     // ...
//! }
//! ```

use crate::ffi::{self, catch_panic, result_to_json};
use jni::objects::{JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Convert JString to Rust String
fn jstring_to_string(env: &mut JNIEnv, jstr: JString) -> crate::Result<String> {
    if jstr.is_null() {
        return Ok(String::new());
    }
    env.get_string(&jstr)
        .map(|s| s.into())
        .map_err(|e| crate::MysticError::invalid_input(format!("JNI string conversion failed: {}", e)))
}

/// Read the parameter string, run `handler`, and hand back a Java string
fn call_jni(env: &mut JNIEnv, params: JString, handler: fn(&str) -> String) -> jstring {
    let response = match jstring_to_string(env, params) {
        Ok(params) => catch_panic(|| handler(&params)),
        Err(e) => result_to_json::<()>(Err(e)),
    };

    env.new_string(response)
        .map(|s| s.into_raw())
        .unwrap_or(std::ptr::null_mut())
}

// ============================================================================
// LIFECYCLE
// ============================================================================

#[no_mangle]
pub extern "C" fn Java_com_mysticmovies_core_MysticCore_nativeInit(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_jni(&mut env, params_json, ffi::handle_init)
}

#[no_mangle]
pub extern "C" fn Java_com_mysticmovies_core_MysticCore_nativeLaunch(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_jni(&mut env, params_json, ffi::handle_launch)
}

// ============================================================================
// CATALOG AND CONTENT
// ============================================================================

#[no_mangle]
pub extern "C" fn Java_com_mysticmovies_core_MysticCore_nativeFetchCatalog(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_jni(&mut env, params_json, ffi::handle_fetch_catalog)
}

#[no_mangle]
pub extern "C" fn Java_com_mysticmovies_core_MysticCore_nativeSearchSuggestions(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_jni(&mut env, params_json, ffi::handle_search)
}

#[no_mangle]
pub extern "C" fn Java_com_mysticmovies_core_MysticCore_nativeFetchContent(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_jni(&mut env, params_json, ffi::handle_fetch_content)
}

// ============================================================================
// SESSION AND PROFILE
// ============================================================================

#[no_mangle]
pub extern "C" fn Java_com_mysticmovies_core_MysticCore_nativeFetchSession(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_jni(&mut env, params_json, ffi::handle_fetch_session)
}

#[no_mangle]
pub extern "C" fn Java_com_mysticmovies_core_MysticCore_nativeLoginUrl(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_jni(&mut env, params_json, ffi::handle_login_url)
}

#[no_mangle]
pub extern "C" fn Java_com_mysticmovies_core_MysticCore_nativeCompleteLogin(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_jni(&mut env, params_json, ffi::handle_complete_login)
}

#[no_mangle]
pub extern "C" fn Java_com_mysticmovies_core_MysticCore_nativeLogout(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_jni(&mut env, params_json, ffi::handle_logout)
}

#[no_mangle]
pub extern "C" fn Java_com_mysticmovies_core_MysticCore_nativeFetchProfile(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_jni(&mut env, params_json, ffi::handle_fetch_profile)
}

#[no_mangle]
pub extern "C" fn Java_com_mysticmovies_core_MysticCore_nativeRequestContent(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_jni(&mut env, params_json, ffi::handle_request_content)
}

// ============================================================================
// SCREEN ACCESS
// ============================================================================

#[no_mangle]
pub extern "C" fn Java_com_mysticmovies_core_MysticCore_nativeAccessOpen(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_jni(&mut env, params_json, ffi::handle_access_open)
}

#[no_mangle]
pub extern "C" fn Java_com_mysticmovies_core_MysticCore_nativeAccessRequestLogin(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_jni(&mut env, params_json, ffi::handle_access_request_login)
}

#[no_mangle]
pub extern "C" fn Java_com_mysticmovies_core_MysticCore_nativeAccessLoginCallback(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_jni(&mut env, params_json, ffi::handle_access_login_callback)
}

#[no_mangle]
pub extern "C" fn Java_com_mysticmovies_core_MysticCore_nativeAccessResume(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_jni(&mut env, params_json, ffi::handle_access_resume)
}

#[no_mangle]
pub extern "C" fn Java_com_mysticmovies_core_MysticCore_nativeAccessClose(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_jni(&mut env, params_json, ffi::handle_access_close)
}

// ============================================================================
// ACTIONS AND PLAYBACK
// ============================================================================

#[no_mangle]
pub extern "C" fn Java_com_mysticmovies_core_MysticCore_nativeResolveAction(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_jni(&mut env, params_json, ffi::handle_resolve_action)
}

#[no_mangle]
pub extern "C" fn Java_com_mysticmovies_core_MysticCore_nativeSaveProgress(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_jni(&mut env, params_json, ffi::handle_save_progress)
}

#[no_mangle]
pub extern "C" fn Java_com_mysticmovies_core_MysticCore_nativeContinueWatching(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_jni(&mut env, params_json, ffi::handle_continue_watching)
}
