//! Returned-buffer arena
//!
//! Every string handed across the C boundary is parked here, keyed by its
//! address, until the caller releases it. Entries are only ever dropped by
//! [`release`], so a buffer stays valid and unmodified for as long as the
//! caller holds it. A caller that never releases leaks that buffer and
//! nothing else.

use parking_lot::{const_mutex, Mutex};
use std::collections::BTreeMap;
use std::ffi::{c_char, CString};
use tracing::debug;

static BUFFERS: Mutex<BTreeMap<usize, CString>> = const_mutex(BTreeMap::new());

/// Park `text` and return a pointer to its NUL-terminated bytes
///
/// Interior NULs are removed.
pub fn publish(text: String) -> *mut c_char {
    let owned = match CString::new(text) {
        Ok(owned) => owned,
        Err(e) => {
            let mut bytes = e.into_vec();
            bytes.retain(|&b| b != 0);
            CString::new(bytes).unwrap_or_default()
        }
    };
    let ptr = owned.as_ptr() as *mut c_char;
    BUFFERS.lock().insert(ptr as usize, owned);
    ptr
}

/// Release a buffer returned by [`publish`]
///
/// Returns false for null, unknown or already released pointers.
pub fn release(ptr: *const c_char) -> bool {
    if ptr.is_null() {
        return false;
    }
    let released = BUFFERS.lock().remove(&(ptr as usize)).is_some();
    if !released {
        debug!("Ignoring release of unknown buffer {:p}", ptr);
    }
    released
}

/// Whether `ptr` is a live buffer
pub fn is_live(ptr: *const c_char) -> bool {
    !ptr.is_null() && BUFFERS.lock().contains_key(&(ptr as usize))
}

/// Number of buffers awaiting release
pub fn live_count() -> usize {
    BUFFERS.lock().len()
}
