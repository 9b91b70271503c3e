//! C entry points
//!
//! Every export returns a library-owned, NUL-terminated UTF-8 string that
//! stays valid until passed to [`FreeString`]. Failures of the call itself
//! come back as a `boundary-error` marker; panics are caught and never
//! unwind into the caller.

#![allow(non_snake_case)]

use crate::config::DistillConfig;
use crate::error::{BoundaryError, ConfigError};
use crate::ffi::{boundary, buffers};
use crate::pipeline::{Distiller, ResultSet};
use crate::Error;
use std::ffi::{c_char, CStr};
use std::panic::{self, AssertUnwindSafe};
use tracing::error;

/// Run a batch to completion on a runtime owned by this call
pub fn process_blocking(urls: Vec<String>, config: DistillConfig) -> Result<ResultSet, BoundaryError> {
    // The semaphore bounds URL concurrency; threads beyond the core count add nothing.
    let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
    let workers = config.workers.clamp(1, cores);
    let distiller = Distiller::new(config).map_err(|e| match e {
        Error::Config(e @ ConfigError::InvalidValue { .. }) => {
            BoundaryError::MalformedBatch(format!("config: {}", e))
        }
        other => BoundaryError::Internal(other.to_string()),
    })?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(workers)
        .enable_all()
        .build()
        .map_err(|e| BoundaryError::Internal(format!("runtime: {}", e)))?;
    Ok(runtime.block_on(distiller.process(&urls)))
}

/// Run `body`, turn its outcome into a wire string and publish it
fn respond<F>(body: F) -> *mut c_char
where
    F: FnOnce() -> Result<String, BoundaryError>,
{
    let encoded = match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(encoded)) => encoded,
        Ok(Err(e)) => {
            error!("Call rejected: {}", e);
            boundary::encode_boundary_error(&e)
        }
        Err(_) => {
            error!("Panic caught at the C boundary");
            boundary::encode_boundary_error(&BoundaryError::Internal("panic".to_string()))
        }
    };
    buffers::publish(encoded)
}

/// Borrow a C string as UTF-8
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that stays valid
/// for the duration of the call.
unsafe fn read_input(ptr: *const c_char) -> Result<String, BoundaryError> {
    if ptr.is_null() {
        return Err(BoundaryError::NullInput);
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map(str::to_string)
        .map_err(|e| BoundaryError::InvalidEncoding(e.to_string()))
}

/// Distill one URL
///
/// Returns the distilled text or an error marker. Release the result with
/// [`FreeString`].
///
/// # Safety
///
/// `url` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn Process(url: *const c_char) -> *mut c_char {
    respond(|| {
        let url = boundary::parse_single(&read_input(url)?)?;
        let set = process_blocking(vec![url], DistillConfig::from_env())?;
        let result = set
            .iter()
            .next()
            .ok_or_else(|| BoundaryError::Internal("no result".to_string()))?;
        Ok(boundary::encode_result(result))
    })
}

/// Distill a newline- or comma-separated list of URLs
///
/// Returns one record per URL, in order, joined by U+001E.
///
/// # Safety
///
/// `urls` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn ProcessBatch(urls: *const c_char) -> *mut c_char {
    respond(|| {
        let urls = boundary::parse_batch(&read_input(urls)?)?;
        let set = process_blocking(urls, DistillConfig::from_env())?;
        Ok(boundary::encode_result_set(&set))
    })
}

/// Like [`ProcessBatch`], with a JSON configuration object
///
/// A null `config_json` uses the defaults.
///
/// # Safety
///
/// Both arguments must be null or valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn ProcessWithConfig(urls: *const c_char, config_json: *const c_char) -> *mut c_char {
    respond(|| {
        let urls = boundary::parse_batch(&read_input(urls)?)?;
        let config = if config_json.is_null() {
            DistillConfig::from_env()
        } else {
            boundary::parse_config(&read_input(config_json)?)?
        };
        let set = process_blocking(urls, config)?;
        Ok(boundary::encode_result_set(&set))
    })
}

/// Release a string returned by any export
///
/// Null, unknown and already released pointers are ignored.
///
/// # Safety
///
/// The caller must not use `ptr` after this call.
#[no_mangle]
pub unsafe extern "C" fn FreeString(ptr: *mut c_char) {
    let _ = panic::catch_unwind(|| buffers::release(ptr));
}
