mod types;
mod error;
mod context;

pub use types::*;
pub use error::*;
pub use context::*;

use std::ffi::CString;
use std::os::raw::c_char;

use cs_sampler::{Confidence, Cutoff};

/// Execute a closure that returns a `CSStatus`, catching any panics
/// and converting them into `CSStatus::ErrorInternal`.
fn catch_panic<F: FnOnce() -> CSStatus + std::panic::UnwindSafe>(f: F) -> CSStatus {
    match std::panic::catch_unwind(f) {
        Ok(status) => status,
        Err(_) => {
            set_last_error("internal panic");
            CSStatus::ErrorInternal
        }
    }
}

/// Create a sampler for one generation stream.
///
/// On success, writes a heap-allocated `CSSampler` pointer into `*out`
/// and returns `CSStatus::Ok`. The caller must later call `cs_sampler_destroy`.
#[no_mangle]
pub unsafe extern "C" fn cs_sampler_create(
    params: CSSamplerParams,
    out: *mut *mut CSSampler,
) -> CSStatus {
    catch_panic(|| {
        if out.is_null() {
            set_last_error("out is null");
            return CSStatus::ErrorInvalidArgument;
        }
        match CSSampler::new(&params) {
            Ok(s) => {
                unsafe { *out = Box::into_raw(Box::new(s)) };
                CSStatus::Ok
            }
            Err(e) => {
                set_last_error(e.to_string());
                CSStatus::ErrorInvalidInput
            }
        }
    })
}

/// Destroy a sampler created by `cs_sampler_create`.
///
/// Passing a null pointer is a no-op and returns `CSStatus::Ok`.
#[no_mangle]
pub unsafe extern "C" fn cs_sampler_destroy(ctx: *mut CSSampler) -> CSStatus {
    if ctx.is_null() {
        return CSStatus::Ok;
    }
    drop(Box::from_raw(ctx));
    CSStatus::Ok
}

/// Change the cutoff used by subsequent `cs_sampler_sample` calls.
#[no_mangle]
pub unsafe extern "C" fn cs_sampler_set_cutoff(ctx: *mut CSSampler, cutoff: f32) -> CSStatus {
    if ctx.is_null() {
        set_last_error("ctx is null");
        return CSStatus::ErrorInvalidArgument;
    }
    let ctx = &mut *ctx;
    match Cutoff::new(cutoff) {
        Ok(co) => {
            ctx.sampler.set_cutoff(co);
            CSStatus::Ok
        }
        Err(e) => {
            set_last_error(e.to_string());
            CSStatus::ErrorInvalidInput
        }
    }
}

/// Sample the next token from `len` logits.
///
/// On success, writes the chosen token, the top probability, the admissible
/// set size and the confidence bucket into `*out`. On `ErrorInvalidInput`
/// the caller should abort the step; nothing is written.
#[no_mangle]
pub unsafe extern "C" fn cs_sampler_sample(
    ctx: *mut CSSampler,
    logits: *const f32,
    len: usize,
    out: *mut CSSample,
) -> CSStatus {
    catch_panic(|| {
        if ctx.is_null() || out.is_null() || (logits.is_null() && len > 0) {
            set_last_error("null argument");
            return CSStatus::ErrorInvalidArgument;
        }
        let ctx = unsafe { &mut *ctx };
        let logits: &[f32] = if len == 0 {
            &[]
        } else {
            unsafe { std::slice::from_raw_parts(logits, len) }
        };

        match ctx.sampler.sample(logits) {
            Ok(sample) => {
                unsafe { *out = sample.into() };
                CSStatus::Ok
            }
            Err(e) => {
                set_last_error(e.to_string());
                CSStatus::ErrorInvalidInput
            }
        }
    })
}

/// Classify a top probability into a confidence bucket.
#[no_mangle]
pub unsafe extern "C" fn cs_confidence_classify(t0: f32, out: *mut CSConfidence) -> CSStatus {
    if out.is_null() {
        set_last_error("out is null");
        return CSStatus::ErrorInvalidArgument;
    }
    match Confidence::classify(t0) {
        Ok(c) => {
            *out = c.into();
            CSStatus::Ok
        }
        Err(e) => {
            set_last_error(e.to_string());
            CSStatus::ErrorInvalidInput
        }
    }
}

/// Static, NUL-terminated label for a confidence bucket. Must not be freed.
#[no_mangle]
pub extern "C" fn cs_confidence_label(confidence: CSConfidence) -> *const c_char {
    let label: &'static [u8] = match confidence {
        CSConfidence::Highest => b"highest\0",
        CSConfidence::High => b"high\0",
        CSConfidence::Medium => b"medium\0",
        CSConfidence::Low => b"low\0",
    };
    label.as_ptr() as *const c_char
}

/// Retrieve the last error message for the calling thread.
///
/// Returns null if no error has occurred. The caller must free the returned
/// string with `cs_free_string`.
#[no_mangle]
pub extern "C" fn cs_last_error() -> *mut c_char {
    match error::take_last_error() {
        Some(e) => e.into_raw(),
        None => std::ptr::null_mut(),
    }
}

/// Free a string previously returned by `cs_last_error`.
#[no_mangle]
pub unsafe extern "C" fn cs_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
