// HTTP entry points. Every issued call reports back exactly once through the
// registered completion function, possibly from another thread.

use crate::{c_str, init_logging};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use playdeck_transport_http::{HttpBridge, HttpConfig, HttpRequest, HttpResponse};
use std::os::raw::c_char;
use std::ptr;
use std::sync::Arc;

/// Native completion function
///
/// `body` and `header` are UTF-8 bytes without a terminating NUL and are only
/// valid for the duration of the call. An absent value is a null pointer with
/// length 0. Status 0 means the request failed.
pub type HttpCompletionFn = extern "C" fn(
    callback_id: i32,
    status: i32,
    body: *const c_char,
    body_len: usize,
    header: *const c_char,
    header_len: usize,
);

static COMPLETION: Lazy<RwLock<Option<HttpCompletionFn>>> = Lazy::new(|| RwLock::new(None));

static BRIDGE: Lazy<HttpBridge> = Lazy::new(|| {
    init_logging();
    HttpBridge::new(HttpConfig::default(), Arc::new(deliver))
});

fn raw_parts(text: Option<&str>) -> (*const c_char, usize) {
    match text {
        Some(text) => (text.as_ptr() as *const c_char, text.len()),
        None => (ptr::null(), 0),
    }
}

fn deliver(response: HttpResponse) {
    let completion = *COMPLETION.read();
    let Some(completion) = completion else {
        log::warn!(
            "[ffi] no completion function registered, dropping result for callback {}",
            response.callback_id
        );
        return;
    };

    let (body, body_len) = raw_parts(response.body.as_deref());
    let (header, header_len) = raw_parts(response.header.as_deref());
    completion(
        response.callback_id,
        i32::from(response.status),
        body,
        body_len,
        header,
        header_len,
    );
}

/// Register (or clear, with null) the completion function
#[no_mangle]
pub extern "C" fn playdeck_http_set_callback(completion: Option<HttpCompletionFn>) {
    init_logging();
    *COMPLETION.write() = completion;
}

fn address_of<'a>(address: *const c_char, callback_id: i32) -> &'a str {
    match c_str(address) {
        Some(address) => address,
        None => {
            // An empty address fails inside the worker and reports status 0
            log::warn!("[ffi] null or non UTF-8 address for callback {}", callback_id);
            ""
        }
    }
}

fn payload_of<'a>(body: *const u8, body_len: usize) -> &'a [u8] {
    if body.is_null() || body_len == 0 {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(body, body_len) }
    }
}

#[no_mangle]
pub extern "C" fn playdeck_http_get(address: *const c_char, get_header: bool, callback_id: i32) {
    let address = address_of(address, callback_id);
    BRIDGE.issue(HttpRequest::get(address, get_header, callback_id));
}

#[no_mangle]
pub extern "C" fn playdeck_http_delete(address: *const c_char, get_header: bool, callback_id: i32) {
    let address = address_of(address, callback_id);
    BRIDGE.issue(HttpRequest::delete(address, get_header, callback_id));
}

/// POST `body_len` bytes from `body`. A null `content_type` uses the default
/// content type; a body that is not UTF-8 is dropped and the request is sent
/// empty.
#[no_mangle]
pub extern "C" fn playdeck_http_post(
    address: *const c_char,
    get_header: bool,
    body: *const u8,
    body_len: usize,
    content_type: *const c_char,
    callback_id: i32,
) {
    let address = address_of(address, callback_id);
    BRIDGE.issue(HttpRequest::post(
        address,
        get_header,
        payload_of(body, body_len),
        c_str(content_type),
        callback_id,
    ));
}

/// PUT counterpart of [`playdeck_http_post`]
#[no_mangle]
pub extern "C" fn playdeck_http_put(
    address: *const c_char,
    get_header: bool,
    body: *const u8,
    body_len: usize,
    content_type: *const c_char,
    callback_id: i32,
) {
    let address = address_of(address, callback_id);
    BRIDGE.issue(HttpRequest::put(
        address,
        get_header,
        payload_of(body, body_len),
        c_str(content_type),
        callback_id,
    ));
}

/// Requests issued but not yet reported
#[no_mangle]
pub extern "C" fn playdeck_http_pending() -> u32 {
    BRIDGE.pending() as u32
}
