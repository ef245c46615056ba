// Fire-and-forget HTTP requests with exactly-once completion

use crate::client::{create_http_agent, HttpConfig};
use crate::error::{Result, TransportError};
use crate::registry::{CallbackRegistry, Completion, HttpCallback, RequestTicket};
use crate::request::{HttpMethod, HttpRequest};
use std::io::Read;
use std::sync::Arc;
use std::thread;

/// Issues requests on worker threads and reports each one back through the
/// registered sink exactly once
///
/// Only 2xx answers carry a status and body; transport failures and error
/// statuses are both reported as status 0. There is no cancellation, retry,
/// or limit on in-flight requests.
pub struct HttpBridge {
    agent: ureq::Agent,
    config: HttpConfig,
    registry: Arc<CallbackRegistry>,
    sink: Arc<dyn HttpCallback>,
}

impl HttpBridge {
    pub fn new(config: HttpConfig, sink: Arc<dyn HttpCallback>) -> Self {
        Self {
            agent: create_http_agent(&config),
            config,
            registry: Arc::new(CallbackRegistry::new()),
            sink,
        }
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<CallbackRegistry> {
        &self.registry
    }

    /// Requests issued but not yet reported
    pub fn pending(&self) -> usize {
        self.registry.pending()
    }

    pub fn get(&self, address: &str, get_header: bool, callback_id: i32) -> RequestTicket {
        self.issue(HttpRequest::get(address, get_header, callback_id))
    }

    pub fn post(
        &self,
        address: &str,
        get_header: bool,
        payload: &[u8],
        content_type: Option<&str>,
        callback_id: i32,
    ) -> RequestTicket {
        self.issue(HttpRequest::post(
            address,
            get_header,
            payload,
            content_type,
            callback_id,
        ))
    }

    pub fn put(
        &self,
        address: &str,
        get_header: bool,
        payload: &[u8],
        content_type: Option<&str>,
        callback_id: i32,
    ) -> RequestTicket {
        self.issue(HttpRequest::put(
            address,
            get_header,
            payload,
            content_type,
            callback_id,
        ))
    }

    pub fn delete(&self, address: &str, get_header: bool, callback_id: i32) -> RequestTicket {
        self.issue(HttpRequest::delete(address, get_header, callback_id))
    }

    /// Start one request reported through the bridge's sink
    pub fn issue(&self, request: HttpRequest) -> RequestTicket {
        self.issue_to(request, self.sink.clone())
    }

    /// Start one request reported through `sink`
    pub fn issue_to(&self, request: HttpRequest, sink: Arc<dyn HttpCallback>) -> RequestTicket {
        let HttpRequest {
            method,
            address,
            get_header,
            payload,
            content_type,
            callback_id,
        } = request;

        if get_header {
            log::debug!(
                "[http] header capture requested for callback {}; not supported",
                callback_id
            );
        }

        let body = if method.has_body() {
            payload.and_then(|bytes| match String::from_utf8(bytes) {
                Ok(text) => Some(text),
                Err(e) => {
                    // Still send the request, without a body
                    log::warn!(
                        "[http] dropping non-text payload for callback {}: {}",
                        callback_id,
                        e
                    );
                    None
                }
            })
        } else {
            None
        };

        let content_type = if method.has_body() {
            Some(content_type.unwrap_or_else(|| self.config.default_content_type.clone()))
        } else {
            None
        };

        let ticket = self.registry.register(callback_id, method, &address, sink);
        let completion = Completion::new(self.registry.clone(), ticket);
        let agent = self.agent.clone();

        log::debug!("[http] issuing {} {} (callback {})", method, address, callback_id);

        let spawned = thread::Builder::new()
            .name(format!("http-{}", callback_id))
            .spawn(move || {
                match execute(
                    &agent,
                    method,
                    &address,
                    body.as_deref(),
                    content_type.as_deref(),
                ) {
                    Ok((status, text)) => completion.finish(status, Some(text)),
                    Err(e) => {
                        log::warn!("[http] {} {} failed: {}", method, address, e);
                        completion.finish(0, None);
                    }
                }
            });

        // A failed spawn drops the closure, and with it the completion,
        // which reports the failure
        if let Err(e) = spawned {
            log::error!("[http] could not start worker for callback {}: {}", callback_id, e);
        }

        ticket
    }
}

/// Run one request to completion; only 2xx answers count as responses
fn execute(
    agent: &ureq::Agent,
    method: HttpMethod,
    address: &str,
    body: Option<&str>,
    content_type: Option<&str>,
) -> Result<(u16, String)> {
    let mut request = agent.request(method.as_str(), address);
    if let Some(content_type) = content_type {
        request = request.set("Content-Type", content_type);
    }

    let result = match body {
        Some(body) => request.send_string(body),
        None => request.call(),
    };

    let response = match result {
        Ok(response) => response,
        Err(ureq::Error::Status(code, _)) => return Err(TransportError::Status(code)),
        Err(ureq::Error::Transport(e)) => {
            return Err(TransportError::Transport(e.to_string()));
        }
    };

    let status = response.status();
    // Read through the reader; into_string caps bodies at 10 MB
    let mut text = String::new();
    response
        .into_reader()
        .read_to_string(&mut text)
        .map_err(TransportError::Body)?;

    Ok((status, text))
}
