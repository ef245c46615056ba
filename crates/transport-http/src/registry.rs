// Correlation table from caller callback ids to pending completions

use crate::request::{HttpMethod, HttpResponse};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Completion sink for bridged requests
/// Called from worker threads; implementations must not assume the caller's
/// thread
pub trait HttpCallback: Send + Sync {
    fn on_response(&self, response: HttpResponse);
}

impl<F> HttpCallback for F
where
    F: Fn(HttpResponse) + Send + Sync,
{
    fn on_response(&self, response: HttpResponse) {
        self(response)
    }
}

/// Internal key of one issued request
///
/// Callback ids come from the caller and may repeat, so entries are keyed by
/// ticket instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket(u64);

struct PendingRequest {
    callback_id: i32,
    method: HttpMethod,
    address: String,
    sink: Arc<dyn HttpCallback>,
}

pub struct CallbackRegistry {
    next_ticket: AtomicU64,
    pending: Mutex<HashMap<RequestTicket, PendingRequest>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self {
            next_ticket: AtomicU64::new(1),
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn register(
        &self,
        callback_id: i32,
        method: HttpMethod,
        address: &str,
        sink: Arc<dyn HttpCallback>,
    ) -> RequestTicket {
        let ticket = RequestTicket(self.next_ticket.fetch_add(1, Ordering::SeqCst));
        self.pending.lock().insert(
            ticket,
            PendingRequest {
                callback_id,
                method,
                address: address.to_string(),
                sink,
            },
        );
        ticket
    }

    /// Deliver the completion for `ticket`. The entry is removed before the
    /// sink runs, so a second completion for the same ticket is dropped.
    pub fn complete(&self, ticket: RequestTicket, status: u16, body: Option<String>) -> bool {
        let entry = self.pending.lock().remove(&ticket);

        match entry {
            Some(pending) => {
                log::debug!(
                    "[http] {} {} -> {} (callback {})",
                    pending.method,
                    pending.address,
                    status,
                    pending.callback_id
                );
                pending.sink.on_response(HttpResponse {
                    callback_id: pending.callback_id,
                    status,
                    body,
                    header: None,
                });
                true
            }
            None => {
                log::warn!("[http] dropping repeated completion for {:?}", ticket);
                false
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn pending_callback_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self
            .pending
            .lock()
            .values()
            .map(|p| p.callback_id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Owned right to complete one request
///
/// Dropping it without calling [`Completion::finish`] reports a failure, so a
/// worker that bails out early still produces its one notification.
pub struct Completion {
    registry: Arc<CallbackRegistry>,
    ticket: RequestTicket,
    done: bool,
}

impl Completion {
    pub fn new(registry: Arc<CallbackRegistry>, ticket: RequestTicket) -> Self {
        Self {
            registry,
            ticket,
            done: false,
        }
    }

    pub fn ticket(&self) -> RequestTicket {
        self.ticket
    }

    pub fn finish(mut self, status: u16, body: Option<String>) {
        self.done = true;
        self.registry.complete(self.ticket, status, body);
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if !self.done {
            self.registry.complete(self.ticket, 0, None);
        }
    }
}
