// Asynchronous HTTP bridge: caller-chosen callback ids correlated with
// fire-and-forget requests

pub mod bridge;
pub mod client;
pub mod error;
pub mod registry;
pub mod request;

pub use bridge::HttpBridge;
pub use client::{create_http_agent, HttpConfig};
pub use error::{Result, TransportError};
pub use registry::{CallbackRegistry, Completion, HttpCallback, RequestTicket};
pub use request::{HttpMethod, HttpRequest, HttpResponse, HttpStatus};
