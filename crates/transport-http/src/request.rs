// Request and response shapes carried across the bridge

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    pub fn has_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request as issued by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub address: String,
    /// Accepted for interface compatibility; headers are never captured
    pub get_header: bool,
    /// Raw body bytes; must be valid UTF-8 text to be sent
    pub payload: Option<Vec<u8>>,
    pub content_type: Option<String>,
    /// Chosen by the caller, echoed back in the completion
    pub callback_id: i32,
}

impl HttpRequest {
    fn new(method: HttpMethod, address: &str, get_header: bool, callback_id: i32) -> Self {
        Self {
            method,
            address: address.to_string(),
            get_header,
            payload: None,
            content_type: None,
            callback_id,
        }
    }

    pub fn get(address: &str, get_header: bool, callback_id: i32) -> Self {
        Self::new(HttpMethod::Get, address, get_header, callback_id)
    }

    pub fn delete(address: &str, get_header: bool, callback_id: i32) -> Self {
        Self::new(HttpMethod::Delete, address, get_header, callback_id)
    }

    pub fn post(
        address: &str,
        get_header: bool,
        payload: &[u8],
        content_type: Option<&str>,
        callback_id: i32,
    ) -> Self {
        Self::new(HttpMethod::Post, address, get_header, callback_id)
            .with_payload(payload, content_type)
    }

    pub fn put(
        address: &str,
        get_header: bool,
        payload: &[u8],
        content_type: Option<&str>,
        callback_id: i32,
    ) -> Self {
        Self::new(HttpMethod::Put, address, get_header, callback_id)
            .with_payload(payload, content_type)
    }

    fn with_payload(mut self, payload: &[u8], content_type: Option<&str>) -> Self {
        self.payload = Some(payload.to_vec());
        self.content_type = content_type.map(str::to_string);
        self
    }
}

/// Completion delivered exactly once per issued request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub callback_id: i32,
    /// HTTP status, or 0 when the request never got a response
    pub status: u16,
    pub body: Option<String>,
    /// Always None; header capture is not supported
    pub header: Option<String>,
}

impl HttpResponse {
    pub fn failure(callback_id: i32) -> Self {
        Self {
            callback_id,
            status: 0,
            body: None,
            header: None,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == 0
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn known_status(&self) -> Option<HttpStatus> {
        HttpStatus::from_code(self.status)
    }
}

/// Status codes callers commonly branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum HttpStatus {
    Ok = 200,
    Created = 201,
    Accepted = 202,
    NoContent = 204,
    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    MethodNotAllowed = 405,
    ImATeapot = 418,
    ServerError = 500,
    NotImplemented = 501,
}

impl HttpStatus {
    pub fn from_code(code: u16) -> Option<Self> {
        let status = match code {
            200 => HttpStatus::Ok,
            201 => HttpStatus::Created,
            202 => HttpStatus::Accepted,
            204 => HttpStatus::NoContent,
            400 => HttpStatus::BadRequest,
            401 => HttpStatus::Unauthorized,
            403 => HttpStatus::Forbidden,
            404 => HttpStatus::NotFound,
            405 => HttpStatus::MethodNotAllowed,
            418 => HttpStatus::ImATeapot,
            500 => HttpStatus::ServerError,
            501 => HttpStatus::NotImplemented,
            _ => return None,
        };
        Some(status)
    }

    pub fn code(self) -> u16 {
        self as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_post_and_put_carry_bodies() {
        assert!(HttpMethod::Post.has_body());
        assert!(HttpMethod::Put.has_body());
        assert!(!HttpMethod::Get.has_body());
        assert!(!HttpMethod::Delete.has_body());
    }

    #[test]
    fn test_request_constructors() {
        let req = HttpRequest::post("http://x/score", true, b"42", Some("text/plain"), 3);
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.payload.as_deref(), Some(&b"42"[..]));
        assert_eq!(req.content_type.as_deref(), Some("text/plain"));
        assert!(req.get_header);

        let req = HttpRequest::delete("http://x/score", false, 4);
        assert_eq!(req.payload, None);
        assert_eq!(req.callback_id, 4);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(HttpStatus::from_code(418), Some(HttpStatus::ImATeapot));
        assert_eq!(HttpStatus::NotFound.code(), 404);
        assert_eq!(HttpStatus::from_code(302), None);

        let response = HttpResponse::failure(8);
        assert!(response.is_failure());
        assert!(!response.is_success());
        assert_eq!(response.known_status(), None);
    }
}
