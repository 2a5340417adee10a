//! Authenticated access to the content service.
//!
//! Every remote capability returns an [`ApiOutcome`]: the server said yes,
//! the server said no for a domain reason, the server rejected the session,
//! or the call never produced a usable answer. Callers handle each case once;
//! nothing here retries.

mod cookies;
mod http;

use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use cookies::CookieJar;
pub use http::HttpContentService;

use crate::models::{LoginRequest, NewPost, Post, RegisterRequest, UserRecord};

/// Standard User-Agent header for postboard requests.
pub const USER_AGENT: &str = concat!("postboard/", env!("CARGO_PKG_VERSION"));

/// Classified result of one remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiOutcome<T> {
    /// Server reported success; payload is the server's data.
    Ok(T),
    /// Server refused for a non-authentication reason. Shown verbatim.
    DomainError(String),
    /// Server rejected the ambient credential.
    SessionInvalid,
    /// No usable answer: unreachable, timed out, or malformed.
    TransportFailure(String),
}

impl<T> ApiOutcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiOutcome<U> {
        match self {
            ApiOutcome::Ok(value) => ApiOutcome::Ok(f(value)),
            ApiOutcome::DomainError(message) => ApiOutcome::DomainError(message),
            ApiOutcome::SessionInvalid => ApiOutcome::SessionInvalid,
            ApiOutcome::TransportFailure(detail) => ApiOutcome::TransportFailure(detail),
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> ApiOutcome<U>) -> ApiOutcome<U> {
        match self {
            ApiOutcome::Ok(value) => f(value),
            ApiOutcome::DomainError(message) => ApiOutcome::DomainError(message),
            ApiOutcome::SessionInvalid => ApiOutcome::SessionInvalid,
            ApiOutcome::TransportFailure(detail) => ApiOutcome::TransportFailure(detail),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ApiOutcome::Ok(_))
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            ApiOutcome::Ok(_) => "ok",
            ApiOutcome::DomainError(_) => "domain_error",
            ApiOutcome::SessionInvalid => "session_invalid",
            ApiOutcome::TransportFailure(_) => "transport_failure",
        }
    }
}

/// One operation per remote capability.
///
/// Implementations attach the ambient credential themselves; callers never
/// see it.
#[allow(async_fn_in_trait)]
pub trait ContentService {
    /// Creates an account. Does not establish a session.
    async fn register(&self, request: &RegisterRequest) -> ApiOutcome<String>;

    /// Establishes a session and returns the logged-in user.
    async fn login(&self, request: &LoginRequest) -> ApiOutcome<UserRecord>;

    /// Ends the session on the server. Body is ignored.
    async fn logout(&self) -> ApiOutcome<()>;

    async fn fetch_profile(&self) -> ApiOutcome<UserRecord>;

    /// Full post collection, in the server's order.
    async fn list_posts(&self) -> ApiOutcome<Vec<Post>>;

    async fn create_post(&self, post: &NewPost) -> ApiOutcome<String>;
}

/// Whether an endpoint needs the ambient credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Auth {
    Required,
    Anonymous,
}

/// Response envelope shared by all endpoints.
#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

/// Successful envelope, before the payload is typed.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Reply {
    pub message: Option<String>,
    pub data: Option<Value>,
}

impl Reply {
    /// Decodes the required `data` field.
    pub fn data_as<T: DeserializeOwned>(self) -> ApiOutcome<T> {
        let Some(data) = self.data.filter(|d| !d.is_null()) else {
            return ApiOutcome::TransportFailure("response is missing data".to_string());
        };
        match serde_json::from_value(data) {
            Ok(value) => ApiOutcome::Ok(value),
            Err(e) => ApiOutcome::TransportFailure(format!("malformed response data: {e}")),
        }
    }

    pub fn message_or(self, fallback: &str) -> String {
        self.message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// Classifies a received response.
///
/// A 401 on a session-bound endpoint is `SessionInvalid` whatever the body
/// says. Otherwise the envelope decides; a body that is not an envelope is a
/// transport failure.
pub(crate) fn classify(status: StatusCode, body: &str, auth: Auth) -> ApiOutcome<Reply> {
    if status == StatusCode::UNAUTHORIZED && auth == Auth::Required {
        return ApiOutcome::SessionInvalid;
    }

    let envelope: Envelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            return ApiOutcome::TransportFailure(format!(
                "unexpected response (HTTP {}): {e}",
                status.as_u16()
            ));
        }
    };

    if !envelope.success {
        let message = envelope
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("Request failed (HTTP {})", status.as_u16()));
        return ApiOutcome::DomainError(message);
    }

    ApiOutcome::Ok(Reply {
        message: envelope.message,
        data: envelope.data,
    })
}
