//! reqwest-backed [`ContentService`].

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Method, RequestBuilder};

use super::{ApiOutcome, Auth, ContentService, CookieJar, Reply, USER_AGENT, classify};
use crate::config::Config;
use crate::models::{LoginRequest, NewPost, Post, RegisterRequest, UserRecord};

const REGISTER_PATH: &str = "/auth/register";
const LOGIN_PATH: &str = "/auth/login";
const LOGOUT_PATH: &str = "/auth/logout";
const PROFILE_PATH: &str = "/users/profile";
const POSTS_LIST_PATH: &str = "/posts/list";
const POSTS_CREATE_PATH: &str = "/posts/create";

/// HTTP client for the content service.
///
/// The session cookie lives in the [`CookieJar`] handed to reqwest, so it is
/// attached to every request without the flows touching it.
pub struct HttpContentService {
    base_url: String,
    http: reqwest::Client,
    jar: Arc<CookieJar>,
}

impl HttpContentService {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, jar: Arc<CookieJar>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_provider(Arc::clone(&jar));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            jar,
        })
    }

    /// Client for the configured service, using the persisted cookie jar.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = config.effective_base_url()?;
        let jar = Arc::new(CookieJar::default_location());
        Self::new(&base_url, jar, config.request_timeout())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("accept", "application/json")
    }

    async fn execute(
        &self,
        request: RequestBuilder,
        endpoint: &'static str,
        auth: Auth,
    ) -> ApiOutcome<Reply> {
        tracing::debug!(endpoint, "sending request");

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let detail = describe_reqwest_error(&e);
                tracing::warn!(endpoint, %detail, "request failed");
                return ApiOutcome::TransportFailure(detail);
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                let detail = describe_reqwest_error(&e);
                tracing::warn!(endpoint, status = status.as_u16(), %detail, "failed to read response body");
                return ApiOutcome::TransportFailure(detail);
            }
        };

        let outcome = classify(status, &body, auth);
        match &outcome {
            ApiOutcome::TransportFailure(detail) => {
                tracing::warn!(endpoint, status = status.as_u16(), %detail, "response unusable");
            }
            other => {
                tracing::debug!(endpoint, status = status.as_u16(), outcome = other.label(), "response classified");
            }
        }
        outcome
    }
}

impl ContentService for HttpContentService {
    async fn register(&self, request: &RegisterRequest) -> ApiOutcome<String> {
        let builder = self.request(Method::POST, REGISTER_PATH).json(request);
        self.execute(builder, REGISTER_PATH, Auth::Anonymous)
            .await
            .map(|reply| reply.message_or("Registration successful"))
    }

    async fn login(&self, request: &LoginRequest) -> ApiOutcome<UserRecord> {
        let builder = self.request(Method::POST, LOGIN_PATH).json(request);
        self.execute(builder, LOGIN_PATH, Auth::Anonymous)
            .await
            .and_then(Reply::data_as)
    }

    async fn logout(&self) -> ApiOutcome<()> {
        let builder = self.request(Method::POST, LOGOUT_PATH);
        let outcome = self
            .execute(builder, LOGOUT_PATH, Auth::Required)
            .await
            .map(|_| ());

        // The credential is dropped whatever the server answered.
        if let Err(e) = self.jar.clear() {
            tracing::warn!(error = %e, "failed to clear cookie jar");
        }
        outcome
    }

    async fn fetch_profile(&self) -> ApiOutcome<UserRecord> {
        let builder = self.request(Method::GET, PROFILE_PATH);
        self.execute(builder, PROFILE_PATH, Auth::Required)
            .await
            .and_then(Reply::data_as)
    }

    async fn list_posts(&self) -> ApiOutcome<Vec<Post>> {
        let builder = self.request(Method::GET, POSTS_LIST_PATH);
        self.execute(builder, POSTS_LIST_PATH, Auth::Required)
            .await
            .and_then(Reply::data_as)
    }

    async fn create_post(&self, post: &NewPost) -> ApiOutcome<String> {
        let builder = self.request(Method::POST, POSTS_CREATE_PATH).json(post);
        self.execute(builder, POSTS_CREATE_PATH, Auth::Required)
            .await
            .map(|reply| reply.message_or("Post created"))
    }
}

fn describe_reqwest_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("Request timed out: {e}")
    } else if e.is_connect() {
        format!("Connection failed: {e}")
    } else if e.is_decode() || e.is_body() {
        format!("Failed to read response: {e}")
    } else if e.is_request() {
        format!("Request error: {e}")
    } else {
        format!("Network error: {e}")
    }
}
