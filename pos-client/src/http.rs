//! HTTP client for the Resource API
//!
//! The session lives in a cookie jar, so every request after `login` is
//! authenticated and the same cookie can be handed to the live channel.

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderValue;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::models::{LoginRequest, User};
use std::sync::Arc;

use crate::actions::MutationApi;
use crate::auth::AuthApi;
use crate::cache::{QueryFetcher, QueryKey};
use crate::{ClientConfig, ClientError, ClientResult};

/// Error body returned by the server: `{code, message, details?}`
#[derive(serde::Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    cookies: Arc<Jar>,
}

impl HttpClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let cookies = Arc::new(Jar::default());
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .cookie_provider(cookies.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cookies,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `Cookie` header value for the live channel upgrade
    pub fn session_cookie(&self) -> Option<HeaderValue> {
        let url = Url::parse(&self.base_url).ok()?;
        self.cookies.cookies(&url)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.client.get(self.url(path)).send().await?;
        Self::handle_response(response).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::handle_response(response).await
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.client.post(self.url(path)).send().await?;
        Self::handle_response(response).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self.client.patch(self.url(path)).json(body).send().await?;
        Self::handle_response(response).await
    }

    pub async fn current_user(&self) -> ClientResult<User> {
        self.get("/api/user").await
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(error_for_status(status, &text));
        }
        Ok(response.json().await?)
    }
}

/// Map a non-2xx response to a typed error, surfacing the server `message`
pub fn error_for_status(status: StatusCode, body: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| {
            if body.is_empty() {
                status.to_string()
            } else {
                body.to_string()
            }
        });
    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::FORBIDDEN => ClientError::Forbidden(message),
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ClientError::Validation(message),
        StatusCode::CONFLICT => ClientError::Conflict(message),
        StatusCode::TOO_MANY_REQUESTS => ClientError::RateLimited(message),
        _ => ClientError::Internal(message),
    }
}

#[async_trait]
impl QueryFetcher for HttpClient {
    async fn fetch(&self, key: &QueryKey) -> ClientResult<Value> {
        self.get(&key.to_string()).await
    }
}

#[async_trait]
impl MutationApi for HttpClient {
    async fn post_value(&self, path: &str, body: Value) -> ClientResult<Value> {
        self.post(path, &body).await
    }

    async fn patch_value(&self, path: &str, body: Value) -> ClientResult<Value> {
        self.patch(path, &body).await
    }
}

#[async_trait]
impl AuthApi for HttpClient {
    async fn login(&self, username: &str, password: &str) -> ClientResult<User> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.post("/api/login", &request).await
    }

    async fn logout(&self) -> ClientResult<()> {
        self.post_empty::<Value>("/api/logout").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_surfaces() {
        let body = r#"{"code":4003,"message":"Order already completed","details":{"orderId":7}}"#;
        match error_for_status(StatusCode::CONFLICT, body) {
            ClientError::Conflict(msg) => assert_eq!(msg, "Order already completed"),
            other => panic!("Expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn status_mapping() {
        assert!(error_for_status(StatusCode::UNAUTHORIZED, "").is_unauthorized());
        assert!(matches!(
            error_for_status(StatusCode::FORBIDDEN, "{}"),
            ClientError::Forbidden(_)
        ));
        assert!(matches!(
            error_for_status(StatusCode::BAD_REQUEST, r#"{"message":"name required"}"#),
            ClientError::Validation(m) if m == "name required"
        ));
        match error_for_status(StatusCode::BAD_GATEWAY, "") {
            ClientError::Internal(m) => assert!(m.contains("502")),
            other => panic!("Expected Internal, got {other:?}"),
        }
    }

    #[test]
    fn urls_join_cleanly() {
        let client = HttpClient::new(&ClientConfig::new("http://localhost:5000/")).unwrap();
        assert_eq!(client.url("/api/user"), "http://localhost:5000/api/user");
        assert_eq!(client.url("api/user"), "http://localhost:5000/api/user");
        assert!(client.session_cookie().is_none());
    }
}
