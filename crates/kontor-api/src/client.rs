//! API client with credential interception
//!
//! Every protected request goes through here: the bearer header is
//! attached from the session manager, and a 401 triggers one renewal
//! followed by one retry. A second 401 after a successful renewal is a
//! hard failure, never another refresh.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use kontor_session::SessionManager;

use crate::error::ApiError;
use crate::http::{join_endpoint, rejection_message};
use crate::Result;

pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
    session: SessionManager,
}

/// Add the bearer header for `token`, replacing any existing one so a
/// request never carries two Authorization values.
pub fn attach_credential(headers: &mut HeaderMap, token: Option<&str>) {
    let token = match token {
        Some(token) => token,
        None => return,
    };

    match HeaderValue::from_str(&format!("Bearer {}", token)) {
        Ok(value) => {
            headers.insert(AUTHORIZATION, value);
        }
        Err(_) => {
            tracing::warn!("Access token is not a valid header value, sending without it");
        }
    }
}

impl ApiClient {
    pub fn new(base_url: Url, session: SessionManager) -> Self {
        Self {
            base_url,
            http: reqwest::Client::new(),
            session,
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.execute(Method::GET, path, None).await?;
        Ok(response.json().await?)
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let body = serde_json::to_value(body)?;
        let response = self.execute(Method::POST, path, Some(body)).await?;
        Ok(response.json().await?)
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let body = serde_json::to_value(body)?;
        let response = self.execute(Method::PUT, path, Some(body)).await?;
        Ok(response.json().await?)
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.execute(Method::DELETE, path, None).await?;
        Ok(())
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response> {
        let token = self.session.credential_for(path);
        let response = self
            .send_once(&method, path, body.as_ref(), token.as_deref())
            .await?;

        // Reactive renewal: only for requests that actually carried a
        // credential (auth endpoints never get one, so they never loop
        // back into the refresh flow).
        if response.status() == StatusCode::UNAUTHORIZED {
            if let Some(rejected) = token {
                let fresh = self.session.refresh_after_unauthorized(&rejected).await?;
                tracing::debug!(path = %path, "Retrying request with renewed credential");

                let retry = self
                    .send_once(&method, path, body.as_ref(), Some(&fresh))
                    .await?;
                return check_status(retry).await;
            }
        }

        check_status(response).await
    }

    async fn send_once(
        &self,
        method: &Method,
        path: &str,
        body: Option<&serde_json::Value>,
        token: Option<&str>,
    ) -> Result<reqwest::Response> {
        let mut headers = HeaderMap::new();
        attach_credential(&mut headers, token);

        let mut request = self
            .http
            .request(method.clone(), join_endpoint(&self.base_url, path))
            .headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let message = rejection_message(response).await;
    Err(ApiError::Status { status, message })
}

impl Clone for ApiClient {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            http: self.http.clone(),
            session: self.session.clone(),
        }
    }
}
