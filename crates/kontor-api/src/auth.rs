//! HTTP auth backend
//!
//! Plain JSON-over-HTTPS calls against the authentication endpoints.
//! None of these go through the interceptor: signin/signup/refresh are
//! credential-free or credential-supplying, and the current-user fetch
//! attaches its header manually to avoid circular initialization.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use url::Url;

use kontor_session::{
    AuthBackend, PasswordChange, ProfileUpdate, SessionError, SessionTokens, SignupRequest,
    UserProfile,
};

use crate::http::{join_endpoint, rejection_message};

type SessionResult<T> = std::result::Result<T, SessionError>;

pub struct HttpAuthBackend {
    base_url: Url,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct SigninRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
struct ResendVerificationRequest<'a> {
    email: &'a str,
}

impl HttpAuthBackend {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_client(base_url: Url, http: reqwest::Client) -> Self {
        Self { base_url, http }
    }

    fn endpoint(&self, path: &str) -> String {
        join_endpoint(&self.base_url, path)
    }

    async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> SessionResult<reqwest::Response> {
        self.http
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await
            .map_err(network_error)
    }
}

fn network_error(e: reqwest::Error) -> SessionError {
    SessionError::Network(e.to_string())
}

fn invalid_response(e: reqwest::Error) -> SessionError {
    SessionError::InvalidResponse(e.to_string())
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn signin(&self, email: &str, password: &str) -> SessionResult<SessionTokens> {
        let response = self
            .post_json("/signin", &SigninRequest { email, password })
            .await?;

        if !response.status().is_success() {
            return Err(SessionError::Credentials(rejection_message(response).await));
        }

        response.json().await.map_err(invalid_response)
    }

    async fn refresh(&self, refresh_token: &str) -> SessionResult<SessionTokens> {
        let response = self
            .post_json("/refresh-token", &RefreshRequest { refresh_token })
            .await?;

        if !response.status().is_success() {
            return Err(SessionError::Credentials(rejection_message(response).await));
        }

        response.json().await.map_err(invalid_response)
    }

    async fn signup(&self, request: &SignupRequest) -> SessionResult<()> {
        let response = self.post_json("/signup", request).await?;

        if !response.status().is_success() {
            return Err(SessionError::Credentials(rejection_message(response).await));
        }
        Ok(())
    }

    async fn resend_verification(&self, email: &str) -> SessionResult<()> {
        let response = self
            .post_json("/resend-verification", &ResendVerificationRequest { email })
            .await?;

        if !response.status().is_success() {
            return Err(SessionError::Credentials(rejection_message(response).await));
        }
        Ok(())
    }

    async fn fetch_current_user(&self, access_token: &str) -> SessionResult<UserProfile> {
        let response = self
            .http
            .get(self.endpoint("/user"))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(network_error)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(SessionError::SessionExpired);
        }
        if !response.status().is_success() {
            return Err(SessionError::InvalidResponse(
                rejection_message(response).await,
            ));
        }

        response.json().await.map_err(invalid_response)
    }

    async fn update_profile(
        &self,
        access_token: &str,
        update: &ProfileUpdate,
    ) -> SessionResult<UserProfile> {
        let response = self
            .http
            .put(self.endpoint("/update-profile"))
            .bearer_auth(access_token)
            .json(update)
            .send()
            .await
            .map_err(network_error)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(SessionError::SessionExpired);
        }
        if !response.status().is_success() {
            return Err(SessionError::Credentials(rejection_message(response).await));
        }

        response.json().await.map_err(invalid_response)
    }

    async fn change_password(
        &self,
        access_token: &str,
        change: &PasswordChange,
    ) -> SessionResult<()> {
        let response = self
            .http
            .put(self.endpoint("/change-password"))
            .bearer_auth(access_token)
            .json(change)
            .send()
            .await
            .map_err(network_error)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(SessionError::SessionExpired);
        }
        if !response.status().is_success() {
            return Err(SessionError::Credentials(rejection_message(response).await));
        }
        Ok(())
    }
}
