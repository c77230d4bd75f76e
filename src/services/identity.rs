// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase Authentication REST client.
//!
//! Verifies credentials with the Identity Toolkit API and reports who the
//! user is. Sessions are issued by this server afterwards, so the provider's
//! own ID and refresh tokens are not kept.

use crate::config::Config;
use crate::error::AppError;
use crate::models::Identity;
use serde::{Deserialize, Serialize};

/// Identity Toolkit client.
#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    /// Sent as `requestUri` for federated sign-in.
    request_uri: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest<'a> {
    post_body: String,
    request_uri: &'a str,
    return_idp_credential: bool,
    return_secure_token: bool,
}

/// The account fields common to all sign-in responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default, alias = "profilePicture")]
    photo_url: Option<String>,
}

impl From<AccountResponse> for Identity {
    fn from(account: AccountResponse) -> Self {
        let non_empty = |s: Option<String>| s.filter(|s| !s.is_empty());
        Identity {
            uid: account.local_id,
            email: non_empty(account.email),
            display_name: non_empty(account.display_name),
            photo_url: non_empty(account.photo_url),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl IdentityClient {
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(
            &config.identity_toolkit_url,
            &config.firebase_api_key,
            &config.frontend_url,
        )
    }

    pub fn with_base_url(base_url: &str, api_key: &str, request_uri: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            request_uri: request_uri.to_string(),
        }
    }

    /// Verify an email/password pair.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AppError> {
        let body = PasswordRequest {
            email,
            password,
            display_name: None,
            return_secure_token: true,
        };
        self.call("accounts:signInWithPassword", &body).await
    }

    /// Register a new email/password account.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Identity, AppError> {
        let body = PasswordRequest {
            email,
            password,
            display_name,
            return_secure_token: true,
        };
        let mut identity = self.call("accounts:signUp", &body).await?;

        // signUp does not echo the display name back.
        if identity.display_name.is_none() {
            identity.display_name = display_name.map(str::to_string);
        }
        Ok(identity)
    }

    /// Exchange a Google ID token obtained by the browser for an identity.
    pub async fn sign_in_with_google(&self, google_id_token: &str) -> Result<Identity, AppError> {
        let body = IdpRequest {
            post_body: format!(
                "id_token={}&providerId=google.com",
                urlencoding::encode(google_id_token)
            ),
            request_uri: &self.request_uri,
            return_idp_credential: true,
            return_secure_token: true,
        };
        self.call("accounts:signInWithIdp", &body).await
    }

    async fn call<B: Serialize>(&self, method: &str, body: &B) -> Result<Identity, AppError> {
        let url = format!("{}/{}", self.base_url, method);

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::IdentityProvider(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| format!("HTTP {}: {}", status, text));
            tracing::debug!(method, %status, error = %message, "Identity provider rejected request");
            return Err(AppError::IdentityProvider(message));
        }

        let account: AccountResponse = response
            .json()
            .await
            .map_err(|e| AppError::IdentityProvider(format!("JSON parse error: {}", e)))?;

        Ok(account.into())
    }
}
