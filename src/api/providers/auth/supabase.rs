//! GoTrue-backed authentication

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{AuthProvider, AuthSession, AuthUser, SignInData, SignUpData, SignUpOutcome};
use crate::api::error::ApiError;
use crate::api::providers::supabase::{error_from_response, SupabaseClient, PROVIDER_NAME};

/// Path appended to the configured app URL for password recovery links
pub const RESET_PASSWORD_PATH: &str = "/(auth)/reset-password";

pub struct SupabaseAuthProvider {
    client: SupabaseClient,
    redirect_url: String,
}

/// Token grant response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl From<TokenResponse> for AuthSession {
    fn from(token: TokenResponse) -> Self {
        let expires_at = token
            .expires_at
            .or_else(|| token.expires_in.map(|secs| Utc::now().timestamp() + secs));
        AuthSession {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at,
            user: token.user,
        }
    }
}

/// Sign-up returns a full token response when confirmation is off, a bare user otherwise
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(AuthUser),
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

impl SupabaseAuthProvider {
    pub fn new(client: SupabaseClient, app_url: &str) -> Self {
        Self {
            client,
            redirect_url: recovery_redirect(app_url),
        }
    }

    pub fn redirect_url(&self) -> &str {
        &self.redirect_url
    }

    async fn read(response: reqwest::Response) -> Result<String, ApiError> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::network(PROVIDER_NAME, e.to_string()))?;
        match status {
            200..=299 => Ok(body),
            _ => Err(error_from_response(status, &body)),
        }
    }
}

/// `<app_url>/(auth)/reset-password`, tolerating a trailing slash on the base
pub fn recovery_redirect(app_url: &str) -> String {
    let base = app_url.trim();
    if base.ends_with("://") {
        // bare deep-link scheme
        format!("{}{}", base, RESET_PASSWORD_PATH.trim_start_matches('/'))
    } else {
        format!("{}{}", base.trim_end_matches('/'), RESET_PASSWORD_PATH)
    }
}

fn parse<T: for<'de> Deserialize<'de>>(body: &str, what: &str) -> Result<T, ApiError> {
    serde_json::from_str(body)
        .map_err(|e| ApiError::network(PROVIDER_NAME, format!("Invalid {} response: {}", what, e)))
}

#[async_trait]
impl AuthProvider for SupabaseAuthProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn sign_up(&self, data: &SignUpData) -> Result<SignUpOutcome, ApiError> {
        let body = json!({
            "email": data.email,
            "password": data.password,
            "data": { "nome": data.name },
        });

        let response = self
            .client
            .post(&self.client.auth_url("signup"), None)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::network(PROVIDER_NAME, e.to_string()))?;
        let body = Self::read(response).await?;

        Ok(match parse::<SignUpResponse>(&body, "sign-up")? {
            SignUpResponse::Session(token) => {
                let session = AuthSession::from(token);
                SignUpOutcome {
                    user: session.user.clone(),
                    session: Some(session),
                }
            }
            SignUpResponse::User(user) => SignUpOutcome {
                user,
                session: None,
            },
        })
    }

    async fn sign_in(&self, data: &SignInData) -> Result<AuthSession, ApiError> {
        let response = self
            .client
            .post(&self.client.auth_url("token"), None)
            .query(&[("grant_type", "password")])
            .json(&Credentials {
                email: &data.email,
                password: &data.password,
            })
            .send()
            .await
            .map_err(|e| ApiError::network(PROVIDER_NAME, e.to_string()))?;
        let body = Self::read(response).await?;

        let token: TokenResponse = parse(&body, "token")?;
        Ok(token.into())
    }

    async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(&self.client.auth_url("recover"), None)
            .query(&[("redirect_to", self.redirect_url.as_str())])
            .json(&json!({ "email": email }))
            .send()
            .await
            .map_err(|e| ApiError::network(PROVIDER_NAME, e.to_string()))?;
        Self::read(response).await?;
        Ok(())
    }

    async fn sign_out(&self, session: &AuthSession) -> Result<(), ApiError> {
        let response = self
            .client
            .post(
                &self.client.auth_url("logout"),
                Some(&session.access_token),
            )
            .send()
            .await
            .map_err(|e| ApiError::network(PROVIDER_NAME, e.to_string()))?;
        Self::read(response).await?;
        Ok(())
    }

    async fn current_user(&self, session: &AuthSession) -> Result<AuthUser, ApiError> {
        let response = self
            .client
            .get(&self.client.auth_url("user"), Some(&session.access_token))
            .send()
            .await
            .map_err(|e| ApiError::network(PROVIDER_NAME, e.to_string()))?;
        let body = Self::read(response).await?;
        parse(&body, "user")
    }
}
