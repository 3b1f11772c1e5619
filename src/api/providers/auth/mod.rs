//! Authentication provider trait, user/session types and a mock

mod supabase;

pub use supabase::SupabaseAuthProvider;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::api::error::ApiError;

/// Fallback shown when a user has neither a name nor an e-mail
pub const DEFAULT_DISPLAY_NAME: &str = "Usuário";

/// Free-form profile data stored alongside the account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

/// Authenticated account as returned by the auth service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl AuthUser {
    /// Name for the drawer header: `nome`, then `full_name`, then the
    /// e-mail's local part, then [`DEFAULT_DISPLAY_NAME`]
    pub fn display_name(&self) -> String {
        non_blank(&self.user_metadata.nome)
            .or_else(|| non_blank(&self.user_metadata.full_name))
            .or_else(|| {
                non_blank(&self.email)
                    .and_then(|e| e.split('@').next())
                    .filter(|local| !local.is_empty())
            })
            .unwrap_or(DEFAULT_DISPLAY_NAME)
            .to_string()
    }

    pub fn initials(&self) -> String {
        initials(&self.display_name())
    }

    pub fn avatar_url(&self) -> Option<&str> {
        non_blank(&self.user_metadata.avatar_url).or_else(|| non_blank(&self.user_metadata.picture))
    }
}

/// First letters of the first and last words, or the first two characters
/// of a single-word name, upper-cased
pub fn initials(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    match words.as_slice() {
        [] => String::new(),
        [single] => single.chars().take(2).collect::<String>().to_uppercase(),
        [first, .., last] => first
            .chars()
            .take(1)
            .chain(last.chars().take(1))
            .collect::<String>()
            .to_uppercase(),
    }
}

/// Tokens plus the user they belong to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp (seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

impl AuthSession {
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|at| at <= Utc::now().timestamp())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpData {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInData {
    pub email: String,
    pub password: String,
}

/// Result of a sign-up: the session is absent while e-mail confirmation is pending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    pub user: AuthUser,
    pub session: Option<AuthSession>,
}

impl SignUpOutcome {
    pub fn needs_confirmation(&self) -> bool {
        self.session.is_none()
    }
}

/// Trait for authentication services
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Get the provider name (e.g., "supabase")
    fn name(&self) -> &str;

    async fn sign_up(&self, data: &SignUpData) -> Result<SignUpOutcome, ApiError>;

    async fn sign_in(&self, data: &SignInData) -> Result<AuthSession, ApiError>;

    /// Send a password recovery e-mail
    async fn forgot_password(&self, email: &str) -> Result<(), ApiError>;

    /// Revoke the session's tokens on the server
    async fn sign_out(&self, session: &AuthSession) -> Result<(), ApiError>;

    /// Fetch the user behind a session, validating its access token
    async fn current_user(&self, session: &AuthSession) -> Result<AuthUser, ApiError>;
}

#[derive(Default)]
struct MockAccounts {
    users: HashMap<String, (String, AuthUser)>,
    recoveries: Vec<String>,
    signed_out: Vec<String>,
    confirm_signups: bool,
}

/// In-memory auth service for tests
#[derive(Clone, Default)]
pub struct MockAuthProvider {
    state: Arc<Mutex<MockAccounts>>,
}

impl MockAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account directly
    pub fn add_user(&self, email: &str, password: &str, name: Option<&str>) -> AuthUser {
        let user = AuthUser {
            id: uuid::Uuid::new_v4().to_string(),
            email: Some(email.to_string()),
            user_metadata: UserMetadata {
                nome: name.map(str::to_string),
                ..Default::default()
            },
        };
        if let Ok(mut state) = self.state.lock() {
            state
                .users
                .insert(email.to_lowercase(), (password.to_string(), user.clone()));
        }
        user
    }

    /// When set, sign-ups return no session until the e-mail is confirmed
    pub fn require_confirmation(&self, required: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.confirm_signups = required;
        }
    }

    /// E-mails that asked for a password recovery
    pub fn recoveries(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|s| s.recoveries.clone())
            .unwrap_or_default()
    }

    /// Access tokens revoked through `sign_out`
    pub fn signed_out(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|s| s.signed_out.clone())
            .unwrap_or_default()
    }

    fn session_for(user: AuthUser) -> AuthSession {
        AuthSession {
            access_token: format!("access-{}", user.id),
            refresh_token: format!("refresh-{}", user.id),
            expires_at: Some(Utc::now().timestamp() + 3600),
            user,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MockAccounts>, ApiError> {
        self.state
            .lock()
            .map_err(|e| ApiError::network("mock", e.to_string()))
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn sign_up(&self, data: &SignUpData) -> Result<SignUpOutcome, ApiError> {
        let key = data.email.to_lowercase();
        let confirm = {
            let state = self.lock()?;
            if state.users.contains_key(&key) {
                return Err(ApiError::http("mock", 422, "User already registered"));
            }
            state.confirm_signups
        };
        let user = self.add_user(&data.email, &data.password, data.name.as_deref());
        Ok(SignUpOutcome {
            session: (!confirm).then(|| Self::session_for(user.clone())),
            user,
        })
    }

    async fn sign_in(&self, data: &SignInData) -> Result<AuthSession, ApiError> {
        let state = self.lock()?;
        match state.users.get(&data.email.to_lowercase()) {
            Some((password, user)) if *password == data.password => {
                Ok(Self::session_for(user.clone()))
            }
            _ => Err(ApiError::unauthorized("mock", "Invalid login credentials")),
        }
    }

    async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        self.lock()?.recoveries.push(email.to_string());
        Ok(())
    }

    async fn sign_out(&self, session: &AuthSession) -> Result<(), ApiError> {
        self.lock()?.signed_out.push(session.access_token.clone());
        Ok(())
    }

    async fn current_user(&self, session: &AuthSession) -> Result<AuthUser, ApiError> {
        let state = self.lock()?;
        if state.signed_out.contains(&session.access_token) {
            return Err(ApiError::unauthorized("mock", "Session revoked"));
        }
        Ok(session.user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(nome: Option<&str>, full_name: Option<&str>, email: Option<&str>) -> AuthUser {
        AuthUser {
            id: "u1".to_string(),
            email: email.map(str::to_string),
            user_metadata: UserMetadata {
                nome: nome.map(str::to_string),
                full_name: full_name.map(str::to_string),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_display_name_resolution_order() {
        assert_eq!(
            user(Some("João Silva"), Some("Other"), Some("x@y.com")).display_name(),
            "João Silva"
        );
        assert_eq!(
            user(None, Some("Ana Lima"), Some("x@y.com")).display_name(),
            "Ana Lima"
        );
        assert_eq!(
            user(Some("  "), None, Some("carlos@oficina.com")).display_name(),
            "carlos"
        );
        assert_eq!(user(None, None, None).display_name(), "Usuário");
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("João Pedro Silva"), "JS");
        assert_eq!(initials("maria"), "MA");
        assert_eq!(initials("Ó"), "Ó");
        assert_eq!(initials(""), "");
        assert_eq!(user(None, None, None).initials(), "US");
    }

    #[test]
    fn test_avatar_prefers_avatar_url() {
        let mut u = user(None, None, None);
        assert_eq!(u.avatar_url(), None);
        u.user_metadata.picture = Some("https://img/p.png".to_string());
        assert_eq!(u.avatar_url(), Some("https://img/p.png"));
        u.user_metadata.avatar_url = Some("https://img/a.png".to_string());
        assert_eq!(u.avatar_url(), Some("https://img/a.png"));
    }

    #[test]
    fn test_session_expiry() {
        let mut session = MockAuthProvider::session_for(user(None, None, None));
        assert!(!session.is_expired());
        session.expires_at = Some(0);
        assert!(session.is_expired());
        session.expires_at = None;
        assert!(!session.is_expired());
    }

    #[tokio::test]
    async fn test_mock_sign_up_and_sign_in() {
        let provider = MockAuthProvider::new();
        let outcome = provider
            .sign_up(&SignUpData {
                email: "ana@oficina.com".to_string(),
                password: "segredo".to_string(),
                name: Some("Ana".to_string()),
            })
            .await
            .unwrap();
        assert!(!outcome.needs_confirmation());

        let session = provider
            .sign_in(&SignInData {
                email: "ANA@oficina.com".to_string(),
                password: "segredo".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(session.user.display_name(), "Ana");

        let err = provider
            .sign_in(&SignInData {
                email: "ana@oficina.com".to_string(),
                password: "errada".to_string(),
            })
            .await
            .unwrap_err();
        assert!(err.is_auth_error());
    }

    #[tokio::test]
    async fn test_mock_duplicate_sign_up() {
        let provider = MockAuthProvider::new();
        provider.add_user("ana@oficina.com", "segredo", None);
        let err = provider
            .sign_up(&SignUpData {
                email: "ana@oficina.com".to_string(),
                password: "outra1".to_string(),
                name: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.message(), "User already registered");
    }

    #[tokio::test]
    async fn test_mock_sign_out_revokes() {
        let provider = MockAuthProvider::new();
        provider.add_user("ana@oficina.com", "segredo", None);
        let session = provider
            .sign_in(&SignInData {
                email: "ana@oficina.com".to_string(),
                password: "segredo".to_string(),
            })
            .await
            .unwrap();

        assert!(provider.current_user(&session).await.is_ok());
        provider.sign_out(&session).await.unwrap();
        assert!(provider.current_user(&session).await.unwrap_err().is_auth_error());
    }
}
