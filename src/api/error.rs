//! Errors returned by backend collaborators

use std::fmt;

/// Errors that can occur when talking to the backend or a submission sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 401/403 or rejected credentials
    Unauthorized { provider: String, message: String },
    /// The distinguished "no matching record" outcome
    NotFound { provider: String, resource: String },
    /// Network, timeout or undecodable response
    NetworkError { provider: String, message: String },
    /// Other non-success HTTP responses
    HttpError {
        provider: String,
        status: u16,
        message: String,
    },
    /// Backend URL or key missing from configuration
    NotConfigured { provider: String },
    /// Local persistence failure (submission sink)
    StorageError { provider: String, message: String },
}

impl ApiError {
    /// Check if this is an authentication error
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// Get the provider name for this error
    pub fn provider_name(&self) -> &str {
        match self {
            ApiError::Unauthorized { provider, .. } => provider,
            ApiError::NotFound { provider, .. } => provider,
            ApiError::NetworkError { provider, .. } => provider,
            ApiError::HttpError { provider, .. } => provider,
            ApiError::NotConfigured { provider } => provider,
            ApiError::StorageError { provider, .. } => provider,
        }
    }

    /// The collaborator's own message, for showing to the user verbatim
    pub fn message(&self) -> String {
        match self {
            ApiError::Unauthorized { message, .. }
            | ApiError::NetworkError { message, .. }
            | ApiError::HttpError { message, .. }
            | ApiError::StorageError { message, .. } => message.clone(),
            ApiError::NotFound { resource, .. } => format!("{} não encontrado", resource),
            ApiError::NotConfigured { provider } => {
                format!("Serviço {} não configurado", provider)
            }
        }
    }

    pub fn unauthorized(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Unauthorized {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn not_found(provider: impl Into<String>, resource: impl Into<String>) -> Self {
        ApiError::NotFound {
            provider: provider.into(),
            resource: resource.into(),
        }
    }

    pub fn network(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::NetworkError {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn http(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        ApiError::HttpError {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    pub fn not_configured(provider: impl Into<String>) -> Self {
        ApiError::NotConfigured {
            provider: provider.into(),
        }
    }

    pub fn storage(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::StorageError {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized { provider, message } => {
                write!(f, "{}: Unauthorized - {}", provider, message)
            }
            ApiError::NotFound { provider, resource } => {
                write!(f, "{}: Not found - {}", provider, resource)
            }
            ApiError::NetworkError { provider, message } => {
                write!(f, "{}: Network error - {}", provider, message)
            }
            ApiError::HttpError {
                provider,
                status,
                message,
            } => {
                write!(f, "{}: HTTP {} - {}", provider, status, message)
            }
            ApiError::NotConfigured { provider } => {
                write!(f, "{}: Not configured (missing URL or key)", provider)
            }
            ApiError::StorageError { provider, message } => {
                write!(f, "{}: Storage error - {}", provider, message)
            }
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_auth_error() {
        assert!(ApiError::unauthorized("supabase", "Invalid login credentials").is_auth_error());
        assert!(!ApiError::network("supabase", "timeout").is_auth_error());
        assert!(!ApiError::not_found("supabase", "ABC1234").is_auth_error());
    }

    #[test]
    fn test_is_not_found() {
        assert!(ApiError::not_found("supabase", "ABC1234").is_not_found());
        assert!(!ApiError::http("supabase", 500, "boom").is_not_found());
    }

    #[test]
    fn test_message_is_verbatim() {
        assert_eq!(
            ApiError::http("supabase", 500, "relation \"veiculos\" does not exist").message(),
            "relation \"veiculos\" does not exist"
        );
        assert_eq!(
            ApiError::unauthorized("supabase", "Invalid login credentials").message(),
            "Invalid login credentials"
        );
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(ApiError::not_configured("supabase").provider_name(), "supabase");
        assert_eq!(ApiError::storage("local", "disk full").provider_name(), "local");
    }

    #[test]
    fn test_display() {
        let err = ApiError::http("supabase", 503, "unavailable");
        assert_eq!(err.to_string(), "supabase: HTTP 503 - unavailable");

        let err = ApiError::not_configured("supabase");
        assert_eq!(
            err.to_string(),
            "supabase: Not configured (missing URL or key)"
        );
    }
}
