//! Backend integrations
//!
//! - Provider traits for authentication and vehicle lookup
//! - [`Services`], the set of providers enabled by the current configuration
//! - Error handling shared by every collaborator

pub mod error;
pub mod providers;

pub use error::ApiError;
pub use providers::auth::{AuthProvider, AuthSession, AuthUser, MockAuthProvider};
pub use providers::vehicle::{MockVehicleProvider, VehicleProvider};
pub use providers::{SupabaseAuthProvider, SupabaseClient, SupabaseVehicleProvider};

use std::sync::Arc;

use crate::config::Config;

/// Backend providers available to the app.
///
/// Providers are only present when the backend section is configured; calls
/// through an absent provider report [`ApiError::NotConfigured`].
#[derive(Clone, Default)]
pub struct Services {
    auth: Option<Arc<dyn AuthProvider>>,
    vehicles: Option<Arc<dyn VehicleProvider>>,
}

impl Services {
    /// No providers configured
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the Supabase providers from the `backend` section
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let Some(client) = SupabaseClient::from_config(&config.backend)? else {
            tracing::warn!("Backend URL or key missing; auth and lookups are disabled");
            return Ok(Self::new());
        };

        tracing::info!(url = %client.base_url(), "Supabase backend configured");

        Ok(Self {
            auth: Some(Arc::new(SupabaseAuthProvider::new(
                client.clone(),
                &config.backend.redirect_url,
            ))),
            vehicles: Some(Arc::new(SupabaseVehicleProvider::new(
                client,
                config.backend.vehicles_table.clone(),
                config.backend.customers_table.clone(),
            ))),
        })
    }

    pub fn with_auth(mut self, provider: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(provider);
        self
    }

    pub fn with_vehicles(mut self, provider: Arc<dyn VehicleProvider>) -> Self {
        self.vehicles = Some(provider);
        self
    }

    pub fn has_auth(&self) -> bool {
        self.auth.is_some()
    }

    pub fn has_vehicles(&self) -> bool {
        self.vehicles.is_some()
    }

    pub fn auth(&self) -> Result<Arc<dyn AuthProvider>, ApiError> {
        self.auth
            .clone()
            .ok_or_else(|| ApiError::not_configured("auth"))
    }

    pub fn vehicles(&self) -> Result<Arc<dyn VehicleProvider>, ApiError> {
        self.vehicles
            .clone()
            .ok_or_else(|| ApiError::not_configured("vehicles"))
    }

    /// Get a summary of configured providers
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        if let Some(auth) = &self.auth {
            parts.push(format!("Auth: {}", auth.name()));
        }

        if let Some(vehicles) = &self.vehicles {
            parts.push(format!("Veículos: {}", vehicles.name()));
        }

        if parts.is_empty() {
            "No providers configured".to_string()
        } else {
            parts.join(", ")
        }
    }
}
