//! Vehicle lookup provider trait and implementations

mod supabase;

pub use supabase::SupabaseVehicleProvider;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::api::error::ApiError;
use crate::checkin::plate::Plate;
use crate::checkin::vehicle::VehicleData;

/// Trait for services that resolve a plate to a vehicle and its customer
#[async_trait]
pub trait VehicleProvider: Send + Sync {
    /// Get the provider name (e.g., "supabase")
    fn name(&self) -> &str;

    /// Look up exactly one vehicle by plate.
    ///
    /// Returns [`ApiError::NotFound`] when no vehicle has the plate.
    async fn find_by_plate(&self, plate: &Plate) -> Result<VehicleData, ApiError>;
}

/// In-memory provider for tests and offline demos
#[derive(Clone, Default)]
pub struct MockVehicleProvider {
    vehicles: Arc<Mutex<HashMap<String, VehicleData>>>,
    requests: Arc<Mutex<Vec<String>>>,
    failure: Arc<Mutex<Option<ApiError>>>,
}

impl MockVehicleProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a vehicle under its (normalized) plate
    pub fn insert(&self, vehicle: VehicleData) {
        let key = crate::checkin::plate::normalize(&vehicle.plate);
        if let Ok(mut vehicles) = self.vehicles.lock() {
            vehicles.insert(key, vehicle);
        }
    }

    /// Make every following lookup fail with `err`
    pub fn fail_with(&self, err: ApiError) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some(err);
        }
    }

    /// Plates requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl VehicleProvider for MockVehicleProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn find_by_plate(&self, plate: &Plate) -> Result<VehicleData, ApiError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(plate.as_str().to_string());
        }
        if let Some(err) = self.failure.lock().ok().and_then(|f| f.clone()) {
            return Err(err);
        }
        self.vehicles
            .lock()
            .ok()
            .and_then(|v| v.get(plate.as_str()).cloned())
            .ok_or_else(|| ApiError::not_found(self.name(), plate.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle(plate: &str) -> VehicleData {
        VehicleData {
            id: "v1".to_string(),
            plate: plate.to_string(),
            brand: None,
            model: None,
            year: None,
            color: None,
            customer_id: "c1".to_string(),
            customer: None,
        }
    }

    #[tokio::test]
    async fn test_mock_finds_inserted_vehicle() {
        let provider = MockVehicleProvider::new();
        provider.insert(vehicle("abc1234"));

        let found = provider
            .find_by_plate(&Plate::parse("ABC1234").unwrap())
            .await
            .unwrap();
        assert_eq!(found.plate, "abc1234");
    }

    #[tokio::test]
    async fn test_mock_not_found() {
        let provider = MockVehicleProvider::new();
        let err = provider
            .find_by_plate(&Plate::parse("ZZZ0000").unwrap())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(provider.requests(), vec!["ZZZ0000".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let provider = MockVehicleProvider::new();
        provider.insert(vehicle("ABC1234"));
        provider.fail_with(ApiError::network("mock", "timeout"));

        let err = provider
            .find_by_plate(&Plate::parse("ABC1234").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.message(), "timeout");
    }
}
