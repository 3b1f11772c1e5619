//! Plate lookup holder with request-generation tracking
//!
//! Each lookup is started with [`VehicleLookup::begin`], which hands out a
//! [`LookupTicket`]. Responses are applied through [`VehicleLookup::complete`]
//! and only the ticket from the most recent `begin` (or plate edit) is allowed
//! to touch the holder. Older responses come back as [`LookupOutcome::Stale`].

use crate::api::providers::vehicle::VehicleProvider;
use crate::api::ApiError;

use super::error::CheckInError;
use super::plate::Plate;
use super::vehicle::VehicleData;

/// Message shown when the backend has no vehicle with the plate
pub const NOT_FOUND_MESSAGE: &str = "Veículo não encontrado";

/// Handle for one in-flight lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    generation: u64,
    plate: Plate,
}

impl LookupTicket {
    pub fn plate(&self) -> &Plate {
        &self.plate
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What happened when a lookup response was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Holder now contains the vehicle
    Found,
    /// No vehicle with this plate; holder cleared
    NotFound,
    /// Collaborator failure; holder cleared, message is the collaborator's
    Failed(String),
    /// A newer lookup or plate edit superseded this one; holder untouched
    Stale,
}

impl LookupOutcome {
    /// Toast title/body pair for the outcome, `None` for stale responses
    pub fn notice(&self) -> Option<(&'static str, String)> {
        match self {
            LookupOutcome::Found => Some((
                "Veículo encontrado",
                "Dados do cliente carregados com sucesso".to_string(),
            )),
            LookupOutcome::NotFound => Some((
                NOT_FOUND_MESSAGE,
                "Nenhum veículo encontrado com esta placa".to_string(),
            )),
            LookupOutcome::Failed(message) => Some(("Erro na busca", message.clone())),
            LookupOutcome::Stale => None,
        }
    }
}

/// Single-slot holder for the latest plate lookup result
#[derive(Debug, Clone, Default)]
pub struct VehicleLookup {
    generation: u64,
    in_flight: bool,
    vehicle: Option<VehicleData>,
}

impl VehicleLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the plate and start a new lookup.
    ///
    /// Clears the holder and supersedes any lookup still in flight.
    pub fn begin(&mut self, raw_plate: &str) -> Result<LookupTicket, CheckInError> {
        let plate = Plate::parse(raw_plate)?;
        self.generation += 1;
        self.in_flight = true;
        self.vehicle = None;
        tracing::debug!(plate = %plate, generation = self.generation, "Plate lookup started");
        Ok(LookupTicket {
            generation: self.generation,
            plate,
        })
    }

    /// Apply a lookup response if it belongs to the latest request
    pub fn complete(
        &mut self,
        ticket: &LookupTicket,
        result: Result<VehicleData, ApiError>,
    ) -> LookupOutcome {
        if ticket.generation != self.generation {
            tracing::debug!(
                plate = %ticket.plate,
                generation = ticket.generation,
                latest = self.generation,
                "Discarding stale plate lookup response"
            );
            return LookupOutcome::Stale;
        }

        self.in_flight = false;
        match result {
            // A plate match counts even without an embedded customer record
            Ok(vehicle) => {
                tracing::info!(
                    plate = %ticket.plate,
                    vehicle_id = %vehicle.id,
                    has_customer = vehicle.customer.is_some(),
                    "Vehicle found"
                );
                self.vehicle = Some(vehicle);
                LookupOutcome::Found
            }
            Err(err) if err.is_not_found() => {
                tracing::info!(plate = %ticket.plate, "Vehicle not found");
                self.vehicle = None;
                LookupOutcome::NotFound
            }
            Err(err) => {
                tracing::warn!(plate = %ticket.plate, error = %err, "Plate lookup failed");
                self.vehicle = None;
                LookupOutcome::Failed(err.message())
            }
        }
    }

    /// Forget the current result (plate text changed); in-flight responses become stale
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.in_flight = false;
        self.vehicle = None;
    }

    pub fn vehicle(&self) -> Option<&VehicleData> {
        self.vehicle.as_ref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Issue the single request for a ticket.
///
/// Kept apart from [`VehicleLookup`] so the request can run on another task
/// while the holder stays with its owner.
pub async fn fetch(
    provider: &dyn VehicleProvider,
    ticket: &LookupTicket,
) -> Result<VehicleData, ApiError> {
    provider.find_by_plate(ticket.plate()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::providers::vehicle::MockVehicleProvider;

    fn vehicle(plate: &str) -> VehicleData {
        VehicleData {
            id: format!("id-{}", plate),
            plate: plate.to_string(),
            brand: None,
            model: None,
            year: None,
            color: None,
            customer_id: "c1".to_string(),
            customer: None,
        }
    }

    #[test]
    fn test_begin_rejects_empty_plate() {
        let mut lookup = VehicleLookup::new();
        assert_eq!(lookup.begin("   "), Err(CheckInError::EmptyPlate));
        assert_eq!(lookup.generation(), 0);
        assert!(!lookup.is_in_flight());
    }

    #[test]
    fn test_found_populates_holder() {
        let mut lookup = VehicleLookup::new();
        let ticket = lookup.begin("abc1234").unwrap();
        assert_eq!(ticket.plate().as_str(), "ABC1234");

        let outcome = lookup.complete(&ticket, Ok(vehicle("ABC1234")));

        assert_eq!(outcome, LookupOutcome::Found);
        assert_eq!(lookup.vehicle().unwrap().plate, "ABC1234");
        assert!(!lookup.is_in_flight());
    }

    #[test]
    fn test_vehicle_without_customer_is_found() {
        let mut lookup = VehicleLookup::new();
        let ticket = lookup.begin("ABC1234").unwrap();

        let outcome = lookup.complete(&ticket, Ok(vehicle("ABC1234")));

        assert_eq!(outcome, LookupOutcome::Found);
        let found = lookup.vehicle().unwrap();
        assert!(found.customer.is_none());
        assert_eq!(found.customer_id, "c1");
    }

    #[test]
    fn test_not_found_clears_holder() {
        let mut lookup = VehicleLookup::new();
        let first = lookup.begin("XYZ9876").unwrap();
        lookup.complete(&first, Ok(vehicle("XYZ9876")));

        let ticket = lookup.begin("abc1234").unwrap();
        let outcome = lookup.complete(&ticket, Err(ApiError::not_found("supabase", "ABC1234")));

        assert_eq!(outcome, LookupOutcome::NotFound);
        assert!(lookup.vehicle().is_none());
        assert_eq!(outcome.notice().unwrap().0, "Veículo não encontrado");
    }

    #[test]
    fn test_failure_surfaces_message_verbatim() {
        let mut lookup = VehicleLookup::new();
        let ticket = lookup.begin("ABC1234").unwrap();
        let outcome = lookup.complete(
            &ticket,
            Err(ApiError::network("supabase", "connection refused")),
        );

        assert_eq!(outcome, LookupOutcome::Failed("connection refused".to_string()));
        assert!(lookup.vehicle().is_none());
    }

    #[test]
    fn test_stale_response_is_ignored() {
        let mut lookup = VehicleLookup::new();
        let older = lookup.begin("AAA1111").unwrap();
        let newer = lookup.begin("BBB2222").unwrap();

        assert_eq!(
            lookup.complete(&newer, Ok(vehicle("BBB2222"))),
            LookupOutcome::Found
        );
        // The first request resolves last; it must not overwrite the newer result
        assert_eq!(
            lookup.complete(&older, Ok(vehicle("AAA1111"))),
            LookupOutcome::Stale
        );
        assert_eq!(lookup.vehicle().unwrap().plate, "BBB2222");
        assert_eq!(LookupOutcome::Stale.notice(), None);
    }

    #[test]
    fn test_invalidate_makes_in_flight_stale() {
        let mut lookup = VehicleLookup::new();
        let ticket = lookup.begin("ABC1234").unwrap();
        lookup.invalidate();

        assert_eq!(
            lookup.complete(&ticket, Ok(vehicle("ABC1234"))),
            LookupOutcome::Stale
        );
        assert!(lookup.vehicle().is_none());
    }

    #[tokio::test]
    async fn test_fetch_uses_ticket_plate() {
        let provider = MockVehicleProvider::new();
        provider.insert(vehicle("ABC1234"));
        let mut lookup = VehicleLookup::new();

        let ticket = lookup.begin(" abc1234 ").unwrap();
        let result = fetch(&provider, &ticket).await;

        assert_eq!(lookup.complete(&ticket, result), LookupOutcome::Found);
        assert_eq!(provider.requests(), vec!["ABC1234".to_string()]);
    }
}
