//! Assembled check-in record handed to the submission collaborator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::CheckInError;
use super::media::MediaItem;
use super::steps::{CheckInStep, FuelAndItemsData, HandoverData};
use super::vehicle::VehicleData;
use super::wizard::WizardSession;

/// Everything collected during one check-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRecord {
    pub id: Uuid,
    pub vehicle: VehicleData,
    pub media: Vec<MediaItem>,
    /// `None` when step 1 was left without handover details (owner delivered)
    pub handover: Option<HandoverData>,
    pub fuel_and_items: FuelAndItemsData,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl CheckInRecord {
    /// Build the record, failing on anything the shop cannot work without.
    ///
    /// Required: a looked-up vehicle, at least one media item and the step 3
    /// record. Handover details are optional.
    pub fn assemble(session: &WizardSession) -> Result<Self, CheckInError> {
        let vehicle = session
            .lookup()
            .vehicle()
            .cloned()
            .ok_or(CheckInError::MissingVehicle)?;

        if session.media().is_empty() {
            return Err(CheckInError::InsufficientMedia);
        }

        let fuel_and_items = session
            .steps()
            .fuel_and_items()
            .cloned()
            .ok_or(CheckInError::MissingStepData(CheckInStep::FuelAndItems))?;

        Ok(Self {
            id: session.id(),
            vehicle,
            media: session.media().as_slice().to_vec(),
            handover: session.steps().handover().cloned(),
            fuel_and_items,
            started_at: session.started_at(),
            completed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::checkin::media::MediaItem;
    use crate::checkin::steps::{FuelLevel, StepData};

    fn vehicle() -> VehicleData {
        VehicleData {
            id: "v1".to_string(),
            plate: "ABC1234".to_string(),
            brand: Some("Fiat".to_string()),
            model: Some("Uno".to_string()),
            year: None,
            color: None,
            customer_id: "c1".to_string(),
            customer: None,
        }
    }

    fn complete_session() -> WizardSession {
        let mut session = WizardSession::new();
        let ticket = session.lookup_mut().begin("abc1234").unwrap();
        session.lookup_mut().complete(&ticket, Ok(vehicle()));
        session.media_mut().append(MediaItem::image("uri1"));
        session
            .set_step_data(
                CheckInStep::FuelAndItems,
                StepData::FuelAndItems(FuelAndItemsData {
                    personal_items_note: "chave reserva".to_string(),
                    fuel_level: FuelLevel::new(2),
                }),
            )
            .unwrap();
        session
    }

    #[test]
    fn test_assemble_complete_session() {
        let session = complete_session();
        let record = session.assemble().unwrap();

        assert_eq!(record.id, session.id());
        assert_eq!(record.vehicle.plate, "ABC1234");
        assert_eq!(record.media, vec![MediaItem::image("uri1")]);
        assert_eq!(record.fuel_and_items.personal_items_note, "chave reserva");
        assert!(record.handover.is_none());
        assert!(record.completed_at >= record.started_at);
    }

    #[test]
    fn test_assemble_requires_vehicle() {
        let mut session = complete_session();
        session.lookup_mut().invalidate();
        assert_eq!(session.assemble(), Err(CheckInError::MissingVehicle));
    }

    #[test]
    fn test_assemble_requires_fuel_step() {
        let mut session = WizardSession::new();
        let ticket = session.lookup_mut().begin("abc1234").unwrap();
        session.lookup_mut().complete(&ticket, Ok(vehicle()));
        session.media_mut().append(MediaItem::image("uri1"));

        assert_eq!(
            session.assemble(),
            Err(CheckInError::MissingStepData(CheckInStep::FuelAndItems))
        );
    }

    #[test]
    fn test_assemble_requires_media() {
        let mut session = complete_session();
        session.media_mut().clear();
        assert_eq!(session.assemble(), Err(CheckInError::InsufficientMedia));
    }

    #[test]
    fn test_not_found_lookup_cannot_be_assembled() {
        let mut session = complete_session();
        let ticket = session.lookup_mut().begin("zzz0000").unwrap();
        session
            .lookup_mut()
            .complete(&ticket, Err(ApiError::not_found("supabase", "ZZZ0000")));
        assert_eq!(session.assemble(), Err(CheckInError::MissingVehicle));
    }

    #[test]
    fn test_serialized_field_names() {
        let record = complete_session().assemble().unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["fuelAndItems"]["nivelCombustivel"], 2);
        assert_eq!(json["media"][0]["type"], "image");
        assert!(json["handover"].is_null());
    }
}
