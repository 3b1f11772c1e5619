//! Finalizing a check-in: assemble the record and hand it to a sink

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::api::ApiError;

use super::error::CheckInError;
use super::record::CheckInRecord;
use super::wizard::WizardSession;

const SINK_NAME: &str = "local";

/// Acknowledgement returned by a sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    /// Where the record ended up (file path, remote id, ...)
    pub reference: String,
    pub plate: String,
}

/// Errors from [`finalize`]
#[derive(Error, Debug)]
pub enum FinalizeError {
    #[error(transparent)]
    Invalid(#[from] CheckInError),

    #[error(transparent)]
    Sink(#[from] ApiError),
}

/// Receiver for completed check-in records
#[async_trait]
pub trait CheckInSink: Send + Sync {
    /// Sink name for logs
    fn name(&self) -> &str;

    async fn submit(&self, record: &CheckInRecord) -> Result<String, ApiError>;
}

/// Writes each record as pretty JSON to `<dir>/<id>.json`
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

#[async_trait]
impl CheckInSink for JsonFileSink {
    fn name(&self) -> &str {
        SINK_NAME
    }

    async fn submit(&self, record: &CheckInRecord) -> Result<String, ApiError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ApiError::storage(SINK_NAME, e.to_string()))?;

        let path = self.dir.join(format!("{}.json", record.id));
        let contents = serde_json::to_string_pretty(record)
            .map_err(|e| ApiError::storage(SINK_NAME, e.to_string()))?;
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| ApiError::storage(SINK_NAME, e.to_string()))?;

        Ok(path.to_string_lossy().to_string())
    }
}

/// Submit the session's record from the final step and reset the session.
///
/// On any failure the session is left untouched so the attendant can fix the
/// problem and try again.
pub async fn finalize(
    session: &mut WizardSession,
    sink: &dyn CheckInSink,
) -> Result<SubmitReceipt, FinalizeError> {
    if !session.step().is_final() {
        return Err(CheckInError::NotAtFinalStep.into());
    }

    let record = session.assemble()?;
    let reference = sink.submit(&record).await?;

    tracing::info!(
        checkin_id = %record.id,
        plate = %record.vehicle.plate,
        media = record.media.len(),
        sink = sink.name(),
        reference = %reference,
        "Check-in submitted"
    );

    session.reset();
    Ok(SubmitReceipt {
        reference,
        plate: record.vehicle.plate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkin::media::MediaItem;
    use crate::checkin::steps::{CheckInStep, FuelAndItemsData, FuelLevel, StepData};
    use crate::checkin::vehicle::VehicleData;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct FailingSink;

    #[async_trait]
    impl CheckInSink for FailingSink {
        fn name(&self) -> &str {
            "failing"
        }

        async fn submit(&self, _record: &CheckInRecord) -> Result<String, ApiError> {
            Err(ApiError::network("failing", "offline"))
        }
    }

    struct RecordingSink {
        records: Mutex<Vec<CheckInRecord>>,
    }

    #[async_trait]
    impl CheckInSink for RecordingSink {
        fn name(&self) -> &str {
            "recording"
        }

        async fn submit(&self, record: &CheckInRecord) -> Result<String, ApiError> {
            self.records.lock().unwrap().push(record.clone());
            Ok(record.id.to_string())
        }
    }

    fn ready_session() -> WizardSession {
        let mut session = WizardSession::new();
        let ticket = session.lookup_mut().begin("abc1234").unwrap();
        session.lookup_mut().complete(
            &ticket,
            Ok(VehicleData {
                id: "v1".to_string(),
                plate: "ABC1234".to_string(),
                brand: None,
                model: None,
                year: None,
                color: None,
                customer_id: "c1".to_string(),
                customer: None,
            }),
        );
        session.advance().unwrap();
        session.media_mut().append(MediaItem::image("uri1"));
        session.advance().unwrap();
        session
            .set_step_data(
                CheckInStep::FuelAndItems,
                StepData::FuelAndItems(FuelAndItemsData {
                    personal_items_note: String::new(),
                    fuel_level: FuelLevel::new(4),
                }),
            )
            .unwrap();
        while !session.step().is_final() {
            session.advance().unwrap();
        }
        session
    }

    #[tokio::test]
    async fn test_finalize_requires_final_step() {
        let mut session = WizardSession::new();
        let sink = RecordingSink {
            records: Mutex::new(Vec::new()),
        };
        let err = finalize(&mut session, &sink).await.unwrap_err();
        assert!(matches!(
            err,
            FinalizeError::Invalid(CheckInError::NotAtFinalStep)
        ));
    }

    #[tokio::test]
    async fn test_finalize_submits_and_resets() {
        let mut session = ready_session();
        let id = session.id();
        let sink = RecordingSink {
            records: Mutex::new(Vec::new()),
        };

        let receipt = finalize(&mut session, &sink).await.unwrap();

        assert_eq!(receipt.plate, "ABC1234");
        assert_eq!(receipt.reference, id.to_string());
        assert_eq!(sink.records.lock().unwrap().len(), 1);
        assert_eq!(session.step(), CheckInStep::Plate);
        assert_ne!(session.id(), id);
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_session() {
        let mut session = ready_session();
        let id = session.id();

        let err = finalize(&mut session, &FailingSink).await.unwrap_err();

        assert_eq!(err.to_string(), "failing: Network error - offline");
        assert_eq!(session.id(), id);
        assert!(session.step().is_final());
    }

    #[tokio::test]
    async fn test_json_file_sink_writes_record() {
        let temp_dir = TempDir::new().unwrap();
        let sink = JsonFileSink::new(temp_dir.path().join("checkins"));
        let mut session = ready_session();
        let id = session.id();

        let receipt = finalize(&mut session, &sink).await.unwrap();

        let path = temp_dir.path().join("checkins").join(format!("{}.json", id));
        assert_eq!(receipt.reference, path.to_string_lossy());
        let written: CheckInRecord =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written.vehicle.plate, "ABC1234");
        assert_eq!(written.fuel_and_items.fuel_level, FuelLevel::FULL);
    }
}
