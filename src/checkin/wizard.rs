//! Check-in wizard session and step sequencer

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::error::CheckInError;
use super::lookup::VehicleLookup;
use super::media::MediaList;
use super::record::CheckInRecord;
use super::steps::{CheckInStep, StepData, StepDataStore};

/// State of one check-in attempt.
///
/// Owned by the check-in screen and handed to each step by `&mut`; nothing
/// else holds it. Lives only in memory and is reset after submission or when
/// the attendant abandons the check-in.
#[derive(Debug, Clone)]
pub struct WizardSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    step: CheckInStep,
    lookup: VehicleLookup,
    media: MediaList,
    steps: StepDataStore,
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            step: CheckInStep::Plate,
            lookup: VehicleLookup::new(),
            media: MediaList::new(),
            steps: StepDataStore::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn step(&self) -> CheckInStep {
        self.step
    }

    pub fn lookup(&self) -> &VehicleLookup {
        &self.lookup
    }

    pub fn lookup_mut(&mut self) -> &mut VehicleLookup {
        &mut self.lookup
    }

    pub fn media(&self) -> &MediaList {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut MediaList {
        &mut self.media
    }

    pub fn step_data(&self, step: CheckInStep) -> Option<&StepData> {
        self.steps.get(step)
    }

    pub fn steps(&self) -> &StepDataStore {
        &self.steps
    }

    /// Replace the record for `step`
    pub fn set_step_data(&mut self, step: CheckInStep, data: StepData) -> Result<(), CheckInError> {
        self.steps.set(step, data)
    }

    /// Check the exit condition of the current step without moving
    pub fn can_advance(&self) -> Result<(), CheckInError> {
        match self.step {
            CheckInStep::Media if self.media.is_empty() => Err(CheckInError::InsufficientMedia),
            CheckInStep::Finish => Err(CheckInError::AlreadyAtFinalStep),
            _ => Ok(()),
        }
    }

    /// Move to the next step if the current step's guard allows it
    pub fn advance(&mut self) -> Result<CheckInStep, CheckInError> {
        self.can_advance()?;
        let next = self.step.next().ok_or(CheckInError::AlreadyAtFinalStep)?;
        tracing::debug!(from = self.step.number(), to = next.number(), "Check-in step advanced");
        self.step = next;
        Ok(next)
    }

    /// Move one step back; accumulated data is kept.
    ///
    /// Returns `None` on the first step (caller decides whether to leave the flow).
    pub fn go_back(&mut self) -> Option<CheckInStep> {
        let prev = self.step.prev()?;
        self.step = prev;
        Some(prev)
    }

    /// Assemble the final record from the accumulated data
    pub fn assemble(&self) -> Result<CheckInRecord, CheckInError> {
        CheckInRecord::assemble(self)
    }

    /// Discard everything and start a fresh attempt
    pub fn reset(&mut self) {
        tracing::debug!(checkin_id = %self.id, "Check-in session reset");
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkin::media::MediaItem;
    use crate::checkin::steps::{FuelAndItemsData, FuelLevel};

    fn at_step(step: CheckInStep) -> WizardSession {
        let mut session = WizardSession::new();
        session.step = step;
        session
    }

    #[test]
    fn test_new_session_starts_at_plate() {
        let session = WizardSession::new();
        assert_eq!(session.step(), CheckInStep::Plate);
        assert!(session.media().is_empty());
        assert!(session.lookup().vehicle().is_none());
    }

    #[test]
    fn test_media_step_requires_one_item() {
        let mut session = at_step(CheckInStep::Media);

        assert_eq!(session.advance(), Err(CheckInError::InsufficientMedia));
        assert_eq!(session.step(), CheckInStep::Media);

        session.media_mut().append(MediaItem::image("uri1"));
        assert_eq!(session.advance(), Ok(CheckInStep::FuelAndItems));
    }

    #[test]
    fn test_media_step_blocks_again_after_removal() {
        let mut session = at_step(CheckInStep::Media);
        session.media_mut().append(MediaItem::image("uri1"));
        session.media_mut().remove_at(0);

        assert_eq!(session.can_advance(), Err(CheckInError::InsufficientMedia));
    }

    #[test]
    fn test_other_steps_are_unguarded() {
        let mut session = WizardSession::new();
        assert_eq!(session.advance(), Ok(CheckInStep::Media));

        let mut session = at_step(CheckInStep::FuelAndItems);
        assert_eq!(session.advance(), Ok(CheckInStep::Step4));
        assert_eq!(session.advance(), Ok(CheckInStep::Step5));
        assert_eq!(session.advance(), Ok(CheckInStep::Step6));
        assert_eq!(session.advance(), Ok(CheckInStep::Finish));
    }

    #[test]
    fn test_cannot_advance_past_final_step() {
        let mut session = at_step(CheckInStep::Finish);
        assert_eq!(session.advance(), Err(CheckInError::AlreadyAtFinalStep));
        assert_eq!(session.step(), CheckInStep::Finish);
    }

    #[test]
    fn test_go_back_keeps_data() {
        let mut session = at_step(CheckInStep::Media);
        session.media_mut().append(MediaItem::image("uri1"));
        session.advance().unwrap();
        session
            .set_step_data(
                CheckInStep::FuelAndItems,
                StepData::FuelAndItems(FuelAndItemsData {
                    personal_items_note: "chave reserva".to_string(),
                    fuel_level: FuelLevel::new(2),
                }),
            )
            .unwrap();

        assert_eq!(session.go_back(), Some(CheckInStep::Media));
        assert_eq!(session.go_back(), Some(CheckInStep::Plate));
        assert_eq!(session.go_back(), None);

        assert_eq!(session.media().len(), 1);
        assert!(session.steps().fuel_and_items().is_some());
    }

    #[test]
    fn test_reset_discards_everything() {
        let mut session = at_step(CheckInStep::Step5);
        session.media_mut().append(MediaItem::video("uri"));
        let old_id = session.id();

        session.reset();

        assert_eq!(session.step(), CheckInStep::Plate);
        assert!(session.media().is_empty());
        assert!(session.steps().is_empty());
        assert_ne!(session.id(), old_id);
    }
}
