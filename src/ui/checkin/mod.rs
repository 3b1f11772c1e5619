//! Check-in wizard screen
//!
//! Owns the [`WizardSession`] and the widgets for each step. Side effects
//! (lookups, capture, submission) are returned as [`CheckInAction`]s for the
//! app loop to run; results come back through the `apply_*` methods.

use crossterm::event::KeyCode;
use ratatui::{layout::Rect, widgets::ListState, Frame};
use std::path::PathBuf;
use std::time::Duration;

use crate::api::ApiError;
use crate::checkin::{
    CheckInError, CheckInStep, FuelAndItemsData, FuelLevel, HandoverData, LookupOutcome,
    LookupTicket, MediaItem, StepData, VehicleData, WizardSession, PLATE_MAX_LENGTH,
};
use crate::ui::form_field::FormField;

pub mod steps;


/// Focusable inputs on the plate step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlateFocus {
    Plate,
    Handover,
    ResponsibleName,
    ResponsiblePhone,
}

/// Focusable inputs on the fuel and items step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuelFocus {
    Note,
    Fuel,
}

/// Side effect requested by the screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckInAction {
    Lookup(LookupTicket),
    TakePhoto,
    StartRecording,
    StopRecording,
    Import(PathBuf),
    Submit,
    /// Report a validation problem to the attendant
    Notice {
        title: &'static str,
        message: String,
    },
    /// Esc on the first step; the app asks before discarding the session
    Leave,
}

impl From<CheckInError> for CheckInAction {
    fn from(err: CheckInError) -> Self {
        CheckInAction::Notice {
            title: err.title(),
            message: err.to_string(),
        }
    }
}

pub struct CheckInScreen {
    pub session: WizardSession,
    // Step 1
    pub(crate) plate: FormField,
    pub(crate) handover: FormField,
    pub(crate) responsible_name: FormField,
    pub(crate) responsible_phone: FormField,
    pub(crate) plate_focus: PlateFocus,
    // Step 2
    pub(crate) media_state: ListState,
    /// Path prompt for attaching an existing file; `Some` while open
    pub(crate) import_path: Option<FormField>,
    /// Mirrors the capture device; the app refreshes it before each key
    pub recording: bool,
    // Step 3
    pub(crate) items_note: FormField,
    pub(crate) fuel_level: FuelLevel,
    pub(crate) fuel_focus: FuelFocus,
    // Step 7
    pub submitting: bool,
}

impl Default for CheckInScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckInScreen {
    pub fn new() -> Self {
        Self {
            session: WizardSession::new(),
            plate: FormField::code("Ex: ABC1234", PLATE_MAX_LENGTH),
            handover: FormField::toggle(false, "Sim", "Não"),
            responsible_name: FormField::text("Digite o nome do responsável"),
            responsible_phone: FormField::text("Digite o telefone do responsável"),
            plate_focus: PlateFocus::Plate,
            media_state: ListState::default(),
            import_path: None,
            recording: false,
            items_note: FormField::text_area(
                "Liste os objetos pessoais encontrados no veículo...",
            ),
            fuel_level: FuelLevel::default(),
            fuel_focus: FuelFocus::Note,
            submitting: false,
        }
    }

    /// Start over with an empty session and cleared inputs
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn step(&self) -> CheckInStep {
        self.session.step()
    }

    pub fn plate_input(&self) -> String {
        self.plate.value()
    }

    pub fn vehicle(&self) -> Option<&VehicleData> {
        self.session.lookup().vehicle()
    }

    /// "Avançar" is only offered once a vehicle has been loaded
    pub fn can_leave_plate_step(&self) -> bool {
        self.vehicle().is_some() && !self.session.lookup().is_in_flight()
    }

    pub fn handover_data(&self) -> HandoverData {
        let mut data = HandoverData::default();
        data.set_other_person_delivering(self.handover.is_on());
        if data.other_person_delivering {
            data.responsible_name = self.responsible_name.value().trim().to_string();
            data.responsible_phone = self.responsible_phone.value().trim().to_string();
        }
        data
    }

    pub fn fuel_and_items_data(&self) -> FuelAndItemsData {
        FuelAndItemsData {
            personal_items_note: self.items_note.value(),
            fuel_level: self.fuel_level,
        }
    }

    pub fn fuel_level(&self) -> FuelLevel {
        self.fuel_level
    }

    pub fn selected_media(&self) -> Option<usize> {
        self.media_state.selected()
    }

    // ─── Results from the app loop ──────────────────────────────────────────

    /// Apply a finished lookup; stale responses are ignored
    pub fn apply_lookup(
        &mut self,
        ticket: &LookupTicket,
        result: Result<VehicleData, ApiError>,
    ) -> LookupOutcome {
        let outcome = self.session.lookup_mut().complete(ticket, result);
        if outcome == LookupOutcome::Found {
            self.plate_focus = PlateFocus::Handover;
        }
        outcome
    }

    pub fn add_media(&mut self, item: MediaItem) {
        self.session.media_mut().append(item);
        let last = self.session.media().len() - 1;
        self.media_state.select(Some(last));
    }

    pub fn remove_selected_media(&mut self) -> Option<MediaItem> {
        let index = self.media_state.selected()?;
        let removed = self.session.media_mut().remove_at(index)?;
        let len = self.session.media().len();
        self.media_state
            .select(if len == 0 { None } else { Some(index.min(len - 1)) });
        Some(removed)
    }

    /// Submission failed; keep everything so the attendant can retry
    pub fn submit_failed(&mut self) {
        self.submitting = false;
    }

    // ─── Navigation ─────────────────────────────────────────────────────────

    /// Store the current step's inputs, then move forward
    pub fn advance(&mut self) -> Result<CheckInStep, CheckInError> {
        match self.session.step() {
            CheckInStep::Plate => {
                if self.vehicle().is_none() {
                    return Err(CheckInError::MissingVehicle);
                }
                let data = StepData::Handover(self.handover_data());
                self.session.set_step_data(CheckInStep::Plate, data)?;
            }
            CheckInStep::FuelAndItems => {
                let data = StepData::FuelAndItems(self.fuel_and_items_data());
                self.session.set_step_data(CheckInStep::FuelAndItems, data)?;
            }
            _ => {}
        }
        let next = self.session.advance()?;
        if next == CheckInStep::Media && self.media_state.selected().is_none() {
            self.media_state
                .select(if self.session.media().is_empty() { None } else { Some(0) });
        }
        Ok(next)
    }

    /// Step back; on the first step ask to leave instead
    pub fn go_back(&mut self) -> Option<CheckInAction> {
        if self.session.step() == CheckInStep::FuelAndItems {
            // Keep what was typed even when leaving backwards
            let data = StepData::FuelAndItems(self.fuel_and_items_data());
            if let Err(err) = self.session.set_step_data(CheckInStep::FuelAndItems, data) {
                return Some(err.into());
            }
        }
        match self.session.go_back() {
            Some(_) => None,
            None => Some(CheckInAction::Leave),
        }
    }

    fn advance_action(&mut self) -> Option<CheckInAction> {
        self.advance().err().map(CheckInAction::from)
    }

    // ─── Keys ───────────────────────────────────────────────────────────────

    pub fn handle_key(&mut self, key: KeyCode) -> Option<CheckInAction> {
        if self.submitting {
            return None;
        }

        // A running recording pins the wizard to the media step
        if self.recording && self.step() == CheckInStep::Media {
            let leaving = match key {
                KeyCode::PageDown | KeyCode::PageUp => true,
                KeyCode::Enter | KeyCode::Esc => self.import_path.is_none(),
                _ => false,
            };
            if leaving {
                return Some(CheckInAction::Notice {
                    title: "Gravação em andamento",
                    message: "Pare a gravação (s) antes de sair desta etapa".to_string(),
                });
            }
        }

        // Global step navigation
        match key {
            KeyCode::PageDown if self.step() != CheckInStep::Finish => {
                return self.advance_action();
            }
            KeyCode::PageUp => return self.go_back(),
            _ => {}
        }

        match self.step() {
            CheckInStep::Plate => self.handle_plate_key(key),
            CheckInStep::Media => self.handle_media_key(key),
            CheckInStep::FuelAndItems => self.handle_fuel_key(key),
            CheckInStep::Step4 | CheckInStep::Step5 | CheckInStep::Step6 => match key {
                KeyCode::Enter => self.advance_action(),
                KeyCode::Esc => self.go_back(),
                _ => None,
            },
            CheckInStep::Finish => match key {
                KeyCode::Enter => {
                    self.submitting = true;
                    Some(CheckInAction::Submit)
                }
                KeyCode::Esc => self.go_back(),
                _ => None,
            },
        }
    }

    fn plate_focus_order(&self) -> Vec<PlateFocus> {
        let mut order = vec![PlateFocus::Plate];
        if self.vehicle().is_some() {
            order.push(PlateFocus::Handover);
            if self.handover.is_on() {
                order.push(PlateFocus::ResponsibleName);
                order.push(PlateFocus::ResponsiblePhone);
            }
        }
        order
    }

    fn cycle_plate_focus(&mut self, forward: bool) {
        let order = self.plate_focus_order();
        let pos = order
            .iter()
            .position(|f| *f == self.plate_focus)
            .unwrap_or(0);
        let len = order.len();
        let next = if forward {
            (pos + 1) % len
        } else {
            (pos + len - 1) % len
        };
        self.plate_focus = order[next];
    }

    fn handle_plate_key(&mut self, key: KeyCode) -> Option<CheckInAction> {
        match key {
            KeyCode::Esc => return Some(CheckInAction::Leave),
            KeyCode::Tab | KeyCode::Down => {
                self.cycle_plate_focus(true);
                return None;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.cycle_plate_focus(false);
                return None;
            }
            _ => {}
        }

        match self.plate_focus {
            PlateFocus::Plate => {
                if key == KeyCode::Enter {
                    return match self.session.lookup_mut().begin(&self.plate.value()) {
                        Ok(ticket) => Some(CheckInAction::Lookup(ticket)),
                        Err(err) => Some(err.into()),
                    };
                }
                let before = self.plate.value();
                self.plate.handle_key(key);
                if self.plate.value() != before {
                    // Loaded data no longer matches what is typed
                    self.session.lookup_mut().invalidate();
                }
                None
            }
            PlateFocus::Handover => {
                if key == KeyCode::Enter {
                    return self.advance_action();
                }
                self.handover.handle_key(key);
                if !self.handover.is_on() {
                    self.responsible_name.clear();
                    self.responsible_phone.clear();
                }
                None
            }
            PlateFocus::ResponsibleName | PlateFocus::ResponsiblePhone => {
                if key == KeyCode::Enter {
                    return self.advance_action();
                }
                let field = if self.plate_focus == PlateFocus::ResponsibleName {
                    &mut self.responsible_name
                } else {
                    &mut self.responsible_phone
                };
                field.handle_key(key);
                None
            }
        }
    }

    fn handle_media_key(&mut self, key: KeyCode) -> Option<CheckInAction> {
        if let Some(prompt) = self.import_path.as_mut() {
            match key {
                KeyCode::Esc => self.import_path = None,
                KeyCode::Enter => {
                    let raw = prompt.value();
                    let path = raw.trim();
                    if path.is_empty() {
                        return None;
                    }
                    let path = PathBuf::from(path);
                    self.import_path = None;
                    return Some(CheckInAction::Import(path));
                }
                other => {
                    prompt.handle_key(other);
                }
            }
            return None;
        }

        let len = self.session.media().len();
        match key {
            KeyCode::Char('f') | KeyCode::Char('p') => Some(CheckInAction::TakePhoto),
            KeyCode::Char('v') => Some(CheckInAction::StartRecording),
            KeyCode::Char('s') => Some(CheckInAction::StopRecording),
            KeyCode::Char('i') => {
                self.import_path = Some(FormField::text("/caminho/para/arquivo.jpg"));
                None
            }
            KeyCode::Char('d') | KeyCode::Delete | KeyCode::Backspace => {
                self.remove_selected_media();
                None
            }
            KeyCode::Up | KeyCode::Char('k') if len > 0 => {
                let i = self.media_state.selected().unwrap_or(0);
                self.media_state.select(Some(i.saturating_sub(1)));
                None
            }
            KeyCode::Down | KeyCode::Char('j') if len > 0 => {
                let i = self.media_state.selected().map(|i| i + 1).unwrap_or(0);
                self.media_state.select(Some(i.min(len - 1)));
                None
            }
            KeyCode::Enter => self.advance_action(),
            KeyCode::Esc => self.go_back(),
            _ => None,
        }
    }

    fn handle_fuel_key(&mut self, key: KeyCode) -> Option<CheckInAction> {
        match key {
            KeyCode::Tab | KeyCode::BackTab => {
                self.fuel_focus = match self.fuel_focus {
                    FuelFocus::Note => FuelFocus::Fuel,
                    FuelFocus::Fuel => FuelFocus::Note,
                };
                None
            }
            KeyCode::Esc => self.go_back(),
            other => match self.fuel_focus {
                FuelFocus::Note => {
                    self.items_note.handle_key(other);
                    None
                }
                FuelFocus::Fuel => match other {
                    KeyCode::Left | KeyCode::Char('-') => {
                        self.fuel_level = self.fuel_level.decrement();
                        None
                    }
                    KeyCode::Right | KeyCode::Char('+') => {
                        self.fuel_level = self.fuel_level.increment();
                        None
                    }
                    KeyCode::Char(c) if c.is_ascii_digit() => {
                        self.fuel_level = FuelLevel::new(i64::from(c as u8 - b'0'));
                        None
                    }
                    KeyCode::Enter => self.advance_action(),
                    _ => None,
                },
            },
        }
    }

    // ─── Rendering ──────────────────────────────────────────────────────────

    /// `recording` is the elapsed time of an active recording, if any
    pub fn render(&mut self, frame: &mut Frame, area: Rect, recording: Option<Duration>) {
        match self.step() {
            CheckInStep::Plate => self.render_plate_step(frame, area),
            CheckInStep::Media => self.render_media_step(frame, area, recording),
            CheckInStep::FuelAndItems => self.render_fuel_step(frame, area),
            CheckInStep::Step4 | CheckInStep::Step5 | CheckInStep::Step6 => {
                self.render_pending_step(frame, area)
            }
            CheckInStep::Finish => self.render_finish_step(frame, area),
        }
    }
}
