//! Wizard steps and the data collected at each of them

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::error::CheckInError;

/// Steps of the check-in wizard, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInStep {
    /// Plate entry, customer confirmation and handover details
    Plate,
    /// Photo/video capture
    Media,
    /// Fuel level and personal items left in the vehicle
    FuelAndItems,
    Step4,
    Step5,
    Step6,
    /// Terminal step; the record is finalized from here
    Finish,
}

impl CheckInStep {
    pub fn all() -> &'static [CheckInStep] {
        &[
            CheckInStep::Plate,
            CheckInStep::Media,
            CheckInStep::FuelAndItems,
            CheckInStep::Step4,
            CheckInStep::Step5,
            CheckInStep::Step6,
            CheckInStep::Finish,
        ]
    }

    /// 1-based position in the wizard
    pub fn number(&self) -> usize {
        match self {
            CheckInStep::Plate => 1,
            CheckInStep::Media => 2,
            CheckInStep::FuelAndItems => 3,
            CheckInStep::Step4 => 4,
            CheckInStep::Step5 => 5,
            CheckInStep::Step6 => 6,
            CheckInStep::Finish => 7,
        }
    }

    pub fn next(&self) -> Option<CheckInStep> {
        Self::all().get(self.number()).copied()
    }

    pub fn prev(&self) -> Option<CheckInStep> {
        self.number()
            .checked_sub(2)
            .and_then(|i| Self::all().get(i).copied())
    }

    pub fn is_final(&self) -> bool {
        matches!(self, CheckInStep::Finish)
    }

    pub fn title(&self) -> String {
        format!("Check-In - Passo {}", self.number())
    }

    pub fn heading(&self) -> &'static str {
        match self {
            CheckInStep::Plate => "Placa do veículo",
            CheckInStep::Media => "Fotos e vídeos",
            CheckInStep::FuelAndItems => "Combustível e objetos pessoais",
            CheckInStep::Step4 | CheckInStep::Step5 | CheckInStep::Step6 => "Próxima etapa",
            CheckInStep::Finish => "Finalizar check-in",
        }
    }
}

impl fmt::Display for CheckInStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Discrete fuel gauge reading: 0 (empty) to 4 (full)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct FuelLevel(u8);

impl FuelLevel {
    pub const EMPTY: FuelLevel = FuelLevel(0);
    pub const HALF: FuelLevel = FuelLevel(2);
    pub const FULL: FuelLevel = FuelLevel(4);

    pub const LABELS: [&'static str; 5] = ["0", "1/4", "1/2", "3/4", "Full"];

    /// Build a level, clamping anything outside 0..=4
    pub fn new(level: i64) -> Self {
        Self(level.clamp(0, 4) as u8)
    }

    /// Snap a slider position (0.0 ..= 1.0) to the nearest level
    pub fn from_fraction(fraction: f64) -> Self {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        Self::new((fraction * 4.0).round() as i64)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn label(&self) -> &'static str {
        Self::LABELS[self.0 as usize]
    }

    /// Fraction of a full tank, for gauges
    pub fn ratio(&self) -> f64 {
        f64::from(self.0) / 4.0
    }

    pub fn increment(self) -> Self {
        Self::new(i64::from(self.0) + 1)
    }

    pub fn decrement(self) -> Self {
        Self::new(i64::from(self.0) - 1)
    }
}

impl Default for FuelLevel {
    fn default() -> Self {
        Self::HALF
    }
}

impl From<i64> for FuelLevel {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<FuelLevel> for u8 {
    fn from(level: FuelLevel) -> Self {
        level.0
    }
}

/// Step 3: fuel level and free-text note about personal items
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelAndItemsData {
    #[serde(rename = "objetosPessoais")]
    pub personal_items_note: String,
    #[serde(rename = "nivelCombustivel")]
    pub fuel_level: FuelLevel,
}

/// Step 1: who is handing the vehicle over
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverData {
    #[serde(rename = "outraPessoaEntregando")]
    pub other_person_delivering: bool,
    #[serde(rename = "nomeResponsavel", default)]
    pub responsible_name: String,
    #[serde(rename = "telefoneResponsavel", default)]
    pub responsible_phone: String,
}

impl HandoverData {
    /// Flip the "someone else is delivering" switch; turning it off clears the contact
    pub fn set_other_person_delivering(&mut self, value: bool) {
        self.other_person_delivering = value;
        if !value {
            self.responsible_name.clear();
            self.responsible_phone.clear();
        }
    }
}

/// Complete record for one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepData {
    Handover(HandoverData),
    FuelAndItems(FuelAndItemsData),
}

impl StepData {
    /// The step this kind of data belongs to
    pub fn step(&self) -> CheckInStep {
        match self {
            StepData::Handover(_) => CheckInStep::Plate,
            StepData::FuelAndItems(_) => CheckInStep::FuelAndItems,
        }
    }
}

/// Per-step records; each `set` replaces the previous record wholesale
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepDataStore {
    entries: BTreeMap<CheckInStep, StepData>,
}

impl StepDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, step: CheckInStep, data: StepData) -> Result<(), CheckInError> {
        if data.step() != step {
            return Err(CheckInError::StepMismatch(step));
        }
        self.entries.insert(step, data);
        Ok(())
    }

    pub fn get(&self, step: CheckInStep) -> Option<&StepData> {
        self.entries.get(&step)
    }

    pub fn handover(&self) -> Option<&HandoverData> {
        match self.entries.get(&CheckInStep::Plate) {
            Some(StepData::Handover(data)) => Some(data),
            _ => None,
        }
    }

    pub fn fuel_and_items(&self) -> Option<&FuelAndItemsData> {
        match self.entries.get(&CheckInStep::FuelAndItems) {
            Some(StepData::FuelAndItems(data)) => Some(data),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
