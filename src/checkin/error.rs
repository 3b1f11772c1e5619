//! Validation errors raised by the check-in wizard

use thiserror::Error;

use super::steps::CheckInStep;

/// Errors reported synchronously by the wizard core.
///
/// Every variant is recoverable by user action; the `Display` text is what the
/// check-in screen shows to the attendant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckInError {
    #[error("Placa é obrigatória")]
    EmptyPlate,

    #[error("Adicione pelo menos uma foto ou vídeo antes de continuar")]
    InsufficientMedia,

    #[error("Nenhum veículo selecionado para o check-in")]
    MissingVehicle,

    #[error("Dados do passo {} não preenchidos", .0.number())]
    MissingStepData(CheckInStep),

    #[error("Dados informados não pertencem ao passo {}", .0.number())]
    StepMismatch(CheckInStep),

    #[error("O check-in já está no último passo")]
    AlreadyAtFinalStep,

    #[error("O check-in só pode ser finalizado no passo {}", CheckInStep::Finish.number())]
    NotAtFinalStep,
}

impl CheckInError {
    /// Short title used for toast headers
    pub fn title(&self) -> &'static str {
        match self {
            CheckInError::EmptyPlate => "Placa obrigatória",
            CheckInError::InsufficientMedia => "Mídia obrigatória",
            CheckInError::MissingVehicle => "Veículo não selecionado",
            CheckInError::MissingStepData(_) | CheckInError::StepMismatch(_) => {
                "Dados incompletos"
            }
            CheckInError::AlreadyAtFinalStep | CheckInError::NotAtFinalStep => "Check-In",
        }
    }
}
