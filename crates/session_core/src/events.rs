//! Notifications published to the presentation layer and the confirmation seam.

use shared::domain::{HistoryId, PresetAngle};

/// The one message shown for any generation failure, whatever the cause.
pub const GENERATION_FAILURE_MESSAGE: &str =
    "Failed to generate view. Please check your API Key and try again.";

pub const CLEAR_HISTORY_PROMPT: &str = "Are you sure you want to clear the project history?";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    ImageUploaded,
    GenerationStarted { preset: Option<PresetAngle> },
    GenerationCompleted { item_id: HistoryId },
    GenerationFailed { message: String },
    HistoryCleared,
    ReturnedHome,
}

/// Blocking yes/no decision owned by the front end.
pub trait ConfirmationPrompt: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

pub struct AlwaysConfirm;

impl ConfirmationPrompt for AlwaysConfirm {
    fn confirm(&self, _message: &str) -> bool {
        true
    }
}

pub struct NeverConfirm;

impl ConfirmationPrompt for NeverConfirm {
    fn confirm(&self, _message: &str) -> bool {
        false
    }
}
