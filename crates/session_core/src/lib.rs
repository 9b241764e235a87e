//! Session state machine for regenerating an uploaded image from a new
//! viewpoint: presets, the generation guard, and the history ledger.

pub mod events;
pub mod history;
pub mod orchestrator;
pub mod preset;
mod session;
pub mod thumbnail;

pub use events::{
    AlwaysConfirm, ConfirmationPrompt, NeverConfirm, SessionEvent, CLEAR_HISTORY_PROMPT,
    GENERATION_FAILURE_MESSAGE,
};
pub use history::HistoryLedger;
pub use orchestrator::{describe, GenerationOrchestrator, GenerationOutcome, SkipReason};
pub use session::{SessionController, SessionOptions, SessionSnapshot};

#[cfg(test)]
#[path = "tests/mod.rs"]
mod tests;
