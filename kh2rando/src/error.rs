use crate::validate::ValidationFailure;
use thiserror::Error;

pub use kh2rando_game::ConfigError;

/// Why a single generation attempt failed. A fresh attempt with another seed may succeed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AttemptFailure {
    #[error("no checks are reachable from the start")]
    NoInitiallyReachableChecks,
    #[error("the padded item pool does not fit the open checks")]
    UnplaceableItems,
    #[error("exhausted key item placements at step {step}")]
    KeyItemPlacementExhausted { step: usize },
    #[error("key items left unplaced: {}", .items.join(", "))]
    KeyItemsUnplaced { items: Vec<String> },
    #[error("goal was never reached")]
    GoalUnreachable,
    #[error("{count} slots could not be filled")]
    UnfilledSlots { count: usize },
    #[error("{count} items could not be placed")]
    LeftoverItems { count: usize },
    #[error("seed failed validation with {} problems", .failures.len())]
    ValidationFailed { failures: Vec<ValidationFailure> },
}

#[derive(Debug, Error)]
pub enum RandomizeError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("attempt failed: {0}")]
    Attempt(#[from] AttemptFailure),
    #[error("exhausted randomization attempts after {} failures", .failures.len())]
    ExhaustedRetries { failures: Vec<AttemptFailure> },
}

impl RandomizeError {
    pub fn is_config(&self) -> bool {
        matches!(self, RandomizeError::Config(_))
    }
}
