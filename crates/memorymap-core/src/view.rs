use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::api::{ApiOutcome, CANCELLED_MESSAGE};

/// Per-view async state. Containers move out of `Loading` on every path
/// once a response (or failure) has arrived.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewState<T> {
    #[default]
    Loading,
    Loaded(T),
    Empty,
    Failed(String),
}

impl<T> ViewState<T> {
    /// Build from an outcome; successful data for which `is_empty` holds
    /// becomes `Empty`.
    pub fn from_outcome(outcome: ApiOutcome<T>, is_empty: impl FnOnce(&T) -> bool) -> Self {
        match outcome {
            ApiOutcome::Success { data } => {
                if is_empty(&data) {
                    Self::Empty
                } else {
                    Self::Loaded(data)
                }
            }
            ApiOutcome::Failure { error } => Self::Failed(error),
            ApiOutcome::Cancelled => Self::Failed(CANCELLED_MESSAGE.to_string()),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(v) => Some(v),
            _ => None,
        }
    }

    pub fn loaded_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Loaded(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// What the user can do after a render failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Re-render the same view.
    Retry,
    /// Rebuild the whole shell from scratch.
    Reload,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderFailure {
    pub message: String,
}

impl RenderFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn actions(&self) -> [RecoveryAction; 2] {
        [RecoveryAction::Retry, RecoveryAction::Reload]
    }

    pub fn title(&self) -> &'static str {
        "Something went wrong"
    }
}

/// Result of rendering a child view under supervision.
#[derive(Debug, Clone, PartialEq)]
pub enum Supervised<V> {
    Ok(V),
    Failed(RenderFailure),
}

impl<V> Supervised<V> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn failure(&self) -> Option<&RenderFailure> {
        match self {
            Self::Failed(f) => Some(f),
            Self::Ok(_) => None,
        }
    }
}

/// Run `render`, turning both an `Err` and a panic into
/// `Supervised::Failed` so one broken view does not take down the shell.
pub fn supervise<V, E, F>(render: F) -> Supervised<V>
where
    E: std::fmt::Display,
    F: FnOnce() -> std::result::Result<V, E>,
{
    match catch_unwind(AssertUnwindSafe(render)) {
        Ok(Ok(view)) => Supervised::Ok(view),
        Ok(Err(e)) => {
            tracing::error!("view render failed: {e}");
            Supervised::Failed(RenderFailure::new(e.to_string()))
        }
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown render panic".to_string());
            tracing::error!("view render panicked: {message}");
            Supervised::Failed(RenderFailure::new(message))
        }
    }
}
