use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PiineError {
    #[error("host element '{id}' not found")]
    MissingElement { id: String },
    #[error("controller is no longer running")]
    ControllerStopped,
    #[error("controller already disposed")]
    Disposed,
    #[error("unknown trigger '{name}'")]
    UnknownTrigger { name: String },
}

impl PiineError {
    pub fn missing_element(id: impl Into<String>) -> Self {
        Self::MissingElement { id: id.into() }
    }

    /// Conditions the UI is expected to shrug off rather than report.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MissingElement { .. } | Self::Disposed)
    }
}
