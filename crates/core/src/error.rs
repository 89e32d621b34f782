use triage_types::AttributeError;

#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("invalid attribute: {0}")]
    InvalidAttribute(#[from] AttributeError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("dispatcher is no longer running")]
    DispatcherClosed,
}

pub type TriageResult<T> = std::result::Result<T, TriageError>;
