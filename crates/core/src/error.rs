use thiserror::Error;

pub type DataLayerResult<T> = Result<T, DataLayerError>;

#[derive(Error, Debug)]
pub enum DataLayerError {
    #[error("'{field}' is missing from Event object")]
    MissingField { field: &'static str },

    #[error("There is no page information for event {event}")]
    MissingPageContext { event: String },

    #[error("unknown event type {event_type}")]
    UnknownType { event_type: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl DataLayerError {
    /// True for errors that reject a single queue entry. These are logged
    /// and skipped; they never stop the queue.
    pub fn is_entry_error(&self) -> bool {
        matches!(
            self,
            DataLayerError::MissingField { .. }
                | DataLayerError::MissingPageContext { .. }
                | DataLayerError::UnknownType { .. }
        )
    }
}

impl From<config::ConfigError> for DataLayerError {
    fn from(err: config::ConfigError) -> Self {
        DataLayerError::Config(err.to_string())
    }
}
