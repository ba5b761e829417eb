//! Aggregation-specific error types.

use perch_ebird::EbirdError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObservationError {
    #[error("eBird API error: {0}")]
    Api(#[from] EbirdError),

    #[error("Invalid observation timestamp: {0}")]
    InvalidTimestamp(String),
}

impl ObservationError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => e.user_message(),
            Self::InvalidTimestamp(_) => {
                "Received malformed sighting data. Please try again.".to_string()
            }
        }
    }
}
