//! Maps service errors to perch_core::AppError for consistent user-facing
//! messages.

use perch_core::{ApiError, AppError};
use perch_ebird::EbirdError;
use perch_observations::ObservationError;

pub fn ebird(e: EbirdError) -> AppError {
    let api = match e {
        EbirdError::InvalidApiKey => ApiError::InvalidApiKey,
        EbirdError::RateLimited(secs) => ApiError::RateLimited(secs),
        EbirdError::NotFound(msg) => ApiError::NotFound(msg),
        EbirdError::ApiError(msg) => ApiError::Failed(msg),
        EbirdError::CacheError(msg) => ApiError::Cache(msg),
        EbirdError::NetworkError(e) => ApiError::Network(e.to_string()),
    };
    AppError::Api(api)
}

pub fn observation(e: ObservationError) -> AppError {
    match e {
        ObservationError::Api(inner) => ebird(inner),
        ObservationError::InvalidTimestamp(raw) => AppError::Api(ApiError::InvalidData(raw)),
    }
}
