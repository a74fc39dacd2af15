//! Domain error types.
//!
//! These errors describe records that could not be projected into domain
//! values. They are per-record and distinct from transport or decode errors.

/// A raw field could not be interpreted as a domain value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatError {
    /// Coordinate string is not a recognised pair
    #[error("malformed coordinate {0:?}: expected \"lat, lon\" or \"POINT (lon lat)\"")]
    MalformedCoordinate(String),

    /// A coordinate component is not a finite number
    #[error("invalid coordinate component {0:?}")]
    InvalidNumber(String),

    /// Coordinate is outside the WGS84 range
    #[error("coordinate out of range: latitude {latitude}, longitude {longitude}")]
    OutOfRange { latitude: f64, longitude: f64 },

    /// Train number is not a non-negative integer
    #[error("invalid train number {0:?}")]
    InvalidTrainNumber(String),

    /// A field needed for projection was absent from the record
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}
