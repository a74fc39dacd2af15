//! The projected train record.

use std::fmt;

use super::FormatError;

/// An advertised train number, as shown to passengers.
///
/// The service sends this as a string; it is always a plain non-negative
/// integer for passenger services.
///
/// # Examples
///
/// ```
/// use train_positions::domain::TrainNumber;
///
/// let n = TrainNumber::parse("542").unwrap();
/// assert_eq!(n.get(), 542);
/// assert!(TrainNumber::parse("54A").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrainNumber(u32);

impl TrainNumber {
    /// Parse a train number from its decimal string form.
    pub fn parse(s: &str) -> Result<Self, FormatError> {
        let trimmed = s.trim();
        // u32::from_str accepts a leading '+', the service never sends one
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FormatError::InvalidTrainNumber(s.to_string()));
        }
        trimmed
            .parse()
            .map(Self)
            .map_err(|_| FormatError::InvalidTrainNumber(s.to_string()))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TrainNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A train position ready for output.
///
/// Derived from exactly one raw position record. Bearing and speed are
/// optional because a query may choose not to project them.
#[derive(Debug, Clone, PartialEq)]
pub struct Train {
    /// WGS84 latitude in degrees
    pub latitude: f64,
    /// WGS84 longitude in degrees
    pub longitude: f64,
    pub number: TrainNumber,
    /// Direction of travel in degrees
    pub bearing: Option<i32>,
    /// Speed in km/h
    pub speed: Option<i32>,
    /// RFC 3339 time the position was measured
    pub timestamp: Option<String>,
}
