//! Geographic (WGS84) coordinate type.

use std::fmt;

use super::FormatError;

/// A validated WGS84 point.
///
/// The service reports positions as strings. Two encodings are accepted:
/// a comma-delimited `"lat, lon"` pair, and the WKT form the service
/// actually emits, `"POINT (lon lat)"`. Note the WKT form puts longitude first.
///
/// # Examples
///
/// ```
/// use train_positions::domain::GeoPoint;
///
/// let p = GeoPoint::parse("59.33, 18.07").unwrap();
/// assert_eq!(p.latitude(), 59.33);
/// assert_eq!(p.longitude(), 18.07);
///
/// let p = GeoPoint::parse("POINT (18.07 59.33)").unwrap();
/// assert_eq!(p.latitude(), 59.33);
///
/// // A bare space-separated pair is ambiguous and rejected
/// assert!(GeoPoint::parse("59.33 18.07").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Create a point, checking that both components are finite and in range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, FormatError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(FormatError::InvalidNumber(format!(
                "{latitude}, {longitude}"
            )));
        }
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(FormatError::OutOfRange {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parse a point from either `"lat, lon"` or `"POINT (lon lat)"`.
    pub fn parse(s: &str) -> Result<Self, FormatError> {
        let trimmed = s.trim();

        if let Some(rest) = trimmed.strip_prefix("POINT") {
            let inner = rest
                .trim_start()
                .strip_prefix('(')
                .and_then(|r| r.strip_suffix(')'))
                .ok_or_else(|| FormatError::MalformedCoordinate(s.to_string()))?;

            let mut parts = inner.split_whitespace();
            let (Some(lon), Some(lat), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err(FormatError::MalformedCoordinate(s.to_string()));
            };
            return Self::new(parse_component(lat)?, parse_component(lon)?);
        }

        let (lat, lon) = trimmed
            .split_once(',')
            .ok_or_else(|| FormatError::MalformedCoordinate(s.to_string()))?;
        Self::new(parse_component(lat)?, parse_component(lon)?)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

fn parse_component(s: &str) -> Result<f64, FormatError> {
    let s = s.trim();
    s.parse::<f64>()
        .map_err(|_| FormatError::InvalidNumber(s.to_string()))
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_comma_pair() {
        let p = GeoPoint::parse("59.33, 18.07").unwrap();
        assert_eq!(p.latitude(), 59.33);
        assert_eq!(p.longitude(), 18.07);
    }

    #[test]
    fn parse_comma_pair_without_space() {
        let p = GeoPoint::parse("59.33,18.07").unwrap();
        assert_eq!(p.latitude(), 59.33);
        assert_eq!(p.longitude(), 18.07);
    }

    #[test]
    fn parse_wkt_point() {
        let p = GeoPoint::parse("POINT (18.0686 59.3293)").unwrap();
        assert_eq!(p.latitude(), 59.3293);
        assert_eq!(p.longitude(), 18.0686);

        let p = GeoPoint::parse("POINT(11.97 57.71)").unwrap();
        assert_eq!(p.latitude(), 57.71);
    }

    #[test]
    fn reject_missing_delimiter() {
        assert!(matches!(
            GeoPoint::parse("59.33 18.07"),
            Err(FormatError::MalformedCoordinate(_))
        ));
    }

    #[test]
    fn reject_empty() {
        assert!(GeoPoint::parse("").is_err());
        assert!(GeoPoint::parse(",").is_err());
    }

    #[test]
    fn reject_non_numeric() {
        assert!(matches!(
            GeoPoint::parse("north, east"),
            Err(FormatError::InvalidNumber(_))
        ));
        assert!(matches!(
            GeoPoint::parse("NaN, 18.0"),
            Err(FormatError::InvalidNumber(_))
        ));
    }

    #[test]
    fn reject_malformed_wkt() {
        assert!(GeoPoint::parse("POINT 18.07 59.33").is_err());
        assert!(GeoPoint::parse("POINT (18.07)").is_err());
        assert!(GeoPoint::parse("POINT (18.07 59.33 12.0)").is_err());
    }

    #[test]
    fn reject_out_of_range() {
        assert!(matches!(
            GeoPoint::parse("91.0, 18.0"),
            Err(FormatError::OutOfRange { .. })
        ));
        assert!(GeoPoint::parse("59.0, -181.0").is_err());
    }

    #[test]
    fn display() {
        let p = GeoPoint::new(59.33, 18.07).unwrap();
        assert_eq!(p.to_string(), "59.33, 18.07");
    }
}
