//! Geographic coordinates.

use std::fmt;

/// Error returned when a coordinate string is not in `"lat,lon"` form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid coordinate format: {reason}")]
pub struct CoordinateFormatError {
    reason: &'static str,
}

/// A WGS84 latitude/longitude pair in decimal degrees.
///
/// Parsing only checks the shape of the input. Range checks are done with
/// [`Coordinate::is_valid`] so that out-of-range input can be reported
/// separately from malformed input.
///
/// # Examples
///
/// ```
/// use departures_server::domain::Coordinate;
///
/// let c = Coordinate::parse("51.1079, 17.0385").unwrap();
/// assert_eq!(c.latitude, 51.1079);
/// assert!(c.is_valid());
///
/// let off_planet = Coordinate::parse("91,0").unwrap();
/// assert!(!off_planet.is_valid());
///
/// assert!(Coordinate::parse("51.1").is_err());
/// ```
#[derive(Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Parse a coordinate from `"lat,lon"`. Whitespace around each part is ignored.
    pub fn parse(s: &str) -> Result<Self, CoordinateFormatError> {
        let mut parts = s.split(',');
        let (Some(lat), Some(lon), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(CoordinateFormatError {
                reason: "expected exactly two comma-separated values",
            });
        };

        let latitude = lat.trim().parse::<f64>().map_err(|_| CoordinateFormatError {
            reason: "latitude is not a number",
        })?;
        let longitude = lon.trim().parse::<f64>().map_err(|_| CoordinateFormatError {
            reason: "longitude is not a number",
        })?;

        Ok(Self::new(latitude, longitude))
    }

    /// Returns true if latitude is within [-90, 90] and longitude within [-180, 180].
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Debug for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coordinate({}, {})", self.latitude, self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}
