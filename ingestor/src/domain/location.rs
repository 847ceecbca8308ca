//! Geographic points the ingestor fetches observations for.

/// A named geographic point in WGS84 degrees.
///
/// Locations are supplied by configuration, validated once at load, and
/// treated as read-only input for the rest of the run.
///
/// # Examples
/// ```
/// use ingestor::domain::Location;
///
/// let location = Location::new("Edinburgh", -3.19, 55.95).expect("valid location");
/// assert_eq!(location.name(), "Edinburgh");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    name: String,
    longitude: f64,
    latitude: f64,
}

/// Validation errors emitted by [`Location::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationValidationError {
    /// The name is empty once trimmed of whitespace.
    #[error("location name must not be empty")]
    EmptyName,
    /// A coordinate is NaN or infinite.
    #[error("location coordinates must be finite")]
    NonFiniteCoordinate,
    /// Longitude is outside [-180, 180].
    #[error("longitude must be within [-180, 180]")]
    LongitudeOutOfRange,
    /// Latitude is outside [-90, 90].
    #[error("latitude must be within [-90, 90]")]
    LatitudeOutOfRange,
}

impl Location {
    /// Build a validated location.
    ///
    /// # Errors
    ///
    /// Returns a [`LocationValidationError`] when the name is blank or the
    /// coordinates fall outside WGS84 ranges.
    pub fn new(
        name: impl Into<String>,
        longitude: f64,
        latitude: f64,
    ) -> Result<Self, LocationValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LocationValidationError::EmptyName);
        }
        if !longitude.is_finite() || !latitude.is_finite() {
            return Err(LocationValidationError::NonFiniteCoordinate);
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(LocationValidationError::LongitudeOutOfRange);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(LocationValidationError::LatitudeOutOfRange);
        }
        Ok(Self {
            name,
            longitude,
            latitude,
        })
    }

    /// Human-readable location name used in events and persistence.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Longitude in WGS84 degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Latitude in WGS84 degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }
}
