//! Search configuration for the departure search.

/// Configuration parameters for departure search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Radius around the start point in which stops are considered (meters).
    pub default_radius_m: f64,

    /// Number of departures returned when the caller does not ask for a limit.
    pub default_limit: usize,
}

/// Error returned for an unusable search configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid search config: {0}")]
pub struct InvalidSearchConfig(&'static str);

impl SearchConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(default_radius_m: f64, default_limit: usize) -> Self {
        Self {
            default_radius_m,
            default_limit,
        }
    }

    /// Check the configuration can produce valid requests.
    pub fn validate(&self) -> Result<(), InvalidSearchConfig> {
        if !self.default_radius_m.is_finite() || self.default_radius_m < 0.0 {
            return Err(InvalidSearchConfig("radius must be a non-negative number"));
        }
        if self.default_limit == 0 {
            return Err(InvalidSearchConfig("limit must be positive"));
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_radius_m: 1000.0,
            default_limit: 5,
        }
    }
}
