//! Controller configuration.

use crate::error::ControllerError;
use serde::{Deserialize, Serialize};

/// Tunable parameters of a [`Controller`](crate::Controller).
///
/// Missing fields fall back to their defaults when deserializing:
///
/// ```
/// use basis_control::ControllerConfig;
///
/// let config = ControllerConfig::from_json(r#"{ "gain": 0.5, "use_jacobian_transpose": true }"#).unwrap();
/// assert_eq!(config.gain, 0.5);
/// assert!(config.use_jacobian_transpose);
/// assert_eq!(config.history_capacity, None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Scalar gain κ applied to the command. Must be finite and non-negative.
    pub gain: f64,
    /// Use −κJᵗφ instead of κJ⁺φ.
    pub use_jacobian_transpose: bool,
    /// Tikhonov damping λ for singular values below `singular_threshold`.
    pub damping: f64,
    /// Singular values below this are damped instead of inverted.
    pub singular_threshold: f64,
    /// Maximum length of each history buffer; `None` keeps everything.
    pub history_capacity: Option<usize>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            gain: 1.0,
            use_jacobian_transpose: false,
            damping: 1e-3,
            singular_threshold: 1e-6,
            history_capacity: None,
        }
    }
}

impl ControllerConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the gain.
    #[must_use]
    pub fn with_gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self
    }

    /// Selects transpose mode.
    #[must_use]
    pub fn with_jacobian_transpose(mut self, enabled: bool) -> Self {
        self.use_jacobian_transpose = enabled;
        self
    }

    /// Sets the damping factor λ.
    #[must_use]
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Sets the singular value threshold.
    #[must_use]
    pub fn with_singular_threshold(mut self, threshold: f64) -> Self {
        self.singular_threshold = threshold;
        self
    }

    /// Bounds both history buffers to `capacity` entries.
    #[must_use]
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = Some(capacity);
        self
    }

    /// Parses a configuration from JSON and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::InvalidConfig`] if the JSON is malformed or
    /// a value is out of range.
    pub fn from_json(json: &str) -> Result<Self, ControllerError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|err| ControllerError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is in range.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::InvalidConfig`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ControllerError> {
        validate_gain(self.gain)?;
        if !self.damping.is_finite() || self.damping < 0.0 {
            return Err(ControllerError::InvalidConfig(format!(
                "damping must be finite and non-negative, got {}",
                self.damping
            )));
        }
        if !self.singular_threshold.is_finite() || self.singular_threshold < 0.0 {
            return Err(ControllerError::InvalidConfig(format!(
                "singular threshold must be finite and non-negative, got {}",
                self.singular_threshold
            )));
        }
        if self.history_capacity == Some(0) {
            return Err(ControllerError::InvalidConfig(
                "history capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

pub(crate) fn validate_gain(gain: f64) -> Result<(), ControllerError> {
    if gain.is_finite() && gain >= 0.0 {
        Ok(())
    } else {
        Err(ControllerError::InvalidConfig(format!(
            "gain must be finite and non-negative, got {gain}"
        )))
    }
}
