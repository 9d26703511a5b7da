//! Error types for the unit-commitment core.
//!
//! [`ModelError`] covers everything that can go wrong before a model is handed
//! to a solver: reading and parsing a scenario, and configuration errors found
//! while validating entity parameters. Structural infeasibility is not an
//! error; it is reported by the solver as a status.

use thiserror::Error;

/// Errors raised while loading or validating an energy system.
#[derive(Error, Debug)]
pub enum ModelError {
    /// I/O errors (reading a scenario file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Horizon is empty or has a non-positive step length
    #[error("Invalid horizon: {0}")]
    Horizon(String),

    /// Lower capacity bound above the upper one
    #[error("{entity}: {lo_name} ({lo}) exceeds {up_name} ({up})")]
    CapacityBounds {
        entity: String,
        lo_name: &'static str,
        lo: f64,
        up_name: &'static str,
        up: f64,
    },

    /// A parameter that must be non-negative is negative (or NaN)
    #[error("{entity}: {parameter} must be non-negative, got {value}")]
    Negative {
        entity: String,
        parameter: &'static str,
        value: f64,
    },

    /// min-fraction outside [0, 1]
    #[error("{unit}: min-fraction must lie in [0, 1], got {value}")]
    MinFraction { unit: String, value: f64 },

    /// Part-load coefficients are undefined at min-fraction = 1
    #[error("{unit}: part-load requires min-fraction < 1, got {value}")]
    DegeneratePartLoad { unit: String, value: f64 },

    /// start-up-duration outside [0, dt]
    #[error("{unit}: start-up-duration must lie in [0, {dt}], got {value}")]
    StartupDuration { unit: String, value: f64, dt: f64 },

    /// Step counts must be whole, non-negative numbers
    #[error("{unit}: {parameter} must be a non-negative integer, got {value}")]
    NonInteger {
        unit: String,
        parameter: &'static str,
        value: f64,
    },

    /// An infinite upper bound where a big-M constant is derived from it
    #[error("{entity}: {parameter} is unbounded but {reason}")]
    UnboundedBigM {
        entity: String,
        parameter: &'static str,
        reason: &'static str,
    },

    /// Two records share the same key
    #[error("Duplicate {kind} key: {key}")]
    Duplicate { kind: &'static str, key: String },

    /// A ratio record names a unit that does not exist
    #[error("Ratio {commodity} ({direction}) references unknown unit {unit} in timeframe {timeframe}")]
    UnknownUnit {
        timeframe: i32,
        unit: String,
        commodity: String,
        direction: String,
    },

    /// A variable key that the assembled model does not contain
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),
}

impl ModelError {
    /// Label of the entity a configuration error refers to.
    pub fn entity(&self) -> Option<&str> {
        match self {
            ModelError::CapacityBounds { entity, .. }
            | ModelError::Negative { entity, .. }
            | ModelError::UnboundedBigM { entity, .. } => Some(entity),
            ModelError::MinFraction { unit, .. }
            | ModelError::DegeneratePartLoad { unit, .. }
            | ModelError::StartupDuration { unit, .. }
            | ModelError::NonInteger { unit, .. } => Some(unit),
            ModelError::Duplicate { key, .. } => Some(key),
            _ => None,
        }
    }
}

/// Convenience type alias for Results using ModelError.
pub type ModelResult<T> = Result<T, ModelError>;

impl From<toml::de::Error> for ModelError {
    fn from(err: toml::de::Error) -> Self {
        ModelError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModelError::CapacityBounds {
            entity: "2020.Mid.Gas plant".to_string(),
            lo_name: "cap-lo",
            lo: 30.0,
            up_name: "cap-up",
            up: 20.0,
        };
        assert_eq!(
            err.to_string(),
            "2020.Mid.Gas plant: cap-lo (30) exceeds cap-up (20)"
        );

        let err = ModelError::UnboundedBigM {
            entity: "2020.Mid.Gas plant".to_string(),
            parameter: "cap-up",
            reason: "the unit has an operating state",
        };
        assert!(err.to_string().contains("cap-up is unbounded"));
        assert_eq!(err.entity(), Some("2020.Mid.Gas plant"));
        assert_eq!(ModelError::Horizon("no steps".to_string()).entity(), None);
    }

    #[test]
    fn test_parse_error_conversion() {
        let err: ModelError = toml::from_str::<toml::Value>("a = ")
            .unwrap_err()
            .into();
        assert!(matches!(err, ModelError::Parse(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.toml");
        let err: ModelError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }
}
