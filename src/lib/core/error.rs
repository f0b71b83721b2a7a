//! Error types for the afplot library
//!
//! Per-sample and per-record failures (`SourceRead`, `MissingField`,
//! `ValueFormat`, `EmptySample`) are recoverable: the assembler records them
//! in its diagnostics and keeps going. `PurityUnavailable` asks the caller to
//! supply the named purities, and `NoData` ends the run.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AfplotError {
    #[error("Could not read {source_name}: {reason}")]
    SourceRead { source_name: String, reason: String },

    #[error("Column '{field}' not found in {source_name}")]
    MissingField { source_name: String, field: String },

    #[error("Malformed {field} value '{value}'{}", .location.as_ref().map(|l| format!(" ({})", l)).unwrap_or_default())]
    ValueFormat {
        field: String,
        value: String,
        location: Option<String>,
    },

    #[error("Purity unavailable for samples: {}", .keys.join(", "))]
    PurityUnavailable { keys: Vec<String> },

    #[error("No sample could be assembled from the given inputs")]
    NoData,

    /// Carries the row errors that left the source empty.
    #[error("No valid records in {source_name}")]
    EmptySample {
        source_name: String,
        rejected: Vec<AfplotError>,
    },

    #[error("Threshold validation error: {field} must be between {min} and {max}, got {value}")]
    ThresholdValidation {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AfplotError>;

impl AfplotError {
    pub fn source_read(source_name: impl Into<String>, reason: impl ToString) -> Self {
        AfplotError::SourceRead {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn value_format(field: impl Into<String>, value: impl Into<String>) -> Self {
        AfplotError::ValueFormat {
            field: field.into(),
            value: value.into(),
            location: None,
        }
    }

    /// Attach a location (file and line) to a `ValueFormat` error; other variants pass through.
    pub fn at(self, location: impl Into<String>) -> Self {
        match self {
            AfplotError::ValueFormat { field, value, .. } => AfplotError::ValueFormat {
                field,
                value,
                location: Some(location.into()),
            },
            other => other,
        }
    }

    /// `true` for errors that only cost one source or one record.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AfplotError::SourceRead { .. }
                | AfplotError::MissingField { .. }
                | AfplotError::ValueFormat { .. }
                | AfplotError::EmptySample { .. }
        )
    }
}

/// Check that `value` is a probability in [0, 1].
pub fn validate_probability(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(AfplotError::value_format(field, value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purity_unavailable_names_keys() {
        let err = AfplotError::PurityUnavailable {
            keys: vec!["S1".into(), "S3".into()],
        };
        assert_eq!(err.to_string(), "Purity unavailable for samples: S1, S3");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_value_format_location() {
        let err = AfplotError::value_format("tumor_f", "abc").at("s1.maf:4");
        assert_eq!(err.to_string(), "Malformed tumor_f value 'abc' (s1.maf:4)");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_validate_probability() {
        assert_eq!(validate_probability("purity", 0.5).unwrap(), 0.5);
        assert!(validate_probability("purity", 0.0).is_ok());
        assert!(validate_probability("purity", 1.0).is_ok());
        assert!(validate_probability("purity", 1.2).is_err());
        assert!(validate_probability("purity", -0.1).is_err());
        assert!(validate_probability("purity", f64::NAN).is_err());
    }
}
