//! Variant records and column mapping

use crate::core::error::{validate_probability, AfplotError, Result};
use serde::{Deserialize, Serialize};

/// Column names used to pull the required fields out of a MAF header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    pub sample_barcode: String,
    pub tumor_freq: String,
    pub population_freq: String,
    pub ref_count: String,
    pub alt_count: String,
    pub gene: String,
    pub protein_change: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        ColumnMap {
            sample_barcode: "Tumor_Sample_Barcode".to_string(),
            tumor_freq: "tumor_f".to_string(),
            population_freq: "gnomADg_AF".to_string(),
            ref_count: "t_ref_count".to_string(),
            alt_count: "t_alt_count".to_string(),
            gene: "Hugo_Symbol".to_string(),
            protein_change: "Protein_Change".to_string(),
        }
    }
}

impl ColumnMap {
    /// Required column names, in a fixed order.
    pub fn required(&self) -> [&str; 7] {
        [
            &self.sample_barcode,
            &self.tumor_freq,
            &self.population_freq,
            &self.ref_count,
            &self.alt_count,
            &self.gene,
            &self.protein_change,
        ]
    }
}

/// One variant observation from a sample's MAF.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub sample: String,
    pub tumor_freq: f64,
    /// First value of the population-frequency annotation, `None` when absent.
    pub population_freq: Option<f64>,
    pub ref_count: u32,
    pub alt_count: u32,
    pub gene: String,
    pub protein_change: String,
}

impl Record {
    #[inline]
    pub fn read_depth(&self) -> u32 {
        self.ref_count.saturating_add(self.alt_count)
    }
}

/// Values pandas would read as NaN.
const MISSING_MARKERS: &[&str] = &["", ".", "NA", "N/A", "NaN", "nan", "null", "None"];

#[inline]
pub(crate) fn is_missing(value: &str) -> bool {
    MISSING_MARKERS.contains(&value.trim())
}

/// Reduce a population-frequency cell to its first numeric value.
///
/// `"0.12,0.03"` becomes `0.12`, `"0.08"` stays `0.08`, missing markers
/// become `None`. Anything that is not a frequency in [0, 1] is a
/// `ValueFormat` error.
pub fn normalize_population_frequency(field: &str, raw: &str) -> Result<Option<f64>> {
    if is_missing(raw) {
        return Ok(None);
    }
    let first = raw.split(',').next().unwrap_or(raw).trim();
    if is_missing(first) {
        return Ok(None);
    }
    first
        .parse::<f64>()
        .ok()
        .and_then(|v| validate_probability(field, v).ok())
        .map(Some)
        .ok_or_else(|| AfplotError::value_format(field, raw))
}

pub(crate) fn parse_float(field: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AfplotError::value_format(field, raw))
}

/// Read counts occasionally arrive as floats ("12.0"); whole non-negative values are accepted.
pub(crate) fn parse_count(field: &str, raw: &str) -> Result<u32> {
    let trimmed = raw.trim();
    if let Ok(count) = trimmed.parse::<u32>() {
        return Ok(count);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 => Ok(v as u32),
        _ => Err(AfplotError::value_format(field, raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_multi_value() {
        assert_eq!(
            normalize_population_frequency("gnomADg_AF", "0.12,0.03").unwrap(),
            Some(0.12)
        );
        assert_eq!(
            normalize_population_frequency("gnomADg_AF", "0.08").unwrap(),
            Some(0.08)
        );
        assert_eq!(
            normalize_population_frequency("gnomADg_AF", " 1e-4 ,0.5").unwrap(),
            Some(0.0001)
        );
    }

    #[test]
    fn test_normalize_missing() {
        assert_eq!(normalize_population_frequency("af", "").unwrap(), None);
        assert_eq!(normalize_population_frequency("af", "NA").unwrap(), None);
        assert_eq!(normalize_population_frequency("af", ".,0.2").unwrap(), None);
    }

    #[test]
    fn test_normalize_malformed() {
        let err = normalize_population_frequency("gnomADg_AF", "high").unwrap_err();
        assert!(matches!(err, AfplotError::ValueFormat { ref value, .. } if value == "high"));
        assert!(normalize_population_frequency("gnomADg_AF", "0.1;0.2").is_err());
    }

    #[test]
    fn test_normalize_out_of_range() {
        for raw in ["inf", "-inf", "-0.01", "1.5", "2,0.1"] {
            let err = normalize_population_frequency("gnomADg_AF", raw).unwrap_err();
            assert!(matches!(err, AfplotError::ValueFormat { ref value, .. } if value == raw));
        }
        assert_eq!(
            normalize_population_frequency("gnomADg_AF", "1").unwrap(),
            Some(1.0)
        );
        assert_eq!(
            normalize_population_frequency("gnomADg_AF", "0").unwrap(),
            Some(0.0)
        );
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("t_ref_count", "12").unwrap(), 12);
        assert_eq!(parse_count("t_ref_count", "12.0").unwrap(), 12);
        assert!(parse_count("t_ref_count", "-1").is_err());
        assert!(parse_count("t_ref_count", "1.5").is_err());
        assert!(parse_count("t_ref_count", "").is_err());
    }

    #[test]
    fn test_read_depth() {
        let record = Record {
            sample: "S1".into(),
            tumor_freq: 0.3,
            population_freq: None,
            ref_count: 7,
            alt_count: 3,
            gene: "TP53".into(),
            protein_change: "p.R175H".into(),
        };
        assert_eq!(record.read_depth(), 10);
    }

    #[test]
    fn test_default_columns() {
        let columns = ColumnMap::default();
        assert_eq!(columns.required()[0], "Tumor_Sample_Barcode");
        assert!(columns.required().contains(&"gnomADg_AF"));
    }
}
