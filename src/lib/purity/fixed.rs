use super::{PurityLookup, PurityResolver};
use crate::core::error::{validate_probability, AfplotError, Result};
use rustc_hash::FxHashMap;

/// Purity values given up front, either in input order or by key.
///
/// Positional values follow the input list, not the samples that loaded: a
/// skipped input leaves its value unused.
#[derive(Debug, Clone)]
pub enum FixedPurityResolver {
    Positional {
        values: Vec<f64>,
        /// Input position of each key in the next lookup, when bound.
        inputs: Option<Vec<usize>>,
    },
    Keyed(FxHashMap<String, f64>),
}

impl FixedPurityResolver {
    pub fn positional(values: Vec<f64>) -> Result<Self> {
        for value in &values {
            validate_probability("purity", *value)?;
        }
        Ok(FixedPurityResolver::Positional {
            values,
            inputs: None,
        })
    }

    pub fn keyed<K, I>(values: I) -> Result<Self>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
    {
        let mut map = FxHashMap::default();
        for (key, value) in values {
            map.insert(key.into(), validate_probability("purity", value)?);
        }
        Ok(FixedPurityResolver::Keyed(map))
    }

    /// Parse `0.94,0.15,0.55` (positional) or `S1=0.94,S2=0.15` (keyed).
    pub fn parse(text: &str) -> Result<Self> {
        let entries: Vec<&str> = text
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if entries.is_empty() {
            return Err(AfplotError::value_format("purity list", text));
        }

        if entries.iter().all(|e| e.contains('=')) {
            let mut pairs = Vec::with_capacity(entries.len());
            for entry in entries {
                let (key, value) = entry.split_once('=').unwrap_or((entry, ""));
                pairs.push((key.trim().to_string(), parse_purity(value)?));
            }
            Self::keyed(pairs)
        } else {
            let values = entries
                .into_iter()
                .map(parse_purity)
                .collect::<Result<Vec<_>>>()?;
            Self::positional(values)
        }
    }

    /// Positional values must cover the input list one to one.
    pub fn check_input_count(&self, inputs: usize) -> Result<()> {
        match self {
            FixedPurityResolver::Positional { values, .. } if values.len() != inputs => {
                Err(AfplotError::Config(format!(
                    "{} purity values given for {} inputs",
                    values.len(),
                    inputs
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Parse one purity entry and check it is a probability.
pub(crate) fn parse_purity(raw: &str) -> Result<f64> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| AfplotError::value_format("purity", raw.trim()))?;
    validate_probability("purity", value)
}

impl PurityResolver for FixedPurityResolver {
    fn name(&self) -> &str {
        "fixed values"
    }

    fn bind_inputs(&mut self, positions: &[usize]) {
        if let FixedPurityResolver::Positional { inputs, .. } = self {
            *inputs = Some(positions.to_vec());
        }
    }

    fn lookup(&mut self, keys: &[String]) -> Result<PurityLookup> {
        let mut lookup = PurityLookup::default();
        match self {
            FixedPurityResolver::Positional { values, inputs } => {
                let positions = match inputs.take() {
                    Some(positions) if positions.len() == keys.len() => positions,
                    Some(positions) => {
                        return Err(AfplotError::Config(format!(
                            "{} input positions bound for {} samples",
                            positions.len(),
                            keys.len()
                        )))
                    }
                    None => (0..keys.len()).collect(),
                };
                for (key, position) in keys.iter().zip(positions) {
                    match values.get(position) {
                        Some(value) => {
                            lookup.found.insert(key.clone(), *value);
                        }
                        None => lookup.missing.push(key.clone()),
                    }
                }
            }
            FixedPurityResolver::Keyed(map) => {
                for key in keys {
                    match map.get(key) {
                        Some(value) => {
                            lookup.found.insert(key.clone(), *value);
                        }
                        None => lookup.missing.push(key.clone()),
                    }
                }
            }
        }
        Ok(lookup)
    }
}
