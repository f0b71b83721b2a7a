use super::fixed::parse_purity;
use super::{PurityLookup, PurityResolver};
use crate::core::error::Result;
use crate::workspace::EntityTable;
use log::warn;

/// Where purity lives in an exported entity table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub id_column: String,
    pub purity_column: String,
    /// Appended to a sample key to form the entity id (`S1` -> `S1_pair`).
    pub key_suffix: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            id_column: "pair_id".to_string(),
            purity_column: "purity".to_string(),
            key_suffix: "_pair".to_string(),
        }
    }
}

/// Key-value purity lookup over an exported pairs table.
///
/// Absent entities, empty cells and unparseable or out-of-range values are
/// all reported as misses.
#[derive(Debug)]
pub struct TablePurityResolver {
    table: EntityTable,
    purity_index: usize,
    key_suffix: String,
}

impl TablePurityResolver {
    pub fn from_path(location: &str, config: &TableConfig) -> Result<Self> {
        let table = EntityTable::from_path(location, &config.id_column)?;
        Self::new(table, config)
    }

    pub fn new(table: EntityTable, config: &TableConfig) -> Result<Self> {
        let purity_index = table.column_index(&config.purity_column)?;
        Ok(TablePurityResolver {
            table,
            purity_index,
            key_suffix: config.key_suffix.clone(),
        })
    }
}

impl PurityResolver for TablePurityResolver {
    fn name(&self) -> &str {
        "purity table"
    }

    fn lookup(&mut self, keys: &[String]) -> Result<PurityLookup> {
        let mut lookup = PurityLookup::default();
        for key in keys {
            let id = format!("{}{}", key, self.key_suffix);
            let value = self.table.get(&id, self.purity_index).and_then(|raw| {
                parse_purity(raw)
                    .inspect_err(|e| warn!("{}: {} for {}", self.table.source(), e, id))
                    .ok()
            });
            match value {
                Some(purity) => {
                    lookup.found.insert(key.clone(), purity);
                }
                None => lookup.missing.push(key.clone()),
            }
        }
        Ok(lookup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AfplotError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn pairs() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "entity:pair_id\tpurity\tploidy").unwrap();
        writeln!(file, "S1_pair\t0.94\t2.0").unwrap();
        writeln!(file, "S2_pair\t0.15\t2.1").unwrap();
        writeln!(file, "S4_pair\t1.8\t2.1").unwrap();
        file
    }

    #[test]
    fn test_lookup_with_suffix() {
        let file = pairs();
        let mut resolver =
            TablePurityResolver::from_path(file.path().to_str().unwrap(), &TableConfig::default())
                .unwrap();
        let keys: Vec<String> = vec!["S2".into(), "S1".into()];
        let purities = resolver.resolve(&keys).unwrap();
        assert_eq!(purities["S1"], 0.94);
        assert_eq!(purities["S2"], 0.15);
    }

    #[test]
    fn test_missing_and_invalid_entries_are_misses() {
        let file = pairs();
        let mut resolver =
            TablePurityResolver::from_path(file.path().to_str().unwrap(), &TableConfig::default())
                .unwrap();
        let keys: Vec<String> = vec!["S1".into(), "S3".into(), "S4".into()];
        let lookup = resolver.lookup(&keys).unwrap();
        assert_eq!(lookup.found.len(), 1);
        assert_eq!(lookup.missing, vec!["S3", "S4"]);
    }

    #[test]
    fn test_missing_purity_column() {
        let file = pairs();
        let config = TableConfig {
            purity_column: "absolute_purity".into(),
            ..TableConfig::default()
        };
        assert!(matches!(
            TablePurityResolver::from_path(file.path().to_str().unwrap(), &config),
            Err(AfplotError::MissingField { .. })
        ));
    }
}
