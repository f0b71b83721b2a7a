//! Exported workspace entity tables
//!
//! Genomics workspaces (Terra/FireCloud) export their data model as one TSV
//! per entity type: `pair`, `sample` or `participant`, keyed by an id column
//! named `entity:<type>_id`, plus membership tables for the matching sets.
//! This module reads those exports; talking to the live workspace is out of
//! scope.

use crate::core::error::{AfplotError, Result};
use crate::core::io::get_reader;
use crate::maf::record::is_missing;
use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityType {
    Pair,
    Sample,
    Participant,
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pair" => Ok(EntityType::Pair),
            "sample" => Ok(EntityType::Sample),
            "participant" => Ok(EntityType::Participant),
            _ => Err(format!(
                "set_type must be one of pair, sample, participant, not {}",
                s
            )),
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EntityType::Pair => write!(f, "pair"),
            EntityType::Sample => write!(f, "sample"),
            EntityType::Participant => write!(f, "participant"),
        }
    }
}

impl EntityType {
    /// Name of the id column in an entity export, without the `entity:` prefix.
    pub fn id_column(&self) -> String {
        format!("{}_id", self)
    }
}

/// Does header `h` name column `name`, allowing the `entity:`/`membership:` export prefixes?
fn header_matches(h: &str, name: &str) -> bool {
    let h = h.trim();
    h == name
        || h.strip_prefix("entity:") == Some(name)
        || h.strip_prefix("membership:") == Some(name)
}

/// An entity table held in memory, rows in file order.
#[derive(Debug, Clone)]
pub struct EntityTable {
    source: String,
    headers: Vec<String>,
    id_index: usize,
    rows: Vec<Vec<String>>,
    by_id: FxHashMap<String, usize>,
}

impl EntityTable {
    /// Load a TSV export. `id_column` may be given with or without the
    /// `entity:` prefix.
    pub fn from_path(location: &str, id_column: &str) -> Result<Self> {
        let mut reader = get_reader(location, true)?;
        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| AfplotError::source_read(location, e))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let id_index = headers
            .iter()
            .position(|h| header_matches(h, id_column))
            .ok_or_else(|| AfplotError::MissingField {
                source_name: location.to_string(),
                field: id_column.to_string(),
            })?;

        let mut rows = Vec::new();
        let mut by_id = FxHashMap::default();
        for result in reader.records() {
            let record = result.map_err(|e| AfplotError::source_read(location, e))?;
            let row: Vec<String> = record.iter().map(|c| c.to_string()).collect();
            by_id.entry(row[id_index].clone()).or_insert(rows.len());
            rows.push(row);
        }

        debug!("Loaded {} entities from {}", rows.len(), location);
        Ok(EntityTable {
            source: location.to_string(),
            headers,
            id_index,
            rows,
            by_id,
        })
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column, or `MissingField`.
    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| header_matches(h, column))
            .ok_or_else(|| AfplotError::MissingField {
                source_name: self.source.clone(),
                field: column.to_string(),
            })
    }

    /// Non-missing cell of the entity `id` in `column`.
    pub fn get(&self, id: &str, column: usize) -> Option<&str> {
        let row = self.rows.get(*self.by_id.get(id)?)?;
        row.get(column)
            .map(|s| s.as_str())
            .filter(|v| !is_missing(v))
    }

    /// Non-missing values of `column`, in row order, optionally restricted to `members`.
    pub fn non_null_values(
        &self,
        column: usize,
        members: Option<&FxHashSet<String>>,
    ) -> Vec<String> {
        self.rows
            .iter()
            .filter(|row| members.map_or(true, |m| m.contains(&row[self.id_index])))
            .filter_map(|row| row.get(column))
            .filter(|v| !is_missing(v))
            .cloned()
            .collect()
    }
}

/// Members of the set `set_name` from a set-membership export.
///
/// The export's first column is the set id and the second the member id,
/// one row per membership.
pub fn set_members(location: &str, set_name: &str) -> Result<FxHashSet<String>> {
    let mut reader = get_reader(location, true)?;
    let mut members = FxHashSet::default();
    for result in reader.records() {
        let record = result.map_err(|e| AfplotError::source_read(location, e))?;
        match (record.get(0), record.get(1)) {
            (Some(set), Some(member)) if set.trim() == set_name => {
                members.insert(member.trim().to_string());
            }
            (Some(_), Some(_)) => {}
            _ => {
                return Err(AfplotError::source_read(
                    location,
                    "membership table needs a set id and a member id column",
                ))
            }
        }
    }
    if members.is_empty() {
        return Err(AfplotError::Config(format!(
            "set '{}' has no members in {}",
            set_name, location
        )));
    }
    Ok(members)
}
