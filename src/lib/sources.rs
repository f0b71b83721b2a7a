//! Filename collection
//!
//! Builds the list of MAF locations to plot from one of three places, in
//! priority order: a list file, a directory, or an exported workspace
//! entity table.

use crate::core::error::{AfplotError, Result};
use crate::core::io::read_to_string;
use crate::workspace::{set_members, EntityTable, EntityType};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Restrict a workspace table to the members of one named set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetFilter {
    /// Set-membership export (`<type>_set_membership.tsv`).
    pub membership: String,
    pub set_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceQuery {
    /// Entity export (`pair.tsv`, `sample.tsv`, `participant.tsv`).
    pub table: String,
    pub entity_type: EntityType,
    /// Column holding the file locations.
    pub column: String,
    pub set: Option<SetFilter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilenameSource {
    ListFile(String),
    Directory(PathBuf),
    Workspace(WorkspaceQuery),
}

impl FilenameSource {
    /// Pick the highest-priority source that was given.
    pub fn select(
        list_file: Option<String>,
        directory: Option<PathBuf>,
        workspace: Option<WorkspaceQuery>,
    ) -> Result<Self> {
        if let Some(path) = list_file {
            Ok(FilenameSource::ListFile(path))
        } else if let Some(dir) = directory {
            Ok(FilenameSource::Directory(dir))
        } else if let Some(query) = workspace {
            Ok(FilenameSource::Workspace(query))
        } else {
            Err(AfplotError::Config(
                "one of a list file, a directory, or a workspace table must be specified"
                    .to_string(),
            ))
        }
    }
}

/// Split list-file text on newlines, tabs and commas.
pub fn parse_filename_list(text: &str) -> Vec<String> {
    text.split(['\n', '\t', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Regular files directly inside `dir`, sorted by path.
pub fn list_directory(dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)
        .map_err(|e| AfplotError::source_read(dir.display().to_string(), e))?
    {
        let path = entry?.path();
        if path.is_file() {
            files.push(path.to_string_lossy().into_owned());
        }
    }
    files.sort();
    Ok(files)
}

/// Non-null values of the query column, restricted to the set when one is given.
pub fn query_workspace(query: &WorkspaceQuery) -> Result<Vec<String>> {
    let table = EntityTable::from_path(&query.table, &query.entity_type.id_column())?;
    let column = table.column_index(&query.column)?;
    let members = match &query.set {
        Some(filter) => Some(set_members(&filter.membership, &filter.set_name)?),
        None => None,
    };
    Ok(table.non_null_values(column, members.as_ref()))
}

pub fn collect_filenames(source: &FilenameSource) -> Result<Vec<String>> {
    let files = match source {
        FilenameSource::ListFile(path) => parse_filename_list(&read_to_string(path)?),
        FilenameSource::Directory(dir) => list_directory(dir)?,
        FilenameSource::Workspace(query) => query_workspace(query)?,
    };
    info!("Collected {} filenames", files.len());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_filename_list() {
        let text = "a.maf, b.maf\tc.maf\n\n  d.maf  \n";
        assert_eq!(
            parse_filename_list(text),
            vec!["a.maf", "b.maf", "c.maf", "d.maf"]
        );
    }

    #[test]
    fn test_list_file_source() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "/data/a.maf,/data/b.maf").unwrap();
        writeln!(file, "/data/c.maf").unwrap();
        let source = FilenameSource::ListFile(file.path().to_str().unwrap().to_string());
        assert_eq!(collect_filenames(&source).unwrap().len(), 3);
    }

    #[test]
    fn test_directory_skips_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.maf"), "").unwrap();
        fs::write(dir.path().join("a.maf"), "").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let files = collect_filenames(&FilenameSource::Directory(dir.path().to_path_buf())).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.maf"));
        assert!(files[1].ends_with("b.maf"));
    }

    #[test]
    fn test_workspace_source_with_set() {
        let mut pairs = NamedTempFile::new().unwrap();
        writeln!(pairs, "entity:pair_id\tmutation_validator_validated_maf").unwrap();
        writeln!(pairs, "P1\tgs://bucket/P1.maf").unwrap();
        writeln!(pairs, "P2\t").unwrap();
        writeln!(pairs, "P3\tgs://bucket/P3.maf").unwrap();
        let mut membership = NamedTempFile::new().unwrap();
        writeln!(membership, "membership:pair_set_id\tpair").unwrap();
        writeln!(membership, "cohort\tP2").unwrap();
        writeln!(membership, "cohort\tP3").unwrap();

        let mut query = WorkspaceQuery {
            table: pairs.path().to_str().unwrap().to_string(),
            entity_type: EntityType::Pair,
            column: "mutation_validator_validated_maf".to_string(),
            set: None,
        };
        assert_eq!(
            query_workspace(&query).unwrap(),
            vec!["gs://bucket/P1.maf", "gs://bucket/P3.maf"]
        );

        query.set = Some(SetFilter {
            membership: membership.path().to_str().unwrap().to_string(),
            set_name: "cohort".to_string(),
        });
        assert_eq!(query_workspace(&query).unwrap(), vec!["gs://bucket/P3.maf"]);
    }

    #[test]
    fn test_select_priority() {
        let source = FilenameSource::select(
            Some("list.txt".into()),
            Some(PathBuf::from("/dir")),
            None,
        )
        .unwrap();
        assert_eq!(source, FilenameSource::ListFile("list.txt".into()));
        assert!(matches!(
            FilenameSource::select(None, None, None),
            Err(AfplotError::Config(_))
        ));
    }
}
