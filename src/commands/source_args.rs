use afplot_lib::sources::{FilenameSource, SetFilter, WorkspaceQuery};
use afplot_lib::workspace::EntityType;
use anyhow::{bail, Result};
use std::path::PathBuf;
use structopt::StructOpt;

/// Where to find MAF locations. Priority: list file, directory, workspace table.
#[derive(Debug, Clone, StructOpt)]
pub struct SourceArgs {
    /// File listing MAF paths/URLs, separated by newlines, tabs or commas.
    #[structopt(long, short = "f")]
    pub filepath: Option<String>,

    /// Directory whose files are all MAFs.
    #[structopt(long, short = "d")]
    pub directory: Option<PathBuf>,

    /// Exported workspace entity table (TSV) with a column of MAF locations.
    #[structopt(long, short = "w")]
    pub workspace_table: Option<String>,

    /// Entity type of the workspace table: pair, sample or participant.
    #[structopt(long = "set-type", default_value = "pair")]
    pub set_type: EntityType,

    /// Restrict the workspace table to this set.
    #[structopt(long = "set-name")]
    pub set_name: Option<String>,

    /// Set-membership export used with `--set-name`.
    #[structopt(long = "set-membership")]
    pub set_membership: Option<String>,

    /// Workspace column holding the MAF locations.
    #[structopt(
        long = "column-name",
        default_value = "mutation_validator_validated_maf"
    )]
    pub column_name: String,
}

impl SourceArgs {
    #[inline]
    pub fn is_given(&self) -> bool {
        self.filepath.is_some() || self.directory.is_some() || self.workspace_table.is_some()
    }

    pub fn to_source(&self) -> Result<FilenameSource> {
        let workspace = match &self.workspace_table {
            Some(table) => {
                let set = match (&self.set_name, &self.set_membership) {
                    (Some(set_name), Some(membership)) => Some(SetFilter {
                        membership: membership.clone(),
                        set_name: set_name.clone(),
                    }),
                    (None, None) => None,
                    _ => bail!("--set-name and --set-membership must be given together"),
                };
                Some(WorkspaceQuery {
                    table: table.clone(),
                    entity_type: self.set_type,
                    column: self.column_name.clone(),
                    set,
                })
            }
            None => None,
        };
        Ok(FilenameSource::select(
            self.filepath.clone(),
            self.directory.clone(),
            workspace,
        )?)
    }
}
