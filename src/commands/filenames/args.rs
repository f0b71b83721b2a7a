use crate::commands::source_args::SourceArgs;
use std::path::PathBuf;
use structopt::StructOpt;

/// CLI arguments for the `filenames` subcommand.
#[derive(Debug, Clone, StructOpt)]
#[structopt(author, name = "filenames")]
pub struct FilenamesArgs {
    #[structopt(flatten)]
    pub source: SourceArgs,

    /// Write the list here, one per line, instead of stdout.
    #[structopt(long = "output-path", short = "o")]
    pub output: Option<PathBuf>,
}
