//! afplot - allelic frequency versus tumor purity plots
//!
//! afplot reads one Mutation Annotation Format (MAF) file per sample, looks
//! up each sample's tumor purity, and writes an interactive plotly figure:
//! samples ordered by purity along the x axis, each variant's allelic
//! fraction jittered within its sample's slot, a red line at half purity,
//! a heatmap strip of mutation counts, and a slider filtering variants by
//! population (gnomAD) frequency.
//!
//! # Tools
//!
//! - `filenames`: list MAF locations from a list file, directory or workspace export
//! - `plot`: build the figure
//!
//! # Usage
//!
//! ```bash
//! # Collect MAF paths from an exported pairs table
//! afplot filenames -w pair.tsv --column-name mutation_validator_validated_maf -o mafs.txt
//!
//! # Plot with purity given on the command line
//! afplot plot a.maf b.maf c.maf --purity 0.94,0.15,0.55 -o figure.html
//!
//! # Plot with purity from the pairs table, prompting for any that are missing
//! afplot plot -f mafs.txt --purity-table pair.tsv --seed 7 -o figure.json --table records.tsv
//! ```

extern crate afplot_lib;
pub mod commands;
use afplot_lib::prelude::is_broken_pipe;
use anyhow::Result;
use env_logger::Env;
use log::*;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case", author, about)]
/// Allelic frequency versus tumor purity plots from per-sample MAF files
struct Args {
    #[structopt(subcommand)]
    subcommand: Subcommand,
}

#[derive(StructOpt)]
enum Subcommand {
    /// Collect MAF filenames from a list file, directory, or workspace table
    Filenames(commands::FilenamesArgs),
    /// Build the purity-ordered allelic frequency figure
    Plot(commands::PlotArgs),
}

impl Subcommand {
    fn run(self) -> Result<()> {
        match self {
            Subcommand::Filenames(args) => commands::run_filenames(args)?,
            Subcommand::Plot(args) => commands::run_plot(args)?,
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Err(err) = Args::from_args().subcommand.run() {
        if is_broken_pipe(&err) {
            std::process::exit(0);
        }
        error!("{}", err);
        std::process::exit(1);
    }
    Ok(())
}
