use crate::commands::source_args::SourceArgs;
use afplot_lib::figure::FigureConfig;
use afplot_lib::layout::LayoutConfig;
use afplot_lib::maf::ColumnMap;
use afplot_lib::purity::TableConfig;
use anyhow::{bail, Result};
use std::path::PathBuf;
use std::str::FromStr;
use structopt::StructOpt;

/// Character window `start:end` of a sample key used for tick labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelRange(pub usize, pub usize);

impl FromStr for LabelRange {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parsed = s
            .split_once(':')
            .and_then(|(a, b)| Some((a.trim().parse().ok()?, b.trim().parse().ok()?)));
        match parsed {
            Some((start, end)) if start < end => Ok(LabelRange(start, end)),
            _ => Err(format!("Invalid label range: {}. Expected start:end, e.g. 8:15", s)),
        }
    }
}

/// CLI arguments for the `plot` subcommand.
#[derive(Debug, Clone, StructOpt)]
#[structopt(author, name = "plot")]
pub struct PlotArgs {
    /// MAF paths or http(s) URLs, one per sample. When empty, the source options are used.
    pub inputs: Vec<String>,

    #[structopt(flatten)]
    pub source: SourceArgs,

    /// Figure output; `.html` writes a standalone page, anything else plotly JSON. Defaults to stdout JSON.
    #[structopt(long, short = "o")]
    pub output: Option<PathBuf>,

    /// Also write the annotated records as TSV (`.gz` compresses).
    #[structopt(long)]
    pub table: Option<PathBuf>,

    /// Purity values, comma-separated in input order (`0.94,0.15`) or by key (`S1=0.94,S2=0.15`).
    #[structopt(long, short = "p")]
    pub purity: Option<String>,

    /// Exported pairs table to look purity up in.
    #[structopt(long)]
    pub purity_table: Option<String>,

    /// Purity column of `--purity-table`.
    #[structopt(long, default_value = "purity")]
    pub purity_column: String,

    /// Id column of `--purity-table`.
    #[structopt(long, default_value = "pair_id")]
    pub pair_id_column: String,

    /// Suffix turning a sample key into a pair id.
    #[structopt(long, default_value = "_pair")]
    pub pair_suffix: String,

    /// Never prompt for missing purity; fail instead.
    #[structopt(long)]
    pub no_prompt: bool,

    /// Width of the jitter window around each sample slot, in [0, 1].
    #[structopt(long, short = "j", default_value = "0.3")]
    pub jitter: f64,

    /// Width of the half-purity line across each slot, in [0, 1].
    #[structopt(long, default_value = "0.8")]
    pub line_length: f64,

    /// Seed for reproducible jitter.
    #[structopt(long)]
    pub seed: Option<u64>,

    /// Number of population-frequency slider positions.
    #[structopt(long, default_value = "10")]
    pub filter_steps: usize,

    /// Figure title.
    #[structopt(long, default_value = "Allelic Frequency Plot")]
    pub title: String,

    /// Use characters `start:end` of each sample key as its tick label.
    #[structopt(long)]
    pub label_range: Option<LabelRange>,

    #[structopt(long, default_value = "Tumor_Sample_Barcode")]
    pub sample_column: String,

    #[structopt(long, default_value = "tumor_f")]
    pub tumor_freq_column: String,

    #[structopt(long, default_value = "gnomADg_AF")]
    pub population_freq_column: String,

    #[structopt(long, default_value = "t_ref_count")]
    pub ref_count_column: String,

    #[structopt(long, default_value = "t_alt_count")]
    pub alt_count_column: String,

    #[structopt(long, default_value = "Hugo_Symbol")]
    pub gene_column: String,

    #[structopt(long, default_value = "Protein_Change")]
    pub protein_change_column: String,

    /// Validate arguments and list inputs without plotting.
    #[structopt(long)]
    pub dry_run: bool,
}

/// How purity is obtained, before any interactive fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum PuritySource {
    Values(String),
    Table(String, TableConfig),
    Prompt,
}

/// Normalised configuration derived from [`PlotArgs`].
#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub inputs: Vec<String>,
    pub source: SourceArgs,
    pub output: Option<PathBuf>,
    pub table: Option<PathBuf>,
    pub purity: PuritySource,
    pub prompt: bool,
    pub seed: Option<u64>,
    pub columns: ColumnMap,
    pub layout: LayoutConfig,
    pub figure: FigureConfig,
    pub dry_run: bool,
}

impl From<PlotArgs> for PlotConfig {
    fn from(args: PlotArgs) -> PlotConfig {
        let purity = match (args.purity, args.purity_table) {
            (Some(values), _) => PuritySource::Values(values),
            (None, Some(table)) => PuritySource::Table(
                table,
                TableConfig {
                    id_column: args.pair_id_column,
                    purity_column: args.purity_column,
                    key_suffix: args.pair_suffix,
                },
            ),
            (None, None) => PuritySource::Prompt,
        };

        PlotConfig {
            inputs: args.inputs,
            source: args.source,
            output: args.output,
            table: args.table,
            purity,
            prompt: !args.no_prompt,
            seed: args.seed,
            columns: ColumnMap {
                sample_barcode: args.sample_column,
                tumor_freq: args.tumor_freq_column,
                population_freq: args.population_freq_column,
                ref_count: args.ref_count_column,
                alt_count: args.alt_count_column,
                gene: args.gene_column,
                protein_change: args.protein_change_column,
            },
            layout: LayoutConfig {
                jitter: args.jitter,
                line_length: args.line_length,
            },
            figure: FigureConfig {
                title: args.title,
                filter_steps: args.filter_steps,
                label_range: args.label_range.map(|LabelRange(start, end)| (start, end)),
            },
            dry_run: args.dry_run,
        }
    }
}

impl PlotConfig {
    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;

        if self.figure.filter_steps == 0 {
            bail!("filter_steps must be greater than 0");
        }
        if self.inputs.is_empty() && !self.source.is_given() {
            bail!("no MAF inputs: pass paths or one of --filepath, --directory, --workspace-table");
        }
        if self.purity == PuritySource::Prompt && !self.prompt {
            bail!("no purity source: pass --purity or --purity-table, or allow prompting");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use afplot_lib::figure::DEFAULT_FILTER_STEPS;
    use afplot_lib::layout::{DEFAULT_JITTER, DEFAULT_LINE_LENGTH};

    fn parse(args: &[&str]) -> PlotConfig {
        let mut argv = vec!["plot"];
        argv.extend_from_slice(args);
        PlotArgs::from_iter_safe(argv).unwrap().into()
    }

    #[test]
    fn test_defaults_match_library() {
        let config = parse(&["a.maf", "-p", "0.5"]);
        assert_eq!(config.layout.jitter, DEFAULT_JITTER);
        assert_eq!(config.layout.line_length, DEFAULT_LINE_LENGTH);
        assert_eq!(config.figure.filter_steps, DEFAULT_FILTER_STEPS);
        assert_eq!(config.columns, ColumnMap::default());
        assert!(config.prompt);
        config.validate().unwrap();
    }

    #[test]
    fn test_purity_source_priority() {
        let config = parse(&["a.maf", "--purity", "0.4", "--purity-table", "pairs.tsv"]);
        assert_eq!(config.purity, PuritySource::Values("0.4".into()));

        let config = parse(&["a.maf", "--purity-table", "pairs.tsv", "--pair-suffix", ""]);
        match config.purity {
            PuritySource::Table(path, table) => {
                assert_eq!(path, "pairs.tsv");
                assert_eq!(table.key_suffix, "");
            }
            other => panic!("unexpected purity source {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_bad_configs() {
        assert!(parse(&["a.maf", "-p", "0.5", "--jitter", "1.5"]).validate().is_err());
        assert!(parse(&["-p", "0.5"]).validate().is_err());
        assert!(parse(&["a.maf", "--no-prompt"]).validate().is_err());
        assert!(parse(&["a.maf", "-p", "0.5", "--filter-steps", "0"]).validate().is_err());
    }

    #[test]
    fn test_label_range() {
        assert_eq!("8:15".parse::<LabelRange>().unwrap(), LabelRange(8, 15));
        assert!("15:8".parse::<LabelRange>().is_err());
        assert!("8".parse::<LabelRange>().is_err());
    }
}
