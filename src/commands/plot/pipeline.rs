use anyhow::Result;
use log::{error, info};

use super::args::{PlotArgs, PlotConfig, PuritySource};
use crate::commands::common;
use afplot_lib::assembler::SampleAssembler;
use afplot_lib::export::write_layout_table;
use afplot_lib::figure::FigureBuilder;
use afplot_lib::layout::{jitter_rng, LayoutEngine};
use afplot_lib::prelude::{make_parent_dirs, AfplotError};
use afplot_lib::purity::{
    FallbackResolver, FixedPurityResolver, ManualPurityResolver, PurityResolver,
    TablePurityResolver,
};
use afplot_lib::sources::collect_filenames;

pub fn run_plot(args: PlotArgs) -> Result<()> {
    let config: PlotConfig = args.into();
    config.validate()?;
    info!("Configuration validation passed");

    let sources = resolve_inputs(&config)?;
    info!("Plotting {} MAF inputs", sources.len());

    if config.dry_run {
        for source in &sources {
            info!("  {}", source);
        }
        info!("Dry run completed successfully - all validations passed");
        return Ok(());
    }

    match execute_pipeline(&config, &sources) {
        Ok(_) => {
            info!("Plot completed successfully");
            Ok(())
        }
        Err(err) => {
            error!("Plotting failed: {}", err);
            Err(err)
        }
    }
}

fn resolve_inputs(config: &PlotConfig) -> Result<Vec<String>> {
    if !config.inputs.is_empty() {
        return Ok(config.inputs.clone());
    }
    let source = config.source.to_source()?;
    Ok(collect_filenames(&source)?)
}

/// Primary resolver from the config, backed by a stdin prompt unless prompting is off.
fn build_resolver(
    config: &PlotConfig,
    inputs: usize,
) -> Result<Box<dyn PurityResolver>, AfplotError> {
    let primary: Option<Box<dyn PurityResolver>> = match &config.purity {
        PuritySource::Values(text) => {
            let fixed = FixedPurityResolver::parse(text)?;
            fixed.check_input_count(inputs)?;
            Some(Box::new(fixed) as Box<dyn PurityResolver>)
        }
        PuritySource::Table(path, table) => {
            info!("Reading purity from {}", path);
            Some(Box::new(TablePurityResolver::from_path(path, table)?) as Box<dyn PurityResolver>)
        }
        PuritySource::Prompt => None,
    };

    let resolver: Box<dyn PurityResolver> = match (primary, config.prompt) {
        (Some(primary), true) => Box::new(FallbackResolver::new(
            primary,
            ManualPurityResolver::stdin(),
        )),
        (Some(primary), false) => primary,
        (None, _) => Box::new(ManualPurityResolver::stdin()),
    };
    Ok(resolver)
}

fn execute_pipeline(config: &PlotConfig, sources: &[String]) -> Result<()> {
    let assembler = SampleAssembler::new(config.columns.clone());
    let mut resolver = build_resolver(config, sources.len())?;

    let assembly = assembler.assemble(sources, &mut resolver)?;
    assembly.diagnostics.log_summary();
    if !assembly.diagnostics.skipped.is_empty() {
        info!(
            "Skipped sources: {}",
            assembly.diagnostics.skipped_sources().join(", ")
        );
    }

    let engine = LayoutEngine::new(config.layout)?;
    let layout = engine.layout(&assembly, &mut jitter_rng(config.seed));
    for slot in &layout.slots {
        info!(
            "  #{} {} purity {:.3} ({} mutations)",
            slot.rank, slot.key, slot.purity, slot.count
        );
    }

    let figure = FigureBuilder::new(config.figure.clone()).build(&layout);
    common::write_figure(&figure, &config.output)?;
    if let Some(path) = &config.output {
        info!("Figure written to: {:?}", path);
    }

    if let Some(path) = &config.table {
        make_parent_dirs(path)?;
        let rows = write_layout_table(&layout, &Some(path))?;
        info!("Wrote {} annotated records -> {:?}", rows, path);
    }

    Ok(())
}
