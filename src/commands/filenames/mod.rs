mod args;

use afplot_lib::prelude::{get_raw_writer, make_parent_dirs};
use afplot_lib::sources::collect_filenames;
use anyhow::Result;
use log::info;
use std::io::Write;

pub use args::FilenamesArgs;

/// Execute the `filenames` command: print or save the collected MAF list.
pub fn run_filenames(args: FilenamesArgs) -> Result<()> {
    let source = args.source.to_source()?;
    info!("Collecting filenames from {:?}", source);
    let files = collect_filenames(&source)?;

    if let Some(path) = &args.output {
        make_parent_dirs(path)?;
    }
    let mut writer = get_raw_writer(&args.output)?;
    for file in &files {
        writeln!(writer, "{}", file)?;
    }
    writer.flush()?;

    if let Some(path) = &args.output {
        info!("Wrote {} filenames -> {:?}", files.len(), path);
    }
    Ok(())
}
