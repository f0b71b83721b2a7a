//! Annotated record table
//!
//! Writes every laid-out record with its sample's purity, rank and x
//! position as TSV, for use outside the figure.

use crate::core::error::Result;
use crate::core::io::get_writer;
use crate::layout::Layout;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct TableRow<'a> {
    sample: &'a str,
    purity: f64,
    half_purity: f64,
    rank: usize,
    x_jitter: f64,
    tumor_freq: f64,
    population_freq: Option<f64>,
    gene: &'a str,
    protein_change: &'a str,
    ref_count: u32,
    alt_count: u32,
}

/// Write the layout's points as TSV to `path` (stdout for `None` or `-`).
pub fn write_layout_table<P: AsRef<Path>>(layout: &Layout, path: &Option<P>) -> Result<usize> {
    let mut writer = get_writer(path, true)?;
    for point in &layout.points {
        let slot = &layout.slots[point.rank - 1];
        writer.serialize(TableRow {
            sample: &point.sample,
            purity: slot.purity,
            half_purity: slot.half_purity(),
            rank: point.rank,
            x_jitter: point.x,
            tumor_freq: point.tumor_freq,
            population_freq: point.population_freq,
            gene: &point.gene,
            protein_change: &point.protein_change,
            ref_count: point.ref_count,
            alt_count: point.alt_count,
        })?;
    }
    writer.flush()?;
    Ok(layout.points.len())
}
