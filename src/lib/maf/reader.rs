//! Loading one sample's MAF into [`Record`]s

use super::record::{is_missing, normalize_population_frequency, parse_count, parse_float};
use super::{ColumnMap, Record};
use crate::core::error::{AfplotError, Result};
use crate::core::io::get_reader;
use log::{debug, warn};

/// Records loaded from one source, tagged with the source's sample key.
#[derive(Debug)]
pub struct SampleRecords {
    pub source: String,
    pub key: String,
    pub records: Vec<Record>,
    /// Per-record `ValueFormat` errors; those rows are not in `records`.
    pub rejected: Vec<AfplotError>,
}

impl SampleRecords {
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

struct ColumnIndex {
    sample_barcode: usize,
    tumor_freq: usize,
    population_freq: usize,
    ref_count: usize,
    alt_count: usize,
    gene: usize,
    protein_change: usize,
}

impl ColumnIndex {
    fn from_headers(source: &str, headers: &csv::StringRecord, columns: &ColumnMap) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| AfplotError::MissingField {
                    source_name: source.to_string(),
                    field: name.to_string(),
                })
        };
        Ok(ColumnIndex {
            sample_barcode: find(&columns.sample_barcode)?,
            tumor_freq: find(&columns.tumor_freq)?,
            population_freq: find(&columns.population_freq)?,
            ref_count: find(&columns.ref_count)?,
            alt_count: find(&columns.alt_count)?,
            gene: find(&columns.gene)?,
            protein_change: find(&columns.protein_change)?,
        })
    }
}

/// Read one sample's records from a local path or URL.
///
/// Fails with `SourceRead` when the source cannot be opened or is not a
/// consistent table, `MissingField` when a mapped column is absent, and
/// `EmptySample` when no row survives value parsing. Rows with malformed
/// numeric cells are collected in [`SampleRecords::rejected`], or in the
/// `EmptySample` error when none survive.
pub fn read_sample(location: &str, columns: &ColumnMap) -> Result<SampleRecords> {
    let mut reader = get_reader(location, true)?;
    let headers = reader
        .headers()
        .map_err(|e| AfplotError::source_read(location, e))?
        .clone();
    if headers.is_empty() {
        return Err(AfplotError::source_read(location, "no header line"));
    }
    let index = ColumnIndex::from_headers(location, &headers, columns)?;

    let mut key: Option<String> = None;
    let mut records = Vec::new();
    let mut rejected = Vec::new();
    let mut foreign_rows = 0usize;

    for (row, result) in reader.records().enumerate() {
        let row_data = result.map_err(|e| AfplotError::source_read(location, e))?;
        let line = row_data
            .position()
            .map(|p| p.line())
            .unwrap_or(row as u64 + 2);
        let cell = |i: usize| row_data.get(i).unwrap_or("");

        let barcode = cell(index.sample_barcode).trim();
        if key.is_none() {
            if is_missing(barcode) {
                rejected.push(
                    AfplotError::value_format(&columns.sample_barcode, barcode)
                        .at(format!("{}:{}", location, line)),
                );
                continue;
            }
            key = Some(barcode.to_string());
        }
        let sample_key = key.clone().unwrap_or_default();
        if barcode != sample_key {
            foreign_rows += 1;
        }

        match parse_row(&index, columns, &row_data, sample_key) {
            Ok(record) => records.push(record),
            Err(e) => rejected.push(e.at(format!("{}:{}", location, line))),
        }
    }

    if foreign_rows > 0 {
        warn!(
            "{}: {} rows carry a different {} than the first row; tagged as the first row's sample",
            location, foreign_rows, columns.sample_barcode
        );
    }

    let key = match key {
        Some(key) if !records.is_empty() => key,
        _ => {
            return Err(AfplotError::EmptySample {
                source_name: location.to_string(),
                rejected,
            })
        }
    };

    debug!(
        "Loaded {} records for sample {} from {} ({} rejected)",
        records.len(),
        key,
        location,
        rejected.len()
    );

    Ok(SampleRecords {
        source: location.to_string(),
        key,
        records,
        rejected,
    })
}

fn parse_row(
    index: &ColumnIndex,
    columns: &ColumnMap,
    row: &csv::StringRecord,
    sample: String,
) -> Result<Record> {
    let cell = |i: usize| row.get(i).unwrap_or("");
    Ok(Record {
        sample,
        tumor_freq: parse_float(&columns.tumor_freq, cell(index.tumor_freq))?,
        population_freq: normalize_population_frequency(
            &columns.population_freq,
            cell(index.population_freq),
        )?,
        ref_count: parse_count(&columns.ref_count, cell(index.ref_count))?,
        alt_count: parse_count(&columns.alt_count, cell(index.alt_count))?,
        gene: cell(index.gene).trim().to_string(),
        protein_change: cell(index.protein_change).trim().to_string(),
    })
}
