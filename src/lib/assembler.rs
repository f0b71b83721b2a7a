//! Sample Assembler
//!
//! Reads per-sample MAF sources, skips the ones that cannot be used, merges
//! the rest into one collection tagged by sample key and attaches each
//! sample's purity through a [`PurityResolver`].
//!
//! ```no_run
//! use afplot_lib::assembler::SampleAssembler;
//! use afplot_lib::maf::ColumnMap;
//! use afplot_lib::purity::FixedPurityResolver;
//!
//! let assembler = SampleAssembler::new(ColumnMap::default());
//! let mut purity = FixedPurityResolver::parse("0.94,0.15").unwrap();
//! let assembly = assembler
//!     .assemble(&["a.maf", "b.maf"], &mut purity)
//!     .unwrap();
//! println!("{} samples", assembly.samples.len());
//! ```

use crate::core::error::{AfplotError, Result};
use crate::maf::{read_sample, ColumnMap, Record};
use crate::purity::{PurityMap, PurityResolver};
use log::{info, warn};
use rustc_hash::FxHashMap;

/// Record-level errors kept verbatim in [`Diagnostics`]; the rest are only counted.
pub const MAX_RECORD_ERRORS: usize = 20;

/// A source that contributed nothing, and why.
#[derive(Debug)]
pub struct SkippedSource {
    pub source: String,
    pub error: AfplotError,
}

/// Everything that went wrong without stopping the batch.
#[derive(Debug, Default)]
pub struct Diagnostics {
    pub skipped: Vec<SkippedSource>,
    pub rejected_records: usize,
    /// The first [`MAX_RECORD_ERRORS`] record-level errors.
    pub record_errors: Vec<AfplotError>,
}

impl Diagnostics {
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.rejected_records == 0
    }

    pub fn skipped_sources(&self) -> Vec<&str> {
        self.skipped.iter().map(|s| s.source.as_str()).collect()
    }

    fn reject_records(&mut self, errors: Vec<AfplotError>) {
        self.rejected_records += errors.len();
        let room = MAX_RECORD_ERRORS.saturating_sub(self.record_errors.len());
        self.record_errors.extend(errors.into_iter().take(room));
    }

    /// Log a one-line summary plus each skipped source.
    pub fn log_summary(&self) {
        for skipped in &self.skipped {
            warn!("Skipped {}: {}", skipped.source, skipped.error);
        }
        if self.rejected_records > 0 {
            warn!(
                "Rejected {} records with malformed values",
                self.rejected_records
            );
            for error in &self.record_errors {
                warn!("  {}", error);
            }
        }
    }
}

/// Records of one sample before purity is known.
#[derive(Debug)]
pub struct LoadedSample {
    pub key: String,
    /// Position of the sample's first source in the input list.
    pub input: usize,
    pub sources: Vec<String>,
    pub records: Vec<Record>,
}

/// A sample with its purity attached.
#[derive(Debug, Clone)]
pub struct Sample {
    pub key: String,
    pub sources: Vec<String>,
    pub purity: f64,
    pub records: Vec<Record>,
}

impl Sample {
    #[inline]
    pub fn half_purity(&self) -> f64 {
        self.purity / 2.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A record seen together with the sample it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct AssembledRecord<'a> {
    pub sample: &'a Sample,
    pub record: &'a Record,
}

impl AssembledRecord<'_> {
    #[inline]
    pub fn half_purity(&self) -> f64 {
        self.sample.half_purity()
    }
}

/// Samples read from disk, in first-seen order, waiting for purity.
#[derive(Debug)]
pub struct LoadedSamples {
    pub samples: Vec<LoadedSample>,
    pub diagnostics: Diagnostics,
}

impl LoadedSamples {
    /// Sample keys in input order.
    pub fn keys(&self) -> Vec<String> {
        self.samples.iter().map(|s| s.key.clone()).collect()
    }

    pub fn total_records(&self) -> usize {
        self.samples.iter().map(|s| s.records.len()).sum()
    }

    /// Ask `resolver` for the purity of every loaded sample.
    pub fn resolve_purity<R: PurityResolver + ?Sized>(&self, resolver: &mut R) -> Result<PurityMap> {
        let keys = self.keys();
        let positions: Vec<usize> = self.samples.iter().map(|s| s.input).collect();
        resolver.bind_inputs(&positions);
        info!(
            "Resolving purity for {} samples via {}",
            keys.len(),
            resolver.name()
        );
        resolver.resolve(&keys)
    }

    /// Attach purities. Fails with `PurityUnavailable` naming every key absent from `purities`.
    pub fn into_assembly(self, purities: &PurityMap) -> Result<Assembly> {
        let missing: Vec<String> = self
            .samples
            .iter()
            .filter(|s| !purities.contains_key(&s.key))
            .map(|s| s.key.clone())
            .collect();
        if !missing.is_empty() {
            return Err(AfplotError::PurityUnavailable { keys: missing });
        }

        let samples = self
            .samples
            .into_iter()
            .map(|s| {
                let purity = purities[&s.key];
                Sample {
                    key: s.key,
                    sources: s.sources,
                    purity,
                    records: s.records,
                }
            })
            .collect();

        Ok(Assembly {
            samples,
            diagnostics: self.diagnostics,
        })
    }
}

/// The assembled collection: samples in input order, each with purity.
#[derive(Debug)]
pub struct Assembly {
    pub samples: Vec<Sample>,
    pub diagnostics: Diagnostics,
}

impl Assembly {
    pub fn total_records(&self) -> usize {
        self.samples.iter().map(Sample::len).sum()
    }

    /// Every record with its sample, samples in input order.
    pub fn records(&self) -> impl Iterator<Item = AssembledRecord<'_>> {
        self.samples.iter().flat_map(|sample| {
            sample
                .records
                .iter()
                .map(move |record| AssembledRecord { sample, record })
        })
    }
}

pub struct SampleAssembler {
    columns: ColumnMap,
}

impl SampleAssembler {
    pub fn new(columns: ColumnMap) -> Self {
        SampleAssembler { columns }
    }

    /// Read every source, skipping the unusable ones.
    ///
    /// Sources sharing a sample key are merged into the first one. Fails with
    /// `NoData` when nothing could be loaded.
    pub fn load<S: AsRef<str>>(&self, sources: &[S]) -> Result<LoadedSamples> {
        if sources.is_empty() {
            return Err(AfplotError::Config("no input sources given".to_string()));
        }

        let mut diagnostics = Diagnostics::default();
        let mut samples: Vec<LoadedSample> = Vec::new();
        let mut by_key: FxHashMap<String, usize> = FxHashMap::default();

        for (input, source) in sources.iter().map(AsRef::as_ref).enumerate() {
            match read_sample(source, &self.columns) {
                Ok(loaded) => {
                    diagnostics.reject_records(loaded.rejected);
                    match by_key.get(&loaded.key).copied() {
                        Some(idx) => {
                            warn!(
                                "{} repeats sample {}; merging its {} records",
                                source,
                                loaded.key,
                                loaded.records.len()
                            );
                            let sample = &mut samples[idx];
                            sample.sources.push(loaded.source);
                            sample.records.extend(loaded.records);
                        }
                        None => {
                            by_key.insert(loaded.key.clone(), samples.len());
                            samples.push(LoadedSample {
                                key: loaded.key,
                                input,
                                sources: vec![loaded.source],
                                records: loaded.records,
                            });
                        }
                    }
                }
                Err(mut error) if error.is_recoverable() => {
                    if let AfplotError::EmptySample { rejected, .. } = &mut error {
                        diagnostics.reject_records(std::mem::take(rejected));
                    }
                    warn!("{}. Continuing on remaining files.", error);
                    diagnostics.skipped.push(SkippedSource {
                        source: source.to_string(),
                        error,
                    });
                }
                Err(error) => return Err(error),
            }
        }

        if samples.is_empty() {
            diagnostics.log_summary();
            return Err(AfplotError::NoData);
        }

        let loaded = LoadedSamples {
            samples,
            diagnostics,
        };
        info!(
            "Loaded {} records from {} samples ({} sources skipped)",
            loaded.total_records(),
            loaded.samples.len(),
            loaded.diagnostics.skipped.len()
        );
        Ok(loaded)
    }

    /// Load `sources` and attach purity from `resolver`.
    pub fn assemble<S, R>(&self, sources: &[S], resolver: &mut R) -> Result<Assembly>
    where
        S: AsRef<str>,
        R: PurityResolver + ?Sized,
    {
        let loaded = self.load(sources)?;
        let purities = loaded.resolve_purity(resolver)?;
        loaded.into_assembly(&purities)
    }
}
