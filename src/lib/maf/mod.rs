//! Mutation Annotation Format (MAF) input
//!
//! - [`record`]: the [`Record`] type, the configurable [`ColumnMap`] and
//!   population-frequency normalisation
//! - [`reader`]: loading one sample's records from a tab-delimited source

pub mod reader;
pub mod record;

pub use reader::{read_sample, SampleRecords};
pub use record::{normalize_population_frequency, ColumnMap, Record};
