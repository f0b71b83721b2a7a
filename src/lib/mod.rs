//! afplot: allelic frequency versus tumor purity plots
//!
//! afplot loads per-sample Mutation Annotation Format (MAF) files, attaches
//! each sample's tumor purity, and lays the variants out for a two-panel
//! plotly figure: a heatmap strip of mutation counts above a scatter of
//! allelic fraction per sample, samples ordered by purity, with a reference
//! line at half purity and a population-frequency filter slider.
//!
//! # Modules
//!
//! - [`sources`]: collecting MAF locations from a list file, directory or workspace export
//! - [`maf`]: reading records and normalising population frequency
//! - [`purity`]: the [`purity::PurityResolver`] interface and its implementations
//! - [`assembler`]: merging samples and attaching purity
//! - [`layout`]: purity ranks, jittered x positions, counts and reference lines
//! - [`figure`]: the plotly figure document
//! - [`export`]: annotated record table
//! - [`workspace`]: exported workspace entity tables
//! - [`core`]: errors, IO and filesystem helpers

pub mod assembler;
pub mod core;
pub mod export;
pub mod figure;
pub mod layout;
pub mod maf;
pub mod purity;
pub mod sources;
pub mod workspace;

pub use crate::core::prelude;
