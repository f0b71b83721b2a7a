//! Sample purity resolution
//!
//! A [`PurityResolver`] maps sample keys to tumor purity. The assembler asks
//! for every loaded key at once and never substitutes a default: keys a
//! resolver cannot answer come back as [`AfplotError::PurityUnavailable`].
//!
//! # Implementations
//!
//! - [`table::TablePurityResolver`]: lookup in an exported pairs table
//! - [`fixed::FixedPurityResolver`]: values supplied on the command line
//! - [`manual::ManualPurityResolver`]: interactive prompt
//! - [`FallbackResolver`]: primary resolver, then a secondary for its misses

pub mod fixed;
pub mod manual;
pub mod table;

use crate::core::error::{AfplotError, Result};
use log::info;
use rustc_hash::FxHashMap;

pub use fixed::FixedPurityResolver;
pub use manual::ManualPurityResolver;
pub use table::{TableConfig, TablePurityResolver};

pub type PurityMap = FxHashMap<String, f64>;

/// Outcome of a lookup: the values found and, in request order, the keys that were not.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PurityLookup {
    pub found: PurityMap,
    pub missing: Vec<String>,
}

impl PurityLookup {
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Every key resolved, or `PurityUnavailable` naming the misses.
    pub fn into_complete(self) -> Result<PurityMap> {
        if self.missing.is_empty() {
            Ok(self.found)
        } else {
            Err(AfplotError::PurityUnavailable { keys: self.missing })
        }
    }
}

pub trait PurityResolver {
    /// Short label for log messages.
    fn name(&self) -> &str;

    /// Input position of each key passed to the next `lookup`.
    ///
    /// Only resolvers that answer by position care; the rest ignore it.
    fn bind_inputs(&mut self, _positions: &[usize]) {}

    /// Look up every key. Values in the result are probabilities in [0, 1].
    fn lookup(&mut self, keys: &[String]) -> Result<PurityLookup>;

    /// Look up every key and fail with `PurityUnavailable` on any miss.
    fn resolve(&mut self, keys: &[String]) -> Result<PurityMap> {
        self.lookup(keys)?.into_complete()
    }
}

impl<R: PurityResolver + ?Sized> PurityResolver for Box<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn bind_inputs(&mut self, positions: &[usize]) {
        (**self).bind_inputs(positions)
    }

    fn lookup(&mut self, keys: &[String]) -> Result<PurityLookup> {
        (**self).lookup(keys)
    }
}

/// Ask `primary` first and hand only its misses to `secondary`.
pub struct FallbackResolver<P, S> {
    primary: P,
    secondary: S,
    positions: Option<Vec<usize>>,
}

impl<P: PurityResolver, S: PurityResolver> FallbackResolver<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        FallbackResolver {
            primary,
            secondary,
            positions: None,
        }
    }
}

impl<P: PurityResolver, S: PurityResolver> PurityResolver for FallbackResolver<P, S> {
    fn name(&self) -> &str {
        "fallback"
    }

    fn bind_inputs(&mut self, positions: &[usize]) {
        self.primary.bind_inputs(positions);
        self.positions = Some(positions.to_vec());
    }

    fn lookup(&mut self, keys: &[String]) -> Result<PurityLookup> {
        let positions = self.positions.take();
        let mut lookup = self.primary.lookup(keys)?;
        if lookup.is_complete() {
            return Ok(lookup);
        }

        if let Some(positions) = positions {
            let missing_positions: Vec<usize> = keys
                .iter()
                .zip(positions)
                .filter(|(key, _)| lookup.missing.contains(*key))
                .map(|(_, position)| position)
                .collect();
            self.secondary.bind_inputs(&missing_positions);
        }

        info!(
            "{} could not supply purity for {}; asking {}",
            self.primary.name(),
            lookup.missing.join(", "),
            self.secondary.name()
        );
        let second = self.secondary.lookup(&lookup.missing)?;
        lookup.found.extend(second.found);
        lookup.missing = second.missing;
        Ok(lookup)
    }
}
