//! Layout Engine
//!
//! Places every record of an [`Assembly`] on a categorical x axis: one slot
//! per sample, slots ordered by ascending purity (stable on ties), records
//! spread within their slot by uniform jitter. Also derives the per-sample
//! record counts for the heatmap strip and the half-purity reference lines.

use crate::assembler::Assembly;
use crate::core::error::{AfplotError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

pub const DEFAULT_JITTER: f64 = 0.3;
pub const DEFAULT_LINE_LENGTH: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutConfig {
    /// Full width of the jitter window around a slot.
    pub jitter: f64,
    /// Width of the half-purity line drawn across a slot.
    pub line_length: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            jitter: DEFAULT_JITTER,
            line_length: DEFAULT_LINE_LENGTH,
        }
    }
}

impl LayoutConfig {
    /// Both widths must lie in [0, 1] so that neighbouring slots never overlap.
    pub fn validate(&self) -> Result<()> {
        validate_width("jitter", self.jitter)?;
        validate_width("line_length", self.line_length)?;
        if self.jitter > 0.6 {
            log::warn!(
                "jitter {} is wide; points of neighbouring samples may touch",
                self.jitter
            );
        }
        Ok(())
    }
}

fn validate_width(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(AfplotError::ThresholdValidation {
            field: name.to_string(),
            min: 0.0,
            max: 1.0,
            value,
        });
    }
    Ok(())
}

/// Horizontal reference segment at half a sample's purity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PurityLine {
    pub y: f64,
    pub x0: f64,
    pub x1: f64,
}

/// One sample's slot on the x axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleSlot {
    pub key: String,
    /// 1-based position in ascending purity order.
    pub rank: usize,
    pub purity: f64,
    pub count: usize,
    pub line: PurityLine,
}

impl SampleSlot {
    #[inline]
    pub fn half_purity(&self) -> f64 {
        self.line.y
    }
}

/// A record placed on the plot, carrying its hover metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotPoint {
    pub sample: String,
    pub rank: usize,
    pub x: f64,
    pub tumor_freq: f64,
    pub population_freq: Option<f64>,
    pub gene: String,
    pub protein_change: String,
    pub ref_count: u32,
    pub alt_count: u32,
}

impl PlotPoint {
    #[inline]
    pub fn read_depth(&self) -> u32 {
        self.ref_count.saturating_add(self.alt_count)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub config: LayoutConfig,
    /// Slots in rank order.
    pub slots: Vec<SampleSlot>,
    /// Points grouped by slot in rank order, input order within a slot.
    pub points: Vec<PlotPoint>,
}

impl Layout {
    /// Record counts in rank order.
    pub fn counts(&self) -> Vec<usize> {
        self.slots.iter().map(|s| s.count).collect()
    }

    pub fn rank_of(&self, key: &str) -> Option<usize> {
        self.slots.iter().find(|s| s.key == key).map(|s| s.rank)
    }

    /// Largest population frequency among points, `None` when no point is annotated.
    pub fn max_population_freq(&self) -> Option<f64> {
        self.points
            .iter()
            .filter_map(|p| p.population_freq)
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
    }

    pub fn min_population_freq(&self) -> Option<f64> {
        self.points
            .iter()
            .filter_map(|p| p.population_freq)
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.min(v))))
    }
}

/// Indices of `purities` in ascending order; equal values keep input order.
pub fn sample_ordering(purities: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..purities.len()).collect();
    order.sort_by(|&a, &b| purities[a].total_cmp(&purities[b]));
    order
}

/// 1-based rank of each input position under [`sample_ordering`].
pub fn assign_ranks(purities: &[f64]) -> Vec<usize> {
    let mut ranks = vec![0; purities.len()];
    for (position, idx) in sample_ordering(purities).into_iter().enumerate() {
        ranks[idx] = position + 1;
    }
    ranks
}

/// Seeded generator for reproducible jitter, or one seeded from the OS.
pub fn jitter_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        Ok(LayoutEngine { config })
    }

    #[inline]
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Uniform offset in [-jitter/2, jitter/2].
    #[inline]
    pub fn jitter_offset<R: Rng>(&self, rng: &mut R) -> f64 {
        let half = self.config.jitter / 2.0;
        if half > 0.0 {
            rng.random_range(-half..=half)
        } else {
            0.0
        }
    }

    pub fn layout<R: Rng>(&self, assembly: &Assembly, rng: &mut R) -> Layout {
        let purities: Vec<f64> = assembly.samples.iter().map(|s| s.purity).collect();
        let order = sample_ordering(&purities);
        let half_line = self.config.line_length / 2.0;

        let mut slots = Vec::with_capacity(order.len());
        let mut points = Vec::with_capacity(assembly.total_records());
        for (position, idx) in order.into_iter().enumerate() {
            let sample = &assembly.samples[idx];
            let rank = position + 1;
            let centre = rank as f64;

            slots.push(SampleSlot {
                key: sample.key.clone(),
                rank,
                purity: sample.purity,
                count: sample.len(),
                line: PurityLine {
                    y: sample.half_purity(),
                    x0: centre - half_line,
                    x1: centre + half_line,
                },
            });

            for record in &sample.records {
                points.push(PlotPoint {
                    sample: sample.key.clone(),
                    rank,
                    x: centre + self.jitter_offset(rng),
                    tumor_freq: record.tumor_freq,
                    population_freq: record.population_freq,
                    gene: record.gene.clone(),
                    protein_change: record.protein_change.clone(),
                    ref_count: record.ref_count,
                    alt_count: record.alt_count,
                });
            }
        }

        log::debug!(
            "Laid out {} points over {} slots",
            points.len(),
            slots.len()
        );
        Layout {
            config: self.config,
            slots,
            points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::{Diagnostics, Sample};
    use crate::maf::Record;
    use proptest::prelude::*;

    fn record(sample: &str, i: usize) -> Record {
        Record {
            sample: sample.to_string(),
            tumor_freq: 0.1 * (i % 10) as f64,
            population_freq: if i % 3 == 0 { None } else { Some(0.01 * i as f64) },
            ref_count: 10,
            alt_count: i as u32,
            gene: format!("G{}", i),
            protein_change: format!("p.{}", i),
        }
    }

    fn assembly(samples: &[(&str, f64, usize)]) -> Assembly {
        Assembly {
            samples: samples
                .iter()
                .map(|(key, purity, n)| Sample {
                    key: key.to_string(),
                    sources: vec![format!("{}.maf", key)],
                    purity: *purity,
                    records: (0..*n).map(|i| record(key, i)).collect(),
                })
                .collect(),
            diagnostics: Diagnostics::default(),
        }
    }

    #[test]
    fn test_ranks_follow_ascending_purity() {
        assert_eq!(assign_ranks(&[0.94, 0.15, 0.55]), vec![3, 1, 2]);

        let engine = LayoutEngine::new(LayoutConfig::default()).unwrap();
        let layout = engine.layout(
            &assembly(&[("A", 0.94, 2), ("B", 0.15, 3), ("C", 0.55, 1)]),
            &mut jitter_rng(Some(7)),
        );
        assert_eq!(layout.rank_of("B"), Some(1));
        assert_eq!(layout.rank_of("C"), Some(2));
        assert_eq!(layout.rank_of("A"), Some(3));
        assert_eq!(layout.counts(), vec![3, 1, 2]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        assert_eq!(assign_ranks(&[0.5, 0.2, 0.5, 0.2]), vec![3, 1, 4, 2]);
    }

    #[test]
    fn test_purity_lines_span_slot() {
        let config = LayoutConfig {
            jitter: 0.2,
            line_length: 0.8,
        };
        let layout = LayoutEngine::new(config)
            .unwrap()
            .layout(&assembly(&[("A", 0.6, 1), ("B", 0.2, 1)]), &mut jitter_rng(Some(1)));
        let a = &layout.slots[1];
        assert_eq!(a.key, "A");
        assert!((a.half_purity() - 0.3).abs() < 1e-12);
        assert!((a.line.x0 - 1.6).abs() < 1e-12);
        assert!((a.line.x1 - 2.4).abs() < 1e-12);
    }

    #[test]
    fn test_single_record_and_zero_jitter() {
        let config = LayoutConfig {
            jitter: 0.0,
            line_length: 0.8,
        };
        let layout = LayoutEngine::new(config)
            .unwrap()
            .layout(&assembly(&[("solo", 0.4, 1)]), &mut jitter_rng(Some(3)));
        assert_eq!(layout.slots[0].rank, 1);
        assert_eq!(layout.points[0].x, 1.0);
    }

    #[test]
    fn test_same_seed_same_layout() {
        let engine = LayoutEngine::new(LayoutConfig::default()).unwrap();
        let data = assembly(&[("A", 0.3, 5), ("B", 0.1, 5)]);
        let first = engine.layout(&data, &mut jitter_rng(Some(42)));
        let second = engine.layout(&data, &mut jitter_rng(Some(42)));
        assert_eq!(first.points, second.points);
    }

    #[test]
    fn test_invalid_widths_rejected() {
        for (jitter, line_length) in [(1.5, 0.8), (-0.1, 0.8), (0.3, f64::NAN), (0.3, 2.0)] {
            let result = LayoutEngine::new(LayoutConfig {
                jitter,
                line_length,
            });
            assert!(matches!(
                result,
                Err(AfplotError::ThresholdValidation { .. })
            ));
        }
    }

    #[test]
    fn test_population_freq_extremes() {
        let layout = LayoutEngine::new(LayoutConfig::default())
            .unwrap()
            .layout(&assembly(&[("A", 0.3, 6)]), &mut jitter_rng(Some(0)));
        assert!((layout.max_population_freq().unwrap() - 0.05).abs() < 1e-12);
        assert!((layout.min_population_freq().unwrap() - 0.01).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_ranks_are_a_stable_bijection(purities in prop::collection::vec(0.0f64..=1.0, 1..40)) {
            let ranks = assign_ranks(&purities);
            let mut sorted = ranks.clone();
            sorted.sort_unstable();
            prop_assert_eq!(sorted, (1..=purities.len()).collect::<Vec<_>>());

            for i in 0..purities.len() {
                for j in 0..purities.len() {
                    if purities[i] < purities[j] || (purities[i] == purities[j] && i < j) {
                        prop_assert!(ranks[i] < ranks[j]);
                    }
                }
            }
        }

        #[test]
        fn prop_points_stay_within_jitter(
            sizes in prop::collection::vec(1usize..20, 1..8),
            jitter in 0.0f64..=1.0,
            seed in any::<u64>(),
        ) {
            let names: Vec<String> = (0..sizes.len()).map(|i| format!("S{}", i)).collect();
            let spec: Vec<(&str, f64, usize)> = names
                .iter()
                .zip(&sizes)
                .enumerate()
                .map(|(i, (name, n))| (name.as_str(), ((i * 37) % 100) as f64 / 100.0, *n))
                .collect();
            let data = assembly(&spec);
            let engine = LayoutEngine::new(LayoutConfig { jitter, line_length: 0.8 }).unwrap();
            let layout = engine.layout(&data, &mut jitter_rng(Some(seed)));

            prop_assert_eq!(layout.points.len(), data.total_records());
            prop_assert_eq!(layout.counts().iter().sum::<usize>(), data.total_records());
            for point in &layout.points {
                prop_assert!((point.x - point.rank as f64).abs() <= jitter / 2.0 + 1e-12);
                prop_assert!((point.x - point.rank as f64).abs() <= 0.5 + 1e-12);
            }
        }
    }
}
