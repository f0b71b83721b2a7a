mod args;
mod pipeline;

pub use args::{LabelRange, PlotArgs, PlotConfig, PuritySource};
pub use pipeline::run_plot;
