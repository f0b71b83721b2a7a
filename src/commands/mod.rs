pub mod common;
pub mod filenames;
pub mod plot;
pub mod source_args;

pub use filenames::{run_filenames, FilenamesArgs};
pub use plot::{run_plot, PlotArgs};
