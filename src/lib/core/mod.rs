pub mod error;
pub mod errors;
pub mod fs;
pub mod io;

pub mod prelude {
    pub use super::error::{validate_probability, AfplotError, Result};
    pub use super::errors::is_broken_pipe;
    pub use super::fs::{is_gzipped, make_parent_dirs, url_scheme};
    pub use super::io::{get_raw_writer, get_reader, get_writer, open_source, read_to_string};
}
