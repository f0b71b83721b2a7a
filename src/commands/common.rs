use afplot_lib::figure::Figure;
use afplot_lib::prelude::{get_raw_writer, make_parent_dirs};
use anyhow::Result;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FigureFormat {
    Json,
    Html,
}

/// `.html`/`.htm` outputs get a standalone page, everything else plotly JSON.
pub fn figure_format(path: Option<&Path>) -> FigureFormat {
    match path
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("html") | Some("htm") => FigureFormat::Html,
        _ => FigureFormat::Json,
    }
}

/// Write the figure to `output`, or stdout when absent.
pub fn write_figure(figure: &Figure, output: &Option<PathBuf>) -> Result<()> {
    if let Some(path) = output {
        make_parent_dirs(path)?;
    }
    let mut writer = get_raw_writer(output)?;
    match figure_format(output.as_deref()) {
        FigureFormat::Html => figure.write_html(&mut writer)?,
        FigureFormat::Json => {
            figure.write_json(&mut writer)?;
            writeln!(writer)?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_figure_format() {
        assert_eq!(figure_format(Some(Path::new("plot.html"))), FigureFormat::Html);
        assert_eq!(figure_format(Some(Path::new("plot.HTM"))), FigureFormat::Html);
        assert_eq!(figure_format(Some(Path::new("plot.json"))), FigureFormat::Json);
        assert_eq!(figure_format(None), FigureFormat::Json);
    }
}
