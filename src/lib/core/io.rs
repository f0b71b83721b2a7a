use crate::core::error::{AfplotError, Result};
use crate::core::fs::{is_gzipped, url_scheme};
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Open a local path, `-` for stdin, or an http(s) URL as a byte stream.
///
/// Gzip input is decoded transparently based on the extension. Every
/// failure is reported as [`AfplotError::SourceRead`] naming `location`.
pub fn open_source(location: &str) -> Result<Box<dyn Read>> {
    let raw: Box<dyn Read> = match url_scheme(location) {
        Some("http") | Some("https") => {
            let response = reqwest::blocking::get(location)
                .and_then(|r| r.error_for_status())
                .map_err(|e| AfplotError::source_read(location, e))?;
            Box::new(BufReader::new(response))
        }
        Some(scheme) => {
            return Err(AfplotError::source_read(
                location,
                format!("unsupported URL scheme '{}'", scheme),
            ))
        }
        None if location == "-" => Box::new(BufReader::new(io::stdin())),
        None => {
            let file = File::open(location).map_err(|e| AfplotError::source_read(location, e))?;
            Box::new(BufReader::with_capacity(256 * 1024, file))
        }
    };

    if is_gzipped(location.split(['?', '#']).next().unwrap_or(location)) {
        Ok(Box::new(MultiGzDecoder::new(raw)))
    } else {
        Ok(raw)
    }
}

/// Read a whole source into memory as UTF-8 text.
pub fn read_to_string(location: &str) -> Result<String> {
    let mut text = String::new();
    open_source(location)?
        .read_to_string(&mut text)
        .map_err(|e| AfplotError::source_read(location, e))?;
    Ok(text)
}

/// Build a tab-delimited reader over any source accepted by [`open_source`].
///
/// Lines starting with `#` (MAF version headers) are skipped.
pub fn get_reader(location: &str, has_headers: bool) -> Result<csv::Reader<Box<dyn Read>>> {
    let raw_reader = open_source(location)?;
    Ok(csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .has_headers(has_headers)
        .flexible(false)
        .quoting(false)
        .from_reader(raw_reader))
}

/// Build a tab-delimited writer targeting a file or stdout, gzip-compressed
/// when the path carries a gzip extension.
pub fn get_writer<P: AsRef<Path>>(
    path: &Option<P>,
    write_headers: bool,
) -> Result<csv::Writer<Box<dyn Write>>> {
    let raw_writer = get_raw_writer(path)?;
    Ok(csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(write_headers)
        .from_writer(raw_writer))
}

/// Plain byte writer for a file (or stdout when `None` or `-`).
pub fn get_raw_writer<P: AsRef<Path>>(path: &Option<P>) -> Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = match path {
        Some(path) if path.as_ref() != Path::new("-") => {
            let writer = BufWriter::new(File::create(path)?);
            if is_gzipped(path) {
                Box::new(GzEncoder::new(writer, Compression::default()))
            } else {
                Box::new(writer)
            }
        }
        _ => Box::new(BufWriter::new(io::stdout())),
    };
    Ok(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_reader_skips_comment_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "#version 2.4").unwrap();
        writeln!(file, "a\tb").unwrap();
        writeln!(file, "1\t2").unwrap();

        let mut reader = get_reader(file.path().to_str().unwrap(), true).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["a", "b"]);
        let rows: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][1], "2");
    }

    #[test]
    fn test_gzip_roundtrip_through_writer_and_reader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.tsv.gz");
        {
            let mut writer = get_writer(&Some(&path), false).unwrap();
            writer.write_record(["x", "y"]).unwrap();
            writer.write_record(["1", "2"]).unwrap();
            writer.flush().unwrap();
        }
        let text = read_to_string(path.to_str().unwrap()).unwrap();
        assert_eq!(text, "x\ty\n1\t2\n");
    }

    #[test]
    fn test_missing_file_is_source_read_error() {
        match open_source("/definitely/not/here.maf") {
            Err(AfplotError::SourceRead { source_name, .. }) => {
                assert_eq!(source_name, "/definitely/not/here.maf")
            }
            _ => panic!("expected SourceRead"),
        }
    }

    #[test]
    fn test_unsupported_scheme_is_source_read_error() {
        assert!(matches!(
            open_source("gs://bucket/sample.maf"),
            Err(AfplotError::SourceRead { .. })
        ));
    }
}
