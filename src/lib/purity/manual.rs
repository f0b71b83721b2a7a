use super::fixed::parse_purity;
use super::{PurityLookup, PurityResolver};
use crate::core::error::{AfplotError, Result};
use log::warn;
use std::io::{self, BufRead, StdinLock, Stderr, Write};

pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Prompts for purity values, comma-separated, in the order the keys were requested.
///
/// Invalid answers (wrong count, non-numeric, outside [0, 1]) are reported
/// and re-prompted up to `max_attempts` times. End of input leaves every key
/// unresolved.
pub struct ManualPurityResolver<R, W> {
    input: R,
    output: W,
    max_attempts: usize,
}

impl ManualPurityResolver<StdinLock<'static>, Stderr> {
    /// Prompt on stderr and read answers from stdin.
    pub fn stdin() -> Self {
        ManualPurityResolver::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> ManualPurityResolver<R, W> {
    pub fn new(input: R, output: W) -> Self {
        ManualPurityResolver {
            input,
            output,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

fn parse_answer(line: &str, expected: usize) -> Result<Vec<f64>> {
    let values = line
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_purity)
        .collect::<Result<Vec<_>>>()?;
    if values.len() != expected {
        return Err(AfplotError::value_format("purity list", line.trim())
            .at(format!("expected {} values, got {}", expected, values.len())));
    }
    Ok(values)
}

impl<R: BufRead, W: Write> PurityResolver for ManualPurityResolver<R, W> {
    fn name(&self) -> &str {
        "manual entry"
    }

    fn lookup(&mut self, keys: &[String]) -> Result<PurityLookup> {
        if keys.is_empty() {
            return Ok(PurityLookup::default());
        }

        writeln!(self.output, "Purity call failed for: {}", keys.join(", "))?;
        let mut last_error = None;
        for _ in 0..self.max_attempts {
            write!(
                self.output,
                "Enter purity values for each sample (separated by commas): "
            )?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                warn!("No purity values entered before end of input");
                return Ok(PurityLookup {
                    found: Default::default(),
                    missing: keys.to_vec(),
                });
            }

            match parse_answer(&line, keys.len()) {
                Ok(values) => {
                    return Ok(PurityLookup {
                        found: keys.iter().cloned().zip(values).collect(),
                        missing: Vec::new(),
                    })
                }
                Err(e) => {
                    writeln!(self.output, "{}", e)?;
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| AfplotError::value_format("purity list", "")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn keys() -> Vec<String> {
        vec!["S1".into(), "S2".into(), "S3".into()]
    }

    #[test]
    fn test_prompt_accepts_values_in_key_order() {
        let mut resolver = ManualPurityResolver::new(Cursor::new("0.94, 0.15, 0.55\n"), Vec::new());
        let purities = resolver.resolve(&keys()).unwrap();
        assert_eq!(purities["S1"], 0.94);
        assert_eq!(purities["S2"], 0.15);
        assert_eq!(purities["S3"], 0.55);

        let prompt = String::from_utf8(resolver.into_output()).unwrap();
        assert!(prompt.contains("S1, S2, S3"));
    }

    #[test]
    fn test_reprompts_after_invalid_answer() {
        let input = Cursor::new("0.9, 1.7, 0.2\n0.9,0.2\n0.9,0.7,0.2\n");
        let mut resolver = ManualPurityResolver::new(input, Vec::new());
        let purities = resolver.resolve(&keys()).unwrap();
        assert_eq!(purities["S2"], 0.7);

        let transcript = String::from_utf8(resolver.into_output()).unwrap();
        assert_eq!(transcript.matches("Enter purity values").count(), 3);
    }

    #[test]
    fn test_gives_up_after_max_attempts() {
        let input = Cursor::new("x\ny\n");
        let mut resolver = ManualPurityResolver::new(input, Vec::new()).with_max_attempts(2);
        assert!(matches!(
            resolver.resolve(&keys()),
            Err(AfplotError::ValueFormat { .. })
        ));
    }

    #[test]
    fn test_end_of_input_leaves_keys_missing() {
        let mut resolver = ManualPurityResolver::new(Cursor::new(""), Vec::new());
        match resolver.resolve(&keys()) {
            Err(AfplotError::PurityUnavailable { keys: missing }) => assert_eq!(missing, keys()),
            _ => panic!("expected PurityUnavailable"),
        }
    }
}
