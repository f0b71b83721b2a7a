use crate::core::error::AfplotError;
use anyhow::Error;
use std::io;

/// Returns `true` if any cause in the chain is a broken pipe, either raw or
/// wrapped in [`AfplotError::Io`].
#[inline]
pub fn is_broken_pipe(err: &Error) -> bool {
    err.chain().any(|cause| {
        let io_err = match cause.downcast_ref::<AfplotError>() {
            Some(AfplotError::Io(inner)) => Some(inner),
            _ => cause.downcast_ref::<io::Error>(),
        };
        io_err.is_some_and(|e| e.kind() == io::ErrorKind::BrokenPipe)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broken_pipe_detection() {
        let raw = Error::new(io::Error::new(io::ErrorKind::BrokenPipe, "pipe"));
        assert!(is_broken_pipe(&raw));

        let wrapped = Error::new(AfplotError::Io(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "pipe",
        )));
        assert!(is_broken_pipe(&wrapped.context("writing figure")));

        let other = Error::new(io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert!(!is_broken_pipe(&other));
    }
}
