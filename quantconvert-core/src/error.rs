//! Structured error type shared by the converters and the external runner.
//!
//! The variants form a closed set. Callers branch on the variant; nothing
//! inspects error types at runtime.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The external program could not be started at all.
    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The external program ran but did not exit with status 0.
    /// `code` is `None` when the process was terminated by a signal.
    #[error("'{program}' exited with return code {}", .code.map_or_else(|| "none (terminated by signal)".to_string(), |c| c.to_string()))]
    ExitCode { program: String, code: Option<i32> },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("parse error: {0}")]
    Parse(String),
}

impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        // Keep reader/writer I/O failures in the I/O bucket; everything else
        // (bad UTF-8, ragged rows, ...) is a parse failure.
        if err.is_io_error() {
            match err.into_kind() {
                csv::ErrorKind::Io(e) => PipelineError::Io(e),
                other => PipelineError::Parse(format!("{other:?}")),
            }
        } else {
            PipelineError::Parse(err.to_string())
        }
    }
}

impl PipelineError {
    /// Short label for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Launch { .. } => "launch",
            PipelineError::ExitCode { .. } => "exit-code",
            PipelineError::Io(_) => "io",
            PipelineError::Parse(_) => "parse",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_message_includes_code() {
        let err = PipelineError::ExitCode {
            program: "export.sh".into(),
            code: Some(1),
        };
        assert_eq!(err.to_string(), "'export.sh' exited with return code 1");
        assert_eq!(err.kind(), "exit-code");
    }

    #[test]
    fn exit_code_message_for_signal() {
        let err = PipelineError::ExitCode {
            program: "export.sh".into(),
            code: None,
        };
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn csv_io_error_maps_to_io_variant() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err: PipelineError = csv::Error::from(io_err).into();
        assert!(matches!(err, PipelineError::Io(ref e) if e.kind() == io::ErrorKind::NotFound));
    }

    #[test]
    fn csv_parse_error_maps_to_parse_variant() {
        let data = "a,b\n1,2,3\n";
        let mut rdr = csv::Reader::from_reader(data.as_bytes());
        let err = rdr
            .records()
            .find_map(|r| r.err())
            .expect("ragged row should fail");
        let err: PipelineError = err.into();
        assert_eq!(err.kind(), "parse");
    }
}
