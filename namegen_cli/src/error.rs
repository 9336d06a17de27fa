// Errors surfaced by the `namegen` binary.
//
// Every variant maps to exit status 2. Truncated names are not errors; they
// are printed and reported through the exit status by `main.rs`.

use std::io;
use std::path::PathBuf;

use namegen_lang::DictionaryError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("cannot read config {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed config {}: {source}", path.display())]
    ConfigJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),
    #[error("unknown preset '{0}' (try --list-presets)")]
    UnknownPreset(String),
    #[error("no pattern given: pass PATTERN, --preset, or set one in the config file")]
    NoPattern,
    #[error("pattern {0:?} has unbalanced or mismatched delimiters")]
    InvalidPattern(String),
    #[error("pattern nests groups {depth} deep (max {max})")]
    PatternTooDeep { depth: usize, max: usize },
    #[error("cannot write output: {0}")]
    Output(#[from] io::Error),
}

impl CliError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            CliError::UnknownPreset("elf".into()).to_string(),
            "unknown preset 'elf' (try --list-presets)"
        );
        assert_eq!(
            CliError::InvalidPattern("<s".into()).to_string(),
            "pattern \"<s\" has unbalanced or mismatched delimiters"
        );
        assert_eq!(
            CliError::PatternTooDeep { depth: 300, max: 256 }.to_string(),
            "pattern nests groups 300 deep (max 256)"
        );
        let err = CliError::ConfigIo {
            path: PathBuf::from("missing.json"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "cannot read config missing.json: not found");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_dictionary_error_passes_through() {
        let inner = DictionaryError::TooLarge;
        let expected = inner.to_string();
        let err: CliError = inner.into();
        assert_eq!(err.to_string(), expected);
    }
}
