// Core types shared by the interpreter, the compiled form, and the dictionary.
//
// - `Outcome`: result of one generation call (success, truncated, invalid)
// - `Halt`: internal early-exit reason, threaded through the renderers with `?`
// - `ClassId`: index of a substitution class in a `FragmentDictionary`
// - `METACHARACTERS`: bytes the pattern grammar reserves for itself

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bytes with grammatical meaning. A dictionary may not use them as markers.
pub const METACHARACTERS: &[u8] = b"()<>|!";

/// Closing delimiter that must end a group opened by `opener`.
pub(crate) fn closing_delimiter(opener: u8) -> u8 {
    if opener == b'(' { b')' } else { b'>' }
}

/// Result of a generation call.
///
/// Generation never fails with an error value: grammar problems and short
/// buffers are ordinary outcomes the caller decides how to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The chosen rendering fit in the buffer and the whole pattern was consumed.
    Success,
    /// The buffer filled up first. The output is still NUL-terminated, one
    /// byte shorter than the capacity.
    Truncated,
    /// Unbalanced or mismatched delimiters, or input left over after the
    /// top-level group. Buffer contents are unspecified.
    Invalid,
}

impl Outcome {
    /// Stable numeric code: 0 success, 1 truncated, 2 invalid.
    pub fn code(self) -> u8 {
        match self {
            Outcome::Success => 0,
            Outcome::Truncated => 1,
            Outcome::Invalid => 2,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Success => "success",
            Outcome::Truncated => "truncated",
            Outcome::Invalid => "invalid",
        };
        f.write_str(s)
    }
}

/// Why a render stopped before finishing its span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Halt {
    Truncated,
    Invalid,
}

impl From<Result<(), Halt>> for Outcome {
    fn from(result: Result<(), Halt>) -> Self {
        match result {
            Ok(()) => Outcome::Success,
            Err(Halt::Truncated) => Outcome::Truncated,
            Err(Halt::Invalid) => Outcome::Invalid,
        }
    }
}

/// Index of a substitution class within a dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClassId(pub u8);

impl ClassId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
