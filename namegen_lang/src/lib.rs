// Pattern-driven name generation.
//
// Turns a compact pattern such as `!<s|B>V<c|C>s` plus a 32-bit seed into a
// name, deterministically: the same pattern, seed, and buffer size always give
// the same bytes and leave the seed in the same state.
//
// Architecture:
// - `types.rs`: `Outcome`, `ClassId`, the grammar's reserved bytes
// - `dictionary.rs`: `FragmentDictionary` trait and the packed JSON-loaded
//   implementation (`PackedDictionary`)
// - `pattern.rs`: the single-pass interpreter (`generate`), which scans and
//   renders directly from the pattern text into a caller buffer
// - `compiled.rs`: `CompiledPattern`, an index-based pre-scan with identical
//   output and RNG consumption, for patterns used many times
// - `names.rs`: `String`-returning helpers, truncation retry, preset patterns
// - `lib.rs` (this file): re-exports and the embedded default dictionary
//
// The default dictionary is `data/fragments.json`, embedded with
// `include_str!` and parsed once on first use.
//
// Determinism constraint: all randomness goes through `namegen_prng::NameRng`.
// Nothing here reads clocks, the environment, or a system RNG.

pub mod compiled;
pub mod dictionary;
pub mod names;
pub mod pattern;
pub mod types;

pub use compiled::CompiledPattern;
pub use dictionary::{ClassDef, ClassInfo, DictionaryError, FragmentDictionary, PackedDictionary};
pub use names::{
    GeneratedName, NamePreset, PRESETS, PatternSource, generate_name, generate_with_retry, preset,
};
pub use namegen_prng::NameRng;
pub use pattern::{generate, nesting_depth, terminated};
pub use types::{ClassId, METACHARACTERS, Outcome};

use std::sync::OnceLock;

/// The bundled dictionary, parsed on first use.
///
/// Panics if the embedded JSON is malformed (caught by the tests below, never
/// in a released build).
pub fn default_dictionary() -> &'static PackedDictionary {
    static DEFAULT: OnceLock<PackedDictionary> = OnceLock::new();
    DEFAULT.get_or_init(|| {
        let json = include_str!("../../data/fragments.json");
        PackedDictionary::from_json(json).expect("embedded fragments.json is malformed")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dictionary_loads() {
        let dict = default_dictionary();
        assert_eq!(dict.len(), 11);
        assert_eq!(dict.fragment_count(), 413);
    }

    #[test]
    fn test_default_dictionary_classes() {
        let dict = default_dictionary();
        let summary: Vec<(char, usize)> = dict.classes().map(|c| (c.marker, c.size)).collect();
        assert_eq!(
            summary,
            [
                ('s', 115),
                ('v', 6),
                ('V', 22),
                ('c', 21),
                ('B', 43),
                ('C', 36),
                ('i', 47),
                ('m', 43),
                ('M', 23),
                ('D', 21),
                ('d', 36),
            ]
        );
    }

    #[test]
    fn test_default_dictionary_fragments() {
        let dict = default_dictionary();
        let syllable = dict.class_of(b's').unwrap();
        assert_eq!(dict.class_fragment(syllable, 0), "ach");
        assert_eq!(dict.class_fragment(syllable, 114), "yer");
        let vowel = dict.class_of(b'v').unwrap();
        let vowels: Vec<&str> = dict.fragments(vowel).collect();
        assert_eq!(vowels, ["a", "e", "i", "o", "u", "y"]);
        let dimwit = dict.class_of(b'd').unwrap();
        assert_eq!(dict.class_fragment(dimwit, 35), "uzz");
    }

    #[test]
    fn test_default_dictionary_is_shared() {
        assert!(std::ptr::eq(default_dictionary(), default_dictionary()));
    }

    #[test]
    fn test_no_marker_is_a_metacharacter() {
        let dict = default_dictionary();
        for &b in METACHARACTERS {
            assert_eq!(dict.class_of(b), None);
        }
    }
}
