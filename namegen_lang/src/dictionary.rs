// Fragment dictionary: substitution classes and their word fragments.
//
// The interpreter only sees the `FragmentDictionary` trait: a classifier from
// pattern byte to class, the size of each class, and the N-th fragment of a
// class. Anything that can answer those three questions can drive generation.
//
// `PackedDictionary` is the bundled implementation. All fragments live in one
// string blob with a flat offset table, and each class is a `(first, count)`
// window into that table, so a lookup is two slice indexings and no fragment
// owns its own allocation. Dictionaries are loaded from JSON with
// `PackedDictionary::from_json()` and validated while packing.
// `crate::default_dictionary()` embeds `data/fragments.json` at compile time.
//
// Class and ordinal indices reaching `class_fragment` come from `class_of` and
// `class_size` of the same dictionary; an out-of-range index is a bug and
// panics rather than returning a wrong fragment.

use crate::types::{ClassId, METACHARACTERS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Maximum number of classes. Markers are ASCII, so more could never be reached.
pub const MAX_CLASSES: usize = 128;

/// Longest fragment a dictionary may hold, in bytes.
pub const MAX_FRAGMENT_LEN: usize = u16::MAX as usize;

/// Lookup interface the pattern renderers draw fragments from.
pub trait FragmentDictionary {
    /// Substitution class for a pattern byte, or `None` for a plain literal.
    fn class_of(&self, byte: u8) -> Option<ClassId>;

    /// Number of fragments in `class`. Always positive.
    fn class_size(&self, class: ClassId) -> usize;

    /// Fragment `ordinal` of `class`, where `ordinal < class_size(class)`.
    fn class_fragment(&self, class: ClassId, ordinal: usize) -> &str;
}

/// One class as written in the dictionary JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDef {
    /// Pattern character that expands to this class.
    pub marker: char,
    /// Short identifier, e.g. "syllable".
    pub label: String,
    #[serde(default)]
    pub description: String,
    pub fragments: Vec<String>,
}

/// Top-level JSON structure of a dictionary file.
#[derive(Debug, Serialize, Deserialize)]
struct DictionaryFile {
    classes: Vec<ClassDef>,
}

#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("cannot read dictionary {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed dictionary JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("class '{label}': marker {marker:?} is not a printable ASCII character")]
    MarkerNotPrintable { label: String, marker: char },
    #[error("class '{label}': marker {marker:?} is reserved by the pattern grammar")]
    ReservedMarker { label: String, marker: char },
    #[error("marker {marker:?} is claimed by both '{first}' and '{second}'")]
    DuplicateMarker {
        marker: char,
        first: String,
        second: String,
    },
    #[error("class '{label}' has no fragments")]
    EmptyClass { label: String },
    #[error("class '{label}': fragment {ordinal} is empty or contains NUL")]
    BadFragment { label: String, ordinal: usize },
    #[error("class '{label}': fragment {ordinal} is {len} bytes (max {})", MAX_FRAGMENT_LEN)]
    FragmentTooLong {
        label: String,
        ordinal: usize,
        len: usize,
    },
    #[error("dictionary defines {count} classes (max {})", MAX_CLASSES)]
    TooManyClasses { count: usize },
    #[error("dictionary text exceeds {} bytes", u32::MAX)]
    TooLarge,
}

/// Read-only view of one class, for listings.
#[derive(Debug, Clone, Copy)]
pub struct ClassInfo<'a> {
    pub id: ClassId,
    pub marker: char,
    pub label: &'a str,
    pub description: &'a str,
    pub size: usize,
}

#[derive(Debug, Clone)]
struct PackedClass {
    marker: u8,
    label: String,
    description: String,
    /// Index of the class's first entry in `PackedDictionary::offsets`.
    first: u32,
    count: u32,
}

/// Dictionary stored as one blob plus offset table.
#[derive(Debug, Clone)]
pub struct PackedDictionary {
    blob: String,
    /// Fragment `i` is `blob[offsets[i]..offsets[i + 1]]`.
    offsets: Vec<u32>,
    classes: Vec<PackedClass>,
    markers: [Option<ClassId>; 128],
}

impl PackedDictionary {
    /// Parse and validate a dictionary from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, DictionaryError> {
        let file: DictionaryFile = serde_json::from_str(json)?;
        Self::from_classes(file.classes)
    }

    /// Read a JSON dictionary from disk.
    pub fn load(path: &Path) -> Result<Self, DictionaryError> {
        let json = std::fs::read_to_string(path).map_err(|source| DictionaryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dict = Self::from_json(&json)?;
        log::debug!(
            "loaded dictionary {} ({} classes, {} fragments)",
            path.display(),
            dict.classes.len(),
            dict.fragment_count()
        );
        Ok(dict)
    }

    /// Validate class definitions and pack them.
    pub fn from_classes(defs: Vec<ClassDef>) -> Result<Self, DictionaryError> {
        if defs.len() > MAX_CLASSES {
            return Err(DictionaryError::TooManyClasses { count: defs.len() });
        }

        let mut markers: [Option<ClassId>; 128] = [None; 128];
        let mut blob = String::new();
        let mut offsets = vec![0u32];
        let mut classes = Vec::with_capacity(defs.len());

        for (index, def) in defs.into_iter().enumerate() {
            let marker = validate_marker(&def)?;
            if let Some(existing) = markers[marker as usize] {
                let first: &PackedClass = &classes[existing.index()];
                return Err(DictionaryError::DuplicateMarker {
                    marker: def.marker,
                    first: first.label.clone(),
                    second: def.label,
                });
            }
            if def.fragments.is_empty() {
                return Err(DictionaryError::EmptyClass { label: def.label });
            }

            let first = (offsets.len() - 1) as u32;
            for (ordinal, fragment) in def.fragments.iter().enumerate() {
                if fragment.is_empty() || fragment.contains('\0') {
                    return Err(DictionaryError::BadFragment {
                        label: def.label,
                        ordinal,
                    });
                }
                if fragment.len() > MAX_FRAGMENT_LEN {
                    return Err(DictionaryError::FragmentTooLong {
                        label: def.label,
                        ordinal,
                        len: fragment.len(),
                    });
                }
                blob.push_str(fragment);
                let end = u32::try_from(blob.len()).map_err(|_| DictionaryError::TooLarge)?;
                offsets.push(end);
            }

            markers[marker as usize] = Some(ClassId(index as u8));
            classes.push(PackedClass {
                marker,
                label: def.label,
                description: def.description,
                first,
                count: def.fragments.len() as u32,
            });
        }

        Ok(PackedDictionary {
            blob,
            offsets,
            classes,
            markers,
        })
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Total number of fragments across all classes.
    pub fn fragment_count(&self) -> usize {
        self.offsets.len() - 1
    }

    /// All classes in definition order.
    pub fn classes(&self) -> impl Iterator<Item = ClassInfo<'_>> {
        self.classes.iter().enumerate().map(|(i, c)| ClassInfo {
            id: ClassId(i as u8),
            marker: c.marker as char,
            label: &c.label,
            description: &c.description,
            size: c.count as usize,
        })
    }

    /// Iterate the fragments of one class in ordinal order.
    pub fn fragments(&self, class: ClassId) -> impl Iterator<Item = &str> {
        (0..self.class_size(class)).map(move |ordinal| self.class_fragment(class, ordinal))
    }
}

fn validate_marker(def: &ClassDef) -> Result<u8, DictionaryError> {
    let marker = def.marker;
    if !marker.is_ascii_graphic() {
        return Err(DictionaryError::MarkerNotPrintable {
            label: def.label.clone(),
            marker,
        });
    }
    let byte = marker as u8;
    if METACHARACTERS.contains(&byte) {
        return Err(DictionaryError::ReservedMarker {
            label: def.label.clone(),
            marker,
        });
    }
    Ok(byte)
}

impl FragmentDictionary for PackedDictionary {
    fn class_of(&self, byte: u8) -> Option<ClassId> {
        self.markers.get(byte as usize).copied().flatten()
    }

    fn class_size(&self, class: ClassId) -> usize {
        self.classes[class.index()].count as usize
    }

    fn class_fragment(&self, class: ClassId, ordinal: usize) -> &str {
        let packed = &self.classes[class.index()];
        assert!(
            ordinal < packed.count as usize,
            "fragment ordinal {ordinal} out of range for class '{}' ({} fragments)",
            packed.label,
            packed.count
        );
        let i = packed.first as usize + ordinal;
        &self.blob[self.offsets[i] as usize..self.offsets[i + 1] as usize]
    }
}
