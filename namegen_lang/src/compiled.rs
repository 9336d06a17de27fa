// Compiled patterns: scan once, generate many times.
//
// `CompiledPattern::compile()` walks the whole pattern once and records every
// group it would ever have to scan: the spans of its alternatives and the
// position of its terminator. Groups and spans live in two flat `Vec`s
// addressed by `u32` indices, and a per-byte table maps each opening
// delimiter to the group it opens. Nothing holds a pointer into the pattern,
// so a compiled pattern can be cloned, moved, or shared between threads.
//
// Generation then replaces the interpreter's forward scan with reservoir
// sampling over the recorded spans. The draw sequence, the output bytes and
// the outcome are identical to `pattern::generate` for every pattern, seed,
// and capacity:
// - the same number of `keep_candidate` calls per rendered group, in the same
//   order;
// - closing delimiters are still checked lazily, only for rendered groups;
// - a pattern whose top-level scan runs off the end while nested is recorded
//   with the number of top-level separators seen before that point, and
//   generation spends the same draws before reporting `Invalid`.
//
// Rendering of individual units shares `pattern::Sink` with the interpreter.

use crate::dictionary::FragmentDictionary;
use crate::pattern::Sink;
use crate::types::{Halt, Outcome, closing_delimiter};
use namegen_prng::NameRng;

const NO_GROUP: u32 = u32::MAX;

/// Half-open byte range of one alternative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Span {
    start: u32,
    end: u32,
}

/// One `|`-separated group.
#[derive(Clone, Copy, Debug, Default)]
struct Group {
    /// Index of the group's first alternative in `CompiledPattern::spans`.
    first: u32,
    count: u32,
    /// Position of the terminating `)`/`>`, or the pattern length.
    end: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Top {
    Group(u32),
    /// The top-level scan ran off the end while nested after seeing
    /// `separators` top-level `|`s.
    Unterminated { separators: u32 },
}

/// A pattern pre-scanned into an index-addressed group table.
#[derive(Clone, Debug)]
pub struct CompiledPattern {
    source: String,
    groups: Vec<Group>,
    spans: Vec<Span>,
    /// Group opened by the delimiter at each byte position, or `NO_GROUP`.
    opens: Vec<u32>,
    top: Top,
}

enum Scan {
    Closed { group: u32, end: usize },
    Unterminated,
}

/// Arena under construction. Kept apart from `CompiledPattern` so the scan can
/// borrow the pattern bytes while recursing.
struct Builder<'p> {
    bytes: &'p [u8],
    groups: Vec<Group>,
    spans: Vec<Span>,
    opens: Vec<u32>,
}

impl Builder<'_> {
    /// Record the group starting at `start` and, recursively, every group
    /// nested in it. `separators` counts this group's `|`s as they are seen.
    fn scan_group(&mut self, start: usize, separators: &mut u32) -> Scan {
        let id = self.groups.len() as u32;
        self.groups.push(Group::default());

        // Children append their spans while we scan, so ours are collected
        // here and appended as one contiguous run at the end.
        let mut own = Vec::new();
        let mut alt_start = start;
        let mut pos = start;
        loop {
            match self.bytes.get(pos).copied() {
                None | Some(b')' | b'>') => {
                    own.push(span(alt_start, pos));
                    break;
                }
                Some(b'|') => {
                    own.push(span(alt_start, pos));
                    *separators += 1;
                    alt_start = pos + 1;
                }
                Some(b'(' | b'<') => {
                    // Separators inside the child do not count toward ours.
                    let mut child_separators = 0;
                    match self.scan_group(pos + 1, &mut child_separators) {
                        Scan::Closed { group, end } if end < self.bytes.len() => {
                            self.opens[pos] = group;
                            pos = end;
                        }
                        _ => return Scan::Unterminated,
                    }
                }
                Some(_) => {}
            }
            pos += 1;
        }

        let first = self.spans.len() as u32;
        let count = own.len() as u32;
        self.spans.extend(own);
        self.groups[id as usize] = Group {
            first,
            count,
            end: pos as u32,
        };
        Scan::Closed { group: id, end: pos }
    }
}

impl CompiledPattern {
    /// Scan `pattern` into its group table.
    ///
    /// Compilation itself never fails: malformed patterns compile to a form
    /// that reproduces the interpreter's `Invalid` outcomes (and draws).
    ///
    /// Panics if the pattern is longer than `u32::MAX - 1` bytes.
    pub fn compile(pattern: &str) -> Self {
        assert!(
            pattern.len() < u32::MAX as usize,
            "pattern too long to compile: {} bytes",
            pattern.len()
        );
        let mut builder = Builder {
            bytes: pattern.as_bytes(),
            groups: Vec::new(),
            spans: Vec::new(),
            opens: vec![NO_GROUP; pattern.len()],
        };
        let mut separators = 0;
        let top = match builder.scan_group(0, &mut separators) {
            Scan::Closed { group, .. } => Top::Group(group),
            Scan::Unterminated => Top::Unterminated { separators },
        };
        log::debug!(
            "compiled {pattern:?}: {} groups, {} alternatives",
            builder.groups.len(),
            builder.spans.len()
        );
        CompiledPattern {
            source: pattern.to_string(),
            groups: builder.groups,
            spans: builder.spans,
            opens: builder.opens,
            top,
        }
    }

    /// The pattern text this was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the pattern is statically known to be unbalanced.
    ///
    /// `false` does not guarantee every generation succeeds: mismatched
    /// delimiter kinds are only detected when the group is rendered.
    pub fn is_unterminated(&self) -> bool {
        matches!(self.top, Top::Unterminated { .. })
    }

    /// Generate one name into `buf`, exactly as `pattern::generate` would
    /// for the source pattern.
    pub fn generate<D>(&self, buf: &mut [u8], rng: &mut NameRng, dict: &D) -> Outcome
    where
        D: FragmentDictionary + ?Sized,
    {
        let top = match self.top {
            Top::Group(group) => group,
            Top::Unterminated { separators } => {
                for n in 1..=separators {
                    rng.keep_candidate(n);
                }
                return Outcome::Invalid;
            }
        };

        let mut renderer = Renderer {
            compiled: self,
            sink: Sink::new(buf),
            rng,
            dict,
        };
        let result = renderer.render_group(top, false);
        if self.groups[top as usize].end as usize != self.source.len() {
            return Outcome::Invalid;
        }
        Outcome::from(result)
    }
}

fn span(start: usize, end: usize) -> Span {
    Span {
        start: start as u32,
        end: end as u32,
    }
}

struct Renderer<'a, D: ?Sized> {
    compiled: &'a CompiledPattern,
    sink: Sink<'a>,
    rng: &'a mut NameRng,
    dict: &'a D,
}

impl<D: FragmentDictionary + ?Sized> Renderer<'_, D> {
    fn pick_alternative(&mut self, group: Group) -> Span {
        let compiled = self.compiled;
        let spans = &compiled.spans[group.first as usize..(group.first + group.count) as usize];
        let mut chosen = spans[0];
        for (n, candidate) in (1..).zip(spans) {
            if self.rng.keep_candidate(n) {
                chosen = *candidate;
            }
        }
        chosen
    }

    fn render_group(&mut self, id: u32, literal: bool) -> Result<(), Halt> {
        let compiled = self.compiled;
        let bytes = compiled.source.as_bytes();
        let span = self.pick_alternative(compiled.groups[id as usize]);
        let mut capitalize = false;
        let mut i = span.start as usize;

        while self.sink.remaining() > 0 && i < span.end as usize {
            let c = bytes[i];
            let unit_start = self.sink.written();

            match c {
                b'(' | b'<' => {
                    let child = compiled.opens[i];
                    let nested = self.render_group(child, c == b'(');
                    i = compiled.groups[child as usize].end as usize;
                    nested?;
                    if bytes.get(i).copied() != Some(closing_delimiter(c)) {
                        return Err(Halt::Invalid);
                    }
                }
                b'!' => capitalize = true,
                _ => self.sink.emit(c, literal, self.rng, self.dict),
            }

            if capitalize && self.sink.capitalize_from(unit_start) {
                capitalize = false;
            }
            i += 1;
        }

        self.sink.finish()
    }
}
