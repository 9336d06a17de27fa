// Pattern interpreter: parses and renders in a single recursive pass.
//
// There is no parse tree. Each group is handled in two steps:
// 1. `pick_alternative` scans forward from the group start to its terminator
//    (`)`, `>` or end of pattern at nesting depth 0), running size-1 reservoir
//    sampling over the `|`-separated alternatives. The cursor is left on the
//    terminator so the caller can check it.
// 2. `render_group` walks the winning span byte by byte. `(` and `<` recurse
//    into a nested group (which runs its own scan), `!` arms capitalization for
//    the next unit that writes something, dictionary markers expand to a
//    random fragment, everything else is copied.
//
// Grammar
//   pattern     := alternative ('|' alternative)*
//   alternative := unit*
//   unit        := literal | '!' | marker | '(' pattern ')' | '<' pattern '>'
//
// `(...)` renders its contents in literal mode (markers are copied verbatim);
// `<...>` keeps substitution on. The mode is not inherited: a `<` inside a
// `(` group substitutes again.
//
// Validation is lazy. Only the top-level scan can hit the end of the pattern
// while nested, and only rendered groups get their closing delimiter checked,
// so a mismatched delimiter inside an alternative that is never chosen (or
// after the buffer filled up) goes unnoticed. `compiled.rs` reproduces this
// behavior exactly; see the equivalence tests there.
//
// No heap allocation happens during generation. Recursion depth equals the
// nesting depth of the pattern.
//
// **Critical constraint: determinism.** The order of RNG draws is part of the
// contract: one draw per alternative after the first in every scanned group,
// one draw per substituted marker, in traversal order.

use crate::dictionary::FragmentDictionary;
use crate::types::{Halt, Outcome, closing_delimiter};
use namegen_prng::NameRng;
use std::ops::Range;

/// Generate one name from `pattern` into `buf`.
///
/// `buf.len()` is the capacity including the NUL terminator. On `Success` and
/// `Truncated` the buffer holds a NUL-terminated string (read it back with
/// `terminated`). With an empty buffer nothing is written and the result is
/// `Truncated`, or `Invalid` if the top-level group is malformed.
pub fn generate<D>(buf: &mut [u8], pattern: &str, rng: &mut NameRng, dict: &D) -> Outcome
where
    D: FragmentDictionary + ?Sized,
{
    let mut interp = Interpreter {
        pattern: pattern.as_bytes(),
        pos: 0,
        sink: Sink::new(buf),
        rng,
        dict,
    };
    let result = interp.render_group(false);
    let outcome = if interp.pos != interp.pattern.len() {
        // Top-level group stopped on a dangling `)` or `>`.
        Outcome::Invalid
    } else {
        Outcome::from(result)
    };
    log::trace!("generate {pattern:?}: {outcome} ({} bytes)", interp.sink.written);
    outcome
}

/// Deepest group nesting in `pattern`: the most `(`/`<` open at once.
///
/// Both `generate` and `CompiledPattern::compile` recurse at most this deep,
/// so callers accepting untrusted patterns can bound it before generating.
pub fn nesting_depth(pattern: &str) -> usize {
    let mut depth = 0usize;
    let mut deepest = 0;
    for &b in pattern.as_bytes() {
        match b {
            b'(' | b'<' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            b')' | b'>' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

/// The bytes before the first NUL (or the whole buffer if there is none).
pub fn terminated(buf: &[u8]) -> &[u8] {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    &buf[..end]
}

/// Write cursor over the caller's buffer.
pub(crate) struct Sink<'a> {
    buf: &'a mut [u8],
    written: usize,
}

impl<'a> Sink<'a> {
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        Sink { buf, written: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.written
    }

    pub(crate) fn written(&self) -> usize {
        self.written
    }

    fn push(&mut self, byte: u8) {
        self.buf[self.written] = byte;
        self.written += 1;
    }

    /// Emit one non-group unit: a literal byte, or a fragment drawn from the
    /// byte's class when substitution is active.
    pub(crate) fn emit<D>(&mut self, byte: u8, literal: bool, rng: &mut NameRng, dict: &D)
    where
        D: FragmentDictionary + ?Sized,
    {
        let class = if literal { None } else { dict.class_of(byte) };
        match class {
            None => self.push(byte),
            Some(class) => {
                let ordinal = rng.pick(dict.class_size(class));
                for &b in dict.class_fragment(class, ordinal).as_bytes() {
                    if self.remaining() == 0 {
                        break;
                    }
                    self.push(b);
                }
            }
        }
    }

    /// Uppercase the first byte written since `start`, if any was. Returns
    /// whether the unit wrote anything (and so consumed the pending flag).
    pub(crate) fn capitalize_from(&mut self, start: usize) -> bool {
        if self.written == start {
            return false;
        }
        self.buf[start].make_ascii_uppercase();
        true
    }

    /// Terminate the output of the current group.
    ///
    /// A full buffer has its last byte overwritten by the terminator, so a
    /// truncated result is always a valid string one byte short of capacity.
    pub(crate) fn finish(&mut self) -> Result<(), Halt> {
        if self.remaining() == 0 {
            if let Some(last) = self.written.checked_sub(1) {
                self.buf[last] = 0;
            }
            Err(Halt::Truncated)
        } else {
            self.buf[self.written] = 0;
            Ok(())
        }
    }
}

struct Interpreter<'a, D: ?Sized> {
    pattern: &'a [u8],
    /// Read cursor. Between calls it sits on the terminator of the most
    /// recently scanned group.
    pos: usize,
    sink: Sink<'a>,
    rng: &'a mut NameRng,
    dict: &'a D,
}

impl<D: FragmentDictionary + ?Sized> Interpreter<'_, D> {
    /// Pick one alternative of the group starting at `pos`, uniformly (up to
    /// the RNG's bias), in one forward scan. Leaves `pos` on the terminator.
    fn pick_alternative(&mut self) -> Result<Range<usize>, Halt> {
        let mut nest = 0usize;
        let mut seen = 0u32;
        let mut start = self.pos;
        let mut chosen = self.pos..self.pos;

        loop {
            let c = self.pattern.get(self.pos).copied();
            if nest > 0 {
                match c {
                    None => return Err(Halt::Invalid),
                    Some(b'(' | b'<') => nest += 1,
                    Some(b')' | b'>') => nest -= 1,
                    Some(_) => {}
                }
            } else {
                match c {
                    None | Some(b')' | b'>') => {
                        seen += 1;
                        if self.rng.keep_candidate(seen) {
                            chosen = start..self.pos;
                        }
                        return Ok(chosen);
                    }
                    Some(b'(' | b'<') => nest += 1,
                    Some(b'|') => {
                        seen += 1;
                        if self.rng.keep_candidate(seen) {
                            chosen = start..self.pos;
                        }
                        start = self.pos + 1;
                    }
                    Some(_) => {}
                }
            }
            self.pos += 1;
        }
    }

    fn render_group(&mut self, literal: bool) -> Result<(), Halt> {
        let span = self.pick_alternative()?;
        let mut capitalize = false;
        let mut i = span.start;

        while self.sink.remaining() > 0 && i < span.end {
            let c = self.pattern[i];
            let unit_start = self.sink.written();

            match c {
                b'(' | b'<' => {
                    let resume = self.pos;
                    self.pos = i + 1;
                    let nested = self.render_group(c == b'(');
                    i = self.pos;
                    let closer = self.pattern.get(self.pos).copied();
                    self.pos = resume;
                    nested?;
                    if closer != Some(closing_delimiter(c)) {
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
