//! # Input Cursor
//!
//! The rewindable cursor abstraction that all matching runs against.
//!
//! ## Overview
//!
//! An [`Input`] tracks the current position in a source text and supports
//! saving and restoring that position exactly:
//!
//! - **Checkpoints**: cheap `Copy` snapshots of the cursor position
//! - **Markers**: scoped rewind points with one of three disciplines
//!   ([`Rewind`]), resolved exactly once on every exit path
//! - **Positions**: byte offset plus 1-based line/column, maintained
//!   incrementally as characters are consumed
//!
//! ## Usage
//!
//! ```rust
//! use pegma::input::{Input, Rewind, StrInput};
//!
//! let mut input = StrInput::new("abc");
//! let marker = input.mark(Rewind::Active);
//! input.bump();
//! input.bump();
//!
//! // The attempt failed: resolving with `false` rewinds to the mark.
//! let matched = marker.resolve(&mut input, false);
//! assert!(!matched);
//! assert_eq!(input.position().offset, 0);
//! ```
//!
//! Markers are plain values rather than RAII guards: the engine resolves
//! each marker exactly once before its frame returns, including on the
//! error-propagation path (via [`Marker::unwind`]).

use compact_str::CompactString;

/// A location in the source text.
///
/// `line` and `column` are 1-based and counted in characters; `offset` is
/// the byte offset into the underlying text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Byte offset into the source
    pub offset: usize,
    /// 1-based line number
    pub line: u32,
    /// 1-based column number
    pub column: u32,
}

impl Position {
    /// The position at the start of any input
    #[must_use]
    pub const fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A byte range of matched input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length of the span in bytes
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A snapshot of the cursor position that can be restored exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    position: Position,
}

impl Checkpoint {
    #[must_use]
    pub const fn new(position: Position) -> Self {
        Self { position }
    }

    /// The position this checkpoint restores to
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }
}

/// Rewind discipline for a [`Marker`].
///
/// The discipline decides what happens to the cursor when the marker is
/// resolved:
///
/// - `Required`: the cursor is always restored, whether or not the wrapped
///   match succeeded. Used by lookahead, which is zero-width in every
///   outcome. An explicit [`Marker::keep`] is the only way to retain the
///   advanced position.
/// - `Active`: the cursor is restored only when the wrapped match failed.
///   This is the common backtracking discipline.
/// - `DontCare`: the cursor is never restored. Used where the caller has no
///   use for the saved position, e.g. under a mandatory match whose failure
///   aborts the parse anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rewind {
    Required,
    Active,
    DontCare,
}

/// A scoped rewind point over an [`Input`].
///
/// Obtained from [`Input::mark`]; must be resolved exactly once via
/// [`resolve`](Self::resolve), [`keep`](Self::keep) or
/// [`unwind`](Self::unwind) before the creating frame returns. Markers
/// nest in strict LIFO order matching the recursive match structure.
#[derive(Debug)]
#[must_use]
pub struct Marker {
    mode: Rewind,
    saved: Checkpoint,
}

impl Marker {
    #[must_use]
    pub const fn new(mode: Rewind, saved: Checkpoint) -> Self {
        Self { mode, saved }
    }

    #[must_use]
    pub const fn mode(&self) -> Rewind {
        self.mode
    }

    #[must_use]
    pub const fn checkpoint(&self) -> Checkpoint {
        self.saved
    }

    /// Resolve the marker with the outcome of the wrapped match, applying
    /// the rewind discipline. Returns `matched` unchanged so combinators
    /// can resolve and return in one expression.
    pub fn resolve<I: Input + ?Sized>(self, input: &mut I, matched: bool) -> bool {
        match self.mode {
            Rewind::Required => input.restore(self.saved),
            Rewind::Active => {
                if !matched {
                    input.restore(self.saved);
                }
            }
            Rewind::DontCare => {}
        }
        matched
    }

    /// Commit the advanced position without rewinding, regardless of mode.
    pub fn keep(self) {}

    /// Release obligation on the error-propagation path: restore the saved
    /// position unless the discipline is `DontCare`.
    pub fn unwind<I: Input + ?Sized>(self, input: &mut I) {
        if self.mode != Rewind::DontCare {
            input.restore(self.saved);
        }
    }
}

/// The cursor contract the matching engine runs against.
///
/// Input adapters expose position tracking, single-character peek/consume,
/// an end-of-input query and exact mark/restore. The engine is agnostic to
/// the backing storage; [`StrInput`] is the in-memory implementation.
pub trait Input {
    /// Source identity for diagnostics (e.g. a file name)
    fn name(&self) -> &str;

    /// Current cursor position
    fn position(&self) -> Position;

    /// Look at the next character without consuming it
    fn peek(&self) -> Option<char>;

    /// Consume and return the next character
    fn bump(&mut self) -> Option<char>;

    /// Whether the cursor is at end of input
    fn is_at_end(&self) -> bool {
        self.peek().is_none()
    }

    /// Snapshot the current position
    fn checkpoint(&self) -> Checkpoint;

    /// Restore a previously saved snapshot exactly
    fn restore(&mut self, checkpoint: Checkpoint);

    /// Text of a matched byte range, for action hooks
    fn slice(&self, span: Span) -> &str;

    /// Acquire a rewind point with the given discipline
    fn mark(&self, mode: Rewind) -> Marker {
        Marker::new(mode, self.checkpoint())
    }
}

/// In-memory input over a `&str`.
#[derive(Debug, Clone)]
pub struct StrInput<'a> {
    name: CompactString,
    text: &'a str,
    pos: Position,
}

impl<'a> StrInput<'a> {
    /// Create an input over the given text with a generic source name.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self::with_name(text, "<memory>")
    }

    /// Create an input with an explicit source name for diagnostics.
    #[must_use]
    pub fn with_name(text: &'a str, name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            text,
            pos: Position::start(),
        }
    }

    /// The full source text
    #[must_use]
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// The unconsumed remainder of the source
    #[must_use]
    pub fn remaining(&self) -> &'a str {
        &self.text[self.pos.offset..]
    }
}

impl Input for StrInput<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Position {
        self.pos
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos.offset += c.len_utf8();
        if c == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        } else {
            self.pos.column += 1;
        }
        Some(c)
    }

    fn is_at_end(&self) -> bool {
        self.pos.offset >= self.text.len()
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint::new(self.pos)
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.position();
    }

    fn slice(&self, span: Span) -> &str {
        &self.text[span.start..span.end]
    }
}
