//! # Error Types
//!
//! Error types for grammar construction and matching.
//!
//! ## Two failure channels
//!
//! Ordinary match failure is a boolean (`Ok(false)` inside the engine) and
//! drives backtracking; it is not an error. [`ParseError`] is the other
//! channel: a raised parse error from a mandatory match (`must`), or an
//! engine resource guard tripping. A raised error aborts backtracking
//! entirely and propagates to the top-level caller.
//!
//! [`GrammarError`] reports problems detected while building a grammar,
//! before any matching runs.
//!
//! ## Diagnostics Support
//!
//! When the `diagnostics` feature is enabled, errors derive
//! [`miette::Diagnostic`] for rich reporting.

use crate::input::Position;
use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// A fatal matching error.
///
/// Distinct from ordinary match failure: once raised it unwinds past every
/// enclosing combinator, so an ordered choice containing a branch that
/// raises does not try the next alternative.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum ParseError {
    /// A mandatory rule failed past a commit point.
    #[error("{source_name}:{position}: expected {expected}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(pegma::raised)))]
    Raised {
        /// Description of the rule that was required
        expected: String,
        /// Position at which the rule failed, not rewound
        position: Position,
        /// Source identity of the input
        source_name: String,
    },

    /// Recursion exceeded the configured depth limit.
    #[error("maximum match depth ({limit}) exceeded at {position}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(pegma::depth_exceeded)))]
    DepthExceeded { limit: usize, position: Position },

    /// A named rule re-entered itself without consuming input.
    #[error("rule '{rule}' re-entered at {position} without consuming input")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(pegma::infinite_recursion)))]
    InfiniteRecursion { rule: String, position: Position },

    /// A rule reference did not resolve against the grammar.
    ///
    /// Grammar validation rejects this at build time; the engine keeps the
    /// check as a safety net for hand-assembled grammars.
    #[error("undefined rule '{rule}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(pegma::undefined_rule)))]
    UndefinedRule { rule: String },
}

impl ParseError {
    /// The input position associated with this error, if any
    #[must_use]
    pub const fn position(&self) -> Option<Position> {
        match self {
            Self::Raised { position, .. }
            | Self::DepthExceeded { position, .. }
            | Self::InfiniteRecursion { position, .. } => Some(*position),
            Self::UndefinedRule { .. } => None,
        }
    }
}

/// An error detected while building a [`Grammar`](crate::grammar::Grammar).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum GrammarError {
    /// A rule reference names a rule the grammar does not define.
    #[error("undefined rule '{0}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(pegma::grammar::undefined_rule)))]
    UndefinedRule(String),

    /// The same rule name was defined twice.
    #[error("duplicate definition of rule '{0}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(pegma::grammar::duplicate_rule)))]
    DuplicateRule(String),

    /// No entry point was set on the builder.
    #[error("grammar has no entry point")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(pegma::grammar::missing_entry)))]
    MissingEntryPoint,

    /// An unbounded repetition wraps a body that can match zero input.
    ///
    /// Such a composition would loop forever at match time, so it is
    /// rejected statically.
    #[error("rule '{rule}' contains an unbounded repetition over a nullable body")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(pegma::grammar::nullable_repetition)))]
    NullableRepetition { rule: String },

    /// A rule consumes nothing before recursing into itself.
    #[error("left-recursive rule cycle: {}", .0.join(" -> "))]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(pegma::grammar::left_recursion)))]
    LeftRecursion(Vec<String>),
}
