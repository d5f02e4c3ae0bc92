//! # pegma
//!
//! A runtime parsing-expression-grammar (PEG) matching engine.
//!
//! ## Overview
//!
//! Grammars are built as expression trees ([`Expr`]) of primitive matchers
//! and combinators, assembled into named rules with [`GrammarBuilder`],
//! and interpreted by a [`Matcher`] against a rewindable input cursor.
//! PEG semantics throughout: ordered choice commits to the first matching
//! alternative, repetition is greedy, and lookahead is zero-width.
//!
//! Failure travels on two channels. Ordinary failure rewinds the cursor
//! and lets enclosing combinators try something else; a mandatory match
//! ([`Expr::must`]) converts failure into a raised [`ParseError`] that
//! aborts the whole parse with the exact failure position.
//!
//! ## Usage
//!
//! ```rust
//! use pegma::grammar::{Expr, GrammarBuilder};
//! use pegma::parser::Matcher;
//!
//! // group <- '(' ( !')' . )* ')'   with the closing paren mandatory
//! let grammar = GrammarBuilder::new()
//!     .entry_point("group")
//!     .rule(
//!         "group",
//!         Expr::seq([
//!             Expr::one('('),
//!             Expr::star(Expr::seq([Expr::not_at(Expr::one(')')), Expr::any()])),
//!             Expr::must(Expr::one(')')),
//!         ]),
//!     )
//!     .build()
//!     .expect("grammar is valid");
//!
//! let mut matcher = Matcher::new(&grammar);
//!
//! let outcome = matcher.match_text("(abc)").expect("no raised error");
//! assert!(outcome.matched);
//! assert_eq!(outcome.end.offset, 5);
//!
//! // Unclosed group: the mandatory ')' raises instead of backtracking.
//! let err = matcher.match_text("(abc").unwrap_err();
//! assert_eq!(err.position().map(|p| p.offset), Some(4));
//! ```
//!
//! ## Features
//!
//! - `diagnostics`: derive [`miette::Diagnostic`] on error types
//! - `serde`: serialization for positions, spans and match statistics

pub mod error;
pub mod grammar;
pub mod input;
pub mod parser;

pub use error::{GrammarError, ParseError};
pub use grammar::{Expr, Grammar, GrammarBuilder};
pub use input::{Input, Position, Rewind, Span, StrInput};
pub use parser::{MatchConfig, MatchOutcome, Matcher};
