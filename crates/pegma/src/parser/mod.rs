//! # Parser Module
//!
//! The matching engine and its customization surface.
//!
//! ## Overview
//!
//! A [`Matcher`] interprets a [`Grammar`](crate::grammar::Grammar) against
//! an [`Input`](crate::input::Input). Behavior is customized in layers:
//!
//! - [`MatchConfig`] bounds the run (recursion depth, memoization)
//! - [`Control`] observes rule entry/exit and builds raised errors
//! - [`Action`] consumes successfully matched ranges
//!
//! ## Usage
//!
//! ```rust
//! use pegma::grammar::{Expr, GrammarBuilder};
//! use pegma::parser::Matcher;
//!
//! let grammar = GrammarBuilder::new()
//!     .entry_point("digits")
//!     .rule("digits", Expr::plus(Expr::range('0', '9')))
//!     .build()
//!     .expect("grammar is valid");
//!
//! let mut matcher = Matcher::new(&grammar);
//! let outcome = matcher.match_text("2026").expect("no raised error");
//! assert!(outcome.matched);
//! assert_eq!(outcome.end.offset, 4);
//! ```

pub mod config;
pub mod engine;
pub mod hooks;
pub mod state;

pub use config::MatchConfig;
pub use engine::{MatchOutcome, MatchStats, Matcher};
pub use hooks::{Action, ApplyMode, Control, DefaultControl, NoAction, TraceControl, TraceEvent};
pub use state::MatcherState;
