//! # Grammar Module
//!
//! Grammar definition and validation for parsing expression grammars.
//!
//! ## Overview
//!
//! A [`Grammar`] is a table of named rules, each a parsing [`Expr`]ession,
//! plus an entry point. Rules are stateless and immutable for the lifetime
//! of a parse; composition happens entirely through the [`Expr`]
//! constructors.
//!
//! ## Usage
//!
//! ```rust
//! use pegma::grammar::{Expr, GrammarBuilder};
//!
//! let grammar = GrammarBuilder::new()
//!     .entry_point("word")
//!     .rule("word", Expr::plus(Expr::range('a', 'z')))
//!     .build()
//!     .expect("grammar is valid");
//!
//! assert_eq!(grammar.entry(), "word");
//! ```
//!
//! `build()` validates the grammar: undefined or duplicate rule names,
//! a missing entry point, direct left recursion, and unbounded repetition
//! over a nullable body are all rejected before any matching runs.

pub mod builder;
pub mod expr;
pub mod validate;

pub use builder::GrammarBuilder;
pub use expr::Expr;
pub use validate::validate_grammar;

use hashbrown::HashMap;
use lasso::{Rodeo, Spur};

/// A validated grammar: named rules plus an entry point.
///
/// Rule names are interned, so rule lookup during matching compares
/// interner keys rather than strings.
#[derive(Clone)]
pub struct Grammar {
    rules: HashMap<Spur, Expr, ahash::RandomState>,
    entry: Spur,
    interner: Rodeo,
}

impl Grammar {
    pub(crate) fn from_parts(
        rules: HashMap<Spur, Expr, ahash::RandomState>,
        entry: Spur,
        interner: Rodeo,
    ) -> Self {
        Self {
            rules,
            entry,
            interner,
        }
    }

    /// Name of the entry-point rule
    #[must_use]
    pub fn entry(&self) -> &str {
        self.interner.resolve(&self.entry)
    }

    /// Look up a rule body by name
    #[must_use]
    pub fn get_rule(&self, name: &str) -> Option<&Expr> {
        let key = self.interner.get(name)?;
        self.rules.get(&key)
    }

    /// Resolve a rule name to its interner key and body
    pub(crate) fn lookup(&self, name: &str) -> Option<(Spur, &Expr)> {
        let key = self.interner.get(name)?;
        self.rules.get(&key).map(|expr| (key, expr))
    }

    /// Iterate over `(name, body)` pairs in arbitrary order
    pub fn rules(&self) -> impl Iterator<Item = (&str, &Expr)> {
        self.rules
            .iter()
            .map(|(key, expr)| (self.interner.resolve(key), expr))
    }

    /// Number of rules in the grammar
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl std::fmt::Debug for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grammar")
            .field("entry", &self.entry())
            .field("rules", &self.rules.len())
            .finish()
    }
}
