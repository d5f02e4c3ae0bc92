//! Builder API for assembling and validating grammars.

use compact_str::CompactString;
use hashbrown::HashMap;
use lasso::{Rodeo, Spur};

use crate::error::GrammarError;
use crate::grammar::{validate::validate_grammar, Expr, Grammar};

/// Builder for [`Grammar`].
///
/// # Example
///
/// ```rust
/// use pegma::grammar::{Expr, GrammarBuilder};
///
/// let grammar = GrammarBuilder::new()
///     .entry_point("pair")
///     .rule("pair", Expr::seq([
///         Expr::rule("key"),
///         Expr::one('='),
///         Expr::rule("key"),
///     ]))
///     .rule("key", Expr::plus(Expr::range('a', 'z')))
///     .build()
///     .expect("grammar is valid");
/// # let _ = grammar;
/// ```
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    rules: Vec<(CompactString, Expr)>,
    entry: Option<CompactString>,
}

impl GrammarBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry-point rule name
    #[must_use]
    pub fn entry_point(mut self, name: impl Into<CompactString>) -> Self {
        self.entry = Some(name.into());
        self
    }

    /// Define a named rule
    #[must_use]
    pub fn rule(mut self, name: impl Into<CompactString>, expr: Expr) -> Self {
        self.rules.push((name.into(), expr));
        self
    }

    /// Build and validate the grammar.
    ///
    /// # Errors
    ///
    /// Returns an error for a missing entry point, duplicate or undefined
    /// rule names, direct left recursion, or an unbounded repetition over
    /// a nullable body.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        let entry = self.entry.ok_or(GrammarError::MissingEntryPoint)?;

        let mut interner = Rodeo::new();
        let mut rules: HashMap<Spur, Expr, ahash::RandomState> =
            HashMap::with_hasher(ahash::RandomState::new());

        for (name, expr) in self.rules {
            let key = interner.get_or_intern(name.as_str());
            if rules.insert(key, expr).is_some() {
                return Err(GrammarError::DuplicateRule(name.into()));
            }
        }

        let entry_key = interner
            .get(entry.as_str())
            .ok_or_else(|| GrammarError::UndefinedRule(entry.to_string()))?;

        let grammar = Grammar::from_parts(rules, entry_key, interner);
        validate_grammar(&grammar)?;
        Ok(grammar)
    }
}
