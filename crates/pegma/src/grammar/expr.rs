//! Grammar expressions: the runtime rule tree the engine interprets.
//!
//! An [`Expr`] is a stateless, immutable description of a matching
//! behavior. Leaf variants match directly against the input cursor;
//! combinator variants delegate to sub-expressions. All match-time state
//! lives in the cursor, never in the expression tree, so one tree can
//! drive any number of concurrent matches.

use compact_str::CompactString;

use crate::grammar::Grammar;

/// A parsing expression.
///
/// Built via the associated constructors rather than the variants
/// directly; the constructors normalize degenerate arities (an empty
/// sequence is [`Expr::Empty`], a singleton sequence is the element
/// itself) and desugar the derived combinators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    // Leaves
    /// Match one specific character
    One(char),
    /// Match an exact string
    Literal(CompactString),
    /// Match a string, ASCII case-insensitively
    LiteralNoCase(CompactString),
    /// Match one character in an inclusive range
    Range { lo: char, hi: char },
    /// Match one character out of the given set
    OneOf(CompactString),
    /// Match one character not in the given set
    NoneOf(CompactString),
    /// Match any single character
    Any,
    /// Match end of input (zero-width)
    Eof,
    /// Match a line ending: LF or CRLF
    Eol,
    /// Always succeed without consuming (identity element of `seq`)
    Empty,
    /// Always fail (identity element of `sor`)
    Fail,

    // Combinators
    /// Match all sub-expressions in order
    Seq(Vec<Expr>),
    /// Ordered choice: first sub-expression to match wins
    Sor(Vec<Expr>),
    /// Match zero or one occurrence
    Opt(Box<Expr>),
    /// Greedy bounded repetition
    Repeat {
        expr: Box<Expr>,
        /// Minimum number of repetitions
        min: usize,
        /// Maximum number of repetitions (`None` for unbounded)
        max: Option<usize>,
    },
    /// Positive lookahead: succeeds iff the sub-expression matches,
    /// zero-width, side effects disabled
    At(Box<Expr>),
    /// Negative lookahead: succeeds iff the sub-expression fails,
    /// zero-width, side effects disabled
    NotAt(Box<Expr>),
    /// Mandatory match: failure raises a parse error instead of
    /// returning false
    Must(Box<Expr>),
    /// Reference to a named grammar rule
    Rule(CompactString),
}

impl Expr {
    /// Match one specific character
    #[must_use]
    pub const fn one(c: char) -> Self {
        Self::One(c)
    }

    /// Match an exact string. The empty string normalizes to [`Expr::Empty`].
    #[must_use]
    pub fn literal(s: impl Into<CompactString>) -> Self {
        let s = s.into();
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Literal(s)
        }
    }

    /// Match a string, ASCII case-insensitively
    #[must_use]
    pub fn literal_nocase(s: impl Into<CompactString>) -> Self {
        let s = s.into();
        if s.is_empty() {
            Self::Empty
        } else {
            Self::LiteralNoCase(s)
        }
    }

    /// Match one character in `lo..=hi`
    #[must_use]
    pub fn range(lo: char, hi: char) -> Self {
        debug_assert!(lo <= hi);
        Self::Range { lo, hi }
    }

    /// Match one character out of the given set
    #[must_use]
    pub fn one_of(set: impl Into<CompactString>) -> Self {
        let set = set.into();
        if set.is_empty() {
            Self::Fail
        } else {
            Self::OneOf(set)
        }
    }

    /// Match one character not in the given set
    #[must_use]
    pub fn none_of(set: impl Into<CompactString>) -> Self {
        let set = set.into();
        if set.is_empty() {
            Self::Any
        } else {
            Self::NoneOf(set)
        }
    }

    /// Match any single character
    #[must_use]
    pub const fn any() -> Self {
        Self::Any
    }

    /// Match end of input
    #[must_use]
    pub const fn eof() -> Self {
        Self::Eof
    }

    /// Match a line ending (LF or CRLF)
    #[must_use]
    pub const fn eol() -> Self {
        Self::Eol
    }

    /// Always succeed without consuming
    #[must_use]
    pub const fn empty() -> Self {
        Self::Empty
    }

    /// Always fail
    #[must_use]
    pub const fn fail() -> Self {
        Self::Fail
    }

    /// Reference a named grammar rule
    #[must_use]
    pub fn rule(name: impl Into<CompactString>) -> Self {
        Self::Rule(name.into())
    }

    /// Match all expressions in order.
    ///
    /// An empty sequence trivially succeeds; a singleton sequence is the
    /// element itself.
    #[must_use]
    pub fn seq<I>(exprs: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut vec: Vec<_> = exprs.into_iter().collect();
        match vec.len() {
            0 => Self::Empty,
            1 => vec.pop().unwrap(),
            _ => Self::Seq(vec),
        }
    }

    /// Ordered choice over the expressions.
    ///
    /// An empty choice always fails; a singleton choice is the element
    /// itself.
    #[must_use]
    pub fn sor<I>(exprs: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut vec: Vec<_> = exprs.into_iter().collect();
        match vec.len() {
            0 => Self::Fail,
            1 => vec.pop().unwrap(),
            _ => Self::Sor(vec),
        }
    }

    /// Match zero or one occurrence
    #[must_use]
    pub fn opt(expr: Self) -> Self {
        Self::Opt(Box::new(expr))
    }

    /// Kleene star: zero or more occurrences
    #[must_use]
    pub fn star(expr: Self) -> Self {
        Self::Repeat {
            expr: Box::new(expr),
            min: 0,
            max: None,
        }
    }

    /// Kleene plus: one or more occurrences
    #[must_use]
    pub fn plus(expr: Self) -> Self {
        Self::Repeat {
            expr: Box::new(expr),
            min: 1,
            max: None,
        }
    }

    /// Exactly `n` occurrences
    #[must_use]
    pub fn rep(expr: Self, n: usize) -> Self {
        Self::Repeat {
            expr: Box::new(expr),
            min: n,
            max: Some(n),
        }
    }

    /// At least `n` occurrences, unbounded above
    #[must_use]
    pub fn rep_min(expr: Self, n: usize) -> Self {
        Self::Repeat {
            expr: Box::new(expr),
            min: n,
            max: None,
        }
    }

    /// At most `n` occurrences; matching stops at `n` even if the body
    /// would keep succeeding
    #[must_use]
    pub fn rep_max(expr: Self, n: usize) -> Self {
        Self::Repeat {
            expr: Box::new(expr),
            min: 0,
            max: Some(n),
        }
    }

    /// Between `min` and `max` occurrences, greedy but bounded
    #[must_use]
    pub fn rep_min_max(expr: Self, min: usize, max: usize) -> Self {
        debug_assert!(min <= max);
        Self::Repeat {
            expr: Box::new(expr),
            min,
            max: Some(max),
        }
    }

    /// Positive lookahead (zero-width)
    #[must_use]
    pub fn at(expr: Self) -> Self {
        Self::At(Box::new(expr))
    }

    /// Negative lookahead (zero-width)
    #[must_use]
    pub fn not_at(expr: Self) -> Self {
        Self::NotAt(Box::new(expr))
    }

    /// Mandatory match: convert failure into a raised parse error
    #[must_use]
    pub fn must(expr: Self) -> Self {
        Self::Must(Box::new(expr))
    }

    /// Mandatory match over several rules.
    ///
    /// Each rule is wrapped in its own `must`, so a raised error names the
    /// first failing rule rather than the sequence as a whole.
    #[must_use]
    pub fn must_all<I>(exprs: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self::seq(exprs.into_iter().map(Self::must))
    }

    /// One or more `item`s separated by `sep`
    #[must_use]
    pub fn list(item: Self, sep: Self) -> Self {
        Self::seq([item.clone(), Self::star(Self::seq([sep, item]))])
    }

    /// Like [`list`](Self::list), but once a separator matched the next
    /// item is mandatory
    #[must_use]
    pub fn list_must(item: Self, sep: Self) -> Self {
        Self::seq([item.clone(), Self::star(Self::seq([sep, Self::must(item)]))])
    }

    /// `expr` surrounded by any amount of `padding` on both sides
    #[must_use]
    pub fn pad(expr: Self, padding: Self) -> Self {
        Self::seq([
            Self::star(padding.clone()),
            expr,
            Self::star(padding),
        ])
    }

    /// Human-readable identity of this expression, used by the default
    /// raise hook and in diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::One(c) => format!("'{}'", c.escape_default()),
            Self::Literal(s) => format!("\"{s}\""),
            Self::LiteralNoCase(s) => format!("\"{s}\" (any case)"),
            Self::Range { lo, hi } => {
                format!("['{}'-'{}']", lo.escape_default(), hi.escape_default())
            }
            Self::OneOf(set) => format!("one of \"{set}\""),
            Self::NoneOf(set) => format!("none of \"{set}\""),
            Self::Any => "any character".to_string(),
            Self::Eof => "end of input".to_string(),
            Self::Eol => "end of line".to_string(),
            Self::Empty => "nothing".to_string(),
            Self::Fail => "<unmatchable>".to_string(),
            Self::Seq(subs) => {
                let parts: Vec<_> = subs.iter().map(Self::describe).collect();
                format!("({})", parts.join(" "))
            }
            Self::Sor(subs) => {
                let parts: Vec<_> = subs.iter().map(Self::describe).collect();
                format!("({})", parts.join(" | "))
            }
            Self::Opt(e) => format!("optional {}", e.describe()),
            Self::Repeat { expr, min, max } => match max {
                Some(max) => format!("{}..{} of {}", min, max, expr.describe()),
                None => format!("{}.. of {}", min, expr.describe()),
            },
            Self::At(e) => format!("lookahead {}", e.describe()),
            Self::NotAt(e) => format!("absence of {}", e.describe()),
            Self::Must(e) => e.describe(),
            Self::Rule(name) => name.to_string(),
        }
    }

    /// Whether this expression can succeed without consuming any input.
    ///
    /// Rule references consult the grammar; a reference cycle is treated
    /// as non-nullable, which keeps the analysis terminating and errs on
    /// the permissive side (the engine's runtime recursion guard covers
    /// what slips through).
    #[must_use]
    pub fn is_nullable(&self, grammar: &Grammar) -> bool {
        let mut visited = hashbrown::HashSet::with_hasher(ahash::RandomState::new());
        self.nullable_impl(grammar, &mut visited)
    }

    fn nullable_impl(
        &self,
        grammar: &Grammar,
        visited: &mut hashbrown::HashSet<CompactString, ahash::RandomState>,
    ) -> bool {
        match self {
            Self::Empty | Self::Eof | Self::Opt(_) | Self::At(_) | Self::NotAt(_) => true,
            Self::One(_)
            | Self::Literal(_)
            | Self::LiteralNoCase(_)
            | Self::Range { .. }
            | Self::OneOf(_)
            | Self::NoneOf(_)
            | Self::Any
            | Self::Eol
            | Self::Fail => false,
            Self::Seq(subs) => subs.iter().all(|e| e.nullable_impl(grammar, visited)),
            Self::Sor(subs) => subs.iter().any(|e| e.nullable_impl(grammar, visited)),
            Self::Repeat { expr, min, .. } => {
                *min == 0 || expr.nullable_impl(grammar, visited)
            }
            Self::Must(e) => e.nullable_impl(grammar, visited),
            Self::Rule(name) => {
                // `visited` guards the current path only; the same rule
                // may be consulted again from a sibling branch.
                if !visited.insert(name.clone()) {
                    return false;
                }
                let nullable = grammar
                    .get_rule(name)
                    .is_some_and(|e| e.nullable_impl(grammar, visited));
                visited.remove(name);
                nullable
            }
        }
    }
}
