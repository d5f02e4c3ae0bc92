//! # Matching Engine
//!
//! Recursive-descent interpretation of a grammar's expression tree over a
//! rewindable input cursor.
//!
//! ## Control flow
//!
//! Matching an expression recursively matches its sub-expressions against
//! the shared cursor. Ordinary failure is `Ok(false)` and drives
//! backtracking in `sor`/`opt`/repetition; a raised error (`Err`) from a
//! mandatory match unwinds past every enclosing combinator (each frame
//! runs its marker's release obligation on the way out) and surfaces to
//! the caller of [`Matcher::run`].
//!
//! Under a mandatory match the whole subtree runs with the `DontCare`
//! rewind discipline: composite failures keep their consumption, so the
//! raised error reports the exact position at which matching stopped.
//!
//! Matching is single-threaded and call-stack-recursive; independent
//! matches over separate cursors may run in parallel since expression
//! trees carry no match-time state.

use smallvec::SmallVec;

use crate::error::ParseError;
use crate::grammar::{Expr, Grammar};
use crate::input::{Input, Position, Rewind, Span, StrInput};

use super::config::MatchConfig;
use super::hooks::{Action, ApplyMode, Control, DefaultControl, NoAction};
use super::state::{MatchMemo, MatcherState};

/// Counters collected during a match run.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchStats {
    /// Expressions tried, including retries after backtracking
    pub expressions_tried: usize,
    /// Named-rule outcomes served from the memo table
    pub memo_hits: usize,
    /// Deepest recursion reached
    pub max_depth: usize,
    /// Farthest byte offset the cursor reached, even on paths that were
    /// later rewound; useful for "where did it stop matching" diagnostics
    pub farthest_offset: usize,
}

/// Result of a completed (non-raising) match run.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    /// Whether the entry rule matched
    pub matched: bool,
    /// Cursor position after the run
    pub end: Position,
    /// Counters for this run
    pub stats: MatchStats,
}

/// The matching engine for one grammar.
///
/// Owns the configuration, memo state and statistics; borrow one grammar
/// and run it against any number of inputs.
pub struct Matcher<'g> {
    grammar: &'g Grammar,
    config: MatchConfig,
    memo: MatcherState,
    stats: MatchStats,
}

impl<'g> Matcher<'g> {
    #[must_use]
    pub fn new(grammar: &'g Grammar) -> Self {
        Self::with_config(grammar, MatchConfig::default())
    }

    #[must_use]
    pub fn with_config(grammar: &'g Grammar, config: MatchConfig) -> Self {
        Self {
            grammar,
            config,
            memo: MatcherState::new(),
            stats: MatchStats::default(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Statistics from the most recent run
    #[must_use]
    pub const fn stats(&self) -> &MatchStats {
        &self.stats
    }

    /// Match the grammar's entry rule against `text` with default hooks
    /// and no user state.
    ///
    /// `Ok` with `matched == false` is an ordinary overall failure; `Err`
    /// is a raised error from a mandatory match or an engine guard.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when a `must` rule fails past a commit
    /// point, or when a resource guard (depth, recursion) trips.
    pub fn match_text(&mut self, text: &str) -> Result<MatchOutcome, ParseError> {
        let mut input = StrInput::new(text);
        self.run(&mut input, &mut (), &mut DefaultControl, &mut NoAction)
    }

    /// Match the grammar's entry rule against an input with explicit user
    /// state and hooks.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when a `must` rule fails past a commit
    /// point, or when a resource guard (depth, recursion) trips.
    pub fn run<I, S>(
        &mut self,
        input: &mut I,
        state: &mut S,
        control: &mut dyn Control<S>,
        action: &mut dyn Action<S>,
    ) -> Result<MatchOutcome, ParseError>
    where
        I: Input,
    {
        self.stats = MatchStats::default();
        self.memo.clear();

        let entry = Expr::rule(self.grammar.entry());
        let mut ctx = Ctx {
            grammar: self.grammar,
            config: &self.config,
            memo: &mut self.memo,
            stats: &mut self.stats,
            control,
            action,
            mode: ApplyMode::Action,
            rewind: Rewind::Active,
            depth: 0,
            rule_path: SmallVec::new(),
        };

        let matched = match_expr(&mut ctx, &entry, input, state)?;
        Ok(MatchOutcome {
            matched,
            end: input.position(),
            stats: self.stats.clone(),
        })
    }
}

struct Ctx<'a, 'g, S> {
    grammar: &'g Grammar,
    config: &'a MatchConfig,
    memo: &'a mut MatcherState,
    stats: &'a mut MatchStats,
    control: &'a mut dyn Control<S>,
    action: &'a mut dyn Action<S>,
    mode: ApplyMode,
    /// Discipline backtracking combinators use for their markers. `Active`
    /// normally; `DontCare` under a mandatory match, where failure is
    /// fatal and consumption up to the failure point must survive for the
    /// raise position.
    rewind: Rewind,
    depth: usize,
    /// Named rules on the current match path, with the offset each was
    /// entered at; re-entering a rule at the same offset means recursion
    /// without consumption
    rule_path: SmallVec<[(lasso::Spur, usize); 16]>,
}

fn match_expr<I, S>(
    ctx: &mut Ctx<'_, '_, S>,
    expr: &Expr,
    input: &mut I,
    state: &mut S,
) -> Result<bool, ParseError>
where
    I: Input,
{
    ctx.depth += 1;
    if ctx.config.collect_stats {
        ctx.stats.expressions_tried += 1;
        ctx.stats.max_depth = ctx.stats.max_depth.max(ctx.depth);
    }
    if ctx.depth > ctx.config.max_depth {
        ctx.depth -= 1;
        return Err(ParseError::DepthExceeded {
            limit: ctx.config.max_depth,
            position: input.position(),
        });
    }

    let result = match_expr_inner(ctx, expr, input, state);

    if ctx.config.collect_stats {
        ctx.stats.farthest_offset = ctx.stats.farthest_offset.max(input.position().offset);
    }
    ctx.depth -= 1;
    result
}

#[allow(clippy::too_many_lines)]
fn match_expr_inner<I, S>(
    ctx: &mut Ctx<'_, '_, S>,
    expr: &Expr,
    input: &mut I,
    state: &mut S,
) -> Result<bool, ParseError>
where
    I: Input,
{
    match expr {
        Expr::One(c) => match input.peek() {
            Some(ch) if ch == *c => {
                input.bump();
                Ok(true)
            }
            _ => Ok(false),
        },

        Expr::Literal(s) => {
            let m = input.mark(ctx.rewind);
            let mut matched = true;
            for expected in s.chars() {
                if input.peek() == Some(expected) {
                    input.bump();
                } else {
                    matched = false;
                    break;
                }
            }
            Ok(m.resolve(input, matched))
        }

        Expr::LiteralNoCase(s) => {
            let m = input.mark(ctx.rewind);
            let mut matched = true;
            for expected in s.chars() {
                let hit = input
                    .peek()
                    .is_some_and(|ch| ch.eq_ignore_ascii_case(&expected));
                if hit {
                    input.bump();
                } else {
                    matched = false;
                    break;
                }
            }
            Ok(m.resolve(input, matched))
        }

        Expr::Range { lo, hi } => match input.peek() {
            Some(ch) if (*lo..=*hi).contains(&ch) => {
                input.bump();
                Ok(true)
            }
            _ => Ok(false),
        },

        Expr::OneOf(set) => match input.peek() {
            Some(ch) if set.contains(ch) => {
                input.bump();
                Ok(true)
            }
            _ => Ok(false),
        },

        Expr::NoneOf(set) => match input.peek() {
            Some(ch) if !set.contains(ch) => {
                input.bump();
                Ok(true)
            }
            _ => Ok(false),
        },

        Expr::Any => Ok(input.bump().is_some()),

        Expr::Eof => Ok(input.is_at_end()),

        Expr::Eol => match input.peek() {
            Some('\n') => {
                input.bump();
                Ok(true)
            }
            Some('\r') => {
                let m = input.mark(ctx.rewind);
                input.bump();
                let matched = input.peek() == Some('\n');
                if matched {
                    input.bump();
                }
                Ok(m.resolve(input, matched))
            }
            _ => Ok(false),
        },

        Expr::Empty => Ok(true),

        Expr::Fail => Ok(false),

        Expr::Seq(subs) => {
            let m = input.mark(ctx.rewind);
            for sub in subs {
                match match_expr(ctx, sub, input, state) {
                    Ok(true) => {}
                    Ok(false) => return Ok(m.resolve(input, false)),
                    Err(e) => {
                        m.unwind(input);
                        return Err(e);
                    }
                }
            }
            Ok(m.resolve(input, true))
        }

        Expr::Sor(subs) => {
            let saved = input.checkpoint();
            for sub in subs {
                input.restore(saved);
                match match_expr(ctx, sub, input, state) {
                    Ok(true) => return Ok(true),
                    Ok(false) => {}
                    // A raised error propagates immediately: no further
                    // alternatives are tried. The saved position is still
                    // released on the way out.
                    Err(e) => {
                        input.restore(saved);
                        return Err(e);
                    }
                }
            }
            input.restore(saved);
            Ok(false)
        }

        Expr::Opt(sub) => {
            let m = input.mark(Rewind::Active);
            match match_expr(ctx, sub, input, state) {
                Ok(matched) => {
                    m.resolve(input, matched);
                    Ok(true)
                }
                Err(e) => {
                    m.unwind(input);
                    Err(e)
                }
            }
        }

        Expr::Repeat {
            expr: body,
            min,
            max,
        } => {
            let m = input.mark(ctx.rewind);
            let mut count = 0usize;
            loop {
                if let Some(max) = max {
                    if count >= *max {
                        break;
                    }
                }
                let attempt = input.mark(Rewind::Active);
                match match_expr(ctx, body, input, state) {
                    Ok(true) => {
                        attempt.resolve(input, true);
                        count += 1;
                    }
                    Ok(false) => {
                        // Only the failed attempt's partial consumption
                        // is rewound. When the repetition is itself about
                        // to fail under dontcare, the attempt keeps its
                        // consumption for the raise position.
                        if count >= *min || ctx.rewind != Rewind::DontCare {
                            attempt.resolve(input, false);
                        } else {
                            attempt.keep();
                        }
                        break;
                    }
                    Err(e) => {
                        attempt.unwind(input);
                        m.unwind(input);
                        return Err(e);
                    }
                }
            }
            Ok(m.resolve(input, count >= *min))
        }

        Expr::At(sub) => {
            let m = input.mark(Rewind::Required);
            let (prev_mode, prev_rewind) = (ctx.mode, ctx.rewind);
            ctx.mode = ApplyMode::Nothing;
            ctx.rewind = Rewind::Active;
            let result = match_expr(ctx, sub, input, state);
            ctx.mode = prev_mode;
            ctx.rewind = prev_rewind;
            match result {
                Ok(matched) => Ok(m.resolve(input, matched)),
                Err(e) => {
                    m.unwind(input);
                    Err(e)
                }
            }
        }

        Expr::NotAt(sub) => {
            let m = input.mark(Rewind::Required);
            let (prev_mode, prev_rewind) = (ctx.mode, ctx.rewind);
            ctx.mode = ApplyMode::Nothing;
            ctx.rewind = Rewind::Active;
            let result = match_expr(ctx, sub, input, state);
            ctx.mode = prev_mode;
            ctx.rewind = prev_rewind;
            match result {
                Ok(matched) => {
                    m.resolve(input, matched);
                    Ok(!matched)
                }
                Err(e) => {
                    m.unwind(input);
                    Err(e)
                }
            }
        }

        Expr::Must(sub) => {
            // Failure is fatal, so the subtree runs under dontcare and
            // keeps its consumption up to the failure point.
            let prev = ctx.rewind;
            ctx.rewind = Rewind::DontCare;
            let result = match_expr(ctx, sub, input, state);
            ctx.rewind = prev;
            if result? {
                Ok(true)
            } else {
                Err(ctx.control.raise(sub, input.position(), input.name()))
            }
        }

        Expr::Rule(name) => match_rule(ctx, name, input, state),
    }
}

fn match_rule<I, S>(
    ctx: &mut Ctx<'_, '_, S>,
    name: &str,
    input: &mut I,
    state: &mut S,
) -> Result<bool, ParseError>
where
    I: Input,
{
    let grammar = ctx.grammar;
    let Some((key, body)) = grammar.lookup(name) else {
        return Err(ParseError::UndefinedRule {
            rule: name.to_string(),
        });
    };

    let start = input.checkpoint();
    let offset = start.position().offset;

    if ctx.rule_path.iter().any(|&(r, o)| r == key && o == offset) {
        return Err(ParseError::InfiniteRecursion {
            rule: name.to_string(),
            position: start.position(),
        });
    }

    if ctx.mode == ApplyMode::Nothing && ctx.config.enable_memoization {
        if let Some(memo) = ctx.memo.get_memo(key, offset) {
            if ctx.config.collect_stats {
                ctx.stats.memo_hits += 1;
            }
            return Ok(match memo {
                MatchMemo::Success(end) => {
                    input.restore(end);
                    true
                }
                MatchMemo::Failure => false,
            });
        }
    }

    ctx.control.enter(name, start.position(), state);
    ctx.rule_path.push((key, offset));
    let result = match_expr(ctx, body, input, state);
    ctx.rule_path.pop();

    match result {
        Ok(true) => {
            let end = input.checkpoint();
            ctx.control.success(name, end.position(), state);
            if ctx.mode == ApplyMode::Action {
                let span = Span::new(offset, end.position().offset);
                let text = input.slice(span);
                ctx.action.apply(name, span, text, state);
            } else if ctx.config.enable_memoization {
                ctx.memo
                    .set_memo(key, offset, MatchMemo::Success(end), ctx.config.max_memo_size);
            }
            Ok(true)
        }
        Ok(false) => {
            ctx.control.failure(name, input.position(), state);
            if ctx.mode == ApplyMode::Nothing && ctx.config.enable_memoization {
                ctx.memo
                    .set_memo(key, offset, MatchMemo::Failure, ctx.config.max_memo_size);
            }
            Ok(false)
        }
        Err(e) => Err(e),
    }
}
