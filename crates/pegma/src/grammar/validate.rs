//! Static grammar validation.
//!
//! Runs at [`GrammarBuilder::build`](crate::grammar::GrammarBuilder::build)
//! time, before any matching. Catches the compositions that can never
//! match correctly: dangling rule references, rules that recurse into
//! themselves without consuming input, and unbounded repetition over a
//! body that can match zero input (which would loop forever at match
//! time).

use crate::error::GrammarError;
use crate::grammar::{Expr, Grammar};

/// Validate a grammar for undefined references, direct left recursion and
/// nullable unbounded repetition.
///
/// # Errors
///
/// Returns the first problem found.
pub fn validate_grammar(grammar: &Grammar) -> Result<(), GrammarError> {
    for (_, expr) in grammar.rules() {
        check_references(expr, grammar)?;
    }
    for (name, expr) in grammar.rules() {
        if is_directly_left_recursive(expr, name) {
            return Err(GrammarError::LeftRecursion(vec![name.to_string()]));
        }
        check_repetitions(name, expr, grammar)?;
    }
    Ok(())
}

fn check_references(expr: &Expr, grammar: &Grammar) -> Result<(), GrammarError> {
    match expr {
        Expr::Rule(name) => {
            if grammar.get_rule(name).is_none() {
                return Err(GrammarError::UndefinedRule(name.to_string()));
            }
        }
        Expr::Seq(subs) | Expr::Sor(subs) => {
            for sub in subs {
                check_references(sub, grammar)?;
            }
        }
        Expr::Opt(e)
        | Expr::Repeat { expr: e, .. }
        | Expr::At(e)
        | Expr::NotAt(e)
        | Expr::Must(e) => {
            check_references(e, grammar)?;
        }
        _ => {}
    }
    Ok(())
}

fn check_repetitions(rule: &str, expr: &Expr, grammar: &Grammar) -> Result<(), GrammarError> {
    match expr {
        Expr::Repeat {
            expr: body,
            max: None,
            ..
        } => {
            if body.is_nullable(grammar) {
                return Err(GrammarError::NullableRepetition {
                    rule: rule.to_string(),
                });
            }
            check_repetitions(rule, body, grammar)
        }
        Expr::Repeat { expr: body, .. } => check_repetitions(rule, body, grammar),
        Expr::Seq(subs) | Expr::Sor(subs) => {
            for sub in subs {
                check_repetitions(rule, sub, grammar)?;
            }
            Ok(())
        }
        Expr::Opt(e) | Expr::At(e) | Expr::NotAt(e) | Expr::Must(e) => {
            check_repetitions(rule, e, grammar)
        }
        _ => Ok(()),
    }
}

// A rule is directly left-recursive when it can reach a reference to
// itself before consuming any input. Only the leftmost position of a
// sequence is considered, matching what the engine's recursion guard
// cannot already catch cheaply at build time.
fn is_directly_left_recursive(expr: &Expr, lhs: &str) -> bool {
    match expr {
        Expr::Rule(name) => name == lhs,
        Expr::Seq(subs) => subs
            .first()
            .is_some_and(|e| is_directly_left_recursive(e, lhs)),
        Expr::Sor(subs) => subs.iter().any(|e| is_directly_left_recursive(e, lhs)),
        Expr::Opt(e)
        | Expr::Repeat { expr: e, .. }
        | Expr::At(e)
        | Expr::NotAt(e)
        | Expr::Must(e) => is_directly_left_recursive(e, lhs),
        _ => false,
    }
}
