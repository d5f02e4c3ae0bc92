//! Engine-level behavior: configuration, resource guards, memoization,
//! control hooks and user state.

use pegma::error::ParseError;
use pegma::grammar::{Expr, GrammarBuilder};
use pegma::input::{Input, Span, StrInput};
use pegma::parser::{
    Action, DefaultControl, MatchConfig, Matcher, NoAction, TraceControl, TraceEvent,
};

fn digits_grammar() -> pegma::Grammar {
    GrammarBuilder::new()
        .entry_point("digits")
        .rule("digits", Expr::plus(Expr::range('0', '9')))
        .build()
        .unwrap()
}

#[test]
fn depth_limit_raises_instead_of_overflowing() {
    let grammar = GrammarBuilder::new()
        .entry_point("nest")
        .rule(
            "nest",
            Expr::seq([
                Expr::one('['),
                Expr::opt(Expr::rule("nest")),
                Expr::one(']'),
            ]),
        )
        .build()
        .unwrap();
    let config = MatchConfig {
        max_depth: 64,
        ..MatchConfig::default()
    };
    let mut matcher = Matcher::with_config(&grammar, config);

    let shallow = format!("{}{}", "[".repeat(4), "]".repeat(4));
    assert!(matcher.match_text(&shallow).unwrap().matched);

    let deep = format!("{}{}", "[".repeat(200), "]".repeat(200));
    let err = matcher.match_text(&deep).unwrap_err();
    assert!(matches!(err, ParseError::DepthExceeded { limit: 64, .. }));
}

#[test]
fn zero_width_rule_cycle_is_caught() {
    let grammar = GrammarBuilder::new()
        .entry_point("a")
        .rule("a", Expr::rule("b"))
        .rule("b", Expr::rule("a"))
        .build()
        .unwrap();
    let err = Matcher::new(&grammar).match_text("input").unwrap_err();
    match err {
        ParseError::InfiniteRecursion { rule, position } => {
            assert_eq!(rule, "a");
            assert_eq!(position.offset, 0);
        }
        other => panic!("expected infinite recursion, got {other:?}"),
    }
}

#[test]
fn recursion_with_consumption_is_allowed() {
    // The same rule may recurse as long as each entry is at a new offset.
    let grammar = GrammarBuilder::new()
        .entry_point("nest")
        .rule(
            "nest",
            Expr::seq([
                Expr::one('('),
                Expr::opt(Expr::rule("nest")),
                Expr::one(')'),
            ]),
        )
        .build()
        .unwrap();
    let outcome = Matcher::new(&grammar).match_text("((()))").unwrap();
    assert!(outcome.matched);
    assert_eq!(outcome.end.offset, 6);
}

#[test]
fn stats_track_work_and_progress() {
    let grammar = digits_grammar();
    let mut matcher = Matcher::new(&grammar);
    let outcome = matcher.match_text("123x").unwrap();

    assert!(outcome.matched);
    assert!(outcome.stats.expressions_tried > 0);
    assert!(outcome.stats.max_depth >= 2);
    assert_eq!(outcome.stats.farthest_offset, 3);
    // The matcher keeps the same stats accessible afterwards.
    assert_eq!(matcher.stats().farthest_offset, 3);
}

#[test]
fn farthest_offset_survives_backtracking() {
    // The first alternative consumes "abc" before failing; the match ends
    // at offset 1 but the farthest probe reached offset 3.
    let grammar = GrammarBuilder::new()
        .entry_point("start")
        .rule(
            "start",
            Expr::sor([
                Expr::seq([Expr::literal("abc"), Expr::one('!')]),
                Expr::one('a'),
            ]),
        )
        .build()
        .unwrap();
    let outcome = Matcher::new(&grammar).match_text("abcd").unwrap();
    assert!(outcome.matched);
    assert_eq!(outcome.end.offset, 1);
    assert_eq!(outcome.stats.farthest_offset, 3);
}

#[test]
fn stats_collection_can_be_disabled() {
    let grammar = digits_grammar();
    let config = MatchConfig {
        collect_stats: false,
        ..MatchConfig::default()
    };
    let mut matcher = Matcher::with_config(&grammar, config);
    let outcome = matcher.match_text("42").unwrap();
    assert!(outcome.matched);
    assert_eq!(outcome.stats.expressions_tried, 0);
}

#[test]
fn memoization_serves_repeated_lookahead() {
    // `word` is matched inside lookahead at the same offset twice; the
    // second probe should come from the memo table.
    let grammar = GrammarBuilder::new()
        .entry_point("start")
        .rule(
            "start",
            Expr::seq([
                Expr::at(Expr::rule("word")),
                Expr::at(Expr::rule("word")),
                Expr::rule("word"),
            ]),
        )
        .rule("word", Expr::plus(Expr::range('a', 'z')))
        .build()
        .unwrap();

    let mut matcher = Matcher::new(&grammar);
    let outcome = matcher.match_text("hello").unwrap();
    assert!(outcome.matched);
    assert!(outcome.stats.memo_hits >= 1);
}

#[test]
fn memoization_can_be_disabled() {
    let grammar = GrammarBuilder::new()
        .entry_point("start")
        .rule(
            "start",
            Expr::seq([Expr::at(Expr::rule("word")), Expr::rule("word")]),
        )
        .rule("word", Expr::plus(Expr::range('a', 'z')))
        .build()
        .unwrap();
    let config = MatchConfig {
        enable_memoization: false,
        ..MatchConfig::default()
    };
    let mut matcher = Matcher::with_config(&grammar, config);
    let outcome = matcher.match_text("hello").unwrap();
    assert!(outcome.matched);
    assert_eq!(outcome.stats.memo_hits, 0);
}

#[test]
fn trace_control_records_rule_events() {
    let grammar = GrammarBuilder::new()
        .entry_point("pair")
        .rule(
            "pair",
            Expr::seq([Expr::rule("key"), Expr::one('='), Expr::rule("key")]),
        )
        .rule("key", Expr::plus(Expr::range('a', 'z')))
        .build()
        .unwrap();

    let mut matcher = Matcher::new(&grammar);
    let mut input = StrInput::new("a=b");
    let mut trace = TraceControl::new();
    let outcome = matcher
        .run(&mut input, &mut (), &mut trace, &mut NoAction)
        .unwrap();

    assert!(outcome.matched);
    assert_eq!(trace.entered(), vec!["pair", "key", "key"]);

    let successes = trace
        .events
        .iter()
        .filter(|e| matches!(e, TraceEvent::Success { .. }))
        .count();
    assert_eq!(successes, 3);
}

#[test]
fn trace_control_reports_failures_after_rewind() {
    let grammar = GrammarBuilder::new()
        .entry_point("start")
        .rule("start", Expr::sor([Expr::rule("word"), Expr::one('1')]))
        .rule("word", Expr::plus(Expr::range('a', 'z')))
        .build()
        .unwrap();

    let mut matcher = Matcher::new(&grammar);
    let mut input = StrInput::new("1");
    let mut trace = TraceControl::new();
    matcher
        .run(&mut input, &mut (), &mut trace, &mut NoAction)
        .unwrap();

    let failure = trace
        .events
        .iter()
        .find(|e| matches!(e, TraceEvent::Failure { .. }))
        .expect("word fails once");
    match failure {
        TraceEvent::Failure { rule, position } => {
            assert_eq!(rule, "word");
            assert_eq!(position.offset, 0);
        }
        _ => unreachable!(),
    }
}

/// Accumulates matched integers into user state.
struct SumDigits;

impl Action<Vec<u64>> for SumDigits {
    fn apply(&mut self, rule: &str, _span: Span, text: &str, state: &mut Vec<u64>) {
        if rule == "number" {
            if let Ok(n) = text.parse() {
                state.push(n);
            }
        }
    }
}

#[test]
fn user_state_flows_through_actions() {
    let grammar = GrammarBuilder::new()
        .entry_point("numbers")
        .rule(
            "numbers",
            Expr::list(Expr::rule("number"), Expr::one(',')),
        )
        .rule("number", Expr::plus(Expr::range('0', '9')))
        .build()
        .unwrap();

    let mut matcher = Matcher::new(&grammar);
    let mut input = StrInput::new("10,20,12");
    let mut numbers: Vec<u64> = Vec::new();
    let outcome = matcher
        .run(&mut input, &mut numbers, &mut DefaultControl, &mut SumDigits)
        .unwrap();

    assert!(outcome.matched);
    assert_eq!(numbers, vec![10, 20, 12]);
}

#[test]
fn source_name_appears_in_raised_errors() {
    let grammar = GrammarBuilder::new()
        .entry_point("start")
        .rule("start", Expr::must(Expr::one('x')))
        .build()
        .unwrap();

    let mut matcher = Matcher::new(&grammar);
    let mut input = StrInput::with_name("y", "query.peg");
    let err = matcher
        .run(&mut input, &mut (), &mut DefaultControl, &mut NoAction)
        .unwrap_err();
    assert_eq!(err.to_string(), "query.peg:1:1: expected 'x'");
}

#[test]
fn choice_releases_its_saved_position_when_a_branch_raises() {
    let grammar = GrammarBuilder::new()
        .entry_point("start")
        .rule(
            "start",
            Expr::sor([
                Expr::seq([Expr::one('a'), Expr::must(Expr::one('x'))]),
                Expr::literal("ab"),
            ]),
        )
        .build()
        .unwrap();

    let mut matcher = Matcher::new(&grammar);
    let mut input = StrInput::new("ab");
    let err = matcher
        .run(&mut input, &mut (), &mut DefaultControl, &mut NoAction)
        .unwrap_err();

    // The error carries the position captured at raise time; the frames
    // above it still ran their release obligations, so the cursor is back
    // at the start and safe to reuse.
    assert_eq!(err.position().map(|p| p.offset), Some(1));
    assert_eq!(input.position().offset, 0);
}

#[test]
fn runs_are_independent() {
    let grammar = digits_grammar();
    let mut matcher = Matcher::new(&grammar);

    let first = matcher.match_text("123").unwrap();
    assert!(first.matched);

    // A fresh run starts from clean stats and memo state.
    let second = matcher.match_text("x").unwrap();
    assert!(!second.matched);
    assert_eq!(second.stats.farthest_offset, 0);
}
