//! Property-based tests for algebraic identities of the combinators.

use pegma::error::ParseError;
use pegma::grammar::{Expr, GrammarBuilder};
use pegma::parser::{MatchOutcome, Matcher};
use proptest::prelude::*;

fn run(expr: Expr, text: &str) -> Result<MatchOutcome, ParseError> {
    let grammar = GrammarBuilder::new()
        .entry_point("start")
        .rule("start", expr)
        .build()
        .expect("test grammar is valid");
    Matcher::new(&grammar).match_text(text)
}

fn outcome_key(o: &MatchOutcome) -> (bool, usize) {
    (o.matched, o.end.offset)
}

proptest! {
    #[test]
    fn literal_matches_its_own_prefix(prefix in "[a-z]{1,8}", suffix in "[a-z]{0,8}") {
        let text = format!("{prefix}{suffix}");
        let outcome = run(Expr::literal(prefix.as_str()), &text).unwrap();
        prop_assert!(outcome.matched);
        prop_assert_eq!(outcome.end.offset, prefix.len());
    }

    #[test]
    fn singleton_sequence_is_the_element(c in proptest::char::range('a', 'z'), text in "[a-z]{0,6}") {
        // Built through the raw variant so normalization cannot collapse it
        // before matching.
        let wrapped = run(Expr::Seq(vec![Expr::one(c)]), &text).unwrap();
        let plain = run(Expr::one(c), &text).unwrap();
        prop_assert_eq!(outcome_key(&wrapped), outcome_key(&plain));
    }

    #[test]
    fn empty_is_seq_identity(lit in "[a-z]{1,4}", text in "[a-z]{0,8}") {
        let plain = run(Expr::literal(lit.as_str()), &text).unwrap();
        let padded = run(
            Expr::Seq(vec![Expr::empty(), Expr::literal(lit.as_str()), Expr::empty()]),
            &text,
        )
        .unwrap();
        prop_assert_eq!(outcome_key(&plain), outcome_key(&padded));
    }

    #[test]
    fn fail_is_sor_identity(lit in "[a-z]{1,4}", text in "[a-z]{0,8}") {
        let plain = run(Expr::literal(lit.as_str()), &text).unwrap();
        let padded = run(
            Expr::Sor(vec![Expr::fail(), Expr::literal(lit.as_str())]),
            &text,
        )
        .unwrap();
        prop_assert_eq!(outcome_key(&plain), outcome_key(&padded));
    }

    #[test]
    fn sor_agrees_with_first_matching_alternative(
        a in "[a-z]{1,4}",
        b in "[a-z]{1,4}",
        text in "[a-z]{0,8}",
    ) {
        let first = run(Expr::literal(a.as_str()), &text).unwrap();
        let second = run(Expr::literal(b.as_str()), &text).unwrap();
        let choice = run(
            Expr::sor([Expr::literal(a.as_str()), Expr::literal(b.as_str())]),
            &text,
        )
        .unwrap();

        if first.matched {
            prop_assert_eq!(outcome_key(&choice), outcome_key(&first));
        } else {
            prop_assert_eq!(outcome_key(&choice), outcome_key(&second));
        }
    }

    #[test]
    fn double_negation_is_positive_lookahead(lit in "[a-z]{1,4}", text in "[a-z]{0,8}") {
        let positive = run(Expr::at(Expr::literal(lit.as_str())), &text).unwrap();
        let doubled = run(
            Expr::not_at(Expr::not_at(Expr::literal(lit.as_str()))),
            &text,
        )
        .unwrap();
        prop_assert_eq!(outcome_key(&positive), outcome_key(&doubled));
        // Lookahead is always zero-width.
        prop_assert_eq!(positive.end.offset, 0);
    }

    #[test]
    fn lookahead_never_consumes(lit in "[a-z]{1,4}", text in "[a-z]{0,8}") {
        let at = run(Expr::at(Expr::literal(lit.as_str())), &text).unwrap();
        prop_assert_eq!(at.end.offset, 0);
        let not_at = run(Expr::not_at(Expr::literal(lit.as_str())), &text).unwrap();
        prop_assert_eq!(not_at.end.offset, 0);
        prop_assert_eq!(at.matched, !not_at.matched);
    }

    #[test]
    fn bounded_repetition_consumes_within_bounds(
        available in 0usize..8,
        min in 0usize..4,
        extra in 0usize..4,
    ) {
        let max = min + extra;
        let text = "a".repeat(available);
        let outcome = run(Expr::rep_min_max(Expr::one('a'), min, max), &text).unwrap();

        if available >= min {
            prop_assert!(outcome.matched);
            prop_assert_eq!(outcome.end.offset, available.min(max));
        } else {
            prop_assert!(!outcome.matched);
            prop_assert_eq!(outcome.end.offset, 0);
        }
    }

    #[test]
    fn star_consumes_every_occurrence(available in 0usize..16) {
        let text = format!("{}b", "a".repeat(available));
        let outcome = run(Expr::star(Expr::one('a')), &text).unwrap();
        prop_assert!(outcome.matched);
        prop_assert_eq!(outcome.end.offset, available);
    }

    #[test]
    fn opt_never_fails(lit in "[a-z]{1,4}", text in "[a-z]{0,8}") {
        let outcome = run(Expr::opt(Expr::literal(lit.as_str())), &text).unwrap();
        prop_assert!(outcome.matched);
    }

    #[test]
    fn failure_always_rewinds_to_the_start(lit in "[a-z]{2,6}", text in "[a-z]{0,8}") {
        let outcome = run(
            Expr::seq([Expr::literal(lit.as_str()), Expr::fail()]),
            &text,
        )
        .unwrap();
        prop_assert!(!outcome.matched);
        prop_assert_eq!(outcome.end.offset, 0);
    }
}
