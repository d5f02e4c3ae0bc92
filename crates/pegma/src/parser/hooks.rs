//! Control and action hooks: the engine's only side-effect channel.
//!
//! Every named-rule match is reported through a [`Control`] hook, and a
//! successful named-rule match additionally invokes the [`Action`] hook
//! with the matched range, but only while the current [`ApplyMode`]
//! permits side effects. Lookahead forces [`ApplyMode::Nothing`] for its
//! whole subtree, since lookahead represents hypothetical rather than
//! actual consumption.
//!
//! Combinators themselves are pure with respect to everything but the
//! cursor position; collaborators build derived artifacts (parse trees,
//! symbol tables) exclusively through these hooks.

use crate::error::ParseError;
use crate::grammar::Expr;
use crate::input::{Position, Span};

/// Whether action hooks fire for the current subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    /// Invoke actions after successful named-rule matches
    Action,
    /// Suppress all side effects (lookahead subtrees)
    Nothing,
}

/// Per-rule customization points invoked around matching.
///
/// All notification methods default to no-ops; `raise` defaults to
/// building a diagnostic from the failing rule's description and the
/// failure position.
pub trait Control<S> {
    /// A named rule is about to be matched
    fn enter(&mut self, rule: &str, position: Position, state: &S) {
        let _ = (rule, position, state);
    }

    /// A named rule matched; `position` is the end of the match
    fn success(&mut self, rule: &str, position: Position, state: &S) {
        let _ = (rule, position, state);
    }

    /// A named rule failed; the cursor has been restored
    fn failure(&mut self, rule: &str, position: Position, state: &S) {
        let _ = (rule, position, state);
    }

    /// A mandatory match failed: build the error that aborts the parse.
    ///
    /// `position` is the exact position at which the rule failed; it is
    /// never rewound before this hook runs.
    fn raise(&mut self, expected: &Expr, position: Position, source_name: &str) -> ParseError {
        ParseError::Raised {
            expected: expected.describe(),
            position,
            source_name: source_name.to_string(),
        }
    }
}

/// The default control hook: silent, with the standard raise behavior.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultControl;

impl<S> Control<S> for DefaultControl {}

/// Hook invoked after a successful named-rule match, with the matched
/// range and the in-scope user state.
pub trait Action<S> {
    fn apply(&mut self, rule: &str, span: Span, text: &str, state: &mut S);
}

/// Action hook that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAction;

impl<S> Action<S> for NoAction {
    fn apply(&mut self, _rule: &str, _span: Span, _text: &str, _state: &mut S) {}
}

/// One recorded control event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    Enter { rule: String, position: Position },
    Success { rule: String, position: Position },
    Failure { rule: String, position: Position },
}

/// Control hook that records every rule event, for debugging grammars
/// and asserting engine behavior in tests.
#[derive(Debug, Default)]
pub struct TraceControl {
    /// Events in the order they occurred
    pub events: Vec<TraceEvent>,
}

impl TraceControl {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of rules that were entered, in order
    #[must_use]
    pub fn entered(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TraceEvent::Enter { rule, .. } => Some(rule.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl<S> Control<S> for TraceControl {
    fn enter(&mut self, rule: &str, position: Position, _state: &S) {
        self.events.push(TraceEvent::Enter {
            rule: rule.to_string(),
            position,
        });
    }

    fn success(&mut self, rule: &str, position: Position, _state: &S) {
        self.events.push(TraceEvent::Success {
            rule: rule.to_string(),
            position,
        });
    }

    fn failure(&mut self, rule: &str, position: Position, _state: &S) {
        self.events.push(TraceEvent::Failure {
            rule: rule.to_string(),
            position,
        });
    }
}
