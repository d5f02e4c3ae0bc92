//! Memoization state for named-rule outcomes.

use hashbrown::HashMap;
use lasso::Spur;

use crate::input::Checkpoint;

/// Key for memo entries: a rule and the offset it was tried at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct MemoKey {
    pub rule: Spur,
    pub offset: usize,
}

/// Memoized outcome of a named rule at one position.
///
/// Only recorded while side effects are disabled, where an outcome is a
/// pure function of the start position: success stores the end
/// checkpoint, failure stores nothing (the cursor was restored).
#[derive(Debug, Clone, Copy)]
pub(crate) enum MatchMemo {
    Success(Checkpoint),
    Failure,
}

/// Engine-owned memo table, cleared at the start of every run.
#[derive(Debug, Default)]
pub struct MatcherState {
    memo: HashMap<MemoKey, MatchMemo, ahash::RandomState>,
}

impl MatcherState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            memo: HashMap::with_hasher(ahash::RandomState::new()),
        }
    }

    pub(crate) fn get_memo(&self, rule: Spur, offset: usize) -> Option<MatchMemo> {
        self.memo.get(&MemoKey { rule, offset }).copied()
    }

    /// Store an outcome. When the table outgrows `max_size` it is dropped
    /// wholesale; entries are cheap to recompute and the bound exists to
    /// cap memory on pathological inputs.
    pub(crate) fn set_memo(&mut self, rule: Spur, offset: usize, memo: MatchMemo, max_size: usize) {
        self.memo.insert(MemoKey { rule, offset }, memo);
        if self.memo.len() > max_size {
            self.memo.clear();
        }
    }

    /// Number of cached outcomes
    #[must_use]
    pub fn len(&self) -> usize {
        self.memo.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.memo.is_empty()
    }

    /// Drop all cached outcomes
    pub fn clear(&mut self) {
        self.memo.clear();
    }
}
