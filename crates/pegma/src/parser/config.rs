/// Configuration options for the matching engine.
///
/// # Example
///
/// ```rust
/// use pegma::parser::MatchConfig;
///
/// let config = MatchConfig {
///     max_depth: 512,
///     ..MatchConfig::default()
/// };
/// # let _ = config;
/// ```
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Maximum recursion depth of the match tree.
    ///
    /// Exceeding it raises [`ParseError::DepthExceeded`]
    /// (`crate::error::ParseError::DepthExceeded`) rather than exhausting
    /// the call stack.
    pub max_depth: usize,

    /// Memoize named-rule outcomes per input offset.
    ///
    /// Memoization only applies while side effects are disabled (inside
    /// lookahead), where a rule's outcome is a pure function of its start
    /// position.
    pub enable_memoization: bool,

    /// Maximum number of memo entries before the cache is dropped
    pub max_memo_size: usize,

    /// Collect [`MatchStats`](crate::parser::MatchStats) during matching
    pub collect_stats: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_depth: 1024,
            enable_memoization: true,
            max_memo_size: 5000,
            collect_stats: true,
        }
    }
}
