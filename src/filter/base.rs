//! The stateful filter wrapper used by the query engine.

use crate::filter::bool_filter::{BoolFilter, Operand};
use crate::filter::errors::FilterError;
use crate::filter::token_filter::TokenFilter;
use crate::token::{TokenId, TokenRef};
use std::fmt;

/// What a filter tests a token against.
#[derive(Debug, Clone)]
pub enum Predicate {
    Token(TokenFilter),
    Bool(BoolFilter),
}

impl From<TokenFilter> for Predicate {
    fn from(filter: TokenFilter) -> Self {
        Predicate::Token(filter)
    }
}

impl From<BoolFilter> for Predicate {
    fn from(filter: BoolFilter) -> Self {
        Predicate::Bool(filter)
    }
}

/// Outcome of evaluating one token inside a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Eval {
    pub matched: bool,
    /// The scan should stop once every filter has seen this token.
    pub terminate: bool,
}

/// A predicate plus its query settings and per-run accumulation state.
///
/// Settings (`inverted`, `limit`, `limit_terminates`) are fixed once the
/// filter is built. `count` and `results` belong to the current query run and
/// are cleared by [`reset`](Self::reset) at the start of each run.
#[derive(Debug, Clone)]
#[must_use = "a Filter does nothing until it is used in a query"]
pub struct Filter {
    predicate: Predicate,
    inverted: bool,
    limit: Option<usize>,
    limit_terminates: bool,
    count: usize,
    results: Vec<TokenId>,
}

impl Filter {
    pub fn new(predicate: impl Into<Predicate>) -> Self {
        Self {
            predicate: predicate.into(),
            inverted: false,
            limit: None,
            limit_terminates: true,
            count: 0,
            results: Vec::new(),
        }
    }

    /// A filter that matches every token.
    pub fn any_token() -> Self {
        Self::new(TokenFilter::new())
    }

    /// Shorthand for `Filter::new(TokenFilter::pretty(pattern)?)`.
    pub fn pretty(pattern: &str) -> Result<Self, FilterError> {
        Ok(Self::new(TokenFilter::pretty(pattern)?))
    }

    // ========================================================================
    // Settings
    // ========================================================================

    /// Stop accumulating after `limit` matches.
    pub fn limit(self, limit: usize) -> Self {
        self.with_limit(Some(limit))
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Whether reaching the limit stops the whole query (default) or only
    /// this filter's accumulation.
    pub fn limit_terminates(mut self, terminates: bool) -> Self {
        self.limit_terminates = terminates;
        self
    }

    pub fn with_inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    /// Flip inversion in place.
    pub fn invert(&mut self) {
        self.inverted = !self.inverted;
    }

    /// An inverted copy; `self` is left untouched.
    pub fn negate(&self) -> Self {
        let mut copy = self.clone();
        copy.invert();
        copy
    }

    // ========================================================================
    // Composition
    // ========================================================================

    pub fn all<I>(subs: I) -> Self
    where
        I: IntoIterator<Item = Filter>,
    {
        Self::new(BoolFilter::new(Operand::All, subs))
    }

    pub fn any<I>(subs: I) -> Self
    where
        I: IntoIterator<Item = Filter>,
    {
        Self::new(BoolFilter::new(Operand::Any, subs))
    }

    pub fn one<I>(subs: I) -> Self
    where
        I: IntoIterator<Item = Filter>,
    {
        Self::new(BoolFilter::new(Operand::One, subs))
    }

    /// Matches when no sub-filter matches: `any` of them, inverted.
    pub fn none<I>(subs: I) -> Self
    where
        I: IntoIterator<Item = Filter>,
    {
        Self::any(subs).with_inverted(true)
    }

    pub fn and(self, other: impl Into<Filter>) -> Self {
        Self::all([self, other.into()])
    }

    pub fn or(self, other: impl Into<Filter>) -> Self {
        Self::any([self, other.into()])
    }

    pub fn xor(self, other: impl Into<Filter>) -> Self {
        Self::one([self, other.into()])
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub fn get_limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn terminates_on_limit(&self) -> bool {
        self.limit_terminates
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Tokens accepted during the last query run, in encounter order.
    pub fn results(&self) -> &[TokenId] {
        &self.results
    }

    pub fn take_results(&mut self) -> Vec<TokenId> {
        std::mem::take(&mut self.results)
    }

    /// Returns `true` once the filter has accumulated `limit` tokens.
    pub fn is_exhausted(&self) -> bool {
        self.limit.is_some_and(|limit| self.count >= limit)
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Test a token, applying inversion to the predicate's result.
    pub fn matches(&self, token: &TokenRef<'_>) -> bool {
        let base = match &self.predicate {
            Predicate::Token(filter) => filter.base_match(token),
            Predicate::Bool(filter) => filter.base_match(token),
        };
        base != self.inverted
    }

    /// Test a token as part of a query run, accumulating it on a match.
    ///
    /// A limited filter only tests tokens while below its limit. Once the
    /// limit is reached, `terminate` reports `limit_terminates` whether or not
    /// this token matched.
    pub fn eval(&mut self, token: &TokenRef<'_>) -> Eval {
        let Some(limit) = self.limit else {
            let matched = self.matches(token);
            if matched {
                self.accept(token.id());
            }
            return Eval {
                matched,
                terminate: false,
            };
        };

        let mut matched = false;
        if self.count < limit {
            matched = self.matches(token);
            if matched {
                self.accept(token.id());
            }
        }
        Eval {
            matched,
            terminate: self.limit_terminates && self.count >= limit,
        }
    }

    fn accept(&mut self, id: TokenId) {
        self.count += 1;
        self.results.push(id);
    }

    /// Clear the accumulation state before a new run.
    pub fn reset(&mut self) {
        self.count = 0;
        self.results.clear();
    }
}

impl From<TokenFilter> for Filter {
    fn from(filter: TokenFilter) -> Self {
        Filter::new(filter)
    }
}

impl From<BoolFilter> for Filter {
    fn from(filter: BoolFilter) -> Self {
        Filter::new(filter)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inverted {
            f.write_str("not ")?;
        }
        match &self.predicate {
            Predicate::Token(filter) => write!(f, "{filter}")?,
            Predicate::Bool(filter) => write!(f, "{filter}")?,
        }
        if let Some(limit) = self.limit {
            write!(f, " (limit {limit}")?;
            if !self.limit_terminates {
                f.write_str(", non-terminating")?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}
