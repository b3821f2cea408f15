//! High-level query operations.
//!
//! Every operation builds a small filter list, runs it through
//! [`engine::run`](crate::query::engine::run) and projects one filter's
//! results. [`Scope`] does the work over a chain and a traversal range;
//! [`Queryable`] exposes the same operations on anything that can produce a
//! scope (a whole chain, the tokens after a token, a loaded raws file).

use crate::filter::{Filter, FilterError};
use crate::query::engine::{self, ScanSummary};
use crate::query::item::{Item, ItemKey};
use crate::token::{Token, TokenChain, TokenId, TokenRange, TokenRef, Tokens};
use tracing::debug;

/// A halt criterion paired with the criterion to collect by.
///
/// The scan stops at the first token matching `halt`. That token is still
/// offered to `condition`.
#[derive(Debug, Clone)]
pub struct Until {
    pub halt: Filter,
    pub condition: Filter,
}

impl Until {
    pub fn new(halt: impl Into<Filter>, condition: impl Into<Filter>) -> Self {
        Self {
            halt: halt.into(),
            condition: condition.into(),
        }
    }

    /// Collect every token until `halt` matches.
    pub fn halt(halt: impl Into<Filter>) -> Self {
        Self::new(halt, Filter::any_token())
    }

    fn filters(self, condition_limit: Option<usize>) -> [Filter; 2] {
        let condition = match condition_limit {
            Some(limit) => self.condition.limit(limit),
            None => self.condition,
        };
        [self.halt.limit(1), condition]
    }
}

pub(crate) fn resolve<'a>(chain: &'a TokenChain, ids: &[TokenId]) -> Vec<TokenRef<'a>> {
    ids.iter().filter_map(|id| chain.at(*id)).collect()
}

/// A chain plus the range a query walks over it.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    chain: &'a TokenChain,
    range: TokenRange,
}

impl<'a> Scope<'a> {
    pub fn new(chain: &'a TokenChain, range: TokenRange) -> Self {
        Self { chain, range }
    }

    pub fn chain(self) -> &'a TokenChain {
        self.chain
    }

    pub fn range(self) -> TokenRange {
        self.range
    }

    pub fn walk(self) -> Tokens<'a> {
        self.chain.tokens(&self.range)
    }

    /// Run `filters` over the scope. Results are left in each filter.
    pub fn query(self, filters: &mut [Filter]) -> ScanSummary {
        engine::run(filters, self.walk())
    }

    fn results(self, filters: &mut [Filter], which: usize) -> Vec<TokenRef<'a>> {
        self.query(filters);
        filters
            .get(which)
            .map(|filter| resolve(self.chain, filter.results()))
            .unwrap_or_default()
    }

    fn first(self, filters: &mut [Filter], which: usize) -> Option<TokenRef<'a>> {
        self.query(filters);
        let id = *filters.get(which)?.results().first()?;
        self.chain.at(id)
    }

    fn last(self, filters: &mut [Filter], which: usize) -> Option<TokenRef<'a>> {
        self.query(filters);
        let id = *filters.get(which)?.results().last()?;
        self.chain.at(id)
    }

    // ========================================================================
    // Getters
    // ========================================================================

    pub fn list(self) -> Vec<TokenRef<'a>> {
        self.walk().collect()
    }

    /// The first matching token.
    pub fn get(self, filter: impl Into<Filter>) -> Option<TokenRef<'a>> {
        self.first(&mut [filter.into().limit(1)], 0)
    }

    /// The last matching token. A limit on `filter` still applies, so a
    /// terminating limit of `n` yields the `n`th match.
    pub fn get_last(self, filter: impl Into<Filter>) -> Option<TokenRef<'a>> {
        self.last(&mut [filter.into()], 0)
    }

    pub fn all(self, filter: impl Into<Filter>) -> Vec<TokenRef<'a>> {
        self.results(&mut [filter.into()], 0)
    }

    /// Every token up to and including the first one matching `halt`, or the
    /// whole scope if none does.
    pub fn until(self, halt: impl Into<Filter>) -> Vec<TokenRef<'a>> {
        self.results(&mut Until::halt(halt).filters(None), 1)
    }

    pub fn get_until(self, until: Until) -> Option<TokenRef<'a>> {
        self.first(&mut until.filters(Some(1)), 1)
    }

    pub fn get_last_until(self, until: Until) -> Option<TokenRef<'a>> {
        self.last(&mut until.filters(None), 1)
    }

    pub fn all_until(self, until: Until) -> Vec<TokenRef<'a>> {
        self.results(&mut until.filters(None), 1)
    }

    /// Returns `true` if any token matches the pretty pattern.
    pub fn contains_pretty(self, pattern: &str) -> Result<bool, FilterError> {
        Ok(self.get(Filter::pretty(pattern)?).is_some())
    }

    // ========================================================================
    // Positional access
    // ========================================================================

    /// The token at `index` in traversal order; negative indices count back
    /// from the end.
    pub fn index(self, index: isize) -> Option<TokenRef<'a>> {
        if index >= 0 {
            return self.walk().nth(index.unsigned_abs());
        }
        let tokens = self.list();
        let back = index.unsigned_abs();
        tokens.len().checked_sub(back).map(|i| tokens[i])
    }

    /// Tokens from `start` through `stop`, both inclusive, each resolved
    /// with [`index`](Self::index). Walks backward when `stop` comes first.
    pub fn slice(self, start: isize, stop: isize) -> Vec<TokenRef<'a>> {
        self.slice_step(start, stop, 1)
    }

    pub fn slice_step(self, start: isize, stop: isize, step: usize) -> Vec<TokenRef<'a>> {
        let (Some(root), Some(tail)) = (self.index(start), self.index(stop)) else {
            return Vec::new();
        };
        let range = TokenRange::starting_at(root.id())
            .until(tail.id())
            .reversed(root.follows(&tail))
            .step(step);
        self.chain.tokens(&range).collect()
    }

    pub fn item(self, key: &ItemKey) -> Result<Item<'a>, FilterError> {
        Ok(match key {
            ItemKey::All => Item::Many(self.list()),
            ItemKey::Pretty(pattern) => Item::One(self.get(Filter::pretty(pattern)?)),
            ItemKey::Index(index) => Item::One(self.index(*index)),
            ItemKey::Slice { start, stop, step } => {
                Item::Many(self.slice_step(*start, *stop, *step))
            }
        })
    }

    /// Flattened results of [`item`](Self::item) for each key, in order.
    pub fn items(self, keys: &[ItemKey]) -> Result<Vec<TokenRef<'a>>, FilterError> {
        let mut out = Vec::new();
        for key in keys {
            out.extend(self.item(key)?);
        }
        Ok(out)
    }
}

/// Query operations for anything that can be viewed as a [`Scope`].
///
/// Results borrow from `self`; use [`Scope`] directly to get results tied to
/// the chain's lifetime instead.
pub trait Queryable {
    fn chain(&self) -> &TokenChain;

    fn range(&self) -> TokenRange;

    fn scope(&self) -> Scope<'_> {
        Scope::new(self.chain(), self.range())
    }

    fn walk(&self) -> Tokens<'_> {
        self.scope().walk()
    }

    fn query(&self, filters: &mut [Filter]) -> ScanSummary {
        self.scope().query(filters)
    }

    fn list(&self) -> Vec<TokenRef<'_>> {
        self.scope().list()
    }

    fn get(&self, filter: impl Into<Filter>) -> Option<TokenRef<'_>> {
        self.scope().get(filter)
    }

    fn get_last(&self, filter: impl Into<Filter>) -> Option<TokenRef<'_>> {
        self.scope().get_last(filter)
    }

    fn all(&self, filter: impl Into<Filter>) -> Vec<TokenRef<'_>> {
        self.scope().all(filter)
    }

    fn until(&self, halt: impl Into<Filter>) -> Vec<TokenRef<'_>> {
        self.scope().until(halt)
    }

    fn get_until(&self, until: Until) -> Option<TokenRef<'_>> {
        self.scope().get_until(until)
    }

    fn get_last_until(&self, until: Until) -> Option<TokenRef<'_>> {
        self.scope().get_last_until(until)
    }

    fn all_until(&self, until: Until) -> Vec<TokenRef<'_>> {
        self.scope().all_until(until)
    }

    fn contains_pretty(&self, pattern: &str) -> Result<bool, FilterError> {
        self.scope().contains_pretty(pattern)
    }

    fn index(&self, index: isize) -> Option<TokenRef<'_>> {
        self.scope().index(index)
    }

    fn slice(&self, start: isize, stop: isize) -> Vec<TokenRef<'_>> {
        self.scope().slice(start, stop)
    }

    fn item(&self, key: &ItemKey) -> Result<Item<'_>, FilterError> {
        self.scope().item(key)
    }

    fn items(&self, keys: &[ItemKey]) -> Result<Vec<TokenRef<'_>>, FilterError> {
        self.scope().items(keys)
    }
}

impl Queryable for TokenChain {
    fn chain(&self) -> &TokenChain {
        self
    }

    fn range(&self) -> TokenRange {
        TokenRange::all()
    }
}

/// A token queries the tokens that follow it.
impl Queryable for TokenRef<'_> {
    fn chain(&self) -> &TokenChain {
        TokenRef::chain(self)
    }

    fn range(&self) -> TokenRange {
        TokenRange::after(self.id())
    }
}

impl<'a> TokenRef<'a> {
    /// Scope over the tokens after this one, tied to the chain's lifetime.
    pub fn following(&self) -> Scope<'a> {
        Scope::new(TokenRef::chain(self), TokenRange::after(self.id()))
    }
}

// ============================================================================
// Removal
// ============================================================================

impl TokenChain {
    /// Query with a custom traversal range.
    pub fn scoped(&self, range: TokenRange) -> Scope<'_> {
        Scope::new(self, range)
    }

    /// Remove every live token in `ids`, in order, returning what was removed.
    pub fn remove_selected<I>(&mut self, ids: I) -> Vec<Token>
    where
        I: IntoIterator<Item = TokenId>,
    {
        let removed: Vec<Token> = ids.into_iter().filter_map(|id| self.remove(id)).collect();
        debug!(count = removed.len(), remaining = self.len(), "removed tokens");
        removed
    }

    pub fn remove_first(&mut self, filter: impl Into<Filter>) -> Option<Token> {
        let id = self.get(filter)?.id();
        self.remove(id)
    }

    pub fn remove_last(&mut self, filter: impl Into<Filter>) -> Option<Token> {
        let id = self.get_last(filter)?.id();
        self.remove(id)
    }

    pub fn remove_all(&mut self, filter: impl Into<Filter>) -> Vec<Token> {
        let ids = id_list(&self.all(filter));
        self.remove_selected(ids)
    }

    pub fn remove_until(&mut self, halt: impl Into<Filter>) -> Vec<Token> {
        let ids = id_list(&self.until(halt));
        self.remove_selected(ids)
    }

    pub fn remove_first_until(&mut self, until: Until) -> Option<Token> {
        let id = self.get_until(until)?.id();
        self.remove(id)
    }

    pub fn remove_last_until(&mut self, until: Until) -> Option<Token> {
        let id = self.get_last_until(until)?.id();
        self.remove(id)
    }

    pub fn remove_all_until(&mut self, until: Until) -> Vec<Token> {
        let ids = id_list(&self.all_until(until));
        self.remove_selected(ids)
    }
}

pub(crate) fn id_list(tokens: &[TokenRef<'_>]) -> Vec<TokenId> {
    tokens.iter().map(TokenRef::id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::TokenFilter;

    fn value(v: &str) -> Filter {
        TokenFilter::new().exact_value(v).into()
    }

    fn pretty(tokens: &[TokenRef<'_>]) -> Vec<String> {
        tokens.iter().map(|t| t.pretty()).collect()
    }

    #[test]
    fn get_last_respects_caller_limit() {
        let chain = TokenChain::parse("[A:1][A:2][A:3]").unwrap();
        assert_eq!(chain.get_last(value("A")).unwrap().pretty(), "A:3");
        assert_eq!(chain.get_last(value("A").limit(2)).unwrap().pretty(), "A:2");
    }

    #[test]
    fn get_ignores_caller_limit() {
        let chain = TokenChain::parse("[A:1][A:2]").unwrap();
        assert_eq!(chain.get(value("A").limit(5)).unwrap().pretty(), "A:1");
    }

    #[test]
    fn until_conditions_see_halting_token() {
        let chain = TokenChain::parse("[X:1][H:1][X:2]").unwrap();
        let found = chain.all_until(Until::new(value("H"), TokenFilter::new().args_count(1)));
        assert_eq!(pretty(&found), ["X:1", "H:1"]);
    }

    #[test]
    fn token_queries_tokens_after_itself() {
        let chain = TokenChain::parse("[A][B][A]").unwrap();
        let first = chain.get(value("A")).unwrap();
        let next_a = first.get(value("A")).unwrap();
        assert_ne!(first, next_a);
        assert!(next_a.follows(&first));
        assert_eq!(first.following().list().len(), 2);
    }

    #[test]
    fn index_and_negative_index() {
        let chain = TokenChain::parse("[A][B][C]").unwrap();
        assert_eq!(chain.index(0).unwrap().value, "A");
        assert_eq!(chain.index(-1).unwrap().value, "C");
        assert!(chain.index(3).is_none());
        assert!(chain.index(-4).is_none());
    }

    #[test]
    fn slice_is_inclusive_and_directional() {
        let chain = TokenChain::parse("[A][B][C][D]").unwrap();
        assert_eq!(pretty(&chain.slice(1, 2)), ["B", "C"]);
        assert_eq!(pretty(&chain.slice(-1, 1)), ["D", "C", "B"]);
        assert_eq!(pretty(&chain.scope().slice_step(0, -1, 2)), ["A", "C"]);
        assert!(chain.slice(0, 9).is_empty());
    }

    #[test]
    fn scoped_range_limits_queries() {
        let chain = TokenChain::parse("[A][B][A][C]").unwrap();
        let ids: Vec<_> = chain.iter().map(|t| t.id()).collect();
        let scope = chain.scoped(TokenRange::starting_at(ids[1]).until(ids[2]));
        assert_eq!(scope.all(value("A")).len(), 1);
        assert!(scope.get(value("C")).is_none());
    }

    #[test]
    fn remove_first_and_last() {
        let mut chain = TokenChain::parse("[A:1][B][A:2][A:3]").unwrap();
        assert_eq!(chain.remove_first(value("A")).unwrap().pretty(), "A:1");
        assert_eq!(chain.remove_last(value("A")).unwrap().pretty(), "A:3");
        assert_eq!(chain.to_string(), "[B][A:2]");
        assert!(chain.remove_first(value("Z")).is_none());
    }

    #[test]
    fn remove_until_variants() {
        let mut chain = TokenChain::parse("[A][B][H][A][B]").unwrap();
        let removed = chain.remove_all_until(Until::new(value("H"), value("B")));
        assert_eq!(removed.len(), 1);
        assert_eq!(chain.to_string(), "[A][H][A][B]");

        let removed = chain.remove_until(value("H"));
        assert_eq!(removed.len(), 2);
        assert_eq!(chain.to_string(), "[A][B]");
    }
}
