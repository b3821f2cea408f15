//! Property-based tests for filters and queries using proptest.

use proptest::prelude::*;
use raws_query::filter::{Filter, TokenFilter};
use raws_query::query::{Queryable, Until};
use raws_query::token::{TokenChain, TokenId};

// ============================================================================
// Test helpers
// ============================================================================

const VALUES: &[&str] = &["A", "B", "C", "HEAD"];
const ARGS: &[&str] = &["1", "2", "dog"];
const GAPS: &[&str] = &["", "\n", "\n\t", " junk "];

fn token_strategy() -> impl Strategy<Value = String> {
    (
        prop::sample::select(VALUES),
        prop::collection::vec(prop::sample::select(ARGS), 0..3),
        prop::sample::select(GAPS),
    )
        .prop_map(|(value, args, gap)| {
            let mut text = format!("{gap}[{value}");
            for arg in args {
                text.push(':');
                text.push_str(arg);
            }
            text.push(']');
            text
        })
}

fn raws_strategy() -> impl Strategy<Value = String> {
    (prop::collection::vec(token_strategy(), 0..24), "[a-z \n]{0,6}")
        .prop_map(|(tokens, tail)| tokens.concat() + &tail)
}

fn filter_strategy() -> impl Strategy<Value = Filter> {
    prop_oneof![
        prop::sample::select(VALUES).prop_map(|v| Filter::new(TokenFilter::new().exact_value(v))),
        (0usize..3).prop_map(|n| Filter::new(TokenFilter::new().args_count(n))),
        prop::sample::select(ARGS).prop_map(|a| Filter::new(TokenFilter::new().args_contains(a))),
        (0usize..3, prop::sample::select(ARGS))
            .prop_map(|(i, a)| Filter::new(TokenFilter::new().exact_arg(i, a))),
        Just(Filter::any_token()),
    ]
}

fn matching_ids(chain: &TokenChain, filter: &Filter) -> Vec<TokenId> {
    chain
        .iter()
        .filter(|t| filter.matches(t))
        .map(|t| t.id())
        .collect()
}

fn ids(tokens: &[raws_query::TokenRef<'_>]) -> Vec<TokenId> {
    tokens.iter().map(|t| t.id()).collect()
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Serializing a parsed chain reproduces the input.
    #[test]
    fn parse_preserves_text(text in raws_strategy()) {
        let chain = TokenChain::parse(&text).unwrap();
        prop_assert_eq!(chain.to_string(), text);
    }

    /// `all` is exactly the matching subsequence, in order.
    #[test]
    fn all_is_filtered_subsequence(text in raws_strategy(), filter in filter_strategy()) {
        let chain = TokenChain::parse(&text).unwrap();
        let expected = matching_ids(&chain, &filter);
        prop_assert_eq!(ids(&chain.all(filter)), expected);
    }

    /// `get` and `get_last` are the ends of `all`.
    #[test]
    fn get_and_get_last_bracket_all(text in raws_strategy(), filter in filter_strategy()) {
        let chain = TokenChain::parse(&text).unwrap();
        let all = ids(&chain.all(filter.clone()));
        prop_assert_eq!(chain.get(filter.clone()).map(|t| t.id()), all.first().copied());
        prop_assert_eq!(chain.get_last(filter).map(|t| t.id()), all.last().copied());
    }

    /// Inverting twice is the identity; inverting once is the complement.
    #[test]
    fn negation_laws(text in raws_strategy(), filter in filter_strategy()) {
        let chain = TokenChain::parse(&text).unwrap();
        let twice = filter.negate().negate();
        let once = filter.negate();
        for token in chain.iter() {
            prop_assert_eq!(twice.matches(&token), filter.matches(&token));
            prop_assert_eq!(once.matches(&token), !filter.matches(&token));
        }
    }

    /// Boolean operands agree with their truth tables.
    #[test]
    fn boolean_operand_laws(
        text in raws_strategy(),
        a in filter_strategy(),
        b in filter_strategy(),
    ) {
        let chain = TokenChain::parse(&text).unwrap();
        let all = Filter::all([a.clone(), b.clone()]);
        let any = Filter::any([a.clone(), b.clone()]);
        let one = Filter::one([a.clone(), b.clone()]);
        let none = Filter::none([a.clone(), b.clone()]);
        for token in chain.iter() {
            let (x, y) = (a.matches(&token), b.matches(&token));
            prop_assert_eq!(all.matches(&token), x && y);
            prop_assert_eq!(any.matches(&token), x || y);
            prop_assert_eq!(one.matches(&token), x != y);
            prop_assert_eq!(none.matches(&token), !(x || y));
        }
    }

    /// An indexed argument check past the end of the argument list never
    /// matches, inverted or not at the criterion level.
    #[test]
    fn out_of_range_indexed_checks_never_match(text in raws_strategy(), arg in "[a-z0-9]{1,4}") {
        let chain = TokenChain::parse(&text).unwrap();
        let exact = TokenFilter::new().exact_arg(5, arg.clone());
        let not_in = TokenFilter::new().arg_not_in(5, [arg]);
        for token in chain.iter() {
            prop_assert!(!exact.base_match(&token));
            prop_assert!(!not_in.base_match(&token));
        }
    }

    /// Wildcards in `exact_args` only constrain the argument count.
    #[test]
    fn wildcard_args_match_by_length(text in raws_strategy(), len in 0usize..3) {
        let chain = TokenChain::parse(&text).unwrap();
        let wild = TokenFilter::new().exact_args(vec![None::<String>; len]);
        for token in chain.iter() {
            prop_assert_eq!(wild.base_match(&token), token.nargs() == len);
        }
    }

    /// `until` is a prefix of the scope that ends at the first halting token.
    #[test]
    fn until_is_prefix(text in raws_strategy(), halt in filter_strategy()) {
        let chain = TokenChain::parse(&text).unwrap();
        let list = ids(&chain.list());
        let until = ids(&chain.until(halt.clone()));
        prop_assert_eq!(&list[..until.len()], &until[..]);

        match chain.get(halt) {
            Some(first) => {
                prop_assert_eq!(until.last().copied(), Some(first.id()));
            }
            None => {
                prop_assert_eq!(until.len(), list.len());
            }
        }
    }

    /// The `*_until` family never reaches past the halting token.
    #[test]
    fn all_until_stays_before_halt(
        text in raws_strategy(),
        halt in filter_strategy(),
        condition in filter_strategy(),
    ) {
        let chain = TokenChain::parse(&text).unwrap();
        let bounded = ids(&chain.until(halt.clone()));
        let found = ids(&chain.all_until(Until::new(halt, condition.clone())));
        let expected: Vec<TokenId> = bounded
            .into_iter()
            .filter(|id| condition.matches(&chain.at(*id).unwrap()))
            .collect();
        prop_assert_eq!(found, expected);
    }

    /// After `remove_all`, nothing matches and everything else survives.
    #[test]
    fn remove_all_is_complete(text in raws_strategy(), filter in filter_strategy()) {
        let mut chain = TokenChain::parse(&text).unwrap();
        let before = chain.len();
        let removed = chain.remove_all(filter.clone());
        prop_assert!(chain.all(filter).is_empty());
        prop_assert_eq!(chain.len() + removed.len(), before);
    }
}
