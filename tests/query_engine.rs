//! Integration tests for the single-pass query engine
//!
//! Covers multi-filter scans, limits, termination, and inversion bookkeeping

use raws_query::filter::{Filter, TokenFilter};
use raws_query::query::{run, Queryable};
use raws_query::token::{TokenChain, TokenRange};

fn chain(text: &str) -> TokenChain {
    TokenChain::parse(text).unwrap()
}

fn value(v: &str) -> Filter {
    TokenFilter::new().exact_value(v).into()
}

fn pretty_results(chain: &TokenChain, filter: &Filter) -> Vec<String> {
    filter
        .results()
        .iter()
        .map(|id| chain.token(*id).unwrap().pretty())
        .collect()
}

#[test]
fn test_filters_accumulate_independently() {
    let c = chain("[A:1][B:1][A:2][C][B:2]");
    let mut filters = [value("A"), value("B"), TokenFilter::new().args_count(0).into()];
    let summary = run(&mut filters, c.iter());

    assert_eq!(summary.scanned, 5);
    assert!(!summary.halted());
    assert_eq!(pretty_results(&c, &filters[0]), ["A:1", "A:2"]);
    assert_eq!(pretty_results(&c, &filters[1]), ["B:1", "B:2"]);
    assert_eq!(pretty_results(&c, &filters[2]), ["C"]);
}

#[test]
fn test_first_terminating_filter_is_reported() {
    let c = chain("[A][B][C]");
    let mut filters = [value("C").limit(1), value("B").limit(1), Filter::any_token()];
    let summary = run(&mut filters, c.iter());

    assert_eq!(summary.halted_by, Some(1));
    assert_eq!(summary.scanned, 2);
    assert_eq!(pretty_results(&c, &filters[2]), ["A", "B"]);
    assert!(filters[0].results().is_empty());
}

#[test]
fn test_same_token_reaches_every_filter_on_halt() {
    let c = chain("[A][H][Z]");
    let mut filters = [
        value("H").limit(1),
        value("H"),
        TokenFilter::new().re_value("[AH]").unwrap().into(),
    ];
    run(&mut filters, c.iter());

    assert_eq!(pretty_results(&c, &filters[1]), ["H"]);
    assert_eq!(pretty_results(&c, &filters[2]), ["A", "H"]);
}

#[test]
fn test_inverted_limited_filter_counts_only_accepted() {
    let c = chain("[A][B][A][C][D]");
    let mut filters = [value("A").negate().limit(2)];
    let summary = run(&mut filters, c.iter());

    assert_eq!(pretty_results(&c, &filters[0]), ["B", "C"]);
    assert_eq!(summary.scanned, 4);
    assert!(summary.halted());
}

#[test]
fn test_run_over_reverse_range() {
    let c = chain("[A:1][B][A:2]");
    let mut filters = [value("A").limit(1)];
    run(&mut filters, c.tokens(&TokenRange::all().reversed(true)));
    assert_eq!(pretty_results(&c, &filters[0]), ["A:2"]);
}

#[test]
fn test_query_through_facade_matches_engine() {
    let c = chain("[A][B][A]");
    let mut filters = [value("A")];
    let summary = c.query(&mut filters);
    assert_eq!(summary.scanned, 3);
    assert_eq!(filters[0].count(), 2);
}

#[test]
fn test_empty_chain_scans_nothing() {
    let c = chain("no tokens here\n");
    let mut filters = [Filter::any_token().limit(1)];
    let summary = run(&mut filters, c.iter());
    assert_eq!(summary.scanned, 0);
    assert!(summary.halted_by.is_none());
}

#[test]
fn test_prefix_and_suffix_criteria_in_scan() {
    let c = chain("[OBJECT:CREATURE]\n\n[CREATURE:DOG]\n\t[NAME:dog]\n\t[COLOR:1]  comment\n");
    let indented = TokenFilter::new().re_prefix(r"\n\t").unwrap();
    let commented = TokenFilter::new().re_suffix(r"\s*comment\s*").unwrap();
    let mut filters = [Filter::new(indented), Filter::new(commented)];
    run(&mut filters, c.iter());

    assert_eq!(pretty_results(&c, &filters[0]), ["NAME:dog", "COLOR:1"]);
    assert_eq!(pretty_results(&c, &filters[1]), ["COLOR:1"]);
}
