//! Atomic token predicates.
//!
//! A [`TokenFilter`] is a conjunction of optional checks against a token's
//! value, its arguments and the raw text around it. A check that was never
//! configured is vacuously true, so `TokenFilter::new()` matches every token.

use crate::cache;
use crate::filter::errors::FilterError;
use crate::token::{parse_singular, Token, TokenId, TokenRef};
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;

/// A compiled, fully anchored regular expression that remembers the text it
/// was built from.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, FilterError> {
        let regex =
            cache::get_or_compile_anchored(source).map_err(|source_err| FilterError::InvalidRegex {
                pattern: source.to_string(),
                source: source_err,
            })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.source)
    }
}

/// Conjunction of optional token checks.
#[derive(Debug, Clone, Default)]
pub struct TokenFilter {
    exact_token: Option<TokenId>,
    exact_value: Option<String>,
    except_value: Option<String>,
    re_value: Option<Pattern>,
    value_in: Option<BTreeSet<String>>,
    value_not_in: Option<BTreeSet<String>>,
    args_count: Option<usize>,
    args_contains: Option<String>,
    exact_args: Option<Vec<Option<String>>>,
    re_args: Option<Vec<Option<Pattern>>>,
    exact_arg: Vec<(usize, String)>,
    re_arg: Vec<(usize, Pattern)>,
    arg_in: Vec<(usize, BTreeSet<String>)>,
    arg_not_in: Vec<(usize, BTreeSet<String>)>,
    exact_prefix: Option<String>,
    re_prefix: Option<Pattern>,
    exact_suffix: Option<String>,
    re_suffix: Option<Pattern>,
}

impl TokenFilter {
    /// A filter with no checks; it matches every token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `pattern` as a single token and match its value, plus its
    /// arguments when it has any.
    ///
    /// `"CREATURE"` matches every `CREATURE` token; `"CREATURE:DOG"` only the
    /// one whose sole argument is `DOG`.
    pub fn pretty(pattern: &str) -> Result<Self, FilterError> {
        let token = parse_singular(pattern).map_err(|err| {
            FilterError::malformed(format!("pretty pattern {pattern:?}: {err}"))
        })?;
        let filter = Self::new().exact_value(token.value);
        Ok(if token.args.is_empty() {
            filter
        } else {
            filter.exact_args(token.args.into_iter().map(Some))
        })
    }

    /// Match tokens with the same value and arguments as `token`.
    pub fn like(token: &Token) -> Self {
        Self::new()
            .exact_value(token.value.clone())
            .exact_args(token.args.iter().cloned().map(Some))
    }

    // ========================================================================
    // Builders
    // ========================================================================

    /// Only match this exact token instance.
    pub fn exact_token(mut self, id: TokenId) -> Self {
        self.exact_token = Some(id);
        self
    }

    pub fn exact_value(mut self, value: impl Into<String>) -> Self {
        self.exact_value = Some(value.into());
        self
    }

    pub fn except_value(mut self, value: impl Into<String>) -> Self {
        self.except_value = Some(value.into());
        self
    }

    pub fn re_value(mut self, pattern: &str) -> Result<Self, FilterError> {
        self.re_value = Some(Pattern::new(pattern)?);
        Ok(self)
    }

    pub fn value_in<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value_in = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn value_not_in<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value_not_in = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn args_count(mut self, count: usize) -> Self {
        self.args_count = Some(count);
        self
    }

    /// At least one argument must equal `arg`.
    pub fn args_contains(mut self, arg: impl Into<String>) -> Self {
        self.args_contains = Some(arg.into());
        self
    }

    /// Positional match over the whole argument list. `None` entries are
    /// wildcards; a length mismatch never matches.
    pub fn exact_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        self.exact_args = Some(args.into_iter().map(|a| a.map(Into::into)).collect());
        self
    }

    /// Regex flavor of [`exact_args`](Self::exact_args).
    pub fn re_args<I, P>(mut self, patterns: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = Option<P>>,
        P: AsRef<str>,
    {
        let compiled = patterns
            .into_iter()
            .map(|p| p.map(|p| Pattern::new(p.as_ref())).transpose())
            .collect::<Result<Vec<_>, _>>()?;
        self.re_args = Some(compiled);
        Ok(self)
    }

    /// The argument at `index` must equal `value`. May be given repeatedly.
    pub fn exact_arg(mut self, index: usize, value: impl Into<String>) -> Self {
        self.exact_arg.push((index, value.into()));
        self
    }

    pub fn re_arg(mut self, index: usize, pattern: &str) -> Result<Self, FilterError> {
        self.re_arg.push((index, Pattern::new(pattern)?));
        Ok(self)
    }

    pub fn arg_in<I, S>(mut self, index: usize, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arg_in
            .push((index, values.into_iter().map(Into::into).collect()));
        self
    }

    pub fn arg_not_in<I, S>(mut self, index: usize, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arg_not_in
            .push((index, values.into_iter().map(Into::into).collect()));
        self
    }

    /// The previous token's suffix followed by this token's prefix must
    /// equal `text`.
    pub fn exact_prefix(mut self, text: impl Into<String>) -> Self {
        self.exact_prefix = Some(text.into());
        self
    }

    pub fn re_prefix(mut self, pattern: &str) -> Result<Self, FilterError> {
        self.re_prefix = Some(Pattern::new(pattern)?);
        Ok(self)
    }

    /// This token's suffix followed by the next token's prefix must equal
    /// `text`.
    pub fn exact_suffix(mut self, text: impl Into<String>) -> Self {
        self.exact_suffix = Some(text.into());
        self
    }

    pub fn re_suffix(mut self, pattern: &str) -> Result<Self, FilterError> {
        self.re_suffix = Some(Pattern::new(pattern)?);
        Ok(self)
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    pub fn get_exact_value(&self) -> Option<&str> {
        self.exact_value.as_deref()
    }

    pub fn get_exact_args(&self) -> Option<&[Option<String>]> {
        self.exact_args.as_deref()
    }

    pub fn get_args_count(&self) -> Option<usize> {
        self.args_count
    }

    /// Returns `true` if no check is configured.
    pub fn is_empty(&self) -> bool {
        self.exact_token.is_none()
            && self.exact_value.is_none()
            && self.except_value.is_none()
            && self.re_value.is_none()
            && self.value_in.is_none()
            && self.value_not_in.is_none()
            && self.args_count.is_none()
            && self.args_contains.is_none()
            && self.exact_args.is_none()
            && self.re_args.is_none()
            && self.exact_arg.is_empty()
            && self.re_arg.is_empty()
            && self.arg_in.is_empty()
            && self.arg_not_in.is_empty()
            && self.exact_prefix.is_none()
            && self.re_prefix.is_none()
            && self.exact_suffix.is_none()
            && self.re_suffix.is_none()
    }

    // ========================================================================
    // Matching
    // ========================================================================

    /// Evaluate every configured check, without inversion.
    pub fn base_match(&self, token: &TokenRef<'_>) -> bool {
        self.match_value(token)
            && self.match_arg_list(token)
            && self.match_indexed_args(token)
            && self.match_surrounding_text(token)
    }

    fn match_value(&self, token: &TokenRef<'_>) -> bool {
        let value = token.value.as_str();
        if self.exact_token.is_some_and(|id| id != token.id()) {
            return false;
        }
        if self.except_value.as_deref() == Some(value) {
            return false;
        }
        if self.exact_value.as_deref().is_some_and(|v| v != value) {
            return false;
        }
        if self.args_count.is_some_and(|n| n != token.nargs()) {
            return false;
        }
        if self.value_in.as_ref().is_some_and(|set| !set.contains(value)) {
            return false;
        }
        if self.value_not_in.as_ref().is_some_and(|set| set.contains(value)) {
            return false;
        }
        if self.re_value.as_ref().is_some_and(|re| !re.is_match(value)) {
            return false;
        }
        if let Some(wanted) = &self.args_contains {
            if !token.args.iter().any(|arg| arg == wanted) {
                return false;
            }
        }
        true
    }

    fn match_arg_list(&self, token: &TokenRef<'_>) -> bool {
        let args = &token.args;
        if let Some(expected) = &self.exact_args {
            if expected.len() != args.len() {
                return false;
            }
            let all_match = expected
                .iter()
                .zip(args)
                .all(|(want, arg)| want.as_ref().map_or(true, |want| want == arg));
            if !all_match {
                return false;
            }
        }
        if let Some(patterns) = &self.re_args {
            if patterns.len() != args.len() {
                return false;
            }
            let all_match = patterns
                .iter()
                .zip(args)
                .all(|(re, arg)| re.as_ref().map_or(true, |re| re.is_match(arg)));
            if !all_match {
                return false;
            }
        }
        true
    }

    /// Indexed checks. An index past the end of the argument list is a
    /// non-match.
    fn match_indexed_args(&self, token: &TokenRef<'_>) -> bool {
        let exact = self
            .exact_arg
            .iter()
            .all(|(i, want)| token.arg(*i).is_some_and(|arg| arg == want));
        let regex = self
            .re_arg
            .iter()
            .all(|(i, re)| token.arg(*i).is_some_and(|arg| re.is_match(arg)));
        let member = self
            .arg_in
            .iter()
            .all(|(i, set)| token.arg(*i).is_some_and(|arg| set.contains(arg)));
        let not_member = self
            .arg_not_in
            .iter()
            .all(|(i, set)| token.arg(*i).is_some_and(|arg| !set.contains(arg)));
        exact && regex && member && not_member
    }

    fn match_surrounding_text(&self, token: &TokenRef<'_>) -> bool {
        if self.exact_prefix.is_some() || self.re_prefix.is_some() {
            let prefix = effective_prefix(token);
            if self.exact_prefix.as_ref().is_some_and(|p| *p != prefix) {
                return false;
            }
            if self.re_prefix.as_ref().is_some_and(|re| !re.is_match(&prefix)) {
                return false;
            }
        }
        if self.exact_suffix.is_some() || self.re_suffix.is_some() {
            let suffix = effective_suffix(token);
            if self.exact_suffix.as_ref().is_some_and(|s| *s != suffix) {
                return false;
            }
            if self.re_suffix.as_ref().is_some_and(|re| !re.is_match(&suffix)) {
                return false;
            }
        }
        true
    }
}

/// The previous token's suffix followed by the token's own prefix.
pub fn effective_prefix(token: &TokenRef<'_>) -> String {
    let mut text = token
        .prev()
        .and_then(|prev| prev.suffix.clone())
        .unwrap_or_default();
    text.push_str(token.prefix.as_deref().unwrap_or(""));
    text
}

/// The token's own suffix followed by the next token's prefix.
pub fn effective_suffix(token: &TokenRef<'_>) -> String {
    let mut text = token.suffix.clone().unwrap_or_default();
    if let Some(next_prefix) = token.next().and_then(|next| next.token().prefix.as_deref()) {
        text.push_str(next_prefix);
    }
    text
}

impl fmt::Display for TokenFilter {
    /// Sorted `key value` pairs of the configured checks.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn set(values: &BTreeSet<String>) -> String {
            format!("{{{}}}", values.iter().cloned().collect::<Vec<_>>().join(", "))
        }
        fn list<T: fmt::Display>(items: &[Option<T>]) -> String {
            let parts: Vec<String> = items
                .iter()
                .map(|i| i.as_ref().map_or_else(|| "*".to_string(), |i| i.to_string()))
                .collect();
            format!("[{}]", parts.join(", "))
        }

        let mut parts = Vec::new();
        if let Some(id) = self.exact_token {
            parts.push(format!("exact_token {id}"));
        }
        if let Some(v) = &self.exact_value {
            parts.push(format!("exact_value {v}"));
        }
        if let Some(v) = &self.except_value {
            parts.push(format!("except_value {v}"));
        }
        if let Some(re) = &self.re_value {
            parts.push(format!("re_value {re}"));
        }
        if let Some(s) = &self.value_in {
            parts.push(format!("value_in {}", set(s)));
        }
        if let Some(s) = &self.value_not_in {
            parts.push(format!("value_not_in {}", set(s)));
        }
        if let Some(n) = self.args_count {
            parts.push(format!("args_count {n}"));
        }
        if let Some(a) = &self.args_contains {
            parts.push(format!("args_contains {a}"));
        }
        if let Some(args) = &self.exact_args {
            parts.push(format!("exact_args {}", list(args)));
        }
        if let Some(args) = &self.re_args {
            parts.push(format!("re_args {}", list(args)));
        }
        for (i, v) in &self.exact_arg {
            parts.push(format!("exact_arg {i}={v}"));
        }
        for (i, re) in &self.re_arg {
            parts.push(format!("re_arg {i}={re}"));
        }
        for (i, s) in &self.arg_in {
            parts.push(format!("arg_in {i}={}", set(s)));
        }
        for (i, s) in &self.arg_not_in {
            parts.push(format!("arg_not_in {i}={}", set(s)));
        }
        if let Some(p) = &self.exact_prefix {
            parts.push(format!("exact_prefix {p:?}"));
        }
        if let Some(re) = &self.re_prefix {
            parts.push(format!("re_prefix {re}"));
        }
        if let Some(s) = &self.exact_suffix {
            parts.push(format!("exact_suffix {s:?}"));
        }
        if let Some(re) = &self.re_suffix {
            parts.push(format!("re_suffix {re}"));
        }

        if parts.is_empty() {
            return f.write_str("any token");
        }
        parts.sort();
        f.write_str(&parts.join(", "))
    }
}
