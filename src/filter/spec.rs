//! Declarative filter descriptions.
//!
//! A [`FilterSpec`] is the serializable form of a [`TokenFilter`] plus its
//! query settings. It is what `[queries.<name>]` tables in the config file
//! and the CLI criteria flags deserialize into.

use crate::filter::base::Filter;
use crate::filter::errors::FilterError;
use crate::filter::token_filter::TokenFilter;
use serde::{Deserialize, Serialize};

/// Argument-list entry that matches any argument.
pub const WILDCARD: &str = "*";

/// `index` must hold `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexedArg {
    pub index: usize,
    pub value: String,
}

/// `index` must (or must not) hold one of `values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexedArgSet {
    pub index: usize,
    pub values: Vec<String>,
}

/// Every criterion a [`TokenFilter`] understands, each optional.
///
/// In `exact_args` and `re_args`, an entry of `"*"` is a wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub except_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub re_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_in: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_not_in: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args_contains: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact_args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub re_args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exact_arg: Vec<IndexedArg>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub re_arg: Vec<IndexedArg>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arg_in: Vec<IndexedArgSet>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arg_not_in: Vec<IndexedArgSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub re_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact_suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub re_suffix: Option<String>,

    /// Negate the match result.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub invert: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Defaults to `true` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_terminates: Option<bool>,
}

impl FilterSpec {
    /// Spec for a pretty pattern such as `CREATURE:DOG`.
    pub fn pretty(pattern: impl Into<String>) -> Self {
        Self {
            pretty: Some(pattern.into()),
            ..Self::default()
        }
    }

    /// Returns `true` if no criterion is set. Settings are ignored.
    pub fn is_empty(&self) -> bool {
        let settings_only = FilterSpec {
            invert: self.invert,
            limit: self.limit,
            limit_terminates: self.limit_terminates,
            ..FilterSpec::default()
        };
        *self == settings_only
    }

    /// Reject combinations that can never mean what the author intended.
    pub fn check(&self) -> Result<(), FilterError> {
        if self.pretty.is_some() && (self.exact_value.is_some() || self.exact_args.is_some()) {
            return Err(FilterError::malformed(
                "pretty cannot be combined with exact_value or exact_args",
            ));
        }
        if let (Some(exact), Some(except)) = (&self.exact_value, &self.except_value) {
            if exact == except {
                return Err(FilterError::malformed(format!(
                    "exact_value and except_value are both {exact:?}"
                )));
            }
        }
        if let Some(count) = self.args_count {
            for (name, list) in [("exact_args", &self.exact_args), ("re_args", &self.re_args)] {
                if let Some(list) = list {
                    if list.len() != count {
                        return Err(FilterError::malformed(format!(
                            "args_count {count} contradicts {name} of length {}",
                            list.len()
                        )));
                    }
                }
            }
        }
        for (name, list) in [("value_in", &self.value_in), ("value_not_in", &self.value_not_in)] {
            if list.as_ref().is_some_and(Vec::is_empty) {
                return Err(FilterError::malformed(format!("{name} must not be empty")));
            }
        }
        for (name, sets) in [("arg_in", &self.arg_in), ("arg_not_in", &self.arg_not_in)] {
            if let Some(set) = sets.iter().find(|set| set.values.is_empty()) {
                return Err(FilterError::malformed(format!(
                    "{name} for argument {} must not be empty",
                    set.index
                )));
            }
        }
        Ok(())
    }

    /// Build the predicate alone.
    pub fn build(&self) -> Result<TokenFilter, FilterError> {
        self.check()?;

        let mut filter = match &self.pretty {
            Some(pattern) => TokenFilter::pretty(pattern)?,
            None => TokenFilter::new(),
        };

        if let Some(value) = &self.exact_value {
            filter = filter.exact_value(value.as_str());
        }
        if let Some(value) = &self.except_value {
            filter = filter.except_value(value.as_str());
        }
        if let Some(pattern) = &self.re_value {
            filter = filter.re_value(pattern)?;
        }
        if let Some(values) = &self.value_in {
            filter = filter.value_in(values.iter().map(String::as_str));
        }
        if let Some(values) = &self.value_not_in {
            filter = filter.value_not_in(values.iter().map(String::as_str));
        }
        if let Some(count) = self.args_count {
            filter = filter.args_count(count);
        }
        if let Some(arg) = &self.args_contains {
            filter = filter.args_contains(arg.as_str());
        }
        if let Some(args) = &self.exact_args {
            filter = filter.exact_args(args.iter().map(|a| wildcard(a)));
        }
        if let Some(patterns) = &self.re_args {
            filter = filter.re_args(patterns.iter().map(|p| wildcard(p)))?;
        }
        for arg in &self.exact_arg {
            filter = filter.exact_arg(arg.index, arg.value.as_str());
        }
        for arg in &self.re_arg {
            filter = filter.re_arg(arg.index, &arg.value)?;
        }
        for set in &self.arg_in {
            filter = filter.arg_in(set.index, set.values.iter().map(String::as_str));
        }
        for set in &self.arg_not_in {
            filter = filter.arg_not_in(set.index, set.values.iter().map(String::as_str));
        }
        if let Some(text) = &self.exact_prefix {
            filter = filter.exact_prefix(text.as_str());
        }
        if let Some(pattern) = &self.re_prefix {
            filter = filter.re_prefix(pattern)?;
        }
        if let Some(text) = &self.exact_suffix {
            filter = filter.exact_suffix(text.as_str());
        }
        if let Some(pattern) = &self.re_suffix {
            filter = filter.re_suffix(pattern)?;
        }

        Ok(filter)
    }

    /// Build the predicate with inversion and limit settings applied.
    pub fn build_filter(&self) -> Result<Filter, FilterError> {
        Ok(Filter::new(self.build()?)
            .with_inverted(self.invert)
            .with_limit(self.limit)
            .limit_terminates(self.limit_terminates.unwrap_or(true)))
    }
}

fn wildcard(entry: &str) -> Option<&str> {
    (entry != WILDCARD).then_some(entry)
}
