//! Boolean composition of filters.

use crate::filter::base::Filter;
use crate::token::TokenRef;
use std::fmt;

/// How a [`BoolFilter`] combines its sub-filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    /// Every sub-filter matches.
    All,
    /// At least one sub-filter matches.
    Any,
    /// Exactly one sub-filter matches.
    One,
}

impl Operand {
    pub fn as_str(self) -> &'static str {
        match self {
            Operand::All => "all",
            Operand::Any => "any",
            Operand::One => "one",
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A predicate computed from an ordered list of sub-filters.
///
/// Sub-filters are only ever asked whether they match; their limits and
/// accumulated results play no part here.
#[derive(Debug, Clone)]
pub struct BoolFilter {
    operand: Operand,
    subs: Vec<Filter>,
}

impl BoolFilter {
    pub fn new<I>(operand: Operand, subs: I) -> Self
    where
        I: IntoIterator<Item = Filter>,
    {
        Self {
            operand,
            subs: subs.into_iter().collect(),
        }
    }

    pub fn operand(&self) -> Operand {
        self.operand
    }

    pub fn subs(&self) -> &[Filter] {
        &self.subs
    }

    /// Combine sub-filter matches, short-circuiting as soon as the outcome is
    /// known.
    pub fn base_match(&self, token: &TokenRef<'_>) -> bool {
        match self.operand {
            Operand::All => self.subs.iter().all(|sub| sub.matches(token)),
            Operand::Any => self.subs.iter().any(|sub| sub.matches(token)),
            Operand::One => {
                let mut count = 0;
                for sub in &self.subs {
                    if sub.matches(token) {
                        count += 1;
                        if count > 1 {
                            return false;
                        }
                    }
                }
                count == 1
            }
        }
    }
}

impl fmt::Display for BoolFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subs: Vec<String> = self.subs.iter().map(|s| format!("({s})")).collect();
        write!(f, "{} of [{}]", self.operand, subs.join(", "))
    }
}
