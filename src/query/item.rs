//! Unified item access: one key type for "everything", a pretty pattern, an
//! index or an inclusive slice.

use crate::query::errors::QueryError;
use crate::token::{parse_singular, TokenRef};
use std::fmt;
use std::str::FromStr;

/// What to pick out of a queryable.
///
/// Textual form, as accepted by [`FromStr`]:
///
/// | text          | key                                  |
/// |---------------|--------------------------------------|
/// | `...`         | [`ItemKey::All`]                     |
/// | `-1`          | [`ItemKey::Index`]                   |
/// | `2..5`        | [`ItemKey::Slice`], step 1           |
/// | `0..-1/2`     | [`ItemKey::Slice`], step 2           |
/// | `CREATURE:DOG`| [`ItemKey::Pretty`]                  |
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKey {
    All,
    Pretty(String),
    Index(isize),
    /// Inclusive of both endpoints.
    Slice {
        start: isize,
        stop: isize,
        step: usize,
    },
}

impl ItemKey {
    pub fn slice(start: isize, stop: isize) -> Self {
        ItemKey::Slice {
            start,
            stop,
            step: 1,
        }
    }
}

impl FromStr for ItemKey {
    type Err = QueryError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        if text == "..." {
            return Ok(ItemKey::All);
        }
        if let Ok(index) = text.parse::<isize>() {
            return Ok(ItemKey::Index(index));
        }
        if !text.contains(':') {
            if let Some((start, rest)) = text.split_once("..") {
                if is_slice_bound(start) || is_slice_bound(rest) {
                    return parse_slice(text, start, rest);
                }
            }
        }
        parse_singular(text).map_err(|err| {
            QueryError::invalid_conversion(format!("{text:?} is not an item key: {err}"))
        })?;
        Ok(ItemKey::Pretty(text.to_string()))
    }
}

fn is_slice_bound(text: &str) -> bool {
    let bound = text.split_once('/').map_or(text, |(stop, _)| stop);
    bound.trim().parse::<isize>().is_ok()
}

fn parse_slice(text: &str, start: &str, rest: &str) -> Result<ItemKey, QueryError> {
    let invalid = || QueryError::invalid_conversion(format!("{text:?} is not a valid slice"));
    let (stop, step) = match rest.split_once('/') {
        Some((stop, step)) => (stop, step.trim().parse::<usize>().map_err(|_| invalid())?),
        None => (rest, 1),
    };
    if step == 0 {
        return Err(invalid());
    }
    Ok(ItemKey::Slice {
        start: start.trim().parse().map_err(|_| invalid())?,
        stop: stop.trim().parse().map_err(|_| invalid())?,
        step,
    })
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKey::All => f.write_str("..."),
            ItemKey::Pretty(pattern) => f.write_str(pattern),
            ItemKey::Index(index) => write!(f, "{index}"),
            ItemKey::Slice { start, stop, step: 1 } => write!(f, "{start}..{stop}"),
            ItemKey::Slice { start, stop, step } => write!(f, "{start}..{stop}/{step}"),
        }
    }
}

/// Result of an item lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item<'a> {
    One(Option<TokenRef<'a>>),
    Many(Vec<TokenRef<'a>>),
}

impl<'a> Item<'a> {
    pub fn into_vec(self) -> Vec<TokenRef<'a>> {
        self.into_iter().collect()
    }
}

impl<'a> IntoIterator for Item<'a> {
    type Item = TokenRef<'a>;
    type IntoIter = std::vec::IntoIter<TokenRef<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        match self {
            Item::One(token) => token.into_iter().collect::<Vec<_>>().into_iter(),
            Item::Many(tokens) => tokens.into_iter(),
        }
    }
}
