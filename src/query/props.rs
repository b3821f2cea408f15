//! Property queries: tokens that belong to an object, bounded by the next
//! sibling object.

use crate::filter::{Filter, TokenFilter};
use crate::query::facade::{id_list, Until};
use crate::sections::{boundary_or_self, SectionClassifier};
use crate::token::{Token, TokenChain, TokenId, TokenRef};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

/// How [`TokenRef::prop_dict`] keys and groups its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropDictOptions {
    /// Keep single-token groups as lists.
    pub always_list: bool,
    /// Key by token value (`NAME`).
    pub value_keys: bool,
    /// Key by the full rendering (`NAME:dog:dogs:canine`).
    pub full_keys: bool,
}

impl Default for PropDictOptions {
    fn default() -> Self {
        Self {
            always_list: true,
            value_keys: true,
            full_keys: true,
        }
    }
}

/// One key's worth of properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropEntry<'a> {
    Single(TokenRef<'a>),
    List(Vec<TokenRef<'a>>),
}

impl<'a> PropEntry<'a> {
    pub fn tokens(&self) -> &[TokenRef<'a>] {
        match self {
            PropEntry::Single(token) => std::slice::from_ref(token),
            PropEntry::List(tokens) => tokens,
        }
    }

    fn push(&mut self, token: TokenRef<'a>) {
        if self.tokens().contains(&token) {
            return;
        }
        match self {
            PropEntry::Single(first) => {
                let first = *first;
                *self = PropEntry::List(vec![first, token]);
            }
            PropEntry::List(tokens) => tokens.push(token),
        }
    }
}

impl<'a> TokenRef<'a> {
    fn boundary<C>(&self, classifier: &C) -> BTreeSet<String>
    where
        C: SectionClassifier + ?Sized,
    {
        boundary_or_self(classifier, &self.value)
    }

    fn prop_until<C>(&self, classifier: &C, condition: Filter) -> Until
    where
        C: SectionClassifier + ?Sized,
    {
        Until::new(TokenFilter::new().value_in(self.boundary(classifier)), condition)
    }

    /// First property matching `condition`, scanning forward from this
    /// object token and stopping at the next sibling object.
    pub fn get_prop<C>(&self, classifier: &C, condition: impl Into<Filter>) -> Option<TokenRef<'a>>
    where
        C: SectionClassifier + ?Sized,
    {
        self.following()
            .get_until(self.prop_until(classifier, condition.into()))
    }

    pub fn get_last_prop<C>(
        &self,
        classifier: &C,
        condition: impl Into<Filter>,
    ) -> Option<TokenRef<'a>>
    where
        C: SectionClassifier + ?Sized,
    {
        self.following()
            .get_last_until(self.prop_until(classifier, condition.into()))
    }

    /// Every property matching `condition`. A sibling object token that
    /// itself matches `condition` is included.
    pub fn all_prop<C>(&self, classifier: &C, condition: impl Into<Filter>) -> Vec<TokenRef<'a>>
    where
        C: SectionClassifier + ?Sized,
    {
        self.following()
            .all_until(self.prop_until(classifier, condition.into()))
    }

    /// Properties grouped by value and/or full rendering.
    ///
    /// Unlike [`all_prop`](Self::all_prop), the sibling object token that
    /// ends the scan is never part of the result. Keys are sorted.
    pub fn prop_dict<C>(
        &self,
        classifier: &C,
        options: PropDictOptions,
        condition: impl Into<Filter>,
    ) -> BTreeMap<String, PropEntry<'a>>
    where
        C: SectionClassifier + ?Sized,
    {
        let boundary = self.boundary(classifier);
        let condition = condition.into();
        let limit = condition.get_limit();
        let terminates = condition.terminates_on_limit();
        let condition = Filter::all([
            condition,
            TokenFilter::new().value_not_in(boundary.iter().cloned()).into(),
        ])
        .with_limit(limit)
        .limit_terminates(terminates);

        let props = self
            .following()
            .all_until(Until::new(TokenFilter::new().value_in(boundary), condition));

        let mut dict: BTreeMap<String, PropEntry<'a>> = BTreeMap::new();
        for prop in props {
            let value_key = options.value_keys.then(|| prop.value.clone());
            let full_key = options.full_keys.then(|| prop.pretty());
            for key in value_key.into_iter().chain(full_key) {
                match dict.entry(key) {
                    Entry::Vacant(slot) => {
                        slot.insert(if options.always_list {
                            PropEntry::List(vec![prop])
                        } else {
                            PropEntry::Single(prop)
                        });
                    }
                    Entry::Occupied(mut slot) => slot.get_mut().push(prop),
                }
            }
        }
        dict
    }
}

impl TokenChain {
    pub fn remove_prop<C>(
        &mut self,
        anchor: TokenId,
        classifier: &C,
        condition: impl Into<Filter>,
    ) -> Option<Token>
    where
        C: SectionClassifier + ?Sized,
    {
        let id = self.at(anchor)?.get_prop(classifier, condition)?.id();
        self.remove(id)
    }

    pub fn remove_last_prop<C>(
        &mut self,
        anchor: TokenId,
        classifier: &C,
        condition: impl Into<Filter>,
    ) -> Option<Token>
    where
        C: SectionClassifier + ?Sized,
    {
        let id = self.at(anchor)?.get_last_prop(classifier, condition)?.id();
        self.remove(id)
    }

    pub fn remove_all_prop<C>(
        &mut self,
        anchor: TokenId,
        classifier: &C,
        condition: impl Into<Filter>,
    ) -> Vec<Token>
    where
        C: SectionClassifier + ?Sized,
    {
        let ids = match self.at(anchor) {
            Some(anchor) => id_list(&anchor.all_prop(classifier, condition)),
            None => return Vec::new(),
        };
        self.remove_selected(ids)
    }
}
