//! Arena-backed token chain.
//!
//! Tokens live in slots addressed by [`TokenId`]. Neighbor links are stored
//! as optional handles, so removing a token is an O(1) splice that leaves
//! every other handle valid. A removed slot stays dead for the lifetime of
//! the chain.

use std::fmt;
use std::ops::Deref;

/// Stable handle to a token slot inside a [`TokenChain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(usize);

impl TokenId {
    /// Raw slot index, useful for diagnostics.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single `[VALUE:ARG:...]` token together with the raw text around it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Token {
    pub value: String,
    pub args: Vec<String>,
    /// Raw text immediately before the opening bracket.
    pub prefix: Option<String>,
    /// Raw text immediately after the closing bracket.
    pub suffix: Option<String>,
}

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn with_args<I, S>(value: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            value: value.into(),
            args: args.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn prefixed(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn suffixed(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn nargs(&self) -> usize {
        self.args.len()
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// The token's content without brackets or surrounding text:
    /// `VALUE:ARG:ARG`.
    pub fn pretty(&self) -> String {
        let mut out = self.value.clone();
        for arg in &self.args {
            out.push(':');
            out.push_str(arg);
        }
        out
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.pretty())
    }
}

#[derive(Debug, Clone)]
struct Slot {
    token: Token,
    prev: Option<TokenId>,
    next: Option<TokenId>,
    alive: bool,
}

/// The ordered, mutable sequence of tokens a query traverses.
#[derive(Debug, Clone, Default)]
pub struct TokenChain {
    slots: Vec<Slot>,
    head: Option<TokenId>,
    tail: Option<TokenId>,
    len: usize,
    /// Text of a parsed document that contained no tokens at all.
    pub(crate) loose_text: String,
}

impl TokenChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tokens<I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = Token>,
    {
        let mut chain = Self::new();
        for token in tokens {
            chain.push_back(token);
        }
        chain
    }

    /// Append a token at the end of the chain.
    pub fn push_back(&mut self, token: Token) -> TokenId {
        let id = TokenId(self.slots.len());
        self.slots.push(Slot {
            token,
            prev: self.tail,
            next: None,
            alive: true,
        });
        match self.tail {
            Some(tail) => self.slots[tail.0].next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
        id
    }

    /// Insert a token directly after `anchor`. Returns `None` if the anchor
    /// is not a live token of this chain.
    pub fn insert_after(&mut self, anchor: TokenId, token: Token) -> Option<TokenId> {
        if !self.is_alive(anchor) {
            return None;
        }
        let id = TokenId(self.slots.len());
        let next = self.slots[anchor.0].next;
        self.slots.push(Slot {
            token,
            prev: Some(anchor),
            next,
            alive: true,
        });
        self.slots[anchor.0].next = Some(id);
        match next {
            Some(next) => self.slots[next.0].prev = Some(id),
            None => self.tail = Some(id),
        }
        self.len += 1;
        Some(id)
    }

    /// Splice a token out of the chain and hand back its contents.
    ///
    /// The handle is dead afterwards; removing it again returns `None`.
    pub fn remove(&mut self, id: TokenId) -> Option<Token> {
        if !self.is_alive(id) {
            return None;
        }
        let (prev, next) = {
            let slot = &self.slots[id.0];
            (slot.prev, slot.next)
        };
        match prev {
            Some(prev) => self.slots[prev.0].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.slots[next.0].prev = prev,
            None => self.tail = prev,
        }
        let slot = &mut self.slots[id.0];
        slot.alive = false;
        slot.prev = None;
        slot.next = None;
        self.len -= 1;
        Some(std::mem::take(&mut slot.token))
    }

    pub fn is_alive(&self, id: TokenId) -> bool {
        self.slots.get(id.0).is_some_and(|slot| slot.alive)
    }

    pub fn token(&self, id: TokenId) -> Option<&Token> {
        self.slots
            .get(id.0)
            .filter(|slot| slot.alive)
            .map(|slot| &slot.token)
    }

    pub fn token_mut(&mut self, id: TokenId) -> Option<&mut Token> {
        self.slots
            .get_mut(id.0)
            .filter(|slot| slot.alive)
            .map(|slot| &mut slot.token)
    }

    /// Borrow a live token together with its chain, for neighbor lookups.
    pub fn at(&self, id: TokenId) -> Option<TokenRef<'_>> {
        let token = self.token(id)?;
        Some(TokenRef {
            chain: self,
            id,
            token,
        })
    }

    pub fn head(&self) -> Option<TokenId> {
        self.head
    }

    pub fn tail(&self) -> Option<TokenId> {
        self.tail
    }

    pub fn prev(&self, id: TokenId) -> Option<TokenId> {
        self.slots.get(id.0).filter(|s| s.alive).and_then(|s| s.prev)
    }

    pub fn next(&self, id: TokenId) -> Option<TokenId> {
        self.slots.get(id.0).filter(|s| s.alive).and_then(|s| s.next)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if `a` comes after `b` in chain order.
    pub fn follows(&self, a: TokenId, b: TokenId) -> bool {
        if !self.is_alive(a) || !self.is_alive(b) || a == b {
            return false;
        }
        let mut cursor = self.next(b);
        while let Some(id) = cursor {
            if id == a {
                return true;
            }
            cursor = self.next(id);
        }
        false
    }

    /// Lazily walk the chain according to `range`.
    pub fn tokens(&self, range: &TokenRange) -> Tokens<'_> {
        let first = match range.start {
            Some(start) if !self.is_alive(start) => None,
            Some(start) if range.include_start => Some(start),
            Some(start) if range.reverse => self.prev(start),
            Some(start) => self.next(start),
            None if range.reverse => self.tail,
            None => self.head,
        };
        Tokens {
            chain: self,
            cursor: first,
            until: range.until,
            reverse: range.reverse,
            step: range.step.max(1),
        }
    }

    /// Forward iteration over every live token.
    pub fn iter(&self) -> Tokens<'_> {
        self.tokens(&TokenRange::all())
    }
}

impl fmt::Display for TokenChain {
    /// Serializes the chain back to raws text, byte for byte.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.head.is_none() {
            return f.write_str(&self.loose_text);
        }
        for token in self.iter() {
            if let Some(prefix) = &token.prefix {
                f.write_str(prefix)?;
            }
            write!(f, "{token}")?;
            if let Some(suffix) = &token.suffix {
                f.write_str(suffix)?;
            }
        }
        Ok(())
    }
}

/// A live token borrowed together with its chain.
///
/// Dereferences to [`Token`]; neighbor access goes through the chain.
#[derive(Debug, Clone, Copy)]
pub struct TokenRef<'a> {
    chain: &'a TokenChain,
    id: TokenId,
    token: &'a Token,
}

impl<'a> TokenRef<'a> {
    pub fn id(&self) -> TokenId {
        self.id
    }

    pub fn chain(&self) -> &'a TokenChain {
        self.chain
    }

    pub fn token(&self) -> &'a Token {
        self.token
    }

    pub fn prev(&self) -> Option<TokenRef<'a>> {
        self.chain.prev(self.id).and_then(|id| self.chain.at(id))
    }

    pub fn next(&self) -> Option<TokenRef<'a>> {
        self.chain.next(self.id).and_then(|id| self.chain.at(id))
    }

    /// Returns `true` if this token comes after `other` in the chain.
    pub fn follows(&self, other: &TokenRef<'_>) -> bool {
        self.chain.follows(self.id, other.id)
    }

    /// Walk the chain from this token according to `range`, with the range's
    /// start replaced by this token.
    pub fn tokens(&self, range: TokenRange) -> Tokens<'a> {
        self.chain.tokens(&TokenRange {
            start: Some(self.id),
            ..range
        })
    }
}

impl Deref for TokenRef<'_> {
    type Target = Token;

    fn deref(&self) -> &Token {
        self.token
    }
}

impl PartialEq for TokenRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.chain, other.chain) && self.id == other.id
    }
}

impl Eq for TokenRef<'_> {}

impl fmt::Display for TokenRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.token, f)
    }
}

/// Traversal options for [`TokenChain::tokens`].
///
/// The default range walks the whole chain forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenRange {
    /// Token to start from. `None` starts at the head (or tail when reversed).
    pub start: Option<TokenId>,
    /// Whether `start` itself is yielded.
    pub include_start: bool,
    /// Last token to visit, inclusive.
    pub until: Option<TokenId>,
    pub reverse: bool,
    /// Yield every `step`th visited token. Zero behaves like one.
    pub step: usize,
}

impl TokenRange {
    pub fn all() -> Self {
        Self::default()
    }

    /// Tokens strictly after `id`.
    pub fn after(id: TokenId) -> Self {
        Self {
            start: Some(id),
            ..Self::default()
        }
    }

    /// Tokens starting at `id`, inclusive.
    pub fn starting_at(id: TokenId) -> Self {
        Self {
            start: Some(id),
            include_start: true,
            ..Self::default()
        }
    }

    pub fn until(mut self, id: TokenId) -> Self {
        self.until = Some(id);
        self
    }

    pub fn reversed(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    pub fn step(mut self, step: usize) -> Self {
        self.step = step;
        self
    }
}

/// Iterator produced by [`TokenChain::tokens`].
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    chain: &'a TokenChain,
    cursor: Option<TokenId>,
    until: Option<TokenId>,
    reverse: bool,
    step: usize,
}

impl<'a> Tokens<'a> {
    fn advance(&mut self, from: TokenId) {
        if self.until == Some(from) {
            self.cursor = None;
            return;
        }
        self.cursor = if self.reverse {
            self.chain.prev(from)
        } else {
            self.chain.next(from)
        };
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = TokenRef<'a>;

    fn next(&mut self) -> Option<TokenRef<'a>> {
        let current = self.cursor?;
        let item = self.chain.at(current);
        self.advance(current);
        // Skip over the tokens between yielded ones, still honoring `until`.
        for _ in 1..self.step {
            match self.cursor {
                Some(id) => self.advance(id),
                None => break,
            }
        }
        item
    }
}
