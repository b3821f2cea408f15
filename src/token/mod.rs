//! The token chain that every query runs over.
//!
//! A chain is built from raws text with [`TokenChain::parse`] and serialized
//! back with `Display`, preserving every byte of the original formatting.

pub mod chain;
pub mod errors;
pub mod parse;

pub use chain::{Token, TokenChain, TokenId, TokenRange, TokenRef, Tokens};
pub use errors::TokenError;
pub use parse::{parse_singular, parse_tokens};
