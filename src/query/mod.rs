//! Queries over token chains.
//!
//! [`engine::run`] is the single-pass scan every operation is built on;
//! [`Queryable`] and [`Scope`] provide the first/last/all/until family,
//! property queries live on [`TokenRef`](crate::token::TokenRef), and
//! removal lives on [`TokenChain`](crate::token::TokenChain).

pub mod engine;
pub mod errors;
pub mod facade;
pub mod item;
pub mod props;

pub use engine::{run, ScanSummary};
pub use errors::QueryError;
pub use facade::{Queryable, Scope, Until};
pub use item::{Item, ItemKey};
pub use props::{PropDictOptions, PropEntry};
