//! raws-query: format-preserving queries over raws token chains
//!
//! Raws are line-oriented configuration text made of `[VALUE:ARG:...]`
//! tokens with free text between them. This crate parses raws into a
//! [`TokenChain`] that serializes back byte for byte, and answers questions
//! about it with composable filters.
//!
//! # Architecture
//!
//! Every query compiles down to one primitive: [`query::run`], a single pass
//! over a token iterator with an ordered list of [`Filter`]s. Each filter
//! accumulates its own matches and may stop the whole scan when it reaches
//! its limit. The first/last/all/until operations on [`Queryable`], property
//! queries on [`TokenRef`], and removal on [`TokenChain`] are thin
//! projections of that scan.
//!
//! # Example
//!
//! ```
//! use raws_query::{Filter, ObjectHeaders, Queryable, TokenChain};
//!
//! let mut chain = TokenChain::parse(
//!     "[CREATURE:DOG]\n\t[NAME:dog:dogs:canine]\n[CREATURE:CAT]\n\t[NAME:cat:cats:feline]\n",
//! )?;
//!
//! let dog = chain.get(Filter::pretty("CREATURE:DOG")?).expect("dog exists");
//! let name = dog
//!     .get_prop(&ObjectHeaders::default(), Filter::pretty("NAME")?)
//!     .expect("dog has a name");
//! assert_eq!(name.pretty(), "NAME:dog:dogs:canine");
//!
//! chain.remove_all(Filter::pretty("NAME")?);
//! assert_eq!(chain.to_string(), "[CREATURE:DOG]\n[CREATURE:CAT]");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cache;
pub mod config;
pub mod file;
pub mod filter;
pub mod query;
pub mod sections;
pub mod token;

// Re-exports
pub use config::{load_from_path, load_from_str, ConfigError, QueryConfig};
pub use file::{find_file, BinFile, FileError, RawFile, WriteResult};
pub use filter::{BoolFilter, Filter, FilterError, FilterSpec, Operand, TokenFilter};
pub use query::{
    ItemKey, PropDictOptions, PropEntry, QueryError, Queryable, ScanSummary, Scope, Until,
};
pub use sections::{ObjectHeaders, SectionClassifier};
pub use token::{Token, TokenChain, TokenError, TokenId, TokenRange, TokenRef};
