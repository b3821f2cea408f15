//! Token predicates and their query-time state.

pub mod base;
pub mod bool_filter;
pub mod errors;
pub mod spec;
pub mod token_filter;

pub use base::{Eval, Filter, Predicate};
pub use bool_filter::{BoolFilter, Operand};
pub use errors::FilterError;
pub use spec::{FilterSpec, IndexedArg, IndexedArgSet, WILDCARD};
pub use token_filter::{effective_prefix, effective_suffix, Pattern, TokenFilter};
