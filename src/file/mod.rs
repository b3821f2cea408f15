//! Loading and saving files that carry raws.

pub mod bin;
pub mod errors;
pub mod find;
pub mod raw;

pub use bin::BinFile;
pub use errors::FileError;
pub use find::{find_file, rel, DEFAULT_DEPTH};
pub use raw::{RawFile, WriteResult};
