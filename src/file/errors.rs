use crate::token::TokenError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("cannot convert {path} to a raws file: {reason}")]
    InvalidConversion { path: PathBuf, reason: String },

    #[error("failed to tokenize {path}: {source}")]
    Tokenize {
        path: PathBuf,
        #[source]
        source: TokenError,
    },

    #[error("file has no parent directory: {0}")]
    NoParent(PathBuf),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}
