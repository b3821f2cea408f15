use crate::file::errors::FileError;
use crate::query::Queryable;
use crate::token::{TokenChain, TokenRange};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

/// Outcome of writing a file back to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "WriteResult should be checked for written/unchanged"]
pub enum WriteResult {
    Written { path: PathBuf, bytes: usize },
    /// Serialized content hashed the same as what was read; nothing written.
    Unchanged { path: PathBuf },
}

/// A raws text file: an optional name line followed by a token chain.
///
/// Dwarf Fortress raws start with a bare line naming the file
/// (`creature_standard`); it is kept apart from the chain so queries never
/// see it.
#[derive(Debug, Clone)]
pub struct RawFile {
    path: PathBuf,
    header: Option<String>,
    chain: TokenChain,
    read_hash: Option<u64>,
}

impl RawFile {
    pub fn new(path: impl Into<PathBuf>, header: Option<String>, chain: TokenChain) -> Self {
        Self {
            path: path.into(),
            header,
            chain,
            read_hash: None,
        }
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, FileError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_text(path, &text)
    }

    /// Parse raws text as if it had been read from `path`.
    pub fn from_text(path: impl Into<PathBuf>, text: &str) -> Result<Self, FileError> {
        let path = path.into();
        let (header, body) = split_header(text);
        let chain = TokenChain::parse(body).map_err(|source| FileError::Tokenize {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), tokens = chain.len(), "parsed raws file");
        Ok(Self {
            path,
            header: header.map(str::to_string),
            chain,
            read_hash: Some(xxh3_64(text.as_bytes())),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The name line, without its line terminator.
    pub fn header(&self) -> Option<&str> {
        self.header.as_deref().map(|h| h.trim_end_matches('\r'))
    }

    pub fn tokens(&self) -> &TokenChain {
        &self.chain
    }

    pub fn tokens_mut(&mut self) -> &mut TokenChain {
        &mut self.chain
    }

    /// Returns `true` if the serialized content differs from what was read.
    pub fn is_modified(&self) -> bool {
        self.read_hash != Some(xxh3_64(self.to_string().as_bytes()))
    }

    /// Write back to the path the file was read from.
    pub fn write(&self) -> Result<WriteResult, FileError> {
        let text = self.to_string();
        if self.read_hash == Some(xxh3_64(text.as_bytes())) && self.path.exists() {
            debug!(path = %self.path.display(), "unchanged, skipping write");
            return Ok(WriteResult::Unchanged {
                path: self.path.clone(),
            });
        }
        atomic_write(&self.path, text.as_bytes())?;
        Ok(WriteResult::Written {
            path: self.path.clone(),
            bytes: text.len(),
        })
    }

    /// Write to a different path. Always writes.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<WriteResult, FileError> {
        let path = path.as_ref();
        let text = self.to_string();
        atomic_write(path, text.as_bytes())?;
        Ok(WriteResult::Written {
            path: path.to_path_buf(),
            bytes: text.len(),
        })
    }
}

fn split_header(text: &str) -> (Option<&str>, &str) {
    match text.split_once('\n') {
        Some((first, rest)) if !first.contains('[') => (Some(first), rest),
        _ => (None, text),
    }
}

impl fmt::Display for RawFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(header) = &self.header {
            writeln!(f, "{header}")?;
        }
        write!(f, "{}", self.chain)
    }
}

impl Queryable for RawFile {
    fn chain(&self) -> &TokenChain {
        &self.chain
    }

    fn range(&self) -> TokenRange {
        TokenRange::all()
    }
}

/// Atomic file write: tempfile in the same directory, fsync, rename.
pub(crate) fn atomic_write(path: &Path, content: &[u8]) -> Result<(), FileError> {
    let parent = match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
        Some(parent) => parent,
        None => return Err(FileError::NoParent(path.to_path_buf())),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    debug!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(())
}
