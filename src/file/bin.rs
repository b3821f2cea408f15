use crate::file::errors::FileError;
use crate::file::raw::{atomic_write, RawFile, WriteResult};
use std::path::{Path, PathBuf};

/// An opaque file carried through unchanged (graphics, sound, anything that
/// is not raws text).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinFile {
    path: PathBuf,
    content: Vec<u8>,
}

impl BinFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, FileError> {
        let path = path.as_ref();
        let content = std::fs::read(path)?;
        Ok(Self::new(path, content))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn append(&mut self, bytes: &[u8]) {
        self.content.extend_from_slice(bytes);
    }

    /// Reinterpret the content as raws text.
    ///
    /// Fails with [`FileError::InvalidConversion`] when the content is not
    /// UTF-8 or does not tokenize.
    pub fn to_raw(&self) -> Result<RawFile, FileError> {
        let invalid = |reason: String| FileError::InvalidConversion {
            path: self.path.clone(),
            reason,
        };
        let text = std::str::from_utf8(&self.content)
            .map_err(|err| invalid(format!("content is not UTF-8 ({err})")))?;
        RawFile::from_text(self.path.clone(), text).map_err(|err| match err {
            FileError::Tokenize { source, .. } => invalid(source.to_string()),
            other => other,
        })
    }

    pub fn write(&self) -> Result<WriteResult, FileError> {
        self.write_to(&self.path)
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<WriteResult, FileError> {
        let path = path.as_ref();
        atomic_write(path, &self.content)?;
        Ok(WriteResult::Written {
            path: path.to_path_buf(),
            bytes: self.content.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Queryable;

    #[test]
    fn text_content_converts_to_raw() {
        let bin = BinFile::new("body_test.txt", b"body_test\n[OBJECT:BODY]".to_vec());
        let raw = bin.to_raw().unwrap();
        assert_eq!(raw.header(), Some("body_test"));
        assert!(raw.get(crate::filter::Filter::pretty("OBJECT:BODY").unwrap()).is_some());
    }

    #[test]
    fn binary_content_is_an_invalid_conversion() {
        let bin = BinFile::new("tile.png", vec![0x89, b'P', b'N', b'G', 0xff, 0xfe]);
        let err = bin.to_raw().unwrap_err();
        assert!(matches!(err, FileError::InvalidConversion { .. }));
    }

    #[test]
    fn untokenizable_text_is_an_invalid_conversion() {
        let bin = BinFile::new("broken.txt", b"[OBJECT:BODY".to_vec());
        let err = bin.to_raw().unwrap_err();
        assert!(err.to_string().contains("unterminated"), "{err}");
    }

    #[test]
    fn write_round_trips_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        let mut bin = BinFile::new(&path, vec![1, 2, 3]);
        bin.append(&[4]);
        let _ = bin.write().unwrap();
        assert_eq!(BinFile::read(&path).unwrap().content(), [1, 2, 3, 4]);
    }
}
