use std::{
    io::{self, Cursor},
    path::{Path, PathBuf},
};

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncSeek};

/// Rewindable byte stream over an uploaded file.
pub trait UploadReader: AsyncRead + AsyncSeek + Unpin + Send {}

impl<T> UploadReader for T where T: AsyncRead + AsyncSeek + Unpin + Send + ?Sized {}

#[derive(Debug, Clone, PartialEq, Eq)]
enum UploadSource {
    Memory(Bytes),
    Spooled(PathBuf),
}

/// Uploaded file handle handed over by the HTTP layer.
///
/// The original filename and declared size are metadata only; content is
/// classified from the bytes returned by [`UploadedFile::open`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    file_name: String,
    size: u64,
    source: UploadSource,
}

impl UploadedFile {
    /// Creates an upload buffered in memory.
    pub fn from_bytes(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let content = content.into();
        Self {
            file_name: file_name.into(),
            size: content.len() as u64,
            source: UploadSource::Memory(content),
        }
    }

    /// Creates an upload spooled to a file on disk.
    pub async fn from_path(
        file_name: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> io::Result<Self> {
        let path = path.into();
        let size = tokio::fs::metadata(&path).await?.len();
        Ok(Self {
            file_name: file_name.into(),
            size,
            source: UploadSource::Spooled(path),
        })
    }

    /// Original filename supplied by the client.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Declared size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Path of the spooled file, when the upload lives on disk.
    pub fn spooled_path(&self) -> Option<&Path> {
        match &self.source {
            UploadSource::Spooled(path) => Some(path),
            UploadSource::Memory(_) => None,
        }
    }

    /// Opens a fresh reader positioned at the first byte.
    pub async fn open(&self) -> io::Result<Box<dyn UploadReader>> {
        match &self.source {
            UploadSource::Memory(content) => Ok(Box::new(Cursor::new(content.clone()))),
            UploadSource::Spooled(path) => Ok(Box::new(tokio::fs::File::open(path).await?)),
        }
    }
}
