use std::{
    io,
    path::{Path, PathBuf},
};

use bytes::Bytes;
use tokio::{
    fs::{File, OpenOptions},
    io::{AsyncRead, AsyncWriteExt},
};

use crate::{
    naming,
    storage::{open_upload, validate, ImageStorage, Locator},
    PictureRequest, StorageError, UploadedFile,
};

/// Flat-directory storage on the local filesystem.
///
/// Each stored object is one file named after its destination key. The root
/// directory is created on the first save that passes validation, so a
/// storage that only ever rejected uploads leaves no trace on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Creates a storage rooted at `root`. Performs no I/O.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the configured root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        if !naming::is_flat_key(key) {
            return Err(StorageError::NotFound {
                key: key.to_owned(),
            });
        }
        Ok(self.root.join(key))
    }
}

#[async_trait::async_trait]
impl ImageStorage for LocalStorage {
    fn full_path(&self, key: &str) -> Locator {
        Locator::Path(self.root.join(key))
    }

    async fn save(&self, upload: &UploadedFile) -> Result<PictureRequest, StorageError> {
        let destination = naming::destination_key(upload.file_name());
        let (image, mut src) = validate(open_upload(upload).await?).await?;

        tokio::fs::create_dir_all(&self.root).await.map_err(|err| {
            StorageError::io(
                format!("failed to create storage directory `{}`", self.root.display()),
                err,
            )
        })?;

        let path = self.root.join(&destination);
        let write_error = |err| StorageError::io(format!("failed to write `{destination}`"), err);
        PartialFile::create(path)
            .await
            .map_err(write_error)?
            .write_from(&mut src)
            .await
            .map_err(write_error)?;

        crate::log_debug!(
            destination = %destination,
            size = upload.size(),
            content_type = image.content_type,
            "stored picture on local disk"
        );
        Ok(PictureRequest::assemble(upload, destination, image))
    }

    async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        let path = self.resolve(key)?;
        let content = tokio::fs::read(&path)
            .await
            .map_err(|err| not_found_or(key, "failed to read", err))?;

        crate::log_debug!(key = key, size = content.len(), "read picture from local disk");
        Ok(Bytes::from(content))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = match self.resolve(key) {
            Ok(path) => path,
            Err(StorageError::NotFound { .. }) => return Ok(()),
            Err(err) => return Err(err),
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::io(format!("failed to delete `{key}`"), err)),
        }
    }
}

fn not_found_or(key: &str, action: &str, err: io::Error) -> StorageError {
    if err.kind() == io::ErrorKind::NotFound {
        StorageError::NotFound {
            key: key.to_owned(),
        }
    } else {
        StorageError::io(format!("{action} `{key}`"), err)
    }
}

/// Newly created file that is removed again unless fully written.
///
/// Write failures clean up through `tokio::fs`. `Drop` only covers a save
/// future cancelled mid-write.
#[derive(Debug)]
struct PartialFile {
    path: PathBuf,
    file: Option<File>,
    armed: bool,
}

impl PartialFile {
    async fn create(path: PathBuf) -> io::Result<Self> {
        // `create_new` turns an improbable key collision into an error rather than an overwrite.
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        Ok(Self {
            path,
            file: Some(file),
            armed: true,
        })
    }

    /// Copies `reader` to the file and syncs it, removing the file on failure.
    async fn write_from<R>(mut self, reader: &mut R) -> io::Result<u64>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let Some(mut file) = self.file.take() else {
            return Err(io::Error::other("file already closed"));
        };

        let result = fill(&mut file, reader).await;
        drop(file);
        match result {
            Ok(written) => {
                self.armed = false;
                Ok(written)
            }
            Err(err) => {
                if let Err(_cleanup) = tokio::fs::remove_file(&self.path).await {
                    crate::log_warn!(
                        path = %self.path.display(),
                        error = %_cleanup,
                        "failed to remove partially written picture"
                    );
                }
                self.armed = false;
                Err(err)
            }
        }
    }
}

async fn fill<R>(file: &mut File, reader: &mut R) -> io::Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let written = tokio::io::copy(reader, file).await?;
    file.flush().await?;
    file.sync_all().await?;
    Ok(written)
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        drop(self.file.take());
        // Reached only when a save is cancelled mid-write; `Drop` cannot await.
        if let Err(_err) = std::fs::remove_file(&self.path) {
            crate::log_warn!(
                path = %self.path.display(),
                error = %_err,
                "failed to remove partially written picture"
            );
        }
    }
}
