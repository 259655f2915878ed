//! Storage engine abstraction and built-in implementations.

use std::{
    fmt,
    io::{self, SeekFrom},
    path::PathBuf,
};

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::SyncIoBridge;

use crate::{
    sniff::{sniff, SNIFF_LEN},
    DecoderRegistry, PictureRequest, StorageError, UploadReader, UploadedFile, ValidatedImage,
};

/// Local filesystem storage engine.
pub mod local;
/// Object storage engine served through a CDN.
pub mod remote;

pub use local::LocalStorage;
pub use remote::{RemoteStorage, RemoteStorageBuilder};

/// Client-resolvable location of a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Filesystem path on the local medium.
    Path(PathBuf),
    /// Public URL through the content-delivery front.
    Url(String),
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Async trait abstraction for picture storage backends.
///
/// One instance is built at startup and shared across requests; every call
/// is independent and safe to run concurrently.
#[async_trait::async_trait]
pub trait ImageStorage: Send + Sync + fmt::Debug {
    /// Maps a storage key to a client-resolvable locator without any I/O.
    fn full_path(&self, key: &str) -> Locator;

    /// Validates an upload and persists it under a freshly generated key.
    async fn save(&self, upload: &UploadedFile) -> Result<PictureRequest, StorageError>;

    /// Reads back the full content stored under `key`.
    async fn get(&self, key: &str) -> Result<Bytes, StorageError>;

    /// Removes the content stored under `key`. Absent keys are not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Sniffs and header-decodes `reader`, handing it back rewound to the first byte.
///
/// The decoder pulls from the stream itself on a blocking thread, so only the
/// header bytes it asks for are read, whatever the size of the upload.
pub(crate) async fn validate(
    mut reader: Box<dyn UploadReader>,
) -> Result<(ValidatedImage, Box<dyn UploadReader>), StorageError> {
    let mut prefix = Vec::with_capacity(SNIFF_LEN);
    (&mut reader)
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut prefix)
        .await
        .map_err(|err| StorageError::io("failed to read upload header", err))?;

    let detected = sniff(&prefix);
    let Some(&decoder) = DecoderRegistry::global().lookup(detected) else {
        let format = essence(detected);
        crate::log_warn!(format = %format, "rejected upload with unsupported format");
        return Err(StorageError::UnsupportedFormat { format });
    };

    rewind(&mut reader).await?;
    let bridge = SyncIoBridge::new(reader);
    let (decoded, mut reader) = tokio::task::spawn_blocking(move || {
        let mut buffered = io::BufReader::new(bridge);
        let decoded = decoder.dimensions(&mut buffered);
        (decoded, buffered.into_inner().into_inner())
    })
    .await
    .map_err(|err| StorageError::io("header decode task failed", io::Error::from(err)))?;

    let dimensions = decoded.map_err(|source| {
        crate::log_warn!(
            format = decoder.content_type(),
            error = %source,
            "rejected corrupt upload"
        );
        StorageError::CorruptContent {
            format: decoder.content_type().to_owned(),
            source,
        }
    })?;

    rewind(&mut reader).await?;
    let image = ValidatedImage {
        content_type: decoder.content_type(),
        dimensions,
    };
    Ok((image, reader))
}

/// Opens `upload`, mapping failures to a server-side I/O error.
pub(crate) async fn open_upload(
    upload: &UploadedFile,
) -> Result<Box<dyn UploadReader>, StorageError> {
    upload.open().await.map_err(|err| {
        StorageError::io(format!("failed to open upload `{}`", upload.file_name()), err)
    })
}

async fn rewind<R>(reader: &mut R) -> Result<(), StorageError>
where
    R: UploadReader + ?Sized,
{
    reader
        .seek(SeekFrom::Start(0))
        .await
        .map(|_| ())
        .map_err(|err| StorageError::io("failed to rewind upload", err))
}

fn essence(content_type: &str) -> String {
    content_type
        .parse::<mime::Mime>()
        .map(|mime| mime.essence_str().to_owned())
        .unwrap_or_else(|_| content_type.to_owned())
}
