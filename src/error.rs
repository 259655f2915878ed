use std::io;

use http::StatusCode;
use thiserror::Error;

/// Error type returned by storage engines.
///
/// Every failure of [`ImageStorage`](crate::ImageStorage) carries a
/// client/server classification through [`StorageError::status`] and, where
/// one exists, the detected format through [`StorageError::data`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// The sniffed content type is not one of the supported image formats.
    #[error("unsupported image format `{format}`")]
    UnsupportedFormat {
        /// Detected MIME essence.
        format: String,
    },
    /// Content looked like a supported format but its header did not decode.
    #[error("content detected as `{format}` could not be decoded: {source}")]
    CorruptContent {
        /// Detected MIME essence.
        format: String,
        /// Underlying decoder failure.
        #[source]
        source: image::ImageError,
    },
    /// Local medium or upload stream failure.
    #[error("{context}: {source}")]
    Io {
        /// Operation that failed.
        context: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// No stored object resolves under the requested key.
    #[error("object `{key}` not found")]
    NotFound {
        /// Requested storage key.
        key: String,
    },
    /// Streaming the object to the remote medium failed.
    #[error("failed to upload `{key}`: {source}")]
    UploadFailed {
        /// Destination storage key.
        key: String,
        /// Underlying transport failure.
        #[source]
        source: io::Error,
    },
    /// Fetching the object from the remote medium failed for a reason other than absence.
    #[error("failed to download `{key}`: {source}")]
    DownloadFailed {
        /// Requested storage key.
        key: String,
        /// Underlying object store failure.
        #[source]
        source: object_store::Error,
    },
    /// Removing the object from the remote medium failed.
    #[error("failed to delete `{key}`: {source}")]
    DeleteFailed {
        /// Requested storage key.
        key: String,
        /// Underlying object store failure.
        #[source]
        source: object_store::Error,
    },
}

/// Coarse failure taxonomy shared by both engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Not an image of a supported format.
    UnsupportedFormat,
    /// Magic bytes matched a supported format but the header is invalid.
    CorruptContent,
    /// The storage medium failed.
    Io,
    /// The key does not resolve to a stored object.
    NotFound,
}

/// Diagnostic payload attached to validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorData {
    /// MIME essence detected from the content.
    pub format: String,
}

impl StorageError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Returns the failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Self::CorruptContent { .. } => ErrorKind::CorruptContent,
            Self::Io { .. }
            | Self::UploadFailed { .. }
            | Self::DownloadFailed { .. }
            | Self::DeleteFailed { .. } => ErrorKind::Io,
            Self::NotFound { .. } => ErrorKind::NotFound,
        }
    }

    /// Returns the HTTP status an API layer should answer with.
    ///
    /// Corrupt content reports as a server error even though bad input is the
    /// root cause; only a failed sniff is blamed on the client.
    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::UnsupportedFormat => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::CorruptContent | ErrorKind::Io => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` when the caller's input caused the failure.
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }

    /// Returns diagnostic data identifying the detected format, when known.
    pub fn data(&self) -> Option<ErrorData> {
        match self {
            Self::UnsupportedFormat { format } | Self::CorruptContent { format, .. } => {
                Some(ErrorData {
                    format: format.clone(),
                })
            }
            _ => None,
        }
    }
}

/// Storage engine construction errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting is empty.
    #[error("storage setting `{field}` must not be empty")]
    EmptyField {
        /// Offending setting name.
        field: &'static str,
    },
    /// The CDN base URL is not an absolute URL.
    #[error("invalid CDN base URL `{url}`: scheme and host are required")]
    InvalidCdnUrl {
        /// Rejected value.
        url: String,
    },
    /// The object store client could not be created.
    #[error("failed to initialize object store: {0}")]
    ObjectStore(#[from] object_store::Error),
}
