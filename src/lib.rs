#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Validated picture storage for `picvault`.
//!
//! Uploads are classified from their leading bytes, header-decoded to prove
//! they are real images of a supported format, and persisted under a freshly
//! generated key through one of two engines: [`LocalStorage`] for a flat
//! directory on disk, or [`RemoteStorage`] for an object store bucket served
//! through a CDN.
//!
//! ```no_run
//! use picvault::{ImageStorage, LocalStorage, UploadedFile};
//!
//! # async fn example(bytes: Vec<u8>) -> Result<(), picvault::StorageError> {
//! let storage = LocalStorage::new("/var/lib/pictures");
//! let picture = storage.save(&UploadedFile::from_bytes("cat.png", bytes)).await?;
//! let content = storage.get(&picture.destination).await?;
//! assert_eq!(content.len() as u64, picture.size);
//! # Ok(())
//! # }
//! ```

macro_rules! log_debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        {
            tracing::debug!($($arg)*);
        }
    };
}

macro_rules! log_warn {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        {
            tracing::warn!($($arg)*);
        }
    };
}

pub(crate) use log_debug;
pub(crate) use log_warn;

/// Storage engine configuration.
pub mod config;
/// Header-only image decoders keyed by MIME type.
pub mod decode;
/// Error types exposed by this crate.
pub mod error;
/// Destination key generation.
pub mod naming;
/// Stored picture metadata record.
pub mod picture;
/// Magic-byte content type detection.
pub mod sniff;
/// Storage engine traits and implementations.
pub mod storage;
/// Uploaded file handles.
pub mod upload;

#[cfg(feature = "axum")]
pub mod axum;

pub use config::StorageConfig;
pub use decode::{Decoder, DecoderRegistry, Dimensions};
pub use error::{ConfigError, ErrorData, ErrorKind, StorageError};
pub use picture::{PictureRequest, ValidatedImage};
pub use sniff::{sniff, SNIFF_LEN};
pub use storage::{
    ImageStorage, LocalStorage, Locator, RemoteStorage, RemoteStorageBuilder,
};
pub use upload::{UploadReader, UploadedFile};
