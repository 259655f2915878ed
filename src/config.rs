use std::path::PathBuf;

use crate::{
    storage::remote::normalize_cdn_base_url, ConfigError, ImageStorage, LocalStorage,
    RemoteStorage,
};

/// Storage engine selection, fixed at process start.
///
/// With the `serde` feature this deserializes from a document tagged by
/// `backend`:
///
/// ```toml
/// [storage]
/// backend = "remote"
/// bucket = "pictures"
/// prefix = "uploads"
/// cdn_base_url = "https://cdn.example.com"
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "backend", rename_all = "lowercase")
)]
pub enum StorageConfig {
    /// Flat directory on the local filesystem.
    Local {
        /// Root directory, created on first save.
        #[cfg_attr(feature = "serde", serde(alias = "imagePath", alias = "image_path"))]
        root: PathBuf,
    },
    /// Object storage bucket fronted by a CDN.
    Remote {
        /// Bucket name.
        bucket: String,
        /// Key prefix inside the bucket.
        #[cfg_attr(feature = "serde", serde(default))]
        prefix: String,
        /// Public base URL of the CDN.
        #[cfg_attr(feature = "serde", serde(alias = "cloudfront_url"))]
        cdn_base_url: String,
    },
}

impl StorageConfig {
    /// Checks settings without touching any medium.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Local { root } if root.as_os_str().is_empty() => {
                Err(ConfigError::EmptyField { field: "root" })
            }
            Self::Local { .. } => Ok(()),
            Self::Remote {
                bucket,
                cdn_base_url,
                ..
            } => {
                if bucket.trim().is_empty() {
                    return Err(ConfigError::EmptyField { field: "bucket" });
                }
                if cdn_base_url.trim().is_empty() {
                    return Err(ConfigError::EmptyField {
                        field: "cdn_base_url",
                    });
                }
                normalize_cdn_base_url(cdn_base_url).map(|_| ())
            }
        }
    }

    /// Builds the configured storage engine.
    ///
    /// The remote engine talks to S3 with credentials and region taken from
    /// the `AWS_*` environment variables.
    pub fn open(&self) -> Result<Box<dyn ImageStorage>, ConfigError> {
        self.validate()?;
        match self {
            Self::Local { root } => Ok(Box::new(LocalStorage::new(root.clone()))),
            Self::Remote {
                bucket,
                prefix,
                cdn_base_url,
            } => {
                let storage = RemoteStorage::builder()
                    .bucket(bucket.clone())
                    .prefix(prefix.clone())
                    .cdn_base_url(cdn_base_url.clone())
                    .build()?;
                Ok(Box::new(storage))
            }
        }
    }
}
