use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue};
use object_store::{
    aws::AmazonS3Builder, buffered::BufWriter, path::Path as ObjectPath, Attribute, Attributes,
    ClientOptions, ObjectStore,
};
use tokio::io::AsyncWriteExt;

use crate::{
    naming,
    storage::{open_upload, validate, ImageStorage, Locator},
    ConfigError, PictureRequest, StorageError, UploadedFile,
};

/// Object storage engine whose objects are served to clients through a CDN.
///
/// Objects live at `<bucket>/<prefix><key>` and are written without any
/// public grant; end clients reach them through [`ImageStorage::full_path`],
/// while [`ImageStorage::get`] exists for server-side re-fetch.
#[derive(Debug, Clone)]
pub struct RemoteStorage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    prefix: String,
    cdn_base_url: String,
}

impl RemoteStorage {
    /// Creates a fluent builder.
    pub fn builder() -> RemoteStorageBuilder {
        RemoteStorageBuilder::default()
    }

    /// Bucket holding the objects.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Normalized key prefix; empty or ending with `/`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// CDN base URL without a trailing `/`.
    pub fn cdn_base_url(&self) -> &str {
        &self.cdn_base_url
    }

    fn object_path(&self, key: &str) -> ObjectPath {
        ObjectPath::from(format!("{}{}", self.prefix, key))
    }
}

#[async_trait::async_trait]
impl ImageStorage for RemoteStorage {
    fn full_path(&self, key: &str) -> Locator {
        Locator::Url(format!("{}/{}{}", self.cdn_base_url, self.prefix, key))
    }

    async fn save(&self, upload: &UploadedFile) -> Result<PictureRequest, StorageError> {
        let destination = naming::destination_key(upload.file_name());
        let (image, mut src) = validate(open_upload(upload).await?).await?;

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, image.content_type.to_owned().into());
        let mut writer = BufWriter::new(Arc::clone(&self.store), self.object_path(&destination))
            .with_attributes(attributes);

        if let Err(source) = tokio::io::copy(&mut src, &mut writer).await {
            if let Err(_abort) = writer.abort().await {
                crate::log_warn!(
                    destination = %destination,
                    error = %_abort,
                    "failed to abort picture upload"
                );
            }
            return Err(StorageError::UploadFailed {
                key: destination,
                source,
            });
        }
        // `abort` panics once shutdown has begun; a failed multipart completion
        // aborts the upload itself.
        if let Err(source) = writer.shutdown().await {
            return Err(StorageError::UploadFailed {
                key: destination,
                source,
            });
        }

        crate::log_debug!(
            bucket = %self.bucket,
            destination = %destination,
            size = upload.size(),
            content_type = image.content_type,
            "uploaded picture to object storage"
        );
        Ok(PictureRequest::assemble(upload, destination, image))
    }

    async fn get(&self, key: &str) -> Result<Bytes, StorageError> {
        if !naming::is_flat_key(key) {
            return Err(StorageError::NotFound {
                key: key.to_owned(),
            });
        }

        let result = match self.store.get(&self.object_path(key)).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => {
                return Err(StorageError::NotFound {
                    key: key.to_owned(),
                })
            }
            Err(source) => {
                return Err(StorageError::DownloadFailed {
                    key: key.to_owned(),
                    source,
                })
            }
        };
        let content = result
            .bytes()
            .await
            .map_err(|source| StorageError::DownloadFailed {
                key: key.to_owned(),
                source,
            })?;

        crate::log_debug!(
            bucket = %self.bucket,
            key = key,
            size = content.len(),
            "downloaded picture from object storage"
        );
        Ok(content)
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        if !naming::is_flat_key(key) {
            return Ok(());
        }

        match self.store.delete(&self.object_path(key)).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(source) => Err(StorageError::DeleteFailed {
                key: key.to_owned(),
                source,
            }),
        }
    }
}

/// Builder for [`RemoteStorage`].
#[derive(Debug, Clone, Default)]
pub struct RemoteStorageBuilder {
    store: Option<Arc<dyn ObjectStore>>,
    bucket: Option<String>,
    prefix: String,
    cdn_base_url: Option<String>,
}

impl RemoteStorageBuilder {
    /// Creates a builder with no settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses an existing object store client instead of building an S3 client.
    pub fn store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the bucket name.
    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// Sets the key prefix prepended to every destination key.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the public CDN base URL.
    pub fn cdn_base_url(mut self, url: impl Into<String>) -> Self {
        self.cdn_base_url = Some(url.into());
        self
    }

    /// Validates settings and builds the storage.
    ///
    /// Without an explicit [`store`](Self::store), an S3 client is configured
    /// from the standard `AWS_*` environment variables.
    pub fn build(self) -> Result<RemoteStorage, ConfigError> {
        let bucket = required("bucket", self.bucket)?;
        let cdn_base_url = required("cdn_base_url", self.cdn_base_url)?;
        let cdn_base_url = normalize_cdn_base_url(&cdn_base_url)?;

        let store: Arc<dyn ObjectStore> = match self.store {
            Some(store) => store,
            None => Arc::new(
                AmazonS3Builder::from_env()
                    .with_bucket_name(&bucket)
                    .with_client_options(ClientOptions::new().with_default_headers(private_acl()))
                    .build()?,
            ),
        };

        Ok(RemoteStorage {
            store,
            bucket,
            prefix: normalize_prefix(&self.prefix),
            cdn_base_url,
        })
    }
}

/// Canned ACL sent with every S3 request so new objects are never public.
fn private_acl() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("x-amz-acl"),
        HeaderValue::from_static("private"),
    );
    headers
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::EmptyField { field }),
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}/")
    }
}

pub(crate) fn normalize_cdn_base_url(url: &str) -> Result<String, ConfigError> {
    let invalid = || ConfigError::InvalidCdnUrl {
        url: url.to_owned(),
    };
    let uri = url.parse::<http::Uri>().map_err(|_| invalid())?;
    if uri.scheme().is_none() || uri.authority().is_none() {
        return Err(invalid());
    }
    Ok(url.trim_end_matches('/').to_owned())
}
