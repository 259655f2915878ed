//! Axum integration helpers.

use axum::{
    extract::multipart::{Field, MultipartError},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::{ErrorData, StorageError, UploadedFile};

/// JSON body rendered for storage failures.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ErrorBody {
    /// Human readable failure description.
    pub error: String,
    /// Diagnostic payload, e.g. the detected format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ErrorData>,
}

impl From<&StorageError> for ErrorBody {
    fn from(err: &StorageError) -> Self {
        Self {
            error: err.to_string(),
            data: err.data(),
        }
    }
}

impl IntoResponse for StorageError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody::from(&self))).into_response()
    }
}

/// Failure turning a multipart field into an [`UploadedFile`].
#[derive(Debug, Error)]
pub enum UploadFieldError {
    /// The field is a plain text field, not a file.
    #[error("multipart field `{field}` has no filename")]
    MissingFileName {
        /// Field name.
        field: String,
    },
    /// The field body could not be read.
    #[error("failed to read multipart field: {0}")]
    Read(#[from] MultipartError),
}

impl IntoResponse for UploadFieldError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
            data: None,
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

impl UploadedFile {
    /// Buffers an Axum multipart file field in memory.
    pub async fn from_field(field: Field<'_>) -> Result<Self, UploadFieldError> {
        let Some(file_name) = field.file_name().map(ToOwned::to_owned) else {
            return Err(UploadFieldError::MissingFileName {
                field: field.name().unwrap_or_default().to_owned(),
            });
        };
        let content = field.bytes().await?;
        Ok(Self::from_bytes(file_name, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_renders_bad_request_with_format() {
        let err = StorageError::UnsupportedFormat {
            format: "text/plain".to_owned(),
        };
        let body = ErrorBody::from(&err);
        assert_eq!(
            body.data,
            Some(ErrorData {
                format: "text/plain".to_owned()
            })
        );
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_object_renders_not_found() {
        let err = StorageError::NotFound {
            key: "abc.png".to_owned(),
        };
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
