use crate::{Dimensions, UploadedFile};

/// Metadata record for a stored picture, handed to the metadata store.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PictureRequest {
    /// Original filename.
    pub name: String,
    /// Generated storage key, extension included.
    pub destination: String,
    /// Height in pixels.
    pub height: u32,
    /// Width in pixels.
    pub width: u32,
    /// Byte length of the upload.
    pub size: u64,
    /// Sniffed MIME type, always one of the supported formats.
    pub content_type: String,
}

/// Output of a successful validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedImage {
    /// Canonical MIME type of the decoder that accepted the content.
    pub content_type: &'static str,
    /// Dimensions read from the header.
    pub dimensions: Dimensions,
}

impl PictureRequest {
    /// Combines upload metadata, the destination key and validation output.
    pub fn assemble(
        upload: &UploadedFile,
        destination: impl Into<String>,
        image: ValidatedImage,
    ) -> Self {
        Self {
            name: upload.file_name().to_owned(),
            destination: destination.into(),
            height: image.dimensions.height,
            width: image.dimensions.width,
            size: upload.size(),
            content_type: image.content_type.to_owned(),
        }
    }
}
