use std::{
    collections::HashMap,
    io::{BufRead, Seek},
    sync::OnceLock,
};

use image::{ImageFormat, ImageReader, ImageResult};

/// Pixel dimensions read from an image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Header-only decoder for one supported format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoder {
    content_type: &'static str,
    format: ImageFormat,
}

impl Decoder {
    /// Canonical MIME type handled by this decoder.
    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    /// Underlying `image` crate format.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Parses just enough of `reader` to return the image dimensions.
    ///
    /// Fails when the stream is truncated, corrupt, or only shares magic
    /// bytes with the format. Pixel data is never decoded.
    pub fn dimensions<R>(&self, reader: R) -> ImageResult<Dimensions>
    where
        R: BufRead + Seek,
    {
        let (width, height) = ImageReader::with_format(reader, self.format).into_dimensions()?;
        Ok(Dimensions { width, height })
    }
}

/// Immutable mapping from MIME type to header decoder.
#[derive(Debug, Clone)]
pub struct DecoderRegistry {
    decoders: HashMap<&'static str, Decoder>,
}

const SUPPORTED: &[(&str, ImageFormat)] = &[
    ("image/jpeg", ImageFormat::Jpeg),
    ("image/png", ImageFormat::Png),
    ("image/gif", ImageFormat::Gif),
    ("image/tiff", ImageFormat::Tiff),
    ("image/webp", ImageFormat::WebP),
    ("image/bmp", ImageFormat::Bmp),
];

impl DecoderRegistry {
    fn standard() -> Self {
        let decoders = SUPPORTED
            .iter()
            .map(|&(content_type, format)| {
                (
                    content_type,
                    Decoder {
                        content_type,
                        format,
                    },
                )
            })
            .collect();
        Self { decoders }
    }

    /// Returns the process-wide registry of the six supported formats.
    pub fn global() -> &'static Self {
        static REGISTRY: OnceLock<DecoderRegistry> = OnceLock::new();
        REGISTRY.get_or_init(Self::standard)
    }

    /// Finds the decoder for a content type, ignoring MIME parameters.
    pub fn lookup(&self, content_type: &str) -> Option<&Decoder> {
        let mime = content_type.parse::<mime::Mime>().ok()?;
        self.decoders.get(mime.essence_str())
    }

    /// Returns `true` when `content_type` is in the allow-list.
    pub fn supports(&self, content_type: &str) -> bool {
        self.lookup(content_type).is_some()
    }

    /// Iterates over the supported MIME types.
    pub fn content_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.decoders.keys().copied()
    }
}
