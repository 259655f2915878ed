#![allow(dead_code)]

use std::{io::Cursor, path::PathBuf};

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use uuid::Uuid;

/// Supported formats with their canonical MIME type and file extension.
pub const FORMATS: &[(ImageFormat, &str, &str)] = &[
    (ImageFormat::Jpeg, "image/jpeg", "jpg"),
    (ImageFormat::Png, "image/png", "png"),
    (ImageFormat::Gif, "image/gif", "gif"),
    (ImageFormat::Tiff, "image/tiff", "tiff"),
    (ImageFormat::WebP, "image/webp", "webp"),
    (ImageFormat::Bmp, "image/bmp", "bmp"),
];

pub const WIDTH: u32 = 3;
pub const HEIGHT: u32 = 2;

pub fn encode(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 120, 40])));
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, format)
        .expect("fixture should encode");
    out.into_inner()
}

pub fn sample(format: ImageFormat) -> Vec<u8> {
    encode(format, WIDTH, HEIGHT)
}

pub fn truncated_png() -> Vec<u8> {
    let mut png = encode(ImageFormat::Png, 2, 2);
    png.truncate(20);
    png
}

pub fn temp_root() -> PathBuf {
    std::env::temp_dir().join(format!("picvault-test-{}", Uuid::new_v4()))
}

pub async fn cleanup(path: PathBuf) {
    let _ = tokio::fs::remove_dir_all(path).await;
}
