#![allow(missing_docs)]

mod common;

use std::{collections::HashSet, io::Cursor};

use common::{encode, sample, truncated_png, FORMATS, HEIGHT, WIDTH};
use image::ImageFormat;
use picvault::{
    naming::{destination_key, extension, unique_name},
    sniff, DecoderRegistry, Dimensions, SNIFF_LEN,
};

#[test]
fn sniff_identifies_encoded_images() {
    for &(format, content_type, _) in FORMATS {
        assert_eq!(sniff(&sample(format)), content_type, "{format:?}");
    }
}

#[test]
fn sniff_classifies_non_image_content() {
    assert_eq!(sniff(b""), "text/plain; charset=utf-8");
    assert_eq!(sniff(b"hello world\n"), "text/plain; charset=utf-8");
    assert_eq!(sniff(b"\x00\x01\x02\x03binary"), "application/octet-stream");
    assert_eq!(sniff(b"%PDF-1.7\n"), "application/pdf");
    assert_eq!(sniff(b"PK\x03\x04rest-of-zip"), "application/zip");
    assert_eq!(
        sniff(b"  \n<html><body>hi</body></html>"),
        "text/html; charset=utf-8"
    );
    assert_eq!(sniff(b"<?xml version=\"1.0\"?>"), "text/xml; charset=utf-8");
    assert_eq!(sniff(b"RIFF\x24\x00\x00\x00WAVEfmt "), "audio/wave");
}

#[test]
fn sniff_ignores_bytes_past_the_window() {
    let mut data = vec![b'a'; SNIFF_LEN];
    data.push(0x00);
    assert_eq!(sniff(&data), "text/plain; charset=utf-8");

    data[SNIFF_LEN - 1] = 0x00;
    assert_eq!(sniff(&data), "application/octet-stream");
}

#[test]
fn sniff_needs_the_full_png_signature() {
    assert_eq!(sniff(b"\x89PNG\r\n\x1A"), "application/octet-stream");
}

#[test]
fn registry_accepts_exactly_six_formats() {
    let registry = DecoderRegistry::global();
    let mut supported: Vec<_> = registry.content_types().collect();
    supported.sort_unstable();
    assert_eq!(
        supported,
        [
            "image/bmp",
            "image/gif",
            "image/jpeg",
            "image/png",
            "image/tiff",
            "image/webp",
        ]
    );

    for unsupported in ["image/x-icon", "image/svg+xml", "application/pdf", "text/plain", ""] {
        assert!(!registry.supports(unsupported), "{unsupported:?}");
    }
}

#[test]
fn registry_lookup_ignores_mime_parameters() {
    let registry = DecoderRegistry::global();
    let decoder = registry
        .lookup("image/png; charset=binary")
        .expect("png decoder");
    assert_eq!(decoder.content_type(), "image/png");
    assert_eq!(decoder.format(), ImageFormat::Png);
    assert!(registry.lookup("text/plain; charset=utf-8").is_none());
}

#[test]
fn decoders_report_header_dimensions() {
    let registry = DecoderRegistry::global();
    for &(format, content_type, _) in FORMATS {
        let decoder = registry.lookup(content_type).expect("decoder registered");
        let dims = decoder
            .dimensions(Cursor::new(sample(format)))
            .expect("header should decode");
        assert_eq!(
            dims,
            Dimensions {
                width: WIDTH,
                height: HEIGHT
            },
            "{format:?}"
        );
    }

    let wide = encode(ImageFormat::Png, 640, 1);
    let decoder = registry.lookup("image/png").expect("png decoder");
    let dims = decoder.dimensions(Cursor::new(wide)).expect("header should decode");
    assert_eq!((dims.width, dims.height), (640, 1));
}

#[test]
fn decoder_rejects_truncated_or_mismatched_input() {
    let registry = DecoderRegistry::global();
    let png = registry.lookup("image/png").expect("png decoder");
    assert!(png.dimensions(Cursor::new(truncated_png())).is_err());

    let gif = registry.lookup("image/gif").expect("gif decoder");
    assert!(gif.dimensions(Cursor::new(b"GIF89a".to_vec())).is_err());
}

#[test]
fn extension_follows_final_component() {
    assert_eq!(extension("cat.png"), ".png");
    assert_eq!(extension("archive.tar.gz"), ".gz");
    assert_eq!(extension("README"), "");
    assert_eq!(extension("trailing."), ".");
    assert_eq!(extension("dir.d/file"), "");
    assert_eq!(extension("C:\\photos.d\\cat"), "");
    assert_eq!(extension(".hidden"), ".hidden");
    assert_eq!(extension("evil.png/../x"), "");
    assert_eq!(extension("evil.p g"), "");
}

#[test]
fn destination_keys_are_unique_and_keep_extension() {
    let keys: HashSet<_> = (0..256).map(|_| destination_key("cat.jpeg")).collect();
    assert_eq!(keys.len(), 256);
    assert!(keys.iter().all(|key| key.ends_with(".jpeg")));

    let name = unique_name();
    assert_eq!(name.len(), 32);
    assert!(name.bytes().all(|byte| byte.is_ascii_hexdigit()));

    let bare = destination_key("noext");
    assert_eq!(bare.len(), 32);
    assert!(!bare.contains('.'));
}
