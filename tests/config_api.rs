#![allow(missing_docs)]

mod common;

use std::path::PathBuf;

use common::{cleanup, sample, temp_root};
use http::StatusCode;
use image::ImageFormat;
use picvault::{
    ConfigError, ErrorKind, ImageStorage, Locator, StorageConfig, StorageError, UploadedFile,
};

#[test]
fn validate_rejects_empty_settings() {
    let local = StorageConfig::Local {
        root: PathBuf::new(),
    };
    assert!(matches!(
        local.validate(),
        Err(ConfigError::EmptyField { field: "root" })
    ));

    let remote = StorageConfig::Remote {
        bucket: " ".to_owned(),
        prefix: String::new(),
        cdn_base_url: "https://cdn.example.com".to_owned(),
    };
    assert!(matches!(
        remote.validate(),
        Err(ConfigError::EmptyField { field: "bucket" })
    ));

    let remote = StorageConfig::Remote {
        bucket: "pictures".to_owned(),
        prefix: String::new(),
        cdn_base_url: "not a url".to_owned(),
    };
    assert!(matches!(
        remote.validate(),
        Err(ConfigError::InvalidCdnUrl { .. })
    ));

    let remote = StorageConfig::Remote {
        bucket: "pictures".to_owned(),
        prefix: "uploads".to_owned(),
        cdn_base_url: "https://cdn.example.com/".to_owned(),
    };
    remote.validate().expect("remote settings are complete");
}

#[tokio::test]
async fn open_local_builds_working_engine() {
    let root = temp_root();
    let storage = StorageConfig::Local { root: root.clone() }
        .open()
        .expect("local engine should open");

    assert_eq!(storage.full_path("k.png"), Locator::Path(root.join("k.png")));

    let content = sample(ImageFormat::Png);
    let picture = storage
        .save(&UploadedFile::from_bytes("cfg.png", content.clone()))
        .await
        .expect("save should succeed");
    assert_eq!(
        storage.get(&picture.destination).await.expect("get should succeed"),
        content
    );

    cleanup(root).await;
}

#[test]
fn deserializes_tagged_documents_with_legacy_keys() {
    let local: StorageConfig =
        serde_json::from_str(r#"{"backend":"local","imagePath":"/srv/pictures"}"#)
            .expect("local config should parse");
    assert_eq!(
        local,
        StorageConfig::Local {
            root: PathBuf::from("/srv/pictures")
        }
    );

    let remote: StorageConfig = serde_json::from_str(
        r#"{"backend":"remote","bucket":"pictures","cloudfront_url":"https://d1.cloudfront.net"}"#,
    )
    .expect("remote config should parse");
    assert_eq!(
        remote,
        StorageConfig::Remote {
            bucket: "pictures".to_owned(),
            prefix: String::new(),
            cdn_base_url: "https://d1.cloudfront.net".to_owned(),
        }
    );

    assert!(serde_json::from_str::<StorageConfig>(r#"{"backend":"ftp"}"#).is_err());
}

#[test]
fn error_taxonomy_maps_to_status_and_data() {
    let unsupported = StorageError::UnsupportedFormat {
        format: "application/pdf".to_owned(),
    };
    assert_eq!(unsupported.kind(), ErrorKind::UnsupportedFormat);
    assert_eq!(unsupported.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        serde_json::to_value(unsupported.data().expect("diagnostic data"))
            .expect("data should serialize"),
        serde_json::json!({ "format": "application/pdf" })
    );

    let missing = StorageError::NotFound {
        key: "gone.png".to_owned(),
    };
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert!(missing.is_client_error());
    assert!(missing.data().is_none());
    assert_eq!(missing.to_string(), "object `gone.png` not found");

    let upload = StorageError::UploadFailed {
        key: "a.png".to_owned(),
        source: std::io::Error::other("connection reset"),
    };
    assert_eq!(upload.kind(), ErrorKind::Io);
    assert_eq!(upload.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!upload.is_client_error());
}
