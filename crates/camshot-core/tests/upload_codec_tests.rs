//! Tests `/capturar` request and response body handling.

use camshot_core::{CoreError, DataUrl, PNG_MIME, UploadRequest, UploadResponse};

#[test]
fn upload_codec_tests_request_has_single_imagen_field() {
    let image = DataUrl::from_bytes(PNG_MIME, &[0x89, b'P', b'N', b'G']).expect("data url");
    let body = UploadRequest::new(image.clone())
        .to_json_bytes()
        .expect("request should encode");

    let value: serde_json::Value = serde_json::from_slice(&body).expect("body is json");
    let object = value.as_object().expect("body is an object");
    assert_eq!(object.len(), 1);
    assert_eq!(object["imagen"], image.as_str());
}

#[test]
fn upload_codec_tests_response_accepts_server_message() {
    let parsed = UploadResponse::from_json_bytes(
        br#"{"message": "Imagen guardada", "filename": "ana_20240101_120000.png"}"#,
    )
    .expect("response should parse");
    assert_eq!(parsed.filename, "ana_20240101_120000.png");
    assert_eq!(parsed.message.as_deref(), Some("Imagen guardada"));
}

#[test]
fn upload_codec_tests_response_requires_filename() {
    let missing = UploadResponse::from_json_bytes(br#"{"message": "ok"}"#);
    assert!(matches!(missing, Err(CoreError::Codec(_))));

    let blank = UploadResponse::from_json_bytes(br#"{"filename": "  "}"#);
    assert!(matches!(blank, Err(CoreError::InvalidContract(_))));

    let html = UploadResponse::from_json_bytes(b"<html>Internal Server Error</html>");
    assert!(matches!(html, Err(CoreError::Codec(_))));
}

#[test]
fn upload_codec_tests_request_rejects_non_data_url_on_decode() {
    let decoded =
        serde_json::from_str::<UploadRequest>(r#"{"imagen": "https://example.test/a.png"}"#);
    assert!(decoded.is_err());
}
