//! Validates contract fixtures and generated bodies against frozen JSON schemas.

use camshot_core::{DataUrl, PNG_MIME, UploadRequest, UploadResponse};
use jsonschema::JSONSchema;
use serde_json::Value;

fn load_json(path: &str) -> Value {
    let raw = std::fs::read_to_string(path).expect("json file should be readable");
    serde_json::from_str(&raw).expect("json file should be valid")
}

fn compile_validator(schema_path: &str) -> JSONSchema {
    let schema = load_json(schema_path);
    JSONSchema::compile(&schema).expect("schema should compile")
}

fn request_validator() -> JSONSchema {
    compile_validator(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/capture-request.schema.json"
    ))
}

fn response_validator() -> JSONSchema {
    compile_validator(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/capture-response.schema.json"
    ))
}

#[test]
fn capture_request_fixture_matches_schema() {
    let fixture = load_json(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/fixtures/capture-request.valid.json"
    ));
    assert!(
        request_validator().is_valid(&fixture),
        "capture request fixture should validate against schema"
    );
}

#[test]
fn capture_response_fixture_matches_schema() {
    let fixture = load_json(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/fixtures/capture-response.valid.json"
    ));
    assert!(
        response_validator().is_valid(&fixture),
        "capture response fixture should validate against schema"
    );
}

#[test]
fn response_without_filename_is_rejected_by_schema_and_codec() {
    let path = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/fixtures/capture-response.invalid.json"
    );
    let fixture = load_json(path);
    assert!(!response_validator().is_valid(&fixture));

    let raw = std::fs::read(path).expect("fixture should be readable");
    assert!(UploadResponse::from_json_bytes(&raw).is_err());
}

#[test]
fn generated_request_body_matches_schema() {
    let image = DataUrl::from_bytes(PNG_MIME, b"\x89PNG\r\n\x1a\nnot-a-real-image")
        .expect("data url should build");
    let body = UploadRequest::new(image)
        .to_json_bytes()
        .expect("request should serialize");
    let value: Value = serde_json::from_slice(&body).expect("body should be json");

    assert!(
        request_validator().is_valid(&value),
        "serialized request should validate against schema"
    );
}

#[test]
fn request_fixture_parses_into_core_request() {
    let raw = std::fs::read_to_string(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/fixtures/capture-request.valid.json"
    ))
    .expect("fixture should be readable");
    let request: UploadRequest = serde_json::from_str(&raw).expect("fixture should decode");

    assert_eq!(request.imagen.mime_type(), PNG_MIME);
    let png = request.imagen.decode_payload().expect("payload should decode");
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn response_fixture_parses_into_core_response() {
    let raw = std::fs::read(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/fixtures/capture-response.valid.json"
    ))
    .expect("fixture should be readable");
    let response = UploadResponse::from_json_bytes(&raw).expect("fixture should decode");
    assert_eq!(response.filename, "foto_20260412_093015.png");
}

#[test]
fn non_png_data_url_is_rejected_by_schema() {
    let value = serde_json::json!({ "imagen": "data:image/jpeg;base64,AAAA" });
    assert!(!request_validator().is_valid(&value));
}
