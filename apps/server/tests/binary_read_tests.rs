#![allow(unused)]
//! Integration tests for reading stored Binary resources.

#[allow(unused)]
mod support;

use axum::http::{Method, StatusCode};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use support::*;

async fn create_binary(app: &TestApp, bytes: &[u8], content_type: Option<&str>) -> anyhow::Result<String> {
    let (status, headers, _body) = app
        .request_raw(
            Method::POST,
            "/fhir/Binary",
            Some(bytes.to_vec()),
            content_type,
            &[],
        )
        .await?;
    assert_status(status, StatusCode::CREATED, "create Binary");

    let location = header_str(&headers, "location");
    let id = location
        .strip_prefix("/fhir/Binary/")
        .and_then(|rest| rest.strip_suffix("/_history/1"))
        .expect("Location should carry id and version");
    Ok(id.to_string())
}

#[tokio::test]
async fn read_returns_native_form_by_default() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let id = create_binary(app, &[0, 1, 2, 3, 4], Some("application/foo")).await?;

            let (status, headers, body) = app
                .request_raw(Method::GET, &format!("/fhir/Binary/{id}"), None, None, &[])
                .await?;

            assert_status(status, StatusCode::OK, "read Binary");
            assert_eq!(header_str(&headers, "content-type"), "application/foo");
            assert_eq!(body, vec![0, 1, 2, 3, 4]);

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn read_without_stored_content_type_falls_back_to_octet_stream() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let id = create_binary(app, &[9, 9, 9], None).await?;

            let (status, headers, body) = app
                .request_raw(Method::GET, &format!("/fhir/Binary/{id}"), None, None, &[])
                .await?;

            assert_status(status, StatusCode::OK, "read Binary");
            assert_eq!(
                header_str(&headers, "content-type"),
                "application/octet-stream"
            );
            assert_eq!(body, vec![9, 9, 9]);

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn fhir_accept_header_yields_resource_form() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let id = create_binary(app, &[0, 1, 2, 3, 4], Some("application/foo")).await?;

            let (status, headers, body) = app
                .request_raw(
                    Method::GET,
                    &format!("/fhir/Binary/{id}"),
                    None,
                    None,
                    &[("accept", "application/fhir+json")],
                )
                .await?;

            assert_status(status, StatusCode::OK, "read Binary as resource");
            assert!(header_str(&headers, "content-type").starts_with("application/json"));

            let resource = parse_json(&body)?;
            assert_eq!(resource["resourceType"], "Binary");
            assert_eq!(resource["contentType"], "application/foo");
            assert_eq!(resource["data"], STANDARD.encode([0, 1, 2, 3, 4]));
            assert_eq!(resource["meta"]["versionId"], "1");

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn read_of_missing_binary_is_not_found() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, _headers, body) = app
                .request_raw(Method::GET, "/fhir/Binary/nope", None, None, &[])
                .await?;

            assert_status(status, StatusCode::NOT_FOUND, "read missing Binary");
            let outcome = parse_json(&body)?;
            assert_eq!(outcome["resourceType"], "OperationOutcome");
            assert_eq!(outcome["issue"][0]["code"], "not-found");

            Ok(())
        })
    })
    .await
}
