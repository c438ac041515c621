mod support;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use config::Environment;
use image::ImageFormat;

use support::{build_app, get_request, multipart_request, sample_png, send, test_app};

#[tokio::test]
async fn converted_image_is_served_as_webp() {
    let app = test_app().await;

    let response = send(
        &app.router,
        multipart_request("/api/convert-to-webp", "image", "photo.png", &sample_png(6, 4)),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    let url = response.body["webpUrl"].as_str().unwrap().to_owned();
    assert!(url.starts_with("/uploads/converted_"));
    assert!(url.ends_with(".webp"));

    let file_name = url.trim_start_matches("/uploads/");
    assert!(app.upload_dir.join(file_name).exists());

    let served = send(&app.router, get_request(&url, None)).await;
    assert_eq!(served.status, StatusCode::OK);
    let decoded = image::load_from_memory_with_format(&served.bytes, ImageFormat::WebP).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (6, 4));
}

#[tokio::test]
async fn non_image_upload_is_a_processing_error() {
    let app = test_app().await;

    let response = send(
        &app.router,
        multipart_request("/api/convert-to-webp", "image", "notes.txt", b"plain text"),
    )
    .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["code"], "IMAGE_PROCESSING_ERROR");
    assert_eq!(response.body["message"], "Error processing image");
    // 开发环境附带内部错误详情
    assert!(response.body["error"].is_string());
}

#[tokio::test]
async fn production_masks_error_detail() {
    let app = build_app(Environment::Production).await;

    let response = send(
        &app.router,
        multipart_request("/api/convert-to-webp", "image", "notes.txt", b"plain text"),
    )
    .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["code"], "IMAGE_PROCESSING_ERROR");
    assert!(response.body.get("error").is_none());
}

#[tokio::test]
async fn missing_file_is_rejected() {
    let app = test_app().await;

    let wrong_field = send(
        &app.router,
        multipart_request("/api/convert-to-webp", "attachment", "photo.png", &sample_png(2, 2)),
    )
    .await;
    assert_eq!(wrong_field.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_field.body["message"], "No file uploaded");

    let not_multipart = send(
        &app.router,
        Request::builder()
            .method("POST")
            .uri("/api/convert-to-webp")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(not_multipart.status, StatusCode::BAD_REQUEST);
    assert_eq!(not_multipart.body["message"], "No file uploaded");
}

#[tokio::test]
async fn upload_endpoint_returns_attachment() {
    let app = test_app().await;

    let response = send(
        &app.router,
        multipart_request("/upload", "image", "photo.png", &sample_png(3, 3)),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers[header::CONTENT_TYPE], "image/webp");
    let disposition = response.headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename="));
    assert!(disposition.ends_with(".webp"));
    assert_eq!(&response.bytes[8..12], b"WEBP");

    let failed = send(
        &app.router,
        multipart_request("/upload", "image", "bad.bin", b"\x00\x01\x02"),
    )
    .await;
    assert_eq!(failed.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(failed.body["message"], "Error converting image to WebP");
}

#[tokio::test]
async fn webp_upload_is_stored_verbatim() {
    let app = test_app().await;
    let payload = b"RIFF\x00\x00\x00\x00WEBPVP8L".to_vec();

    let response = send(
        &app.router,
        multipart_request("/api/upload-webp", "webpFile", "client.webp", &payload),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    let url = response.body["webpUrl"].as_str().unwrap();
    assert!(url.starts_with("/uploads/uploaded_"));

    let stored = std::fs::read(app.upload_dir.join(url.trim_start_matches("/uploads/"))).unwrap();
    assert_eq!(stored, payload);
}
