use crate::common::{TestApp, routes};

#[tokio::test]
async fn uploaded_file_streams_back_through_its_url() {
    let app = TestApp::spawn().await;
    let token = app.init_and_login().await;

    let res = app
        .upload("notes.txt", "text/plain", b"hello keepsake".to_vec(), Some(&token))
        .await;
    assert_eq!(res.status, 201, "{}", res.text);
    let file_id = res.id();
    assert_eq!(res.body["name"], "notes.txt");
    assert_eq!(res.body["size"], 14);
    assert_eq!(res.body["mimeType"], "text/plain");

    let url = res.body["url"].as_str().unwrap();
    assert_eq!(url, app.url(&routes::file(file_id)));

    let download = app.client.get(url).send().await.unwrap();
    assert_eq!(download.status().as_u16(), 200);
    assert_eq!(download.headers()["content-type"], "text/plain");
    let disposition = download.headers()["content-disposition"].to_str().unwrap();
    assert!(disposition.contains("notes.txt"));
    assert_eq!(download.bytes().await.unwrap().as_ref(), b"hello keepsake");
}

#[tokio::test]
async fn identical_content_is_stored_once() {
    let app = TestApp::spawn().await;
    let token = app.init_and_login().await;

    let first = app.upload_photo(&token, b"same-bytes").await;
    let second = app.upload_photo(&token, b"same-bytes").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn upload_requires_a_token() {
    let app = TestApp::spawn().await;
    app.init_and_login().await;

    let res = app
        .upload("a.png", "image/png", b"bytes".to_vec(), None)
        .await;
    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "TOKEN_MISSING");
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.init_and_login().await;

    let res = app
        .upload("big.bin", "application/octet-stream", vec![7u8; 2048], Some(&token))
        .await;
    assert_eq!(res.status, 400, "{}", res.text);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn deleted_file_is_gone_and_unused_files_are_listed() {
    let app = TestApp::spawn().await;
    let token = app.init_and_login().await;

    let kept = app.upload_photo(&token, b"kept").await;
    let dropped = app.upload_photo(&token, b"dropped").await;

    let unused = app.get(routes::UNUSED_FILES, Some(&token)).await;
    assert_eq!(unused.status, 200, "{}", unused.text);
    assert_eq!(unused.body["total"], 2);

    let res = app.delete(&routes::file(dropped), Some(&token)).await;
    assert_eq!(res.status, 204);

    let res = app.get(&routes::file(dropped), None).await;
    assert_eq!(res.status, 404);

    let unused = app.get(routes::UNUSED_FILES, Some(&token)).await;
    assert_eq!(unused.body["total"], 1);
    assert_eq!(unused.body["files"][0]["id"], kept);
}
