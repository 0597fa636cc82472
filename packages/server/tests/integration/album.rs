use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn album_photo_lifecycle() {
    let app = TestApp::spawn().await;
    let token = app.init_and_login().await;

    let album = app
        .post(
            routes::ALBUMS,
            &json!({"name": "Kyoto", "description": "spring trip"}),
            Some(&token),
        )
        .await;
    assert_eq!(album.status, 201, "{}", album.text);
    let album_id = album.id();
    assert_eq!(album.body["photoCount"], 0);

    let a = app.upload_photo(&token, b"photo-a").await;
    let b = app.upload_photo(&token, b"photo-b").await;
    let c = app.upload_photo(&token, b"photo-c").await;

    let res = app
        .post(
            &routes::album_photos(album_id),
            &json!({"photoIds": [a, b, a]}),
            Some(&token),
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["photoCount"], 2);

    let res = app
        .put(&routes::album_cover(album_id), &json!({"photoId": b}), Some(&token))
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["coverImage"]["id"], b);

    let res = app
        .put(&routes::album_cover(album_id), &json!({"photoId": c}), Some(&token))
        .await;
    assert_eq!(res.status, 400, "a photo outside the album cannot be the cover");

    let photos = app
        .get(&format!("{}?page=1&size=10", routes::album_photos(album_id)), Some(&token))
        .await;
    assert_eq!(photos.status, 200, "{}", photos.text);
    assert_eq!(photos.body["total"], 2);
    assert_eq!(photos.body["photos"][0]["albumId"], album_id);
    assert_eq!(photos.body["photos"][0]["alt"], "photo.png");

    let res = app
        .put(
            &routes::album_photos(album_id),
            &json!({"photoIds": [c]}),
            Some(&token),
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["photoCount"], 1);

    let res = app
        .delete(&routes::album_photo(album_id, c), Some(&token))
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["photoCount"], 0);

    let res = app.delete(&routes::album(album_id), Some(&token)).await;
    assert_eq!(res.status, 204);

    let albums = app.get(routes::ALBUMS, Some(&token)).await;
    assert_eq!(albums.body["total"], 0);
}

#[tokio::test]
async fn album_with_photos_cannot_be_deleted() {
    let app = TestApp::spawn().await;
    let token = app.init_and_login().await;

    let album_id = app
        .post(routes::ALBUMS, &json!({"name": "Home"}), Some(&token))
        .await
        .id();
    let photo = app.upload_photo(&token, b"home").await;
    app.post(
        &routes::album_photos(album_id),
        &json!({"photoIds": [photo]}),
        Some(&token),
    )
    .await;

    let res = app.delete(&routes::album(album_id), Some(&token)).await;
    assert_eq!(res.status, 409);
    assert_eq!(res.body["code"], "CONFLICT");
}

#[tokio::test]
async fn appending_unknown_photos_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.init_and_login().await;

    let album_id = app
        .post(routes::ALBUMS, &json!({"name": "Empty"}), Some(&token))
        .await
        .id();
    let res = app
        .post(
            &routes::album_photos(album_id),
            &json!({"photoIds": [9999]}),
            Some(&token),
        )
        .await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn dashboard_counts_albums_and_photos() {
    let app = TestApp::spawn().await;
    let token = app.init_and_login().await;

    let album_id = app
        .post(routes::ALBUMS, &json!({"name": "Stats"}), Some(&token))
        .await
        .id();
    let photo = app.upload_photo(&token, b"stats").await;
    app.post(
        &routes::album_photos(album_id),
        &json!({"photoIds": [photo]}),
        Some(&token),
    )
    .await;

    let res = app.get(routes::DASHBOARD, Some(&token)).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["albumStats"]["total"], 1);
    assert_eq!(res.body["albumStats"]["totalPhotos"], 1);
}
