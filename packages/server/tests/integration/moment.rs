use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn anonymous_visitors_only_see_public_moments() {
    let app = TestApp::spawn().await;
    let token = app.init_and_login().await;
    let image = app.upload_photo(&token, b"moment-image").await;

    let public = app
        .post(
            routes::MOMENTS,
            &json!({"content": "picnic", "imageIds": [image], "isPublic": true}),
            Some(&token),
        )
        .await;
    assert_eq!(public.status, 201, "{}", public.text);
    assert_eq!(public.body["images"][0]["id"], image);
    assert_eq!(public.body["author"]["name"], "bob");

    let private = app
        .post(
            routes::MOMENTS,
            &json!({"content": "just us", "isPublic": false}),
            Some(&token),
        )
        .await;
    assert_eq!(private.status, 201, "{}", private.text);

    let anonymous = app.get(routes::MOMENTS, None).await;
    assert_eq!(anonymous.status, 200, "{}", anonymous.text);
    assert_eq!(anonymous.body["total"], 1);
    assert_eq!(anonymous.body["moments"][0]["content"], "picnic");

    let mine = app.get(routes::MOMENTS, Some(&token)).await;
    assert_eq!(mine.body["total"], 2);
    assert_eq!(mine.body["moments"][0]["content"], "just us");
}

#[tokio::test]
async fn likes_accumulate_without_a_token() {
    let app = TestApp::spawn().await;
    let token = app.init_and_login().await;

    let moment_id = app
        .post(
            routes::MOMENTS,
            &json!({"content": "sunset", "isPublic": true}),
            Some(&token),
        )
        .await
        .id();

    app.post(&routes::moment_like(moment_id), &json!({}), None).await;
    let res = app
        .post(&routes::moment_like(moment_id), &json!({}), None)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["likes"], 2);

    let res = app
        .post(&routes::moment_like(9999), &json!({}), None)
        .await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn visibility_toggle_and_delete() {
    let app = TestApp::spawn().await;
    let token = app.init_and_login().await;

    let moment_id = app
        .post(
            routes::MOMENTS,
            &json!({"content": "draft", "isPublic": false}),
            Some(&token),
        )
        .await
        .id();

    let res = app
        .put(
            &routes::moment_public(moment_id),
            &json!({"isPublic": true}),
            Some(&token),
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["isPublic"], true);

    let res = app
        .put(
            &routes::moment(moment_id),
            &json!({"content": "final"}),
            Some(&token),
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["content"], "final");

    let res = app.delete(&routes::moment(moment_id), Some(&token)).await;
    assert_eq!(res.status, 204);

    let anonymous = app.get(routes::MOMENTS, None).await;
    assert_eq!(anonymous.body["total"], 0);
}
