use serde_json::json;

use crate::common::{PASSWORD, TestApp, routes};

#[tokio::test]
async fn login_accepts_name_or_email() {
    let app = TestApp::spawn().await;
    app.init_and_login().await;

    let res = app
        .post(
            routes::LOGIN,
            &json!({"username": "bob@example.com", "password": PASSWORD}),
            None,
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["user"]["name"], "bob");
    assert_eq!(res.body["user"]["role"], "boy");
    assert!(res.body["expiresIn"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let app = TestApp::spawn().await;
    app.init_and_login().await;

    let res = app
        .post(
            routes::LOGIN,
            &json!({"username": "ann", "password": "not-the-password"}),
            None,
        )
        .await;
    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn protected_routes_need_a_token() {
    let app = TestApp::spawn().await;
    app.init_and_login().await;

    let res = app.get(routes::ME, None).await;
    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "TOKEN_MISSING");

    let res = app
        .post(routes::ALBUMS, &json!({"name": "Trips"}), None)
        .await;
    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "TOKEN_MISSING");

    let res = app.get(routes::ME, Some("garbage")).await;
    assert_eq!(res.status, 401);
    assert_eq!(res.body["code"], "TOKEN_INVALID");
}

#[tokio::test]
async fn me_and_users_list_both_partners() {
    let app = TestApp::spawn().await;
    let token = app.init_and_login().await;

    let me = app.get(routes::ME, Some(&token)).await;
    assert_eq!(me.status, 200);
    assert_eq!(me.body["name"], "bob");

    let users = app.get(routes::USERS, Some(&token)).await;
    assert_eq!(users.status, 200);
    let names: Vec<&str> = users
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"bob"));
    assert!(names.contains(&"ann"));
}

#[tokio::test]
async fn avatar_upload_shows_up_in_history() {
    let app = TestApp::spawn().await;
    let token = app.init_and_login().await;
    let me = app.get(routes::ME, Some(&token)).await;
    let user_id = me.id();
    let avatar = app.upload_photo(&token, b"avatar-bytes").await;

    let res = app
        .put(
            &routes::user(user_id),
            &json!({"name": "bob", "avatarId": avatar}),
            Some(&token),
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["avatar"]["id"], avatar);

    let history = app.get(&routes::user_avatars(user_id), Some(&token)).await;
    assert_eq!(history.status, 200, "{}", history.text);
    assert_eq!(history.body["total"], 1);
    assert_eq!(history.body["avatars"][0]["id"], avatar);
}
