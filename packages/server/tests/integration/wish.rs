use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn visitor_wishes_wait_for_approval() {
    let app = TestApp::spawn().await;
    let token = app.init_and_login().await;

    let wish = app
        .post(
            routes::WISHES,
            &json!({"content": "Congratulations!", "authorName": "Aunt May"}),
            None,
        )
        .await;
    assert_eq!(wish.status, 201, "{}", wish.text);
    assert_eq!(wish.body["approved"], false);
    let wish_id = wish.id();

    let anonymous = app.get(routes::WISHES, None).await;
    assert_eq!(anonymous.body["total"], 0);

    let signed_in = app.get(routes::WISHES, Some(&token)).await;
    assert_eq!(signed_in.body["total"], 1);

    let res = app
        .put(&routes::wish_approve(wish_id), &json!({}), Some(&token))
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["approved"], true);

    let anonymous = app.get(routes::WISHES, None).await;
    assert_eq!(anonymous.body["total"], 1);
    assert_eq!(anonymous.body["wishes"][0]["authorName"], "Aunt May");
}

#[tokio::test]
async fn approval_filter_is_honoured_only_with_a_token() {
    let app = TestApp::spawn().await;
    let token = app.init_and_login().await;

    for content in ["first", "second"] {
        let res = app
            .post(
                routes::WISHES,
                &json!({"content": content, "authorName": "Sam"}),
                None,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
    }
    let approved_id = app
        .post(
            routes::WISHES,
            &json!({"content": "third", "authorName": "Sam"}),
            None,
        )
        .await
        .id();
    app.put(&routes::wish_approve(approved_id), &json!({}), Some(&token))
        .await;

    let queue = app
        .get(&format!("{}?approved=false", routes::WISHES), Some(&token))
        .await;
    assert_eq!(queue.status, 200, "{}", queue.text);
    assert_eq!(queue.body["total"], 2);

    let approved = app
        .get(&format!("{}?approved=true", routes::WISHES), Some(&token))
        .await;
    assert_eq!(approved.body["total"], 1);
    assert_eq!(approved.body["wishes"][0]["content"], "third");

    let anonymous = app
        .get(&format!("{}?approved=false", routes::WISHES), None)
        .await;
    assert_eq!(anonymous.body["total"], 1);
    assert_eq!(anonymous.body["wishes"][0]["content"], "third");
}

#[tokio::test]
async fn approving_requires_a_token() {
    let app = TestApp::spawn().await;
    app.init_and_login().await;

    let wish_id = app
        .post(
            routes::WISHES,
            &json!({"content": "Best wishes", "authorName": "Sam"}),
            None,
        )
        .await
        .id();

    let res = app
        .put(&routes::wish_approve(wish_id), &json!({}), None)
        .await;
    assert_eq!(res.status, 401);
}
