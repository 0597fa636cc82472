use serde_json::json;

use crate::common::{PASSWORD, TestApp, routes};

#[tokio::test]
async fn health_reports_the_storage_backend() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::HEALTH, None).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["status"], "ok");
    assert_eq!(res.body["storage"], "local");
}

#[tokio::test]
async fn init_runs_exactly_once() {
    let app = TestApp::spawn().await;

    let status = app.get(routes::INIT, None).await;
    assert_eq!(status.status, 200);
    assert_eq!(status.body["initialized"], false);

    app.init_and_login().await;

    let status = app.get(routes::INIT, None).await;
    assert_eq!(status.body["initialized"], true);

    let again = app
        .post(
            routes::INIT,
            &json!({
                "siteName": "Second",
                "startDate": "2020-01-01",
                "userAName": "carl",
                "userARole": "boy",
                "userBName": "dana",
                "userBRole": "girl",
                "sitePassword": PASSWORD,
                "sitePasswordConfirm": PASSWORD,
            }),
            None,
        )
        .await;
    assert_eq!(again.status, 409, "{}", again.text);
    assert_eq!(again.body["code"], "CONFLICT");
}

#[tokio::test]
async fn init_rejects_matching_roles() {
    let app = TestApp::spawn().await;

    let res = app
        .post(
            routes::INIT,
            &json!({
                "siteName": "Ours",
                "startDate": "2020-01-01",
                "userAName": "carl",
                "userARole": "boy",
                "userBName": "dana",
                "userBRole": "boy",
                "sitePassword": PASSWORD,
                "sitePasswordConfirm": PASSWORD,
            }),
            None,
        )
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn info_shows_the_site_and_couple() {
    let app = TestApp::spawn().await;
    app.init_and_login().await;

    let res = app.get(routes::INFO, None).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["site"]["name"], "Our Story");
    assert_eq!(res.body["site"]["startDate"], "2019-05-20");
    assert_eq!(res.body["couple"]["boy"]["name"], "bob");
    assert_eq!(res.body["couple"]["girl"]["name"], "ann");
}

#[tokio::test]
async fn site_settings_round_trip() {
    let app = TestApp::spawn().await;
    let token = app.init_and_login().await;

    let saved = app
        .post(
            routes::SITE_SETTINGS,
            &json!({"siteTitle": "Renamed", "startDate": "2019-06-01"}),
            Some(&token),
        )
        .await;
    assert_eq!(saved.status, 200, "{}", saved.text);

    let res = app.get(routes::SITE_SETTINGS, Some(&token)).await;
    assert_eq!(res.body["siteTitle"], "Renamed");
    assert_eq!(res.body["startDate"], "2019-06-01");
    assert_eq!(res.body["siteDescription"], "since day one");
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let app = TestApp::spawn().await;

    let res = app
        .client
        .post(app.url(routes::INIT))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn api_reference_documents_settings_and_wish_filter() {
    let app = TestApp::spawn().await;

    let res = app.get("/scalar", None).await;
    assert_eq!(res.status, 200);
    assert!(res.text.contains("\"operationId\":\"saveSiteSettings\""));
    assert!(res.text.contains("additionalProperties"));
    assert!(res.text.contains("\"name\":\"approved\""));
}
