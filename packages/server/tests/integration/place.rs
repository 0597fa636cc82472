use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn places_and_anniversaries_are_managed_together() {
    let app = TestApp::spawn().await;
    let token = app.init_and_login().await;

    let place = app
        .post(
            routes::PLACES,
            &json!({
                "name": "Lakeside",
                "latitude": 47.5,
                "longitude": 8.6,
                "date": "2020-07-04",
            }),
            Some(&token),
        )
        .await;
    assert_eq!(place.status, 201, "{}", place.text);

    let res = app
        .put(&routes::place(place.id()), &json!({"latitude": 120.0}), Some(&token))
        .await;
    assert_eq!(res.status, 400);

    let anniversary = app
        .post(
            routes::ANNIVERSARIES,
            &json!({"title": "First date", "date": "2019-05-20", "calendar": "solar"}),
            Some(&token),
        )
        .await;
    assert_eq!(anniversary.status, 201, "{}", anniversary.text);

    let places = app.get(routes::PLACES, Some(&token)).await;
    assert_eq!(places.body["total"], 1);
    let anniversaries = app.get(routes::ANNIVERSARIES, Some(&token)).await;
    assert_eq!(anniversaries.body["total"], 1);
    assert_eq!(anniversaries.body["anniversaries"][0]["title"], "First date");
}
