mod common;

use actix_web::{http::StatusCode, test, web, App};
use blogly::routes;
use serde_json::{json, Value};

macro_rules! app {
    ($db:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($db.clone()))
                .configure(routes::config),
        )
        .await
    };
}

#[actix_web::test]
async fn missing_rows_map_to_not_found() {
    let db = common::memory_db().await;
    let app = app!(db);

    for uri in ["/api/users/41", "/api/posts/42", "/api/tags/43"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 5);
        assert!(body["data"].is_null());
    }

    let req = test::TestRequest::post().uri("/api/posts/42/delete").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn invalid_user_input_is_rejected() {
    let db = common::memory_db().await;
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri("/api/users/new")
        .set_json(json!({ "firstName": "  ", "lastName": "Lovelace" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 1);

    let req = test::TestRequest::post()
        .uri("/api/users/new")
        .set_json(json!({ "firstName": "A".repeat(21), "lastName": "Lovelace" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/users/new")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn duplicate_tag_is_conflict() {
    let db = common::memory_db().await;
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri("/api/tags/new")
        .set_json(json!({ "name": "tech" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/tags/new")
        .set_json(json!({ "name": " tech " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 2);
}

#[actix_web::test]
async fn blog_flow_over_http() {
    let db = common::memory_db().await;
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri("/api/users/new")
        .set_json(json!({ "firstName": "Ada", "lastName": "Lovelace", "imageUrl": "" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["fullName"], "Ada Lovelace");
    assert_eq!(body["data"]["imageUrl"], "/static/default_image.png");
    let user_id = body["data"]["id"].as_i64().expect("user id");

    let mut tag_ids = Vec::new();
    for name in ["tech", "math"] {
        let req = test::TestRequest::post()
            .uri("/api/tags/new")
            .set_json(json!({ "name": name }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        tag_ids.push(body["data"]["id"].as_i64().expect("tag id"));
    }

    let req = test::TestRequest::post()
        .uri(&format!("/api/users/{}/posts/new", user_id))
        .set_json(json!({ "title": "Notes", "content": "Engine", "tagIds": tag_ids }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["userId"], user_id);
    assert_eq!(body["data"]["tags"].as_array().expect("tags").len(), 2);
    let post_id = body["data"]["id"].as_i64().expect("post id");

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/edit", post_id))
        .set_json(json!({ "title": "Notes", "content": "Engine", "tagIds": [tag_ids[1]] }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["tags"], json!([{ "id": tag_ids[1], "name": "math" }]));
    assert_eq!(body["data"]["author"]["fullName"], "Ada Lovelace");

    let req = test::TestRequest::get().uri("/api/posts/recent").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"][0]["id"], post_id);
    assert_eq!(body["data"][0]["authorName"], "Ada Lovelace");

    let req = test::TestRequest::get()
        .uri(&format!("/api/tags/{}", tag_ids[0]))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["name"], "tech");
    assert_eq!(body["data"]["posts"], json!([]));

    let req = test::TestRequest::post()
        .uri(&format!("/api/users/{}/delete", user_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["postIds"], json!([post_id]));

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}", post_id))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/api/tags").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().expect("tags").len(), 2);
}

#[actix_web::test]
async fn post_content_is_stored_as_typed() {
    let db = common::memory_db().await;
    let ada = common::seed_user(&db, "Ada", "Lovelace").await;
    let app = app!(db);
    let content = "    indented code\n\nlast para\n";

    let req = test::TestRequest::post()
        .uri(&format!("/api/users/{}/posts/new", ada.id))
        .set_json(json!({ "title": "Snippet", "content": content }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["content"], content);
    let post_id = body["data"]["id"].as_i64().expect("post id");

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}", post_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["content"], content);

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{}/edit", post_id))
        .set_json(json!({ "title": "Snippet", "content": " \n\t " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn unparsable_path_ids_use_the_response_envelope() {
    let db = common::memory_db().await;
    let app = app!(db);

    let req = test::TestRequest::get().uri("/api/users/99999999999").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 1);
    assert!(body["data"].is_null());
    assert!(body["msg"].as_str().expect("msg").starts_with("invalid path parameter"));
}
