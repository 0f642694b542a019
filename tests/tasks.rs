mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use common::{bearer, login, spawn_app};

#[test_log::test(actix_rt::test)]
async fn test_task_lifecycle() {
    let (app, _) = spawn_app().await;
    let (author_id, author) = login(&app, "author@example.com").await;
    let (executor_id, executor) = login(&app, "executor@example.com").await;

    // Defaults: PENDING, MEDIUM, no executor.
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .insert_header(bearer(&author))
        .set_json(json!({ "title": "Fix bug", "description": "Crash on save" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let task: Value = test::read_body_json(resp).await;
    assert_eq!(task["status"], "PENDING");
    assert_eq!(task["priority"], "MEDIUM");
    assert_eq!(task["author_id"], author_id);
    assert_eq!(task["executor_id"], Value::Null);
    let id = task["id"].as_i64().unwrap();

    // Not the executor yet.
    let req = test::TestRequest::patch()
        .uri(&format!("/api/tasks/{}/status", id))
        .insert_header(bearer(&executor))
        .set_json(json!({ "status": "IN_PROGRESS" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/tasks/{}/executor", id))
        .insert_header(bearer(&author))
        .set_json(json!({ "executor_id": executor_id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let task: Value = test::read_body_json(resp).await;
    assert_eq!(task["executor_id"], executor_id);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/tasks/{}/status", id))
        .insert_header(bearer(&executor))
        .set_json(json!({ "status": "COMPLETED" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let task: Value = test::read_body_json(resp).await;
    assert_eq!(task["status"], "COMPLETED");

    // The executor still may not rewrite or delete it.
    let req = test::TestRequest::put()
        .uri(&format!("/api/tasks/{}", id))
        .insert_header(bearer(&executor))
        .set_json(json!({ "title": "Mine now" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "forbidden");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/tasks/{}", id))
        .insert_header(bearer(&executor))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri(&format!("/api/tasks/{}", id))
        .insert_header(bearer(&author))
        .set_json(json!({ "title": "Fix bug properly", "priority": "HIGH" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let task: Value = test::read_body_json(resp).await;
    assert_eq!(task["title"], "Fix bug properly");
    assert_eq!(task["priority"], "HIGH");
    assert_eq!(task["description"], Value::Null);
    assert_eq!(task["status"], "COMPLETED");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/tasks/{}", id))
        .insert_header(bearer(&author))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", id))
        .insert_header(bearer(&author))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "task_not_found");
}

#[test_log::test(actix_rt::test)]
async fn test_task_validation_and_missing_references() {
    let (app, _) = spawn_app().await;
    let (_, token) = login(&app, "validation@example.com").await;

    for payload in [
        json!({ "title": "   " }),
        json!({ "title": "a".repeat(201) }),
        json!({ "title": "ok", "description": "b".repeat(1001) }),
        json!({ "title": "ok", "priority": "URGENT" }),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .insert_header(bearer(&token))
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "payload {}", payload);
    }

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .insert_header(bearer(&token))
        .set_json(json!({ "title": "Assign me" }))
        .to_request();
    let task: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::patch()
        .uri(&format!("/api/tasks/{}/executor", task["id"]))
        .insert_header(bearer(&token))
        .set_json(json!({ "executor_id": 9999 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "user_not_found");

    let req = test::TestRequest::patch()
        .uri("/api/tasks/9999/executor")
        .insert_header(bearer(&token))
        .set_json(json!({ "executor_id": 9999 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "task_not_found");
}

#[test_log::test(actix_rt::test)]
async fn test_task_listing_filters_and_pages() {
    let (app, _) = spawn_app().await;
    let (first_id, first) = login(&app, "first@example.com").await;
    let (_, second) = login(&app, "second@example.com").await;

    for (token, title, priority) in [
        (&first, "one", "LOW"),
        (&first, "two", "HIGH"),
        (&first, "three", "HIGH"),
        (&second, "four", "HIGH"),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .insert_header(bearer(token))
            .set_json(json!({ "title": title, "priority": priority }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri(&format!(
            "/api/tasks?author_id={}&priority=HIGH&size=1&page=1",
            first_id
        ))
        .insert_header(bearer(&second))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = test::read_body_json(resp).await;
    assert_eq!(page["metadata"]["total_elements"], 2);
    assert_eq!(page["metadata"]["total_pages"], 2);
    assert_eq!(page["content"].as_array().unwrap().len(), 1);
    assert_eq!(page["content"][0]["title"], "three");

    let req = test::TestRequest::get()
        .uri("/api/tasks?status=PENDING")
        .insert_header(bearer(&second))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["metadata"]["total_elements"], 4);

    for query in ["size=0", "size=101", "status=DONE"] {
        let req = test::TestRequest::get()
            .uri(&format!("/api/tasks?{}", query))
            .insert_header(bearer(&second))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "query {}", query);
    }
}

#[test_log::test(actix_rt::test)]
async fn test_comments() {
    let (app, _) = spawn_app().await;
    let (_, author) = login(&app, "author@example.com").await;
    let (reader_id, reader) = login(&app, "reader@example.com").await;

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .insert_header(bearer(&author))
        .set_json(json!({ "title": "Discuss" }))
        .to_request();
    let task: Value = test::call_and_read_body_json(&app, req).await;
    let id = task["id"].as_i64().unwrap();

    for (token, text) in [(&author, "first"), (&reader, "second"), (&author, "third")] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/tasks/{}/comments", id))
            .insert_header(bearer(token))
            .set_json(json!({ "text": text }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::post()
        .uri(&format!("/api/tasks/{}/comments", id))
        .insert_header(bearer(&reader))
        .set_json(json!({ "text": "x".repeat(256) }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/tasks/9999/comments")
        .insert_header(bearer(&reader))
        .set_json(json!({ "text": "hello?" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}/comments?author_id={}", id, reader_id))
        .insert_header(bearer(&author))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["metadata"]["total_elements"], 1);
    assert_eq!(page["content"][0]["text"], "second");
    assert_eq!(page["content"][0]["author_id"], reader_id);

    // Comments go with their task.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/tasks/{}", id))
        .insert_header(bearer(&author))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}/comments", id))
        .insert_header(bearer(&author))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["metadata"]["total_elements"], 0);
}
