use crate::modules::tasks::core::task::Task;
use crate::shell::http::router;
use crate::shell::state::InMemoryService;
use crate::tests::fixtures::concurrency::hold_key;
use crate::tests::fixtures::state::make_test_state;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::time::timeout;
use tower::ServiceExt;

async fn send(app: Router, method: &str, uri: String, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri.as_str())
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create(app: &Router, resource: &str, body: Value) -> String {
    let (status, json) = send(app.clone(), "POST", format!("/{resource}"), body).await;
    assert_eq!(status, StatusCode::CREATED);
    json["id"].as_str().unwrap().to_string()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn merges_two_stale_task_updates_from_different_assistants() {
    let app = router(make_test_state());
    let id = create(
        &app,
        "tasks",
        json!({"title": "Run the PCR batch", "status": "To Do", "priority": "low"}),
    )
    .await;
    let uri = format!("/tasks/{id}");

    let assistant_a = tokio::spawn(send(
        app.clone(),
        "PATCH",
        uri.clone(),
        json!({"version": 1, "status": "In Progress"}),
    ));
    let assistant_b = tokio::spawn(send(
        app.clone(),
        "PATCH",
        uri.clone(),
        json!({"version": 1, "priority": "high"}),
    ));
    let (status_a, _) = assistant_a.await.unwrap();
    let (status_b, _) = assistant_b.await.unwrap();
    assert_eq!(status_a, StatusCode::OK);
    assert_eq!(status_b, StatusCode::OK);

    let (_, task) = send(app, "GET", uri.clone(), Value::Null).await;
    assert_eq!(task["status"], "In Progress");
    assert_eq!(task["priority"], "high");
    assert_eq!(task["version"], 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rejects_the_second_of_two_user_updates_claiming_the_same_version() {
    let app = router(make_test_state());
    let id = create(&app, "users", json!({"email": "ada@lab.test", "name": "Ada"})).await;
    let uri = format!("/users/{id}");

    let first = tokio::spawn(send(
        app.clone(),
        "PATCH",
        uri.clone(),
        json!({"version": 0, "name": "Ada L."}),
    ));
    let second = tokio::spawn(send(
        app.clone(),
        "PATCH",
        uri.clone(),
        json!({"version": 0, "role": "admin"}),
    ));
    let mut statuses = [first.await.unwrap().0, second.await.unwrap().0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::CONFLICT]);

    let (_, user) = send(app, "GET", uri.clone(), Value::Null).await;
    assert_eq!(user["version"], 1);
}

#[tokio::test]
async fn updates_an_event_while_a_task_with_the_same_id_is_locked() {
    let state = make_test_state();
    let app = router(state.clone());
    let id = create(
        &app,
        "events",
        json!({"title": "Safety briefing", "starts_at": 1_000, "ends_at": 2_000}),
    )
    .await;
    let task_key = InMemoryService::<Task>::lock_key(&id);
    let held = hold_key(&state.serializer, &task_key).await;

    let (status, event) = timeout(
        Duration::from_secs(1),
        send(
            app,
            "PATCH",
            format!("/events/{id}"),
            json!({"version": 1, "location": "Lecture hall"}),
        ),
    )
    .await
    .expect("event update queued behind the task key");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(event["version"], 2);
    assert!(state.serializer.is_locked(&task_key));

    held.release().await;
    assert_eq!(state.serializer.active_keys(), 0);
}

#[tokio::test]
async fn rejects_an_event_move_that_inverts_its_interval() {
    let app = router(make_test_state());
    let id = create(
        &app,
        "events",
        json!({"title": "Safety briefing", "starts_at": 1_000, "ends_at": 2_000}),
    )
    .await;
    let uri = format!("/events/{id}");

    let (status, json) = send(
        app.clone(),
        "PATCH",
        uri.clone(),
        json!({"version": 1, "ends_at": 500}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let (_, event) = send(app, "GET", uri, Value::Null).await;
    assert_eq!(event["ends_at"], 2_000);
    assert_eq!(event["version"], 1);
}

#[tokio::test]
async fn fails_an_assistant_update_after_the_record_is_deleted() {
    let app = router(make_test_state());
    let id = create(
        &app,
        "assistants",
        json!({"user_id": "u-1", "name": "Grace", "email": "grace@lab.test"}),
    )
    .await;
    let uri = format!("/assistants/{id}");

    let (status, _) = send(app.clone(), "DELETE", uri.clone(), Value::Null).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, json) = send(app, "PATCH", uri.clone(), json!({"version": 0, "phone": null})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}
