#![cfg(feature = "server")]

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use study_planner::api::{build_router, AppState};
use study_planner::{open_in_memory, AccountRules};
use tower::ServiceExt;

fn app() -> Router {
    let conn = open_in_memory().expect("in-memory db");
    build_router(AppState::new(conn, AccountRules::default()), "*").expect("router")
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

async fn register(app: &Router, email: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        Some(json!({"username": "ana", "email": email, "password": "secreta"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["data"]["id"].as_i64().expect("user id")
}

#[tokio::test]
async fn health_and_subjects() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = send(&app, "GET", "/api/subjects", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(|a| a.len()), Some(7));
}

#[tokio::test]
async fn register_login_and_lookup() {
    let app = app();
    let uid = register(&app, "ana@est.ucab.edu.ve").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        Some(json!({"username": "otra", "email": "ANA@est.ucab.edu.ve", "password": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        Some(json!({"username": "luis", "email": "luis@gmail.com", "password": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("@est.ucab.edu.ve"));

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({"email": "ana@est.ucab.edu.ve", "password": "secreta"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"].as_i64(), Some(uid));

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({"email": "ana@est.ucab.edu.ve", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/auth/users/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn event_conflicts_and_delete() {
    let app = app();
    let uid = register(&app, "ana@est.ucab.edu.ve").await;
    let events = format!("/api/users/{}/events", uid);

    let (status, body) = send(
        &app,
        "POST",
        &events,
        Some(json!({
            "name": "Tutoría",
            "date": "2025-05-12",
            "startTime": "10:00 AM",
            "endTime": "11:30 AM",
            "location": "Biblioteca"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let event_id = body["data"]["id"].as_i64().expect("event id");

    let (status, body) = send(
        &app,
        "POST",
        &events,
        Some(json!({
            "name": "Reunión",
            "date": "2025-05-12",
            "startTime": "11:00",
            "endTime": "12:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap_or_default().contains("Tutoría"));

    let (status, _) = send(
        &app,
        "POST",
        &events,
        Some(json!({
            "name": "Al revés",
            "date": "2025-05-13",
            "startTime": "12:00",
            "endTime": "11:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "DELETE", &format!("{}/{}", events, event_id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, "DELETE", &format!("{}/{}", events, event_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn schedule_batch_and_week_view() {
    let app = app();
    let uid = register(&app, "ana@est.ucab.edu.ve").await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/users/{}/schedules/batch", uid),
        Some(json!({
            "subjectId": 5,
            "location": "A-21",
            "classType": "Teoría",
            "days": [
                {"weekday": "Lunes", "startTime": "07:00", "endTime": "08:45"},
                {"weekday": "Miércoles", "startTime": "07:00", "endTime": "08:45"}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"].as_array().map(|a| a.len()), Some(2));

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/users/{}/calendar/week?date=2025-05-14", uid),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["start"], "2025-05-11");
    let days = body["data"]["days"].as_array().expect("days");
    assert_eq!(days.len(), 7);
    assert_eq!(days[1]["occurrences"][0]["kind"], "class");
    assert_eq!(days[1]["occurrences"][0]["startTime"], "07:00");

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/users/{}/calendar/week?date=14-05-2025", uid),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn evaluation_weight_budget_and_grades() {
    let app = app();
    let uid = register(&app, "ana@est.ucab.edu.ve").await;
    let evaluations = format!("/api/users/{}/evaluations", uid);

    let eval = |title: &str, weight: f64, score: f64| {
        json!({
            "title": title,
            "subjectId": 1,
            "weight": weight,
            "score": score,
            "professor": "Rivas",
            "location": "A-12",
            "date": "2025-05-20",
            "startTime": "08:00",
            "endTime": "10:00"
        })
    };

    let (status, _) = send(&app, "POST", &evaluations, Some(eval("Parcial 1", 60.0, 15.0))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "POST", &evaluations, Some(eval("Parcial 2", 50.0, 18.0))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, "POST", &evaluations, Some(eval("Parcial 2", 40.0, 10.0))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "GET", &format!("/api/users/{}/grades", uid), None).await;
    assert_eq!(status, StatusCode::OK);
    let subject = &body["data"]["subjects"][0];
    assert_eq!(subject["weightUsed"], 100.0);
    // 60% of 15 + 40% of 10
    assert!((subject["total"].as_f64().unwrap_or_default() - 13.0).abs() < 1e-9);
    assert_eq!(subject["approved"], true);
}

#[tokio::test]
async fn search_hits_and_misses() {
    let app = app();
    let uid = register(&app, "ana@est.ucab.edu.ve").await;
    send(
        &app,
        "POST",
        &format!("/api/users/{}/events", uid),
        Some(json!({
            "name": "Feria de Ciencias",
            "date": "2025-06-04",
            "startTime": "09:00",
            "endTime": "12:00"
        })),
    )
    .await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/users/{}/search/feria%20de", uid),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["weekStart"], "2025-06-01");

    let (status, body) = send(&app, "GET", &format!("/api/users/{}/search/qu%C3%ADmica", uid), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["error"],
        "No event, class or evaluation matches \"química\""
    );
}

#[tokio::test]
async fn month_grid_has_six_weeks() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/calendar/month?date=2025-02-10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cells"].as_array().map(|c| c.len()), Some(42));
    assert_eq!(body["data"]["month"], 2);
}

#[tokio::test]
async fn updates_replace_items_and_respect_owners() {
    let app = app();
    let uid = register(&app, "ana@est.ucab.edu.ve").await;
    let other = register(&app, "luis@est.ucab.edu.ve").await;

    // Events: moving over its own old time is fine, onto another is not
    let events = format!("/api/users/{}/events", uid);
    let event = |name: &str, start: &str, end: &str| {
        json!({"name": name, "date": "2025-05-12", "startTime": start, "endTime": end})
    };
    let (_, body) = send(&app, "POST", &events, Some(event("Tutoría", "10:00", "11:00"))).await;
    let event_id = body["data"]["id"].as_i64().expect("event id");
    send(&app, "POST", &events, Some(event("Reunión", "14:00", "15:00"))).await;

    let uri = format!("{}/{}", events, event_id);
    let (status, body) = send(&app, "PUT", &uri, Some(event("Tutoría II", "10:30", "11:30"))).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["name"], "Tutoría II");
    assert_eq!(body["data"]["id"].as_i64(), Some(event_id));

    let (status, body) = send(&app, "PUT", &uri, Some(event("Tutoría", "14:30", "15:30"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap_or_default().contains("Reunión"));

    let foreign = format!("/api/users/{}/events/{}", other, event_id);
    let (status, _) = send(&app, "PUT", &foreign, Some(event("Mía", "10:00", "11:00"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Schedules
    let slot = |start: &str, end: &str| {
        json!({"subjectId": 2, "location": "A-3", "weekday": "Martes", "startTime": start, "endTime": end})
    };
    let schedules = format!("/api/users/{}/schedules", uid);
    let (status, body) = send(&app, "POST", &schedules, Some(slot("07:00", "09:00"))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let slot_id = body["data"]["id"].as_i64().expect("slot id");
    send(&app, "POST", &schedules, Some(slot("11:00", "13:00"))).await;

    let uri = format!("{}/{}", schedules, slot_id);
    let (status, body) = send(&app, "PUT", &uri, Some(slot("08:00", "10:00"))).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["startTime"], "08:00");

    let (status, _) = send(&app, "PUT", &uri, Some(slot("10:00", "12:00"))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let foreign = format!("/api/users/{}/schedules/{}", other, slot_id);
    let (status, _) = send(&app, "PUT", &foreign, Some(slot("15:00", "16:00"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Evaluations: the replaced weight does not count against itself
    let eval = |weight: f64| {
        json!({
            "title": "Proyecto",
            "subjectId": 4,
            "weight": weight,
            "score": 16.0,
            "professor": "Mora",
            "location": "B-4",
            "date": "2025-06-02",
            "startTime": "16:00",
            "endTime": "18:00"
        })
    };
    let evaluations = format!("/api/users/{}/evaluations", uid);
    let (status, body) = send(&app, "POST", &evaluations, Some(eval(60.0))).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let eval_id = body["data"]["id"].as_i64().expect("evaluation id");

    let uri = format!("{}/{}", evaluations, eval_id);
    let (status, body) = send(&app, "PUT", &uri, Some(eval(100.0))).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["weight"], 100.0);

    let (status, _) = send(&app, "PUT", &uri, Some(eval(101.0))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let foreign = format!("/api/users/{}/evaluations/{}", other, eval_id);
    let (status, _) = send(&app, "PUT", &foreign, Some(eval(10.0))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_term_is_decoded_once() {
    let app = app();
    let uid = register(&app, "ana@est.ucab.edu.ve").await;
    send(
        &app,
        "POST",
        &format!("/api/users/{}/events", uid),
        Some(json!({"name": "Aula A", "date": "2025-06-04", "startTime": "09:00", "endTime": "10:00"})),
    )
    .await;

    let (status, body) = send(&app, "GET", &format!("/api/users/{}/search/%2541", uid), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No event, class or evaluation matches \"%41\"");
}
