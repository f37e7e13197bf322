use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::{api, config::Config, persistence::db::Dialect, persistence::Db, state::AppState};

async fn setup_app() -> Router {
    let config = Config {
        port: 0,
        database_url: None,
        sqlite_path: ":memory:".to_string(),
        secret_key: "test-secret".to_string(),
        database_max_connections: 1,
    };

    // One connection keeps the in-memory database alive across requests.
    let db = Db::connect_url("sqlite::memory:", Dialect::Sqlite, 1)
        .await
        .expect("init db");
    let state = Arc::new(AppState::new(db, config));
    api::routes(state)
}

fn request(method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let body = match body {
        Some(value) => Body::from(value.to_string()),
        None => Body::empty(),
    };
    builder.body(body).unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

/// Extract the session cookie pair from a Set-Cookie header.
fn session_cookie(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie header")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

/// Register a fresh user and return its session cookie.
async fn register(app: &Router, username: &str) -> String {
    let res = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "username": username, "password": "hunter2hunter" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    session_cookie(&res)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    (status, read_json(res).await)
}

#[tokio::test]
async fn health_endpoint_responds() {
    let app = setup_app().await;
    let res = app
        .oneshot(request("GET", "/health", None, None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn resource_routes_require_a_session() {
    let app = setup_app().await;
    for uri in ["/api/drones", "/api/parts", "/api/practice-days"] {
        let (status, body) = send(&app, request("GET", uri, None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "authentication required");
    }
}

#[tokio::test]
async fn register_returns_user_and_logs_in() {
    let app = setup_app().await;

    let res = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "username": "ava", "password": "longenough", "email": "ava@example.com" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let cookie = session_cookie(&res);
    let body = read_json(res).await;
    assert_eq!(body["user"]["username"], "ava");
    assert_eq!(body["user"]["email"], "ava@example.com");

    let (status, me) = send(&app, request("GET", "/api/auth/me", Some(&cookie), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "ava");
}

#[tokio::test]
async fn short_password_is_rejected() {
    let app = setup_app().await;
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "username": "bo", "password": "short" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("8 characters"));
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let app = setup_app().await;
    register(&app, "taken").await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "username": "taken", "password": "hunter2hunter" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "username is already taken");
}

#[tokio::test]
async fn login_rejects_bad_credentials_and_accepts_good_ones() {
    let app = setup_app().await;
    register(&app, "pilot").await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "username": "pilot", "password": "wrongpassword" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid username or password");

    let res = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "username": "pilot", "password": "hunter2hunter" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = session_cookie(&res);
    let body = read_json(res).await;
    assert_eq!(body["user"]["username"], "pilot");

    let (status, _) = send(&app, request("GET", "/api/auth/me", Some(&cookie), None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn logout_clears_the_session_cookie() {
    let app = setup_app().await;
    let cookie = register(&app, "leaver").await;

    let res = app
        .clone()
        .oneshot(request("POST", "/api/auth/logout", Some(&cookie), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let cleared = session_cookie(&res);

    // The replacement cookie is empty, so it no longer authenticates.
    let (status, _) = send(&app, request("GET", "/api/auth/me", Some(&cleared), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

async fn create_type(app: &Router, cookie: &str, name: &str, default_parts: Value) -> i64 {
    let (status, body) = send(
        app,
        request(
            "POST",
            "/api/drone-types",
            Some(cookie),
            Some(json!({ "name": name, "defaultParts": default_parts })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

async fn create_drone(app: &Router, cookie: &str, name: &str, type_id: i64) -> i64 {
    let (status, body) = send(
        app,
        request(
            "POST",
            "/api/drones",
            Some(cookie),
            Some(json!({ "name": name, "type": type_id, "startDate": "2024-03-01" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn drone_crud_expands_the_default_parts_template() {
    let app = setup_app().await;
    let cookie = register(&app, "builder").await;

    let type_id = create_type(
        &app,
        &cookie,
        "5-inch freestyle",
        json!(["Propeller", { "name": "Motor" }]),
    )
    .await;
    let drone_id = create_drone(&app, &cookie, "Apex", type_id).await;

    let (status, drone) = send(
        &app,
        request(
            "GET",
            &format!("/api/drones/{drone_id}"),
            Some(&cookie),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(drone["name"], "Apex");
    assert_eq!(drone["type"], json!(type_id));
    assert_eq!(drone["typeName"], "5-inch freestyle");
    assert_eq!(drone["status"], "ready");
    assert_eq!(drone["parts"].as_array().unwrap().len(), 2);

    // Template entries became real parts carrying the drone's start date.
    let (status, parts) = send(
        &app,
        request(
            "GET",
            &format!("/api/parts?drone_id={drone_id}"),
            Some(&cookie),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = parts
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Propeller"));
    assert!(names.contains(&"Motor"));
    assert_eq!(parts[0]["startDate"], "2024-03-01");

    let (status, _) = send(
        &app,
        request(
            "PUT",
            &format!("/api/drones/{drone_id}"),
            Some(&cookie),
            Some(json!({ "status": "maintenance" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, drone) = send(
        &app,
        request(
            "GET",
            &format!("/api/drones/{drone_id}"),
            Some(&cookie),
            None,
        ),
    )
    .await;
    assert_eq!(drone["status"], "maintenance");

    let (status, _) = send(
        &app,
        request(
            "DELETE",
            &format!("/api/drones/{drone_id}"),
            Some(&cookie),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Parts went with the drone.
    let (_, parts) = send(&app, request("GET", "/api/parts", Some(&cookie), None)).await;
    assert!(parts.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn drone_with_unknown_type_is_rejected() {
    let app = setup_app().await;
    let cookie = register(&app, "typist").await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/drones",
            Some(&cookie),
            Some(json!({ "name": "Ghost", "type": 9999, "startDate": "2024-01-01" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid drone type");
}

#[tokio::test]
async fn empty_update_is_rejected() {
    let app = setup_app().await;
    let cookie = register(&app, "noop").await;
    let type_id = create_type(&app, &cookie, "Cinewhoop", json!([])).await;
    let drone_id = create_drone(&app, &cookie, "Whoopie", type_id).await;

    let (status, body) = send(
        &app,
        request(
            "PUT",
            &format!("/api/drones/{drone_id}"),
            Some(&cookie),
            Some(json!({})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "no fields to update");
}

#[tokio::test]
async fn part_create_requires_an_owned_drone() {
    let app = setup_app().await;
    let cookie = register(&app, "mechanic").await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/parts",
            Some(&cookie),
            Some(json!({ "droneId": 42, "name": "ESC", "startDate": "2024-02-02" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "drone not found");
}

#[tokio::test]
async fn part_manufacturer_is_joined_and_clearable() {
    let app = setup_app().await;
    let cookie = register(&app, "sourcing").await;
    let type_id = create_type(&app, &cookie, "Racer", json!([])).await;
    let drone_id = create_drone(&app, &cookie, "Comet", type_id).await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/manufacturers",
            Some(&cookie),
            Some(json!({ "name": "iFlight" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let manufacturer_id = body["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/parts",
            Some(&cookie),
            Some(json!({
                "droneId": drone_id,
                "name": "Motor",
                "startDate": "2024-02-02",
                "manufacturerId": manufacturer_id
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let part_id = body["id"].as_i64().unwrap();

    let (_, part) = send(
        &app,
        request("GET", &format!("/api/parts/{part_id}"), Some(&cookie), None),
    )
    .await;
    assert_eq!(part["manufacturerId"], json!(manufacturer_id));
    assert_eq!(part["manufacturerName"], "iFlight");

    // The manufacturer is referenced, so it cannot be deleted.
    let (status, body) = send(
        &app,
        request(
            "DELETE",
            &format!("/api/manufacturers/{manufacturer_id}"),
            Some(&cookie),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("referenced"));

    // Explicit null clears the reference; absent keys stay untouched.
    let (status, _) = send(
        &app,
        request(
            "PUT",
            &format!("/api/parts/{part_id}"),
            Some(&cookie),
            Some(json!({ "manufacturerId": null })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, part) = send(
        &app,
        request("GET", &format!("/api/parts/{part_id}"), Some(&cookie), None),
    )
    .await;
    assert_eq!(part["manufacturerId"], Value::Null);
    assert_eq!(part["name"], "Motor");

    let (status, _) = send(
        &app,
        request(
            "DELETE",
            &format!("/api/manufacturers/{manufacturer_id}"),
            Some(&cookie),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn drone_type_in_use_cannot_be_deleted() {
    let app = setup_app().await;
    let cookie = register(&app, "curator").await;
    let type_id = create_type(&app, &cookie, "Tinywhoop", json!([])).await;
    let drone_id = create_drone(&app, &cookie, "Mobula", type_id).await;

    let (status, body) = send(
        &app,
        request(
            "DELETE",
            &format!("/api/drone-types/{type_id}"),
            Some(&cookie),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("used by"));

    let (status, _) = send(
        &app,
        request(
            "DELETE",
            &format!("/api/drones/{drone_id}"),
            Some(&cookie),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        request(
            "DELETE",
            &format!("/api/drone-types/{type_id}"),
            Some(&cookie),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn repair_log_filters_by_drone_and_part() {
    let app = setup_app().await;
    let cookie = register(&app, "fixer").await;
    let type_id = create_type(&app, &cookie, "Freestyle", json!(["Arm"])).await;
    let drone_id = create_drone(&app, &cookie, "Banger", type_id).await;

    let (_, parts) = send(
        &app,
        request(
            "GET",
            &format!("/api/parts?drone_id={drone_id}"),
            Some(&cookie),
            None,
        ),
    )
    .await;
    let part_id = parts[0]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/repairs",
            Some(&cookie),
            Some(json!({
                "droneId": drone_id,
                "partId": part_id,
                "date": "2024-04-05",
                "description": "replaced cracked arm"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let repair_id = body["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/repairs",
            Some(&cookie),
            Some(json!({
                "droneId": drone_id,
                "date": "2024-04-06",
                "description": "retightened screws"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, all) = send(
        &app,
        request(
            "GET",
            &format!("/api/repairs?drone_id={drone_id}"),
            Some(&cookie),
            None,
        ),
    )
    .await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, by_part) = send(
        &app,
        request(
            "GET",
            &format!("/api/repairs?drone_id={drone_id}&part_id={part_id}"),
            Some(&cookie),
            None,
        ),
    )
    .await;
    assert_eq!(by_part.as_array().unwrap().len(), 1);
    assert_eq!(by_part[0]["description"], "replaced cracked arm");

    let (status, _) = send(
        &app,
        request(
            "PUT",
            &format!("/api/repairs/{repair_id}"),
            Some(&cookie),
            Some(json!({ "description": "replaced both arms" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        request(
            "DELETE",
            &format!("/api/repairs/{repair_id}"),
            Some(&cookie),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn repair_with_unknown_part_is_not_found() {
    let app = setup_app().await;
    let cookie = register(&app, "logger").await;
    let type_id = create_type(&app, &cookie, "Micro", json!([])).await;
    let drone_id = create_drone(&app, &cookie, "Gnat", type_id).await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/repairs",
            Some(&cookie),
            Some(json!({
                "droneId": drone_id,
                "partId": 777,
                "date": "2024-04-05",
                "description": "ghost part"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "part not found");
}

#[tokio::test]
async fn practice_days_are_unique_per_date() {
    let app = setup_app().await;
    let cookie = register(&app, "trainer").await;

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/practice-days",
            Some(&cookie),
            Some(json!({ "date": "2024-05-01", "note": "gates and dives" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let day_id = body["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/practice-days",
            Some(&cookie),
            Some(json!({ "date": "2024-05-01" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already exists"));

    // Explicit null clears the note.
    let (status, _) = send(
        &app,
        request(
            "PUT",
            &format!("/api/practice-days/{day_id}"),
            Some(&cookie),
            Some(json!({ "note": null })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, day) = send(
        &app,
        request(
            "GET",
            &format!("/api/practice-days/{day_id}"),
            Some(&cookie),
            None,
        ),
    )
    .await;
    assert_eq!(day["note"], Value::Null);

    // The date is only unique per user.
    let other = register(&app, "teammate").await;
    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/practice-days",
            Some(&other),
            Some(json!({ "date": "2024-05-01" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn users_cannot_see_each_others_records() {
    let app = setup_app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    let type_id = create_type(&app, &alice, "Quad", json!([])).await;
    let drone_id = create_drone(&app, &alice, "Private", type_id).await;

    let (_, drones) = send(&app, request("GET", "/api/drones", Some(&bob), None)).await;
    assert!(drones.as_array().unwrap().is_empty());

    // Foreign rows are indistinguishable from absent ones.
    let (status, _) = send(
        &app,
        request("GET", &format!("/api/drones/{drone_id}"), Some(&bob), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        request(
            "DELETE",
            &format!("/api/drones/{drone_id}"),
            Some(&bob),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Bob can reuse a name Alice already holds.
    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/drone-types",
            Some(&bob),
            Some(json!({ "name": "Quad" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn snapshot_import_remaps_ids_and_skips_orphans() {
    let app = setup_app().await;
    let cookie = register(&app, "migrator").await;

    // A practice day that will collide with the snapshot.
    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/practice-days",
            Some(&cookie),
            Some(json!({ "date": "2024-06-01" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let snapshot = json!({
        "drone_types": [
            { "name": "Imported type", "defaultParts": ["Prop"] }
        ],
        "manufacturers": [
            { "name": "GEPRC" }
        ],
        "drones": [
            { "id": "local-1", "name": "Kept", "typeName": "Imported type", "startDate": "2023-01-01" },
            { "id": "local-2", "name": "Dropped", "startDate": "2023-01-01" },
            { "id": 3, "name": "NewType", "typeName": "Unseen type", "startDate": "2023-02-01" }
        ],
        "parts": [
            { "id": "p-1", "droneId": "local-1", "name": "Cam", "startDate": "2023-01-02" },
            { "id": "p-2", "droneId": "local-2", "name": "Orphan", "startDate": "2023-01-02" }
        ],
        "repairs": [
            { "droneId": "local-1", "partId": "p-1", "date": "2023-03-01", "description": "lens swap" },
            { "droneId": "local-2", "date": "2023-03-02", "description": "never lands" }
        ],
        "practice_days": [
            { "date": "2024-06-01", "note": "collides" },
            { "date": "2024-06-02" }
        ]
    });

    let (status, body) = send(
        &app,
        request("POST", "/api/migrate/import", Some(&cookie), Some(snapshot)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "import complete");

    // The drone without a type name was skipped; "Unseen type" was created.
    let (_, drones) = send(&app, request("GET", "/api/drones", Some(&cookie), None)).await;
    let names: Vec<&str> = drones
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Kept"));
    assert!(names.contains(&"NewType"));

    let (_, types) = send(
        &app,
        request("GET", "/api/drone-types", Some(&cookie), None),
    )
    .await;
    let type_names: Vec<&str> = types
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert!(type_names.contains(&"Imported type"));
    assert!(type_names.contains(&"Unseen type"));

    // Only the part whose drone imported came through, with no manufacturer.
    let (_, parts) = send(&app, request("GET", "/api/parts", Some(&cookie), None)).await;
    assert_eq!(parts.as_array().unwrap().len(), 1);
    assert_eq!(parts[0]["name"], "Cam");
    assert_eq!(parts[0]["manufacturerId"], Value::Null);

    let (_, repairs) = send(&app, request("GET", "/api/repairs", Some(&cookie), None)).await;
    assert_eq!(repairs.as_array().unwrap().len(), 1);
    assert_eq!(repairs[0]["description"], "lens swap");
    assert_eq!(repairs[0]["partId"], parts[0]["id"]);

    // The colliding date was skipped, the fresh one imported.
    let (_, days) = send(
        &app,
        request("GET", "/api/practice-days", Some(&cookie), None),
    )
    .await;
    assert_eq!(days.as_array().unwrap().len(), 2);
}
