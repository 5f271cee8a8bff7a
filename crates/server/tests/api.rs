use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use http_body_util::BodyExt;
use sea_orm::{ConnectionTrait, Database, Statement};
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;
use server::{ServerState, router};

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for username in ["alice", "bob"] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec![username.into(), "password".into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    router(ServerState::new(engine, db))
}

fn basic(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, basic(user, "password"));
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn new_car(app: &Router, user: &str, name: &str) -> String {
    let (status, body) = send(app, Method::POST, "/cars", user, Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn requests_without_credentials_are_rejected() {
    let app = app().await;

    let request = Request::builder().uri("/stats").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/stats")
        .header(header::AUTHORIZATION, basic("alice", "wrong"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn empty_statistics_use_null_for_missing_values() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/stats", "alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fleet"]["record_count"], 0);
    assert_eq!(body["fleet"]["total_spent_minor"], 0);
    assert_eq!(body["fleet"]["has_data"], false);
    assert!(body["fleet"]["average_price_per_liter"].is_null());
    assert_eq!(body["cars"], json!([]));
}

#[tokio::test]
async fn refuels_feed_statistics() {
    let app = app().await;
    let car = new_car(&app, "alice", "Car1").await;

    for (date, mileage, liters, total) in [
        ("2025-05-01", 10_000.0, "40", "4000"),
        ("2025-05-08", 10_500.0, "38,00", "3800.00"),
    ] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/records",
            "alice",
            Some(json!({
                "car_id": car,
                "date": date,
                "mileage": mileage,
                "liters": liters,
                "total_price": total,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, Method::GET, "/records", "alice", None).await;
    assert_eq!(status, StatusCode::OK);
    let records = body["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["date"], "2025-05-08");
    assert_eq!(records[0]["car"], "Car1");
    assert_eq!(records[0]["price_per_liter_minor"], 10_000);

    let (status, body) = send(&app, Method::GET, "/stats", "alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fleet"]["record_count"], 2);
    assert_eq!(body["fleet"]["total_liters"], 78.0);
    assert_eq!(body["fleet"]["total_spent_minor"], 780_000);
    assert_eq!(body["fleet"]["average_price_per_liter"], 100.0);

    let line = &body["cars"][0];
    assert_eq!(line["car_id"], car.as_str());
    assert_eq!(line["name"], "Car1");
    assert_eq!(line["min_mileage"], 10_000.0);
    assert_eq!(line["max_mileage"], 10_500.0);
    let consumption = line["average_consumption_per_100"].as_f64().unwrap();
    assert!((consumption - 15.6).abs() < 1e-9);

    // Other users see nothing of it.
    let (_, body) = send(&app, Method::GET, "/stats", "bob", None).await;
    assert_eq!(body["fleet"]["record_count"], 0);
}

#[tokio::test]
async fn single_refuel_has_no_consumption() {
    let app = app().await;
    let car = new_car(&app, "alice", "Car1").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/records",
        "alice",
        Some(json!({
            "car_id": car,
            "date": "2025-05-01",
            "mileage": 1000.0,
            "liters": "10",
            "price_per_liter": "1,50",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&app, Method::GET, "/stats", "alice", None).await;
    assert_eq!(body["cars"][0]["total_spent_minor"], 1_500);
    assert!(body["cars"][0]["average_consumption_per_100"].is_null());
}

#[tokio::test]
async fn duplicate_car_is_a_conflict() {
    let app = app().await;
    new_car(&app, "alice", "Toyota Camry").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/cars",
        "alice",
        Some(json!({ "name": "toyota camry" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, Method::POST, "/cars", "alice", Some(json!({ "name": " " }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn invalid_refuels_are_unprocessable() {
    let app = app().await;
    let car = new_car(&app, "alice", "Car1").await;

    let cases = [
        json!({ "car_id": car, "date": "2025-05-01", "mileage": 1.0, "liters": "0", "total_price": "10" }),
        json!({ "car_id": car, "date": "2025-05-01", "mileage": 1.0, "liters": "abc", "total_price": "10" }),
        json!({ "car_id": car, "date": "2025-05-01", "mileage": 1.0, "liters": "10" }),
        json!({ "car_id": car, "date": "2025-05-01", "mileage": 1.0, "liters": "10", "total_price": "1.234" }),
        json!({ "car_id": car, "date": "2025-05-01", "mileage": 1.0, "liters": "40", "total_price": "0.01", "price_per_liter": "1000" }),
        json!({ "car_id": car, "date": "2025-05-01", "mileage": 1.0, "liters": "90000000000000000", "total_price": "10" }),
    ];
    for case in cases {
        let (status, _) = send(&app, Method::POST, "/records", "alice", Some(case)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}

#[tokio::test]
async fn deleting_a_car_deletes_its_records() {
    let app = app().await;
    let car = new_car(&app, "alice", "Car1").await;
    let (_, _) = send(
        &app,
        Method::POST,
        "/records",
        "alice",
        Some(json!({
            "car_id": car,
            "date": "2025-05-01",
            "mileage": 1.0,
            "liters": "10",
            "total_price": "10",
        })),
    )
    .await;

    let uri = format!("/cars/{car}");
    let (status, _) = send(&app, Method::DELETE, &uri, "bob", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &uri, "alice", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, Method::GET, "/records", "alice", None).await;
    assert_eq!(body["records"], json!([]));
    let (_, body) = send(&app, Method::GET, "/cars", "alice", None).await;
    assert_eq!(body["cars"], json!([]));
}

#[tokio::test]
async fn deleting_a_record() {
    let app = app().await;
    let car = new_car(&app, "alice", "Car1").await;
    let (_, created) = send(
        &app,
        Method::POST,
        "/records",
        "alice",
        Some(json!({
            "car_id": car,
            "date": "2025-05-01",
            "mileage": 1.0,
            "liters": "10",
            "total_price": "10",
        })),
    )
    .await;
    let uri = format!("/records/{}", created["id"].as_str().unwrap());

    let (status, _) = send(&app, Method::DELETE, &uri, "alice", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &uri, "alice", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
