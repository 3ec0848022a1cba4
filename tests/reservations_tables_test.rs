mod common;

use axum::http::{Method, StatusCode};
use common::{read_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn double_booking_a_table_is_rejected() {
    let app = TestApp::new().await;
    let table_id = app.seed_table(app.restaurant_id, 12, 6).await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/reservations",
            Some(json!({
                "table_id": table_id,
                "customer_name": "Elena Quispe",
                "guest_count": 4,
                "date": "2026-09-01",
                "start_time": "19:00:00",
                "end_time": "21:00:00",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["data"]["status"], "CONFIRMED");

    // Overlapping window on the same table and day.
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/reservations",
            Some(json!({
                "table_id": table_id,
                "customer_name": "Marco Paredes",
                "guest_count": 2,
                "date": "2026-09-01",
                "start_time": "20:00:00",
                "end_time": "22:00:00",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Back to back is fine: windows are half-open.
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/reservations",
            Some(json!({
                "table_id": table_id,
                "customer_name": "Marco Paredes",
                "guest_count": 2,
                "date": "2026-09-01",
                "start_time": "21:00:00",
                "end_time": "23:00:00",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Same window on another day is fine too.
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/reservations",
            Some(json!({
                "table_id": table_id,
                "customer_name": "Lucia Torres",
                "guest_count": 2,
                "date": "2026-09-02",
                "start_time": "19:30:00",
                "end_time": "21:30:00",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn open_ended_reservations_block_the_rest_of_the_day() {
    let app = TestApp::new().await;
    let table_id = app.seed_table(app.restaurant_id, 3, 4).await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/reservations",
            Some(json!({
                "table_id": table_id,
                "customer_name": "Open Ended",
                "guest_count": 2,
                "date": "2026-09-05",
                "start_time": "18:00:00",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/reservations",
            Some(json!({
                "table_id": table_id,
                "customer_name": "Late Arrival",
                "guest_count": 2,
                "date": "2026-09-05",
                "start_time": "22:00:00",
                "end_time": "23:00:00",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn reservation_validations() {
    let app = TestApp::new().await;
    let table_id = app.seed_table(app.restaurant_id, 5, 2).await;

    // Party larger than the table.
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/reservations",
            Some(json!({
                "table_id": table_id,
                "customer_name": "Big Party",
                "guest_count": 6,
                "date": "2026-09-01",
                "start_time": "19:00:00",
                "end_time": "21:00:00",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // End before start.
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/reservations",
            Some(json!({
                "table_id": table_id,
                "customer_name": "Backwards",
                "guest_count": 2,
                "date": "2026-09-01",
                "start_time": "19:00:00",
                "end_time": "18:00:00",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn seating_and_completing_drive_the_table_state() {
    let app = TestApp::new().await;
    let table_id = app.seed_table(app.restaurant_id, 9, 4).await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/reservations",
            Some(json!({
                "table_id": table_id,
                "customer_name": "Ana Flores",
                "guest_count": 3,
                "date": "2026-09-03",
                "start_time": "20:00:00",
                "end_time": "22:00:00",
            })),
        )
        .await;
    let reservation_id = read_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/reservations/{reservation_id}/status"),
            Some(json!({ "status": "SEATED" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request_authenticated(Method::GET, &format!("/api/v1/tables/{table_id}"), None)
        .await;
    assert_eq!(read_json(response).await["data"]["status"], "OCCUPIED");

    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/reservations/{reservation_id}/status"),
            Some(json!({ "status": "COMPLETED" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request_authenticated(Method::GET, &format!("/api/v1/tables/{table_id}"), None)
        .await;
    assert_eq!(read_json(response).await["data"]["status"], "AVAILABLE");

    // Terminal reservations cannot move again.
    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/reservations/{reservation_id}/status"),
            Some(json!({ "status": "SEATED" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn reservations_are_listed_per_day() {
    let app = TestApp::new().await;

    for (name, date) in [("Day One", "2026-09-10"), ("Day Two", "2026-09-11")] {
        let response = app
            .request_authenticated(
                Method::POST,
                "/api/v1/reservations",
                Some(json!({
                    "customer_name": name,
                    "guest_count": 2,
                    "date": date,
                    "start_time": "19:00:00",
                    "end_time": "21:00:00",
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .request_authenticated(Method::GET, "/api/v1/reservations?date=2026-09-10", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["customer_name"], "Day One");
}

#[tokio::test]
async fn tables_crud_and_manual_status() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/tables",
            Some(json!({ "number": 1, "capacity": 4, "zone": "terrace" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let table_id = read_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    // Duplicate number within the restaurant.
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/tables",
            Some(json!({ "number": 1, "capacity": 2 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/tables/{table_id}/status"),
            Some(json!({ "status": "CLEANING" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["status"], "CLEANING");

    let response = app
        .request_authenticated(Method::GET, "/api/v1/tables?status=CLEANING", None)
        .await;
    let body = read_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn a_table_with_an_open_order_cannot_be_freed_or_deleted() {
    let app = TestApp::new().await;
    let table_id = app.seed_table(app.restaurant_id, 4, 4).await;
    let item = app
        .seed_menu_item(app.restaurant_id, "Mains", "Tacu Tacu", dec!(30.00))
        .await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "table_id": table_id,
                "items": [{ "menu_item_id": item, "quantity": 1 }],
                "guest_count": 2,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/tables/{table_id}/status"),
            Some(json!({ "status": "AVAILABLE" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .request_authenticated(Method::DELETE, &format!("/api/v1/tables/{table_id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
