mod common;

use axum::http::{Method, StatusCode};
use chrono::Utc;
use common::{dec_field, read_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

/// Creates and fully pays an order for `quantity` units of a fresh menu
/// item, returning the menu item name.
async fn sell(app: &TestApp, name: &str, price: &str, quantity: i32, method: &str) {
    let item = app
        .seed_menu_item(
            app.restaurant_id,
            "Mains",
            name,
            price.parse().expect("valid price"),
        )
        .await;
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "items": [{ "menu_item_id": item, "quantity": quantity }],
                "guest_count": 1,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    let order_id = body["data"]["id"].as_str().unwrap();
    let total = body["data"]["total"].as_str().unwrap();

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/payments",
            Some(json!({ "order_id": order_id, "amount": total, "method": method })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn sales_summary_aggregates_paid_orders_only() {
    let app = TestApp::new().await;
    // 2x30 and 1x50, both settled; one open order that must not count.
    sell(&app, "Seco de Res", "30.00", 2, "CASH").await;
    sell(&app, "Chupe", "50.00", 1, "CARD").await;

    let open_item = app
        .seed_menu_item(app.restaurant_id, "Mains", "Open Order", dec!(99.00))
        .await;
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "items": [{ "menu_item_id": open_item, "quantity": 1 }],
                "guest_count": 1,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let today = Utc::now().date_naive();
    let response = app
        .request_authenticated(Method::GET, &format!("/api/v1/reports/sales?from={today}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let summary = &body["data"];

    // Subtotals 60 and 50 at 19% tax and 10% service charge.
    assert_eq!(summary["order_count"], 2);
    assert_eq!(dec_field(&summary["gross"]), dec!(141.90));
    assert_eq!(dec_field(&summary["tax"]), dec!(20.90));
    assert_eq!(dec_field(&summary["service_charge"]), dec!(11.00));
    assert_eq!(dec_field(&summary["net"]), dec!(110.00));
    assert_eq!(dec_field(&summary["average_ticket"]), dec!(70.95));
}

#[tokio::test]
async fn payment_method_breakdown_includes_refunds_as_negatives() {
    let app = TestApp::new().await;
    sell(&app, "Plato Uno", "40.00", 1, "CASH").await;
    sell(&app, "Plato Dos", "40.00", 1, "CARD").await;

    // Refund the card payment; the method's signed sum drops to zero.
    let response = app
        .request_authenticated(Method::GET, "/api/v1/orders?page=1&limit=10", None)
        .await;
    let body = read_json(response).await;
    let card_order = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|o| o["items"][0]["name"] == "Plato Dos")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/orders/{card_order}/payments"),
            None,
        )
        .await;
    let payment_id = read_json(response).await["data"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();
    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/payments/{payment_id}/refund"),
            Some(json!({})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let today = Utc::now().date_naive();
    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/reports/payment-methods?from={today}"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let rows = body["data"].as_array().unwrap();

    let cash = rows.iter().find(|r| r["method"] == "CASH").unwrap();
    assert_eq!(cash["count"], 1);
    assert_eq!(dec_field(&cash["amount"]), dec!(51.60));

    let card = rows.iter().find(|r| r["method"] == "CARD").unwrap();
    assert_eq!(card["count"], 2);
    assert_eq!(dec_field(&card["amount"]), dec!(0.00));
}

#[tokio::test]
async fn top_items_rank_by_quantity_sold() {
    let app = TestApp::new().await;
    sell(&app, "Estrella", "10.00", 5, "CASH").await;
    sell(&app, "Segundo", "80.00", 2, "CASH").await;

    let today = Utc::now().date_naive();
    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/reports/top-items?from={today}&limit=1"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Estrella");
    assert_eq!(rows[0]["quantity_sold"], 5);
    assert_eq!(dec_field(&rows[0]["revenue"]), dec!(50.00));
}

#[tokio::test]
async fn shifts_clock_in_and_out_once() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/shifts/clock-in",
            Some(json!({ "staff_name": "Rosa", "role": "waiter" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let shift_id = read_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    // Rosa is already on the clock.
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/shifts/clock-in",
            Some(json!({ "staff_name": "Rosa", "role": "waiter" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // A different name opens its own shift.
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/shifts/clock-in",
            Some(json!({ "staff_name": "Diego", "role": "kitchen" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/shifts/{shift_id}/clock-out"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert!(!body["data"]["clock_out"].is_null());

    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/shifts/{shift_id}/clock-out"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let today = Utc::now().date_naive();
    let response = app
        .request_authenticated(Method::GET, &format!("/api/v1/shifts?from={today}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}
