mod common;

use axum::http::{Method, StatusCode};
use common::{read_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn requests_without_a_token_are_unauthorized() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/orders", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request(Method::GET, "/api/v1/orders", None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn the_capability_table_gates_each_role() {
    let app = TestApp::new().await;
    let item = app
        .seed_menu_item(app.restaurant_id, "Mains", "Anticuchos", dec!(20.00))
        .await;

    let order_body = json!({
        "items": [{ "menu_item_id": item, "quantity": 1 }],
        "guest_count": 1,
    });

    // Kitchen staff read and update orders but never create them.
    let kitchen = app.token_for("kitchen", Some(app.restaurant_id));
    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(order_body.clone()),
            Some(&kitchen),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .request(Method::GET, "/api/v1/orders", None, Some(&kitchen))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Cashiers process payments but cannot refund them.
    let cashier = app.token_for("cashier", Some(app.restaurant_id));
    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(order_body),
            Some(&cashier),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let order = read_json(response).await;
    let order_id = order["data"]["id"].as_str().unwrap();
    let total = order["data"]["total"].as_str().unwrap();

    let response = app
        .request(
            Method::POST,
            "/api/v1/payments",
            Some(json!({ "order_id": order_id, "amount": total, "method": "CASH" })),
            Some(&cashier),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let payment_id = read_json(response).await["data"]["payment"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/payments/{payment_id}/refund"),
            Some(json!({})),
            Some(&cashier),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The manager can.
    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/payments/{payment_id}/refund"),
            Some(json!({})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Waiters never see inventory.
    let waiter = app.token_for("waiter", Some(app.restaurant_id));
    let response = app
        .request(Method::GET, "/api/v1/inventory", None, Some(&waiter))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Unknown roles hold no permissions at all.
    let intern = app.token_for("intern", Some(app.restaurant_id));
    let response = app
        .request(Method::GET, "/api/v1/orders", None, Some(&intern))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn tenants_never_see_each_other() {
    let app = TestApp::new().await;
    let item = app
        .seed_menu_item(app.restaurant_id, "Mains", "Chaufa", dec!(28.00))
        .await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "items": [{ "menu_item_id": item, "quantity": 1 }],
                "guest_count": 1,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let order_id = read_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let other = app.seed_restaurant("La Otra Esquina", "la-otra-esquina").await;
    let other_manager = app.token_for("manager", Some(other));

    // Foreign orders are invisible, not forbidden.
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/orders/{order_id}"),
            None,
            Some(&other_manager),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .request(Method::GET, "/api/v1/orders", None, Some(&other_manager))
        .await;
    let body = read_json(response).await;
    assert_eq!(body["data"]["total"], 0);

    // Order numbers restart per tenant.
    let foreign_item = app
        .seed_menu_item(other, "Mains", "Plato Unico", dec!(15.00))
        .await;
    let response = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "items": [{ "menu_item_id": foreign_item, "quantity": 1 }],
                "guest_count": 1,
            })),
            Some(&other_manager),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["data"]["order_number"], "ORD-000001");
}

#[tokio::test]
async fn super_admin_bypasses_the_capability_table() {
    let app = TestApp::new().await;
    let admin = app.token_for("super_admin", Some(app.restaurant_id));

    let response = app
        .request(Method::GET, "/api/v1/inventory", None, Some(&admin))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(Method::GET, "/api/v1/reports/low-stock", None, Some(&admin))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}
