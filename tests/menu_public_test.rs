mod common;

use axum::http::{Method, StatusCode};
use common::{dec_field, read_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn menu_crud_and_recipe_costing() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/menu",
            Some(json!({
                "category": "Mains",
                "name": "Tiradito",
                "description": "Thin-sliced fish",
                "price": "38.00",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let menu_item_id = read_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let fish = app
        .seed_inventory_item(app.restaurant_id, "FISH-010", "Flounder", dec!(10), dec!(2), dec!(20))
        .await;
    let lime = app
        .seed_inventory_item(app.restaurant_id, "LIME-001", "Lime", dec!(50), dec!(10), dec!(0.50))
        .await;

    // Ingredient quantities must be positive.
    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/menu/{menu_item_id}/recipe"),
            Some(json!({
                "ingredients": [{ "inventory_item_id": fish, "quantity": "0", "unit": "kg" }],
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/menu/{menu_item_id}/recipe"),
            Some(json!({
                "portion_size": "1",
                "ingredients": [
                    { "inventory_item_id": fish, "quantity": "0.3", "unit": "kg" },
                    { "inventory_item_id": lime, "quantity": "4", "unit": "pcs" },
                ],
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    // 0.3 x 20 + 4 x 0.50 per portion.
    assert_eq!(dec_field(&body["data"]["cost"]), dec!(8.00));
    assert_eq!(body["data"]["ingredients"].as_array().unwrap().len(), 2);

    // Upsert replaces the ingredient list wholesale.
    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/menu/{menu_item_id}/recipe"),
            Some(json!({
                "ingredients": [{ "inventory_item_id": fish, "quantity": "0.5", "unit": "kg" }],
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/menu/{menu_item_id}/recipe"),
            None,
        )
        .await;
    let body = read_json(response).await;
    assert_eq!(body["data"]["ingredients"].as_array().unwrap().len(), 1);
    assert_eq!(dec_field(&body["data"]["cost"]), dec!(10.00));

    let response = app
        .request_authenticated(
            Method::DELETE,
            &format!("/api/v1/menu/{menu_item_id}/recipe"),
            None,
        )
        .await;
    assert!(response.status().is_success());

    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/menu/{menu_item_id}/recipe"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn digital_menu_is_public_and_groups_by_category() {
    let app = TestApp::new().await;
    app.seed_menu_item(app.restaurant_id, "Drinks", "Chicha Morada", dec!(7.00))
        .await;
    app.seed_menu_item(app.restaurant_id, "Mains", "Ceviche", dec!(45.00))
        .await;
    let off_menu = app
        .seed_menu_item(app.restaurant_id, "Mains", "Sold Out Dish", dec!(30.00))
        .await;
    app.request_authenticated(
        Method::PUT,
        &format!("/api/v1/menu/{off_menu}/availability"),
        Some(json!({ "is_available": false })),
    )
    .await;

    // No bearer token required.
    let response = app
        .request(Method::GET, "/api/v1/public/menu/casa-mariscal", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let menu = &body["data"];
    assert_eq!(menu["restaurant"], "Casa Mariscal");
    assert_eq!(menu["currency"], "USD");

    let categories = menu["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 2);
    let mains = categories
        .iter()
        .find(|c| c["category"] == "Mains")
        .unwrap();
    let names: Vec<&str> = mains["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Ceviche"));
    assert!(!names.contains(&"Sold Out Dish"));

    let response = app
        .request(Method::GET, "/api/v1/public/menu/no-such-slug", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn table_qr_payload_points_at_the_digital_menu() {
    let app = TestApp::new().await;
    let table_id = app.seed_table(app.restaurant_id, 14, 2).await;

    let response = app
        .request_authenticated(Method::GET, &format!("/api/v1/tables/{table_id}/qr"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let payload = &body["data"];
    assert_eq!(payload["table_number"], 14);
    assert_eq!(
        payload["url"],
        "http://localhost:8080/menu/casa-mariscal?table=14"
    );
}
