mod common;

use axum::http::{Method, StatusCode};
use common::{dec_field, read_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn inventory_items_are_created_and_moved_through_the_ledger() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/inventory",
            Some(json!({
                "sku": "FISH-001",
                "name": "Sea Bass",
                "unit": "kg",
                "current_stock": "10",
                "min_stock": "3",
                "unit_cost": "12.50",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let item_id: uuid::Uuid = read_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();

    // Duplicate SKU within the tenant is rejected.
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/inventory",
            Some(json!({ "sku": "FISH-001", "name": "Other Fish", "unit": "kg" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Incoming delivery credits stock and refreshes the unit cost.
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/inventory/movements",
            Some(json!({
                "inventory_item_id": item_id,
                "movement_type": "IN",
                "quantity": "5",
                "unit_cost": "13.00",
                "reference": "PO-77",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .request_authenticated(Method::GET, &format!("/api/v1/inventory/{item_id}"), None)
        .await;
    let body = read_json(response).await;
    assert_eq!(dec_field(&body["data"]["current_stock"]), dec!(15));
    assert_eq!(dec_field(&body["data"]["unit_cost"]), dec!(13.00));

    // Loss debits are clamped at zero rather than going negative.
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/inventory/movements",
            Some(json!({
                "inventory_item_id": item_id,
                "movement_type": "LOSS",
                "quantity": "50",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(dec_field(&body["data"]["quantity"]), dec!(50));
    assert_eq!(dec_field(&body["data"]["applied_quantity"]), dec!(15));
    assert_eq!(app.stock_of(item_id).await, dec!(0));

    let response = app
        .request_authenticated(
            Method::GET,
            &format!("/api/v1/inventory/movements?item_id={item_id}"),
            None,
        )
        .await;
    let body = read_json(response).await;
    assert_eq!(body["data"]["total"], 2);
}

#[tokio::test]
async fn transfers_move_stock_atomically() {
    let app = TestApp::new().await;
    let bar = app
        .seed_inventory_item(app.restaurant_id, "GIN-001", "Gin (bar)", dec!(4), dec!(1), dec!(30))
        .await;
    let store = app
        .seed_inventory_item(app.restaurant_id, "GIN-002", "Gin (store)", dec!(10), dec!(2), dec!(30))
        .await;

    // Insufficient source stock fails without touching either side.
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/inventory/transfer",
            Some(json!({
                "from_item_id": bar,
                "to_item_id": store,
                "quantity": "9",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.stock_of(bar).await, dec!(4));
    assert_eq!(app.stock_of(store).await, dec!(10));

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/inventory/transfer",
            Some(json!({
                "from_item_id": store,
                "to_item_id": bar,
                "quantity": "6",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.stock_of(store).await, dec!(4));
    assert_eq!(app.stock_of(bar).await, dec!(10));
}

#[tokio::test]
async fn orders_deduct_recipe_ingredients() {
    let app = TestApp::new().await;
    let rice = app
        .seed_inventory_item(app.restaurant_id, "RICE-001", "Rice", dec!(20), dec!(5), dec!(2))
        .await;
    let duck = app
        .seed_inventory_item(app.restaurant_id, "DUCK-001", "Duck", dec!(8), dec!(2), dec!(15))
        .await;
    let dish = app
        .seed_menu_item(app.restaurant_id, "Mains", "Arroz con Pato", dec!(42.00))
        .await;
    app.seed_recipe(
        app.restaurant_id,
        dish,
        dec!(1),
        &[(rice, dec!(0.2)), (duck, dec!(0.5))],
    )
    .await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "items": [{ "menu_item_id": dish, "quantity": 3 }],
                "guest_count": 3,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Deduction runs detached from the order request.
    assert_eq!(app.wait_for_stock_change(rice, dec!(20)).await, dec!(19.4));
    assert_eq!(app.wait_for_stock_change(duck, dec!(8)).await, dec!(6.5));
}

#[tokio::test]
async fn cancellation_restores_only_what_was_taken() {
    let app = TestApp::new().await;
    // Only 1kg in stock while the order needs 2kg; deduction clamps at zero.
    let fish = app
        .seed_inventory_item(app.restaurant_id, "FISH-002", "Snapper", dec!(1), dec!(0), dec!(18))
        .await;
    let dish = app
        .seed_menu_item(app.restaurant_id, "Mains", "Ceviche", dec!(45.00))
        .await;
    app.seed_recipe(app.restaurant_id, dish, dec!(1), &[(fish, dec!(0.5))])
        .await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "items": [{ "menu_item_id": dish, "quantity": 4 }],
                "guest_count": 4,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    let order_id = body["data"]["id"].as_str().unwrap().to_string();
    let order_number = body["data"]["order_number"].as_str().unwrap().to_string();

    assert_eq!(app.wait_for_stock_change(fish, dec!(1)).await, dec!(0));

    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/cancel"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Restoration credits the applied 1kg, not the unclamped 2kg intent.
    assert_eq!(app.wait_for_stock_change(fish, dec!(0)).await, dec!(1));

    // Restoring the same order again is a no-op.
    app.state
        .services
        .stock
        .restore_for_order(app.restaurant_id, &order_number)
        .await
        .expect("second restoration succeeds");
    assert_eq!(app.stock_of(fish).await, dec!(1));
}

#[tokio::test]
async fn items_without_recipes_do_not_touch_inventory() {
    let app = TestApp::new().await;
    let flour = app
        .seed_inventory_item(app.restaurant_id, "FLOUR-001", "Flour", dec!(25), dec!(5), dec!(1))
        .await;
    let drink = app
        .seed_menu_item(app.restaurant_id, "Drinks", "Bottled Water", dec!(3.00))
        .await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "items": [{ "menu_item_id": drink, "quantity": 2 }],
                "guest_count": 1,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert_eq!(app.stock_of(flour).await, dec!(25));
}

#[tokio::test]
async fn low_stock_surfaces_after_deduction() {
    let app = TestApp::new().await;
    // 5 in stock with a reorder threshold of 5; one portion takes it to 4.
    let pisco = app
        .seed_inventory_item(app.restaurant_id, "PISCO-001", "Pisco", dec!(5), dec!(5), dec!(25))
        .await;
    let cocktail = app
        .seed_menu_item(app.restaurant_id, "Drinks", "Pisco Sour", dec!(18.00))
        .await;
    app.seed_recipe(app.restaurant_id, cocktail, dec!(1), &[(pisco, dec!(1))])
        .await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/orders",
            Some(json!({
                "items": [{ "menu_item_id": cocktail, "quantity": 1 }],
                "guest_count": 1,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(app.wait_for_stock_change(pisco, dec!(5)).await, dec!(4));

    let response = app
        .request_authenticated(Method::GET, "/api/v1/inventory/low-stock", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let skus: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["sku"].as_str().unwrap())
        .collect();
    assert!(skus.contains(&"PISCO-001"));
}

#[tokio::test]
async fn availability_reports_shortages_without_mutating_stock() {
    let app = TestApp::new().await;
    let crab = app
        .seed_inventory_item(app.restaurant_id, "CRAB-001", "Crab", dec!(2), dec!(1), dec!(22))
        .await;
    let dish = app
        .seed_menu_item(app.restaurant_id, "Mains", "Crab Cakes", dec!(35.00))
        .await;
    app.seed_recipe(app.restaurant_id, dish, dec!(1), &[(crab, dec!(1))])
        .await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/inventory/availability",
            Some(json!({ "lines": [{ "menu_item_id": dish, "quantity": 5 }] })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["available"], false);
    let shortage = &body["data"]["shortages"][0];
    assert_eq!(dec_field(&shortage["required"]), dec!(5));
    assert_eq!(dec_field(&shortage["available"]), dec!(2));

    assert_eq!(app.stock_of(crab).await, dec!(2));

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/inventory/availability",
            Some(json!({ "lines": [{ "menu_item_id": dish, "quantity": 2 }] })),
        )
        .await;
    let body = read_json(response).await;
    assert_eq!(body["data"]["available"], true);
}
