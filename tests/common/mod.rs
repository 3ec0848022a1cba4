#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
    Router,
};
use chrono::Utc;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use resto_api::{
    auth::Claims,
    config::AppConfig,
    db,
    entities::{dining_table, inventory_item, menu_item, recipe, recipe_ingredient, restaurant},
    events::{self, EventSender},
    handlers::AppServices,
    realtime::RealtimeHub,
    AppState,
};

const TEST_JWT_SECRET: &str = "test_secret_key_for_testing_purposes_only_32chars";

/// Harness that spins up the full router against a throwaway SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    /// Default tenant seeded by `new`.
    pub restaurant_id: Uuid,
    token: String,
    _tmp: TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Fresh application with one active restaurant and a manager token.
    pub async fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir for test database");
        let db_path = tmp.path().join("resto_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            TEST_JWT_SECRET.to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::init_schema(&pool)
            .await
            .expect("failed to initialize schema in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let hub = Arc::new(RealtimeHub::new());
        let event_task = tokio::spawn(events::process_events(event_rx, hub.clone()));

        let services = AppServices::new(db_arc.clone(), event_sender.clone(), &cfg);

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            realtime: hub,
            services,
        };

        let router = Router::new()
            .nest("/api/v1", resto_api::api_v1_routes())
            .with_state(state.clone());

        let mut app = Self {
            router,
            state,
            restaurant_id: Uuid::nil(),
            token: String::new(),
            _tmp: tmp,
            _event_task: event_task,
        };

        app.restaurant_id = app.seed_restaurant("Casa Mariscal", "casa-mariscal").await;
        app.token = app.token_for("manager", Some(app.restaurant_id));
        app
    }

    /// Bearer token for the default manager of the seeded restaurant.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Mints a token for an arbitrary role and tenant.
    pub fn token_for(&self, role: &str, restaurant_id: Option<Uuid>) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            name: Some(format!("Test {role}")),
            role: role.to_string(),
            restaurant_id,
            iat: now.timestamp(),
            exp: (now + chrono::Duration::hours(1)).timestamp(),
        };
        jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
        )
        .expect("encode test token")
    }

    /// Sends a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {tok}"));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("build test request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Authenticated request as the default manager.
    pub async fn request_authenticated(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        self.request(method, uri, body, Some(self.token())).await
    }

    pub async fn seed_restaurant(&self, name: &str, slug: &str) -> Uuid {
        let id = Uuid::new_v4();
        restaurant::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            currency: Set("USD".to_string()),
            tax_rate: Set(Decimal::from(19)),
            service_charge_rate: Set(Decimal::from(10)),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed restaurant");
        id
    }

    pub async fn seed_menu_item(
        &self,
        restaurant_id: Uuid,
        category: &str,
        name: &str,
        price: Decimal,
    ) -> Uuid {
        let id = Uuid::new_v4();
        menu_item::ActiveModel {
            id: Set(id),
            restaurant_id: Set(restaurant_id),
            category: Set(category.to_string()),
            name: Set(name.to_string()),
            description: Set(None),
            price: Set(price),
            is_available: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed menu item");
        id
    }

    pub async fn seed_table(&self, restaurant_id: Uuid, number: i32, capacity: i32) -> Uuid {
        let id = Uuid::new_v4();
        dining_table::ActiveModel {
            id: Set(id),
            restaurant_id: Set(restaurant_id),
            number: Set(number),
            capacity: Set(capacity),
            zone: Set(None),
            status: Set("AVAILABLE".to_string()),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed table");
        id
    }

    pub async fn seed_inventory_item(
        &self,
        restaurant_id: Uuid,
        sku: &str,
        name: &str,
        current_stock: Decimal,
        min_stock: Decimal,
        unit_cost: Decimal,
    ) -> Uuid {
        let id = Uuid::new_v4();
        inventory_item::ActiveModel {
            id: Set(id),
            restaurant_id: Set(restaurant_id),
            sku: Set(sku.to_string()),
            name: Set(name.to_string()),
            unit: Set("kg".to_string()),
            current_stock: Set(current_stock),
            min_stock: Set(min_stock),
            unit_cost: Set(unit_cost),
            category: Set(None),
            supplier: Set(None),
            location: Set(None),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed inventory item");
        id
    }

    /// Seeds a recipe with the given (inventory item, quantity per portion)
    /// ingredient lines.
    pub async fn seed_recipe(
        &self,
        restaurant_id: Uuid,
        menu_item_id: Uuid,
        portion_size: Decimal,
        ingredients: &[(Uuid, Decimal)],
    ) -> Uuid {
        let recipe_id = Uuid::new_v4();
        recipe::ActiveModel {
            id: Set(recipe_id),
            restaurant_id: Set(restaurant_id),
            menu_item_id: Set(menu_item_id),
            portion_size: Set(portion_size),
            notes: Set(None),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed recipe");

        for (inventory_item_id, quantity) in ingredients {
            recipe_ingredient::ActiveModel {
                id: Set(Uuid::new_v4()),
                recipe_id: Set(recipe_id),
                inventory_item_id: Set(*inventory_item_id),
                quantity: Set(*quantity),
                unit: Set("kg".to_string()),
            }
            .insert(self.state.db.as_ref())
            .await
            .expect("seed recipe ingredient");
        }
        recipe_id
    }

    /// Current stock of an inventory item, read directly from the database.
    pub async fn stock_of(&self, item_id: Uuid) -> Decimal {
        use sea_orm::EntityTrait;
        inventory_item::Entity::find_by_id(item_id)
            .one(self.state.db.as_ref())
            .await
            .expect("query inventory item")
            .expect("inventory item exists")
            .current_stock
    }

    /// Polls until the item's stock differs from `initial` or the deadline
    /// passes. Stock bookkeeping runs detached from order requests.
    pub async fn wait_for_stock_change(&self, item_id: Uuid, initial: Decimal) -> Decimal {
        for _ in 0..100 {
            let current = self.stock_of(item_id).await;
            if current != initial {
                return current;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        self.stock_of(item_id).await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

/// Deserializes a response body into JSON.
pub async fn read_json(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read response body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("response body is valid json")
}

/// Parses a decimal field serialized as a JSON string.
pub fn dec_field(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("decimal field is a string"))
        .expect("decimal field parses")
}
