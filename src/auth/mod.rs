//! Bearer-token authentication and role-based authorization.
//!
//! Token issuance happens on the auth platform; this service only verifies
//! JWTs and enforces a single role→permission capability table. Tenant
//! isolation comes from the `restaurant_id` claim; the platform-level
//! `super_admin` role bypasses tenant scoping.

use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::AppState;

pub const ROLE_SUPER_ADMIN: &str = "super_admin";

/// Permission name constants shared by the capability table and handlers.
pub mod consts {
    pub const ORDERS_READ: &str = "orders:read";
    pub const ORDERS_CREATE: &str = "orders:create";
    pub const ORDERS_UPDATE: &str = "orders:update";
    pub const ORDERS_CANCEL: &str = "orders:cancel";
    pub const PAYMENTS_READ: &str = "payments:read";
    pub const PAYMENTS_PROCESS: &str = "payments:process";
    pub const PAYMENTS_REFUND: &str = "payments:refund";
    pub const INVENTORY_READ: &str = "inventory:read";
    pub const INVENTORY_WRITE: &str = "inventory:write";
    pub const RECIPES_READ: &str = "recipes:read";
    pub const RECIPES_WRITE: &str = "recipes:write";
    pub const MENU_READ: &str = "menu:read";
    pub const MENU_WRITE: &str = "menu:write";
    pub const TABLES_READ: &str = "tables:read";
    pub const TABLES_WRITE: &str = "tables:write";
    pub const RESERVATIONS_READ: &str = "reservations:read";
    pub const RESERVATIONS_WRITE: &str = "reservations:write";
    pub const REPORTS_READ: &str = "reports:read";
    pub const SHIFTS_READ: &str = "shifts:read";
    pub const SHIFTS_WRITE: &str = "shifts:write";
}

/// Capability table: the only place permissions are assigned to roles.
/// Handlers check capabilities through `AuthUser::require_permission`, never
/// against literal role lists.
static ROLE_PERMISSIONS: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let mut table: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
    table.insert(
        "manager",
        &[
            "orders:read",
            "orders:create",
            "orders:update",
            "orders:cancel",
            "payments:read",
            "payments:process",
            "payments:refund",
            "inventory:read",
            "inventory:write",
            "recipes:read",
            "recipes:write",
            "menu:read",
            "menu:write",
            "tables:read",
            "tables:write",
            "reservations:read",
            "reservations:write",
            "reports:read",
            "shifts:read",
            "shifts:write",
        ][..],
    );
    table.insert(
        "cashier",
        &[
            "orders:read",
            "orders:create",
            "orders:update",
            "payments:read",
            "payments:process",
            "tables:read",
            "shifts:write",
        ][..],
    );
    table.insert(
        "waiter",
        &[
            "orders:read",
            "orders:create",
            "orders:update",
            "menu:read",
            "tables:read",
            "tables:write",
            "reservations:read",
            "reservations:write",
            "shifts:write",
        ][..],
    );
    table.insert(
        "kitchen",
        &["orders:read", "orders:update", "menu:read", "shifts:write"][..],
    );
    table.insert(
        "stock",
        &[
            "inventory:read",
            "inventory:write",
            "recipes:read",
            "recipes:write",
            "shifts:write",
        ][..],
    );
    table
});

/// Claims carried by tokens issued for this service.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Display name
    pub name: Option<String>,
    /// Single role; permissions derive from the capability table
    pub role: String,
    /// Tenant; absent only for platform-level principals
    pub restaurant_id: Option<Uuid>,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated principal extracted from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub name: Option<String>,
    pub role: String,
    pub restaurant_id: Option<Uuid>,
}

impl AuthUser {
    pub fn is_super_admin(&self) -> bool {
        self.role == ROLE_SUPER_ADMIN
    }

    /// Checks the capability table for the user's role.
    pub fn has_permission(&self, permission: &str) -> bool {
        if self.is_super_admin() {
            return true;
        }
        ROLE_PERMISSIONS
            .get(self.role.as_str())
            .map_or(false, |perms| perms.contains(&permission))
    }

    pub fn require_permission(&self, permission: &str) -> Result<(), ServiceError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(format!(
                "missing permission {permission}"
            )))
        }
    }

    /// Tenant the principal belongs to.
    pub fn require_restaurant(&self) -> Result<Uuid, ServiceError> {
        self.restaurant_id.ok_or_else(|| {
            ServiceError::Forbidden("principal is not scoped to a restaurant".to_string())
        })
    }

    /// Resolves the tenant a request operates on. Regular users always act on
    /// their own restaurant; a super admin may address any tenant explicitly.
    pub fn resolve_restaurant(&self, requested: Option<Uuid>) -> Result<Uuid, ServiceError> {
        if self.is_super_admin() {
            return requested.or(self.restaurant_id).ok_or_else(|| {
                ServiceError::ValidationError("restaurant_id must be provided".to_string())
            });
        }
        let own = self.require_restaurant()?;
        match requested {
            Some(other) if other != own => Err(ServiceError::Forbidden(
                "cannot act on another restaurant".to_string(),
            )),
            _ => Ok(own),
        }
    }
}

/// Decodes and verifies a bearer token.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, ServiceError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| ServiceError::Unauthorized(format!("invalid token: {e}")))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);

        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                ServiceError::Unauthorized("missing authorization header".to_string())
            })?;

        let token = header_value
            .strip_prefix("Bearer ")
            .or_else(|| header_value.strip_prefix("bearer "))
            .ok_or_else(|| {
                ServiceError::Unauthorized("authorization header is not a bearer token".to_string())
            })?;

        let claims = verify_token(token, &app.config.jwt_secret)?;

        Ok(AuthUser {
            user_id: claims.sub,
            name: claims.name,
            role: claims.role,
            restaurant_id: claims.restaurant_id,
        })
    }
}
