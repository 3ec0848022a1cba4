//! Database entities (sea-orm models).
//!
//! Status columns are stored as upper-case strings; the corresponding enums
//! with transition rules live in the owning service modules.

pub mod dining_table;
pub mod inventory_item;
pub mod inventory_movement;
pub mod menu_item;
pub mod order;
pub mod order_counter;
pub mod order_item;
pub mod payment;
pub mod recipe;
pub mod recipe_ingredient;
pub mod reservation;
pub mod restaurant;
pub mod staff_shift;
