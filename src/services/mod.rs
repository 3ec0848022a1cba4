pub mod inventory;
pub mod menu;
pub mod orders;
pub mod payments;
pub mod recipes;
pub mod reports;
pub mod reservations;
pub mod shifts;
pub mod stock;
pub mod tables;
