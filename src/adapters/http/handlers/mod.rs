pub mod auth;
pub mod catalog;
pub mod health;
pub mod import;
pub mod races;
pub mod simulations;
