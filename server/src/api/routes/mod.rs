//! API route handlers

pub mod auth;
pub mod categories;
pub mod health;
pub mod microposts;
pub mod ranking;
pub mod test;
pub mod users;
pub mod views;
