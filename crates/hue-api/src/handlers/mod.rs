//! Request handlers for the dashboard API

pub mod health;
pub mod rooms;
