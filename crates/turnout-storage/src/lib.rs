// Postgres storage layer with sqlx
//
// This crate provides the database implementation of the core EventStore
// trait. The register path runs inside a transaction holding a row lock on
// the event, which serializes concurrent registrations per event.

pub mod event_store;
pub mod models;
pub mod repositories;

pub use models::*;
pub use repositories::Database;
