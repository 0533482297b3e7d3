//! Core of a browser-style chat demo: mock authentication against a static
//! directory, durable conversations in a JSON key-value store, and canned
//! AI replies selected by keyword with simulated latency.
//!
//! The presentation layer (see `src/main.rs` for a terminal one) holds a
//! [`ChatApp`] and renders what it returns; every invariant lives here.

pub mod agent;
pub mod app;
pub mod errors;
pub mod export;
pub mod models;
pub mod repo;
pub mod service;
pub mod store;

pub use app::ChatApp;
pub use errors::AppError;
