//! Warehouse job service adapter
//!
//! The [`RemoteJobService`] and [`TableService`] traits plus an HTTP
//! implementation of both.

pub mod client;
pub mod models;
pub mod service;

pub use client::WarehouseClient;
pub use service::{RemoteJobService, TableService};
