//! # Mock user API
//!
//! A small hyper server answering the list endpoints consumed by
//! `datatable-lib`: paginated, searchable users, users with embedded tasks,
//! and per-user tasks for on-demand expansion.

mod config;
mod error;
mod server;

pub mod data;
pub mod routes;

pub use config::*;
pub use error::*;
pub use server::*;
