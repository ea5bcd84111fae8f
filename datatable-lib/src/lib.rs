//! # Data Table
//!
//! A headless, generically typed data table: server-side pagination,
//! debounced search and expandable rows whose sub-data is either embedded in
//! the row or fetched on first expansion and cached.
//!
//! [`table::DataTable`] owns the state; [`ListClient`] talks to the list
//! endpoints.

pub mod error;
pub mod model;
pub mod table;

mod client;
mod provider;
mod response;

pub use client::*;
pub use provider::*;
pub use response::*;
