//! Row models

mod record;
mod row;

pub use record::*;
pub use row::*;
