//! Reports over an exported personal-finance transaction log.
//!
//! - [`io`] loads the pipe-delimited export into [`types::Transaction`] values
//! - [`engine`] builds month, category, top-expense and overall reports
//! - [`render`] turns the reports into plain text

pub mod engine;
pub mod errors;
pub mod io;
pub mod render;
pub mod types;
