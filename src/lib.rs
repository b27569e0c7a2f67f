pub mod aggregate;
pub mod classify;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod reconcile;
pub mod schema;
pub mod table;
