pub mod adapters;
pub mod config;
pub mod error;
pub mod web;

pub use web::build_router;
