//! HTTP status endpoints

pub mod routes;

pub use routes::build_router;
