//! HTTP server implementation
//!
//! Route handlers, application state, and server assembly.

pub mod auth;
pub mod builder;
pub mod routes;
pub mod server;
pub mod state;

pub use server::HttpServer;
pub use state::AppState;
