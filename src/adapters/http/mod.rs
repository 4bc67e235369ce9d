//! HTTP Read API
//!
//! Thin axum routing over [`QueryService`](crate::application::QueryService):
//! `GET /health`, `GET /scan?limit=N`, `GET /evaluate?mint=<id>`.

mod routes;
mod server;

pub use routes::{create_router, AppState};
pub use server::{build_app, serve};
