//! API Module
//!
//! HTTP handlers and routing for the meme API.
//!
//! # Endpoints
//! - `GET /` - Random record(s) from every feed
//! - `GET /:feed` - Random record(s) from one feed
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
