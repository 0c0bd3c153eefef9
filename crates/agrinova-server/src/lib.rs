//! # agrinova-server
//!
//! Axum HTTP server for the AgriNova ML service.
//!
//! - [`context::ServiceContext`]: immutable startup state (retriever plus
//!   optional language capabilities), built before the listener binds
//! - Endpoints: `/retrieve`, `/embed`, `/transcribe`, `/translate`, `/tts`,
//!   `/health`, `/metrics`
//! - Errors rendered as `{"error": ...}` with kind-specific status codes
//! - Graceful shutdown via `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod context;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod metrics;
pub mod server;
pub mod shutdown;

pub use config::ServerConfig;
pub use context::{InitError, ServiceContext};
pub use errors::ApiError;
pub use server::{AgriServer, AppState, build_router};
pub use shutdown::ShutdownCoordinator;
