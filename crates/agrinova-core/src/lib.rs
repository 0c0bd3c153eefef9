//! # agrinova-core
//!
//! Foundation pieces shared by every AgriNova crate:
//!
//! - [`Capability`]: an optional collaborator resolved once at startup
//! - [`logging`]: `tracing` subscriber initialization

#![deny(unsafe_code)]

pub mod capability;
pub mod logging;

pub use capability::Capability;
pub use logging::{LogFormat, init_subscriber};
