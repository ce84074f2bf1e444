//! Core types and configuration for lambdalocal.
//!
//! This crate defines the `lambdalocal.toml` schema ([`LambdaLocalConfig`]),
//! the function template loader ([`ResourceDescriptor`]), and shared error
//! types.

pub mod config;
pub mod error;
pub mod template;

pub use config::{EndpointConfig, GatewayConfig, LambdaLocalConfig, ProxyConfig};
pub use error::{Error, Result};
pub use template::{DEFAULT_RUNTIME, ResourceDescriptor};
