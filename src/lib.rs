//! # Aerodata
//!
//! `aerodata` is a Rust client SDK for the Aerodata flight-data API. It wraps
//! the REST endpoints behind typed resource objects and exposes the push
//! update channel (a Socket.IO-style websocket) through a subscription API
//! with per-topic callbacks.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct responsibility:
//!
//! - `client`: The main entry point owning the HTTP transport and the realtime channel.
//! - `config`: Client settings, built programmatically or loaded from the environment.
//! - `http`: The authenticated HTTP transport with retry and error mapping.
//! - `resources`: Typed resource objects for flights, airports, statistics, export,
//!   batch jobs and webhooks.
//! - `realtime`: The realtime update channel (connection manager, framing codec,
//!   subscription registry, dispatcher).
//! - `utils`: Shared utilities, such as logging setup.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod realtime;
pub mod resources;
pub mod utils;

pub use client::AerodataClient;
pub use config::ClientConfig;
pub use error::{ApiError, RealtimeError};
pub use realtime::{ConnectionState, RealtimeClient, SubscriptionHandle};
