//! Async Rust client for the natsboard control-plane REST API.
//!
//! This crate is deliberately thin: typed wire models, a shared
//! [`TransportConfig`], and a [`ControlPlaneClient`] exposing the
//! read-side introspection operations the resource-tree engine in
//! `natsboard-core` consumes. Mutation endpoints (cluster/account/user
//! CRUD) are plain form-to-endpoint glue and live with their callers.

pub mod client;
pub mod error;
pub mod introspection;
pub mod transport;
pub mod types;

pub use client::ControlPlaneClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use types::{
    AccountSummary, ClusterSummary, ConsumersResponse, DetectionResponse, ResourceStatus,
    StreamDetail,
};
