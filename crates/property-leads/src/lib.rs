//! Lead capture, scoring, and agent notification for property sales teams.
//!
//! The crate exposes the domain services (`leads`, `auth`, `notify`), the store adapters they
//! run against, and the HTTP routers the API service mounts.

pub mod agents;
pub mod auth;
pub mod config;
pub mod error;
pub mod health;
pub mod leads;
pub mod notify;
pub mod repository;
pub mod store;
pub mod telemetry;
