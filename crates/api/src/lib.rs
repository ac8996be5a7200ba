// SPDX-FileCopyrightText: 2025 Signalworks Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Complaint Triage API Server Implementation
//!
//! This crate provides the main HTTP server for the complaint triage service,
//! built with Axum and designed for production use with comprehensive
//! configuration, middleware, and graceful shutdown capabilities.
//!
//! # Module Structure
//!
//! - [`config`]: Server configuration and environment management with hierarchical loading
//! - [`error`]: Error types and HTTP response handling with proper status codes
//! - [`state`]: Shared application state with eager service construction and per-type
//!   startup-failure capture
//! - [`server`]: Main server implementation, lifecycle, and coordinated shutdown
//! - [`routes`]: Route configuration and HTTP request handlers
//! - [`extractors`]: JSON extraction with detailed parse-error messages
//! - [`metrics`]: Prometheus metrics and the text exposition handler
//! - [`openapi`]: `OpenAPI` specification and Swagger UI endpoints for API documentation
//!
//! # Key Features
//!
//! - **Per-Type Degradation**: A missing artifact takes down one classify route, not the server
//! - **Graceful Shutdown**: Coordinated termination using `CancellationToken`
//! - **Health Monitoring**: Aggregate plus per-classifier availability reporting
//! - **Comprehensive Middleware**: Request tracing, request IDs, CORS, and timeouts

pub mod config;
pub mod error;
pub mod extractors;
pub mod metrics;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{Environment, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use server::{Server, ShutdownConfig};
pub use shared_types::{ClassificationType, ComplaintRequest, ComplaintResponse};
pub use state::{HealthCheck, OverallStatus, ServerState};
