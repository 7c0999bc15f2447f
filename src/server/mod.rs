//! Server-side API backend and business logic.
//!
//! This module contains the complete backend implementation for the ride-sharing service,
//! including API endpoints, business logic, data access, and background jobs. The backend
//! uses Axum as the web framework and SeaORM for database operations.
//!
//! # Architecture
//!
//! The server follows a layered architecture with clear separation of concerns:
//!
//! - **Controller Layer** (`controller/`) - HTTP request handlers, access control, and DTO conversion
//! - **Service Layer** (`service/`) - Business rules, negotiation workflow, notification fan-out
//! - **Data Layer** (`data/`) - Database operations and entity-to-domain model conversion
//! - **Model Layer** (`model/`) - Domain models and operation-specific parameter types
//! - **Error Layer** (`error/`) - Application error types and HTTP response mapping
//! - **Middleware** (`middleware/`) - Bearer token extraction and authentication guards
//!
//! # Infrastructure
//!
//! - **Configuration** (`config`) - Environment-based application configuration
//! - **State** (`state`) - Shared application state (DB, token service, gateways)
//! - **Startup** (`startup`) - Initialization of database, HTTP client, and gateways
//! - **Router** (`router`) - Route configuration under `/api/v1` and OpenAPI documentation
//! - **Scheduler** (`scheduler/`) - Cron jobs for notification dispatch and offer expiry
//!
//! # Request Flow
//!
//! 1. **Router** receives HTTP request and routes to appropriate controller
//! 2. **Middleware** extracts the bearer token, `AuthGuard` resolves the user
//! 3. **Controller** validates access, converts DTOs to params, calls service
//! 4. **Service** executes business logic inside a transaction and enqueues notifications
//! 5. **Data** queries database, converts entities to domain models
//! 6. **Controller** converts domain model to DTO, returns HTTP response

pub mod config;
pub mod controller;
pub mod data;
pub mod error;
pub mod middleware;
pub mod model;
pub mod router;
pub mod scheduler;
pub mod service;
pub mod startup;
pub mod state;
pub mod util;
