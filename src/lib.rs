//! Pica Loco API documentation relay
//!
//! Fetches the OpenAPI document a Supabase project generates for its REST API,
//! overlays the Pica Loco metadata, caches it in memory and serves it through a
//! Swagger UI page.
//!
//! # Features
//!
//! - Fetch the document from `{SUPABASE_URL}/rest/v1/` with the anon key attached
//! - Overlay fixed title, description, version, contact and server list
//! - Cache the enhanced document for a configurable freshness window
//! - Serve a placeholder document until the first fetch succeeds, and whenever
//!   the backend cannot be reached and nothing was cached
//!
//! # Modules
//!
//! - [`config`]: Backend URL and credential
//! - [`fetcher`]: Outbound request and error classification
//! - [`enhancer`]: The document type and the metadata overlay
//! - [`cache`]: Single-entry cache with freshness checks
//! - [`fallback`]: Placeholder document
//! - [`docs`]: Adapter handing the best available document to the UI
//! - [`ui`]: Swagger UI page rendering
//! - [`server`]: HTTP routes and logging setup

pub mod cache;
pub mod config;
pub mod docs;
pub mod enhancer;
pub mod error;
pub mod fallback;
pub mod fetcher;
pub mod server;
pub mod ui;
