//! Primo Core
//!
//! Persistence and reporting engine for the Primo personal task tracker:
//! credential store, session registry, per-user task CRUD over SQLite, and a
//! pure report aggregator. Presentation layers (HTTP routing, templating,
//! export formatting) sit on top of [`service::Service`].

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod report;
pub mod service;
pub mod session;
pub mod types;
