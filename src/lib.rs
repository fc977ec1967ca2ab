pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod estimator;
pub mod provider;
pub mod repo;
pub mod sync;
pub mod telemetry;
