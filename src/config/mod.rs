//! # Configuration Module
//!
//! Runtime configuration for the analysis flow: the model credential and
//! endpoint, photo preparation limits, the cost policy and card export size.

pub mod config;

pub use config::AppConfig;
