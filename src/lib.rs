//! travel-providers - Pluggable travel inventory supplier library
//!
//! This library provides a uniform way to search external suppliers:
//! - Capability traits for hotel, flight and activity search
//! - Adapters for Hotelbeds, Duffel and Viator
//! - A registry of adapter constructors and UI-facing definitions
//! - A factory owning configuration, per-tenant selection and persistence

pub mod cli;
pub mod domain;
pub mod error;
pub mod factory;
pub mod output;
pub mod progress;
pub mod providers;
pub mod registry;
pub mod settings;
pub mod store;
