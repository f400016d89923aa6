//! `concordia-curves` library crate.
//!
//! The binary (`concordia`) is a thin wrapper around this library so that:
//!
//! - the geometry engine is testable without spawning processes
//! - a renderer can depend on the engine without the CLI
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod curve;
pub mod data;
pub mod domain;
pub mod ellipse;
pub mod error;
pub mod math;
pub mod report;
