//! Docker Health Monitor
//!
//! Polls the local container host, ranks containers by health, infers
//! dependencies from their environment and renders the result as a live
//! terminal dashboard.

pub mod app;
pub mod cli;
pub mod core;
pub mod screens;
pub mod utils;
pub mod widgets;
