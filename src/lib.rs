//! luma-bot library crate.
//!
//! This module exposes the internal components for integration testing.

pub mod bot;
pub mod cli;
pub mod config;
pub mod luma;
