//! Command-line client for the Interlynk platform.
//!
//! Lists products and versions, reports SBOM processing status, and
//! uploads or downloads SBOMs over the Interlynk GraphQL API.

pub mod api;
pub mod ci;
pub mod cli;
pub mod commands;
pub mod config;
pub mod formatters;
pub mod request;
pub mod resolver;
pub mod retry;
pub mod shared;
pub mod timeutil;
