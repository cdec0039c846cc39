pub mod client;
pub mod mutations;
pub mod queries;
pub mod types;

pub use client::{LynkClient, SbomDocument, DEFAULT_API_URL};
