//! Serper (Google search) API client.

pub mod client;
mod types;

pub use client::{PaperSearch, SerperClient, SerperError};
pub use types::OrganicResult;
