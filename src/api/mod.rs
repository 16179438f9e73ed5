//! Remote inventory API client helpers.

/// Login and token extraction.
pub mod auth;
/// Shared HTTP client with bearer attachment.
pub mod client;
/// API error taxonomy.
pub mod error;
/// Session token persistence.
pub mod session;
/// Store list fetching.
pub mod stores;
/// ASN file upload with progress reporting.
pub mod upload;
