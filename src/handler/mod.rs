//! Request handler module
//!
//! Method filtering, health check, and dispatch into the mapping/resolution
//! pipeline.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
