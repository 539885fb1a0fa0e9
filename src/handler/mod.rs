//! Request handler module
//!
//! Request dispatch, file lookup and the mapping from failures to responses.

pub mod error;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use error::ServeError;
pub use router::handle_request;
