//! HTTP server that streams files from a single directory with byte-range
//! support, so media players can seek without downloading whole files.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
