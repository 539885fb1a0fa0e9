//! Request failure taxonomy
//!
//! Each variant maps to exactly one response. Failures after the status line
//! has been sent are not represented here: the streaming body logs them.

use crate::http::{self, ResponseBody};
use hyper::Response;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum ServeError {
    /// Path missing, outside the base directory, or not a regular file
    NotFound,
    /// Range header does not match `bytes=<digits?>-<digits?>`
    MalformedRange,
    /// Range is well-formed but lies outside the file
    RangeNotSatisfiable { total: u64 },
    /// The file passed the metadata lookup but could not be opened
    InternalFault(io::Error),
}

impl ServeError {
    pub fn into_response(self) -> Response<ResponseBody> {
        match self {
            Self::NotFound => http::build_404_response(),
            Self::MalformedRange => http::build_400_response(),
            Self::RangeNotSatisfiable { total } => http::build_416_response(total),
            Self::InternalFault(_) => http::build_500_response(),
        }
    }
}

impl fmt::Display for ServeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("file not found"),
            Self::MalformedRange => f.write_str("malformed Range header"),
            Self::RangeNotSatisfiable { total } => {
                write!(f, "range not satisfiable for {total}-byte file")
            }
            Self::InternalFault(e) => write!(f, "failed to open file: {e}"),
        }
    }
}

impl std::error::Error for ServeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InternalFault(e) => Some(e),
            _ => None,
        }
    }
}
