//! HTTP protocol layer module
//!
//! Range parsing, MIME detection, path confinement, response builders and
//! the streaming file body. Nothing here knows about request dispatch.

pub mod body;
pub mod mime;
pub mod path;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use body::{FileStream, ResponseBody};
pub use range::{parse_range_header, RangeParseResult, RangeSpec};
pub use response::{
    build_400_response, build_404_response, build_416_response, build_500_response,
    build_full_response, build_options_response, build_partial_response,
};
