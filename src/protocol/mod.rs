//! Wire protocol between producers, readers, and the aggregator.
//!
//! Text-line framing, one request per connection. The shape is
//! HTTP-like (`PUT <path> HTTP/1.1`, `Content-Length`, a blank line,
//! then the body) but only two verbs and four status codes exist.

mod request;
mod response;

pub use request::{read_request, Request, RequestError};
pub use response::{Response, Status};

pub const HEADER_CONTENT_LENGTH: &str = "Content-Length";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_LAMPORT_CLOCK: &str = "Lamport-Clock";
