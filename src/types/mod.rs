//! Public types for the MedSource interceptor.

mod envelope;
mod request;
mod response;

pub use envelope::ApiEnvelope;
pub use request::{CacheMode, Destination, Request};
pub use response::{Response, ResponseSource};
