//! In-memory response cache and the `x-twist-status` header values.
//!
//! Keys come from [`crate::hashing::request_key`]: a BLAKE3 hash of an endpoint
//! namespace plus the canonical JSON of the validated request.

mod response;
mod types;

pub use response::ResponseCache;
pub use types::{TWIST_STATUS_ERROR, TWIST_STATUS_HEADER, TWIST_STATUS_HEALTHY, TwistStatus};
