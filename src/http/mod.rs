//! HTTP plumbing shared by both services.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → request.rs (X-Request-ID, "unknown" when absent or unreadable)
//!     → middleware.rs (trace span, metrics, panic boundary, timeout)
//!     → service handlers (data_service / gateway)
//!     → response echoes X-Request-ID
//! ```

pub mod middleware;
pub mod request;

pub use middleware::{apply_common_layers, ErrorResponder, ErrorResponders};
pub use request::{
    normalize_request_id, RequestId, UnknownRequestId, UNKNOWN_REQUEST_ID, X_REQUEST_ID,
};
