//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request span with `request_id` field)
//! 3. Request ID (span field, [`RequestId`] extension, echoed header)
//! 4. CORS (development only)
//! 5. Security headers
//!
//! Authentication is an extractor ([`RequireAuth`]) rather than a layer, so
//! public routes never pay for token verification.

pub mod auth;
pub mod request_id;
pub mod security_headers;

pub use auth::{RequireAuth, TokenSubject};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
