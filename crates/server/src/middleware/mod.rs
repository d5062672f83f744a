//! HTTP middleware stack for the loyalty API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction tracing)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded on the span, echoed in the response)
//! 4. CORS
//! 5. Security headers
//! 6. Rate limiting on `/api/auth` (governor)
//!
//! Bearer token checks are extractors in [`auth`], applied per handler.

pub mod auth;
pub mod cors;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use auth::{CurrentAdmin, CurrentGuest, RequireAdmin, RequireGuest};
pub use cors::cors_layer;
pub use rate_limit::auth_rate_limiter;
pub use request_id::{RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
