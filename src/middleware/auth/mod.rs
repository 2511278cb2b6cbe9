//! Request-side auth pipeline.
//!
//! Order per request:
//! 1. `claims`: decode the bearer token without verifying it, attach `CurrentUser` (never rejects)
//! 2. `access`: look up the matched route's declared roles and run the access guard
pub mod access;
pub mod claims;
