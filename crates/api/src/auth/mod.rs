//! Authentication primitives.
//!
//! - [`jwt`] -- HS256 bearer-token validation (and issuance for local use and tests).

pub mod jwt;
