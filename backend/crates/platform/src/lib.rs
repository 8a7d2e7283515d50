//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (HMAC-SHA256, Base64, constant-time compare)
//! - Cookie and bearer-token extraction
//! - Identity token verification for the external identity provider
//! - In-memory fixed-window rate limiting
//! - Bounded exponential-backoff retries
//! - Environment configuration helpers
//! - Security response headers

pub mod config;
pub mod cookie;
pub mod crypto;
pub mod headers;
pub mod identity;
pub mod rate_limit;
pub mod retry;
