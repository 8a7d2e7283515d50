//! Infrastructure Layer
//!
//! Database pools and repository, upstream model client.

pub mod gemini;
pub mod postgres;
pub mod store;
