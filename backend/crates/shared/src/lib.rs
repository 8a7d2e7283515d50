//! Shared Kernel
//!
//! Vocabulary every crate in the workspace agrees on:
//! - [`error::app_error::AppError`] and [`error::kind::ErrorKind`], the client-facing error shape
//! - Typed UUID ids for persisted rows

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
