//! Shared Kernel
//!
//! Vocabulary shared by every crate in the workspace:
//! - Typed identifiers ([`id::Id`])
//! - The unified error type ([`error::app_error::AppError`]) and its
//!   classification ([`error::kind::ErrorKind`])
//!
//! Nothing here knows about accounts, passwords or tokens.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
