//! Value Object Module

pub mod account_kind;
pub mod account_status;
pub mod email;

pub use account_kind::AccountKind;
pub use account_status::AccountStatus;
pub use email::Email;
