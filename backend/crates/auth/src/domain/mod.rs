//! Domain Layer
//!
//! Contains entities, value objects, the lockout state machine and
//! repository traits.

pub mod clock;
pub mod entity;
pub mod lockout;
pub mod repository;
pub mod value_object;

// Re-exports
pub use clock::{Clock, SystemClock};
pub use entity::Account;
pub use lockout::{LockoutPolicy, LockoutUpdate};
pub use repository::AccountRepository;
