//! tracker-domain
//!
//! Pure domain models (Money, Transaction, Friend, UserProfile).
//! No I/O, no CLI, no backend access. Only data types and core enums.

pub mod common;
pub mod friend;
pub mod money;
pub mod transaction;
pub mod user;

pub use common::*;
pub use friend::*;
pub use money::*;
pub use transaction::*;
pub use user::*;
