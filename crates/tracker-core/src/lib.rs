//! tracker-core
//!
//! Ledger aggregation, validation, and the services behind every screen of the
//! budget tracker. Depends on tracker-domain. No CLI, no terminal I/O; all
//! persistence goes through the [`backend`] traits.

pub mod auth_service;
pub mod backend;
pub mod dashboard_service;
pub mod error;
pub mod friend_service;
pub mod ledger;
pub mod live;
pub mod memory;
pub mod profile_service;
pub mod records;
pub mod time;
pub mod transaction_service;
pub mod validation;

pub use auth_service::*;
pub use backend::{
    AuthProvider, AuthUser, BackendClient, ChangeEvent, ChangeKind, Document, DocumentStore,
    Subscription,
};
pub use dashboard_service::*;
pub use error::{AuthErrorCode, AuthFlow, CoreError, ValidationError};
pub use friend_service::*;
pub use ledger::{ActivityEntry, DebtStanding, Perspective, WeeklySpending};
pub use live::LiveDashboard;
pub use memory::{BackendState, MemoryBackend};
pub use profile_service::*;
pub use records::{DecodeReport, Decoded};
pub use time::{Clock, FixedClock, SystemClock};
pub use transaction_service::*;
pub use validation::PasswordStrength;

#[cfg(test)]
mod tests;
