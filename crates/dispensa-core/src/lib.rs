//! # Dispensa Core
//!
//! Shared foundation for the Dispensa reminder engine:
//! - **Types**: tracked items, reminder requests, permission state
//! - **Traits**: the `DispatchFacility` contract every delivery backend implements
//! - **Config**: TOML configuration under `~/.dispensa/`
//! - **Errors**: the `DispensaError` / `Result` pair used across all crates

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::{DispatchConfig, DispensaConfig, ReminderConfig};
pub use error::{DispensaError, Result};
pub use traits::DispatchFacility;
pub use types::{
    AppSettings, ItemStatus, OutstandingReminder, PermissionOptions, PermissionStatus,
    ReminderContent, ReminderKind, ReminderRequest, Theme, TrackedItem, TriggerKind,
};
