//! Trait contracts between the engine and external systems.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{OutstandingReminder, PermissionOptions, PermissionStatus, ReminderRequest};

/// Contract of the notification dispatch facility.
///
/// The facility is the system of record for outstanding reminders: the engine
/// issues schedule and cancel calls through this trait and re-reads the
/// outstanding set instead of keeping its own copy. Implementations live in
/// `dispensa-dispatch`.
#[async_trait]
pub trait DispatchFacility: Send + Sync {
    /// Whether the facility is present and linked in this environment.
    /// Called at most once per gate; results are memoized upstream.
    async fn probe_availability(&self) -> Result<bool>;

    /// Current notification permission state.
    async fn permission_status(&self) -> Result<PermissionStatus>;

    /// Prompt for permission and return the resulting state.
    async fn request_permission(&self, options: &PermissionOptions) -> Result<PermissionStatus>;

    /// Register one reminder. Facilities that support replacement swap out
    /// any outstanding reminder carrying the same identifier.
    async fn schedule(&self, request: ReminderRequest) -> Result<()>;

    /// Cancel by identifier. Idempotent: cancelling an identifier that was
    /// never scheduled succeeds.
    async fn cancel(&self, identifier: &str) -> Result<()>;

    /// Snapshot of the outstanding-reminder set. The snapshot is eventually
    /// consistent with recent schedule and cancel calls.
    async fn list_outstanding(&self) -> Result<Vec<OutstandingReminder>>;
}
