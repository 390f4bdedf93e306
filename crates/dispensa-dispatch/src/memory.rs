//! In-memory dispatch facility.
//!
//! Keeps the outstanding set in a map and records every trait call in a
//! journal, so engine tests can assert on call order as well as final state.
//! Also usable as a stand-in backend for local development without a relay.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

use dispensa_core::error::{DispensaError, Result};
use dispensa_core::traits::DispatchFacility;
use dispensa_core::types::{
    OutstandingReminder, PermissionOptions, PermissionStatus, ReminderRequest, TriggerKind,
};

/// One recorded facility call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacilityOp {
    Probe,
    PermissionCheck,
    PermissionRequest,
    Schedule(String),
    Cancel(String),
    List,
}

#[derive(Default)]
struct MemoryState {
    outstanding: HashMap<String, OutstandingReminder>,
    journal: Vec<FacilityOp>,
    probe_calls: usize,
}

/// Scripted, introspectable facility.
///
/// Knobs are set at construction; state accessors lock the shared journal.
pub struct MemoryFacility {
    state: Mutex<MemoryState>,
    available: bool,
    probe_error: bool,
    permission: PermissionStatus,
    grant_on_request: bool,
    fail_schedule: HashSet<String>,
    fail_cancel: HashSet<String>,
}

impl MemoryFacility {
    /// Available facility with permission already granted.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            available: true,
            probe_error: false,
            permission: PermissionStatus::Granted,
            grant_on_request: true,
            fail_schedule: HashSet::new(),
            fail_cancel: HashSet::new(),
        }
    }

    /// Probe reports the facility as absent.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Probe fails with a facility error instead of answering.
    pub fn with_probe_error(mut self) -> Self {
        self.probe_error = true;
        self
    }

    /// Fixed permission state reported by `permission_status`.
    pub fn with_permission(mut self, status: PermissionStatus) -> Self {
        self.permission = status;
        self
    }

    /// Make `request_permission` echo the fixed state instead of granting.
    pub fn denying_requests(mut self) -> Self {
        self.grant_on_request = false;
        self
    }

    /// Scripted failure: `schedule` for this identifier returns an error.
    pub fn failing_schedule(mut self, identifier: &str) -> Self {
        self.fail_schedule.insert(identifier.to_string());
        self
    }

    /// Scripted failure: `cancel` for this identifier returns an error.
    pub fn failing_cancel(mut self, identifier: &str) -> Self {
        self.fail_cancel.insert(identifier.to_string());
        self
    }

    /// Outstanding identifiers, sorted.
    pub async fn outstanding_identifiers(&self) -> Vec<String> {
        let state = self.state.lock().await;
        let mut ids: Vec<String> = state.outstanding.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn contains(&self, identifier: &str) -> bool {
        self.state.lock().await.outstanding.contains_key(identifier)
    }

    /// Fire instant recorded for an outstanding identifier.
    pub async fn fires_at(&self, identifier: &str) -> Option<DateTime<Utc>> {
        let state = self.state.lock().await;
        state
            .outstanding
            .get(identifier)
            .and_then(|r| r.fires_at)
    }

    /// Every call recorded so far, in order.
    pub async fn journal(&self) -> Vec<FacilityOp> {
        self.state.lock().await.journal.clone()
    }

    pub async fn probe_calls(&self) -> usize {
        self.state.lock().await.probe_calls
    }
}

impl Default for MemoryFacility {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DispatchFacility for MemoryFacility {
    async fn probe_availability(&self) -> Result<bool> {
        let mut state = self.state.lock().await;
        state.journal.push(FacilityOp::Probe);
        state.probe_calls += 1;
        if self.probe_error {
            return Err(DispensaError::Facility("Scripted probe failure".into()));
        }
        Ok(self.available)
    }

    async fn permission_status(&self) -> Result<PermissionStatus> {
        let mut state = self.state.lock().await;
        state.journal.push(FacilityOp::PermissionCheck);
        Ok(self.permission)
    }

    async fn request_permission(&self, _options: &PermissionOptions) -> Result<PermissionStatus> {
        let mut state = self.state.lock().await;
        state.journal.push(FacilityOp::PermissionRequest);
        if self.grant_on_request {
            Ok(PermissionStatus::Granted)
        } else {
            Ok(self.permission)
        }
    }

    async fn schedule(&self, request: ReminderRequest) -> Result<()> {
        let mut state = self.state.lock().await;
        state
            .journal
            .push(FacilityOp::Schedule(request.identifier.clone()));
        if self.fail_schedule.contains(&request.identifier) {
            return Err(DispensaError::Dispatch(format!(
                "Scripted schedule failure for '{}'",
                request.identifier
            )));
        }
        // Same identifier replaces the previous entry, like a real relay.
        state.outstanding.insert(
            request.identifier.clone(),
            OutstandingReminder {
                identifier: request.identifier,
                trigger_kind: TriggerKind::Date,
                fires_at: Some(request.fires_at),
            },
        );
        Ok(())
    }

    async fn cancel(&self, identifier: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.journal.push(FacilityOp::Cancel(identifier.to_string()));
        if self.fail_cancel.contains(identifier) {
            return Err(DispensaError::Dispatch(format!(
                "Scripted cancel failure for '{identifier}'"
            )));
        }
        // Removing an absent identifier is fine; cancel is idempotent.
        state.outstanding.remove(identifier);
        Ok(())
    }

    async fn list_outstanding(&self) -> Result<Vec<OutstandingReminder>> {
        let mut state = self.state.lock().await;
        state.journal.push(FacilityOp::List);
        let mut all: Vec<OutstandingReminder> = state.outstanding.values().cloned().collect();
        all.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        Ok(all)
    }
}
