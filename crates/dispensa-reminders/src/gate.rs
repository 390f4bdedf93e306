//! Availability gate and permission flow for the dispatch facility.
//!
//! The availability probe runs at most once: the first check asks the
//! facility, every later check reads the memoized answer until
//! `clear_cache` drops it. Probe failures read as unavailable.

use std::sync::Arc;
use tokio::sync::RwLock;

use dispensa_core::traits::DispatchFacility;
use dispensa_core::types::{PermissionOptions, PermissionStatus};

pub struct DispatchGate {
    facility: Arc<dyn DispatchFacility>,
    cache: RwLock<Option<bool>>,
}

impl DispatchGate {
    pub fn new(facility: Arc<dyn DispatchFacility>) -> Self {
        Self {
            facility,
            cache: RwLock::new(None),
        }
    }

    /// Memoized availability check.
    pub async fn is_available(&self) -> bool {
        if let Some(cached) = *self.cache.read().await {
            return cached;
        }

        let mut slot = self.cache.write().await;
        // Another task may have probed while we waited for the write lock.
        if let Some(cached) = *slot {
            return cached;
        }

        let available = match self.facility.probe_availability().await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("⚠️ Facility availability probe failed: {e}");
                false
            }
        };
        if !available {
            tracing::warn!("🚫 Dispatch facility not available; reminder calls will be skipped");
        }
        *slot = Some(available);
        available
    }

    /// Drop the memoized probe result so the next check asks again.
    pub async fn clear_cache(&self) {
        *self.cache.write().await = None;
    }

    /// Whether permission is currently granted, without prompting.
    pub async fn check_permission(&self) -> bool {
        if !self.is_available().await {
            return false;
        }
        match self.facility.permission_status().await {
            Ok(status) => status == PermissionStatus::Granted,
            Err(e) => {
                tracing::warn!("⚠️ Permission check failed: {e}");
                false
            }
        }
    }

    /// Permission if already granted, otherwise prompt once and report the
    /// final state. Never fails; errors read as not granted.
    pub async fn ensure_permission(&self, options: &PermissionOptions) -> bool {
        if !self.is_available().await {
            tracing::warn!("🚫 Cannot check permissions: facility not available");
            return false;
        }

        let current = match self.facility.permission_status().await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!("⚠️ Permission check failed: {e}");
                return false;
            }
        };

        let final_status = if current != PermissionStatus::Granted {
            tracing::info!("🔔 Permissions not granted, requesting...");
            match self.facility.request_permission(options).await {
                Ok(status) => status,
                Err(e) => {
                    tracing::warn!("⚠️ Permission request failed: {e}");
                    return false;
                }
            }
        } else {
            current
        };

        if final_status != PermissionStatus::Granted {
            tracing::info!("🔕 Permission request denied");
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispensa_dispatch::{FacilityOp, MemoryFacility};

    #[tokio::test]
    async fn test_probe_runs_once_and_is_memoized() {
        let facility = Arc::new(MemoryFacility::new());
        let gate = DispatchGate::new(facility.clone());

        assert!(gate.is_available().await);
        assert!(gate.is_available().await);
        assert!(gate.is_available().await);
        assert_eq!(facility.probe_calls().await, 1);
    }

    #[tokio::test]
    async fn test_probe_error_reads_as_unavailable() {
        let facility = Arc::new(MemoryFacility::new().with_probe_error());
        let gate = DispatchGate::new(facility.clone());

        assert!(!gate.is_available().await);
        // The failure is memoized too; no retry storm.
        assert!(!gate.is_available().await);
        assert_eq!(facility.probe_calls().await, 1);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_reprobe() {
        let facility = Arc::new(MemoryFacility::new());
        let gate = DispatchGate::new(facility.clone());

        assert!(gate.is_available().await);
        gate.clear_cache().await;
        assert!(gate.is_available().await);
        assert_eq!(facility.probe_calls().await, 2);
    }

    #[tokio::test]
    async fn test_ensure_permission_prompts_when_not_granted() {
        let facility =
            Arc::new(MemoryFacility::new().with_permission(PermissionStatus::Undetermined));
        let gate = DispatchGate::new(facility.clone());

        assert!(gate.ensure_permission(&PermissionOptions::default()).await);
        let journal = facility.journal().await;
        assert!(journal.contains(&FacilityOp::PermissionRequest));
    }

    #[tokio::test]
    async fn test_ensure_permission_skips_prompt_when_granted() {
        let facility = Arc::new(MemoryFacility::new());
        let gate = DispatchGate::new(facility.clone());

        assert!(gate.ensure_permission(&PermissionOptions::default()).await);
        let journal = facility.journal().await;
        assert!(!journal.contains(&FacilityOp::PermissionRequest));
    }

    #[tokio::test]
    async fn test_ensure_permission_denied() {
        let facility = Arc::new(
            MemoryFacility::new()
                .with_permission(PermissionStatus::Denied)
                .denying_requests(),
        );
        let gate = DispatchGate::new(facility.clone());

        assert!(!gate.ensure_permission(&PermissionOptions::default()).await);
    }

    #[tokio::test]
    async fn test_unavailable_gate_short_circuits_permissions() {
        let facility = Arc::new(MemoryFacility::new().unavailable());
        let gate = DispatchGate::new(facility.clone());

        assert!(!gate.ensure_permission(&PermissionOptions::default()).await);
        assert!(!gate.check_permission().await);
        let journal = facility.journal().await;
        assert!(!journal.contains(&FacilityOp::PermissionCheck));
    }
}
