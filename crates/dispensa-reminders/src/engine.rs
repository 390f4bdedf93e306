//! Engine facade.
//!
//! Single handle the app talks to. Wires the availability gate, per-item
//! scheduler, batch fan-out, and snapshot reconciliation together, and owns
//! the one destructive flow: the full rebuild after a settings change.

use std::sync::Arc;

use chrono::Local;

use dispensa_core::config::DispensaConfig;
use dispensa_core::traits::DispatchFacility;
use dispensa_core::types::{AppSettings, PermissionOptions, TrackedItem};

use crate::batch::{self, BatchReport};
use crate::dates::is_schedulable_date;
use crate::gate::DispatchGate;
use crate::reconcile::{self, ReconcileAction, ReconcilePlan};
use crate::scheduler::{ItemScheduler, ScheduleOutcome};

pub struct ReminderEngine {
    facility: Arc<dyn DispatchFacility>,
    gate: Arc<DispatchGate>,
    scheduler: ItemScheduler,
}

impl ReminderEngine {
    pub fn new(facility: Arc<dyn DispatchFacility>, config: &DispensaConfig) -> Self {
        let gate = Arc::new(DispatchGate::new(facility.clone()));
        let scheduler = ItemScheduler::new(facility.clone(), gate.clone(), config.reminders.clone());
        Self {
            facility,
            gate,
            scheduler,
        }
    }

    /// Availability of the dispatch facility (memoized).
    pub async fn is_available(&self) -> bool {
        self.gate.is_available().await
    }

    /// Force the next availability check to probe the facility again.
    pub async fn refresh_availability(&self) {
        self.gate.clear_cache().await;
    }

    /// Permission if already granted, otherwise prompt once.
    pub async fn ensure_permission(&self) -> bool {
        self.gate
            .ensure_permission(&PermissionOptions::default())
            .await
    }

    /// Schedule the reminders of one item.
    pub async fn schedule_item(
        &self,
        item: &TrackedItem,
        settings: &AppSettings,
    ) -> ScheduleOutcome {
        self.scheduler.schedule_for_item(item, settings).await
    }

    /// Cancel both reminder slots of one item.
    pub async fn cancel_item(&self, item_id: &str) {
        self.scheduler.cancel_for_item(item_id).await;
    }

    /// Whether an item still has an outstanding reminder.
    pub async fn is_scheduled(&self, item_id: &str) -> bool {
        self.scheduler.is_scheduled(item_id).await
    }

    /// Chunked batch scheduling.
    pub async fn schedule_all(&self, items: &[TrackedItem], settings: &AppSettings) -> BatchReport {
        batch::schedule_many(&self.scheduler, items, settings).await
    }

    /// Concurrent batch cancellation.
    pub async fn cancel_all_for(&self, item_ids: &[String]) {
        batch::cancel_many(&self.scheduler, item_ids).await;
    }

    /// Ten-second verification ping.
    pub async fn schedule_test_reminder(&self) -> bool {
        self.scheduler.schedule_test_reminder().await
    }

    /// Diff two snapshots and apply the resulting plan.
    pub async fn reconcile(
        &self,
        previous: &[TrackedItem],
        current: &[TrackedItem],
        settings: &AppSettings,
    ) -> ReconcilePlan {
        let today = Local::now().date_naive();
        let plan = reconcile::diff_snapshots(previous, current, today);
        self.apply_plan(&plan, settings).await;
        plan
    }

    /// Apply an already-computed plan: cancels run concurrently first, then
    /// schedules go through the normal chunked batch path.
    pub async fn apply_plan(&self, plan: &ReconcilePlan, settings: &AppSettings) {
        let cancels: Vec<String> = plan
            .actions
            .iter()
            .filter_map(|action| match action {
                ReconcileAction::Cancel(id) => Some(id.clone()),
                ReconcileAction::Schedule(_) => None,
            })
            .collect();
        let schedules: Vec<TrackedItem> = plan
            .actions
            .iter()
            .filter_map(|action| match action {
                ReconcileAction::Schedule(item) => Some(item.clone()),
                ReconcileAction::Cancel(_) => None,
            })
            .collect();

        if !cancels.is_empty() {
            batch::cancel_many(&self.scheduler, &cancels).await;
        }
        if !schedules.is_empty() {
            batch::schedule_many(&self.scheduler, &schedules, settings).await;
        }
    }

    /// React to a settings update. Returns `None` when nothing relevant
    /// changed, otherwise the report of the full rebuild.
    pub async fn handle_settings_change(
        &self,
        previous: &AppSettings,
        current: &AppSettings,
        items: &[TrackedItem],
    ) -> Option<BatchReport> {
        if !reconcile::settings_changed(previous, current) {
            return None;
        }
        tracing::info!(
            "🔄 Notification days changed ({} -> {}); rebuilding all reminders",
            previous.notification_days,
            current.notification_days
        );
        Some(self.rebuild_all(items, current).await)
    }

    /// Cancel every outstanding reminder, then schedule the active items.
    /// The rebuild is global on purpose; partial rebuilds after a settings
    /// change would leave mixed pre-warning offsets behind.
    pub async fn rebuild_all(&self, items: &[TrackedItem], settings: &AppSettings) -> BatchReport {
        let today = Local::now().date_naive();
        let active: Vec<TrackedItem> = items
            .iter()
            .filter(|item| item.is_active() && is_schedulable_date(&item.expiration_date, today))
            .cloned()
            .collect();
        let active_total = items.iter().filter(|item| item.is_active()).count();
        if active.len() != active_total {
            tracing::warn!(
                "⏭️ Filtered out {} active items with unusable expiration dates",
                active_total - active.len()
            );
        }

        self.cancel_outstanding().await;
        let report = batch::schedule_many(&self.scheduler, &active, settings).await;
        tracing::info!("🔄 Rebuild complete for {} items", active.len());
        report
    }

    /// Cancel everything the facility currently has outstanding.
    async fn cancel_outstanding(&self) {
        if !self.gate.is_available().await {
            return;
        }
        let outstanding = match self.facility.list_outstanding().await {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!("⚠️ Could not list outstanding reminders: {e}");
                return;
            }
        };
        if outstanding.is_empty() {
            return;
        }

        tracing::info!("🗑️ Cancelling {} outstanding reminders", outstanding.len());
        let results = futures::future::join_all(
            outstanding
                .iter()
                .map(|reminder| self.facility.cancel(&reminder.identifier)),
        )
        .await;
        for (reminder, result) in outstanding.iter().zip(results) {
            if let Err(e) = result {
                tracing::warn!("⚠️ Could not cancel '{}': {e}", reminder.identifier);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispensa_core::types::ItemStatus;
    use dispensa_dispatch::{FacilityOp, MemoryFacility};

    fn engine_on(facility: Arc<MemoryFacility>) -> ReminderEngine {
        ReminderEngine::new(facility, &DispensaConfig::default())
    }

    fn item(id: &str, date: &str, status: ItemStatus) -> TrackedItem {
        TrackedItem::new(id, "Latte", date, status)
    }

    fn settings(days: i64) -> AppSettings {
        AppSettings {
            notification_days: days,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_settings_change_rebuilds_everything() {
        let facility = Arc::new(MemoryFacility::new());
        let engine = engine_on(facility.clone());
        let items = vec![
            item("a", "2030-03-10", ItemStatus::Active),
            item("b", "2030-04-01", ItemStatus::Active),
            item("c", "2030-05-20", ItemStatus::Active),
            item("d", "2030-06-02", ItemStatus::Active),
        ];

        engine.schedule_all(&items, &settings(3)).await;
        let before = facility.fires_at("a").await.unwrap() - facility.fires_at("a-pre").await.unwrap();
        assert_eq!(before.num_days(), 3);

        let report = engine
            .handle_settings_change(&settings(3), &settings(5), &items)
            .await
            .unwrap();

        assert_eq!(report.success_count, 4);
        assert_eq!(facility.outstanding_identifiers().await.len(), 8);
        let after = facility.fires_at("a").await.unwrap() - facility.fires_at("a-pre").await.unwrap();
        assert_eq!(after.num_days(), 5);
    }

    #[tokio::test]
    async fn test_rebuild_cancels_all_before_scheduling() {
        let facility = Arc::new(MemoryFacility::new());
        let engine = engine_on(facility.clone());
        let items = vec![item("a", "2030-03-10", ItemStatus::Active)];

        engine.schedule_all(&items, &settings(3)).await;
        engine.rebuild_all(&items, &settings(5)).await;

        // After the initial probe + 2 schedules: a List, then every
        // outstanding identifier cancelled, then the reschedules.
        let journal = facility.journal().await;
        let list_pos = journal
            .iter()
            .position(|op| *op == FacilityOp::List)
            .unwrap();
        let cancels: Vec<usize> = journal
            .iter()
            .enumerate()
            .filter(|(_, op)| matches!(op, FacilityOp::Cancel(_)))
            .map(|(i, _)| i)
            .collect();
        let late_schedules: Vec<usize> = journal
            .iter()
            .enumerate()
            .skip(list_pos)
            .filter(|(_, op)| matches!(op, FacilityOp::Schedule(_)))
            .map(|(i, _)| i)
            .collect();

        assert_eq!(cancels.len(), 2);
        assert!(cancels.iter().all(|i| *i > list_pos));
        assert!(late_schedules.iter().all(|i| cancels.iter().all(|c| c < i)));
        assert_eq!(facility.outstanding_identifiers().await, vec!["a", "a-pre"]);
    }

    #[tokio::test]
    async fn test_settings_noop_when_days_unchanged() {
        let facility = Arc::new(MemoryFacility::new());
        let engine = engine_on(facility.clone());

        let mut same_days = settings(3);
        same_days.theme = dispensa_core::types::Theme::Dark;
        let result = engine
            .handle_settings_change(&settings(3), &same_days, &[])
            .await;

        assert!(result.is_none());
        assert!(facility.journal().await.is_empty());
    }

    #[tokio::test]
    async fn test_reconcile_cancels_before_scheduling() {
        let facility = Arc::new(MemoryFacility::new());
        let engine = engine_on(facility.clone());
        let previous = vec![item("a", "2030-03-10", ItemStatus::Active)];
        let current = vec![
            item("a", "2030-03-10", ItemStatus::Consumed),
            item("b", "2030-03-10", ItemStatus::Active),
        ];

        engine.schedule_all(&previous, &settings(0)).await;
        let plan = engine.reconcile(&previous, &current, &settings(0)).await;

        assert_eq!(plan.cancel_count(), 1);
        assert_eq!(plan.schedule_count(), 1);
        assert_eq!(facility.outstanding_identifiers().await, vec!["b"]);

        let journal = facility.journal().await;
        let cancel_a = journal
            .iter()
            .position(|op| *op == FacilityOp::Cancel("a".into()))
            .unwrap();
        let schedule_b = journal
            .iter()
            .position(|op| *op == FacilityOp::Schedule("b".into()))
            .unwrap();
        assert!(cancel_a < schedule_b);
    }

    #[tokio::test]
    async fn test_rebuild_filters_inactive_and_dateless_items() {
        let facility = Arc::new(MemoryFacility::new());
        let engine = engine_on(facility.clone());
        let items = vec![
            item("a", "2030-03-10", ItemStatus::Active),
            item("b", "2030-03-10", ItemStatus::Consumed),
            item("c", "when I remember", ItemStatus::Active),
        ];

        let report = engine.rebuild_all(&items, &settings(0)).await;

        assert_eq!(report.total_processed, 1);
        assert_eq!(facility.outstanding_identifiers().await, vec!["a"]);
    }

    #[tokio::test]
    async fn test_unavailable_facility_keeps_engine_quiet() {
        let facility = Arc::new(MemoryFacility::new().unavailable());
        let engine = engine_on(facility.clone());
        let items = vec![item("a", "2030-03-10", ItemStatus::Active)];

        let report = engine.schedule_all(&items, &settings(3)).await;
        assert_eq!(report, BatchReport::default());
        assert!(!engine.is_scheduled("a").await);
        assert_eq!(facility.journal().await, vec![FacilityOp::Probe]);
    }
}
