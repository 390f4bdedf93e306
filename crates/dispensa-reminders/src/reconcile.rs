//! Snapshot reconciliation.
//!
//! Pure diff between the previous and current item snapshots. Nothing here
//! touches the facility; the engine applies the resulting plan. Expiration
//! dates are compared as raw text, so a cosmetic rewrite of the same day
//! counts as a change and triggers a reschedule (harmless, since identifiers
//! are stable).

use std::collections::BTreeMap;

use chrono::NaiveDate;

use dispensa_core::types::{AppSettings, ItemStatus, TrackedItem};

use crate::dates::is_schedulable_date;

/// One planned facility operation.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileAction {
    /// Register (or refresh) reminders for this item.
    Schedule(TrackedItem),
    /// Drop both reminder slots for this item id.
    Cancel(String),
}

/// Outcome of one snapshot diff.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan {
    /// Operations in apply order: current ids first, then removed ids, each
    /// group sorted by id.
    pub actions: Vec<ReconcileAction>,
    /// Ids of items whose dates were missing, malformed, or already past.
    pub skipped: Vec<String>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.skipped.is_empty()
    }

    pub fn schedule_count(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, ReconcileAction::Schedule(_)))
            .count()
    }

    pub fn cancel_count(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, ReconcileAction::Cancel(_)))
            .count()
    }
}

/// Diff two snapshots into the operations that reconcile the outstanding set.
///
/// Rules, per item id:
/// - new and active: schedule
/// - still present and active: schedule when the raw date text changed or
///   the item just became active again
/// - was active, now consumed or expired: cancel
/// - was active, now gone: cancel
///
/// `today` bounds which dates are still worth scheduling.
pub fn diff_snapshots(
    previous: &[TrackedItem],
    current: &[TrackedItem],
    today: NaiveDate,
) -> ReconcilePlan {
    let prev_map: BTreeMap<&str, &TrackedItem> =
        previous.iter().map(|p| (p.id.as_str(), p)).collect();
    let current_map: BTreeMap<&str, &TrackedItem> =
        current.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut plan = ReconcilePlan::default();

    for (id, item) in &current_map {
        match prev_map.get(id) {
            None if item.is_active() => {
                if is_schedulable_date(&item.expiration_date, today) {
                    plan.actions.push(ReconcileAction::Schedule((*item).clone()));
                } else {
                    tracing::warn!(
                        "⏭️ Skipping new item {} with unusable date '{}'",
                        id,
                        item.expiration_date
                    );
                    plan.skipped.push((*id).to_string());
                }
            }
            Some(prev) if item.is_active() => {
                let date_changed = item.expiration_date != prev.expiration_date;
                let became_active = prev.status != ItemStatus::Active;
                if date_changed || became_active {
                    if is_schedulable_date(&item.expiration_date, today) {
                        plan.actions.push(ReconcileAction::Schedule((*item).clone()));
                    } else {
                        tracing::warn!(
                            "⏭️ Skipping updated item {} with unusable date '{}'",
                            id,
                            item.expiration_date
                        );
                        plan.skipped.push((*id).to_string());
                    }
                }
            }
            Some(prev) if prev.is_active() => {
                // Active before, consumed or expired now.
                plan.actions.push(ReconcileAction::Cancel((*id).to_string()));
            }
            _ => {}
        }
    }

    for (id, prev) in &prev_map {
        if !current_map.contains_key(id) && prev.is_active() {
            plan.actions.push(ReconcileAction::Cancel((*id).to_string()));
        }
    }

    if !plan.is_empty() {
        tracing::info!(
            "🔄 Reconcile plan: {} to schedule, {} to cancel, {} skipped",
            plan.schedule_count(),
            plan.cancel_count(),
            plan.skipped.len()
        );
    }

    plan
}

/// Whether a settings change requires rebuilding every reminder.
pub fn settings_changed(previous: &AppSettings, current: &AppSettings) -> bool {
    previous.notification_days != current.notification_days
}
