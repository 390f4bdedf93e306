//! Shared domain types for the reminder engine and its facility adapters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a tracked item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Active,
    Consumed,
    Expired,
}

/// An inventory item as handed over by the surrounding app.
///
/// The engine never stores items; every call receives the current snapshot
/// from the caller. `expiration_date` stays in its raw text form because the
/// app compares and displays it as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedItem {
    /// Stable identifier, unique within the inventory.
    pub id: String,
    /// Display name shown in reminder bodies.
    pub name: String,
    /// Calendar date text, `YYYY-MM-DD` with an optional `T...` tail.
    pub expiration_date: String,
    /// Current lifecycle status.
    pub status: ItemStatus,
}

impl TrackedItem {
    pub fn new(id: &str, name: &str, expiration_date: &str, status: ItemStatus) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            expiration_date: expiration_date.to_string(),
            status,
        }
    }

    /// Whether the item participates in reminder scheduling at all.
    pub fn is_active(&self) -> bool {
        self.status == ItemStatus::Active
    }
}

/// Which reminder slot a request describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// Fires on the expiration day itself.
    Expiry,
    /// Fires a configured number of days before expiry.
    PreWarning,
    /// Manual verification ping, fires seconds after scheduling.
    Test,
}

/// Displayable payload of one reminder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderContent {
    pub title: String,
    pub body: String,
    /// Identifier of the item the reminder refers to, so a tap can deep-link.
    pub item_id: String,
}

/// A fully resolved reminder handed to the dispatch facility.
///
/// `fires_at` is already an absolute instant; the facility performs no date
/// arithmetic of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderRequest {
    /// Facility-level identifier. Scheduling reuses it to replace an
    /// outstanding reminder with the same identifier.
    pub identifier: String,
    pub fires_at: DateTime<Utc>,
    pub kind: ReminderKind,
    pub content: ReminderContent,
}

/// Notification permission state reported by the facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

/// Options forwarded with a permission request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionOptions {
    #[serde(default = "bool_true")]
    pub alert: bool,
    #[serde(default = "bool_true")]
    pub badge: bool,
    #[serde(default = "bool_true")]
    pub sound: bool,
}

fn bool_true() -> bool {
    true
}

impl Default for PermissionOptions {
    fn default() -> Self {
        Self {
            alert: true,
            badge: true,
            sound: true,
        }
    }
}

/// Trigger class of an outstanding reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    /// Fires at a fixed instant.
    Date,
    /// Delivered by a remote push; no local fire time.
    Push,
}

/// One entry of the facility's outstanding-reminder snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutstandingReminder {
    pub identifier: String,
    pub trigger_kind: TriggerKind,
    /// Absent for push triggers.
    pub fires_at: Option<DateTime<Utc>>,
}

/// App-level settings that influence scheduling.
///
/// Owned and persisted by the surrounding app; the engine receives the
/// current value with each call and only consults `notification_days`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Days before expiry at which the pre-warning fires. Values below 1
    /// disable the pre-warning.
    #[serde(default = "default_notification_days")]
    pub notification_days: i64,
    /// UI theme preference.
    #[serde(default)]
    pub theme: Theme,
}

fn default_notification_days() -> i64 {
    3
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            notification_days: default_notification_days(),
            theme: Theme::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    Auto,
}
