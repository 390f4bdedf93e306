//! Reminder identifier scheme.
//!
//! Each item owns at most two facility identifiers: the item id itself for
//! the expiry-day reminder, and `{id}-pre` for the pre-warning. Deterministic
//! identifiers keep rescheduling and cancellation idempotent.

/// Identifier of the expiry-day reminder.
pub fn expiry_id(item_id: &str) -> String {
    item_id.to_string()
}

/// Identifier of the pre-warning reminder.
pub fn pre_warning_id(item_id: &str) -> String {
    format!("{item_id}-pre")
}

/// Both identifiers an item may own.
pub fn ids_for_item(item_id: &str) -> [String; 2] {
    [expiry_id(item_id), pre_warning_id(item_id)]
}
