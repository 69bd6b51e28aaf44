//! Pure view merge.

use common::UsageUpdatedEvent;
use view_store::UsageView;

/// Folds one usage event into the current view snapshot.
///
/// Returns `None` when no view exists for the event's user: update events
/// never create records, so an update racing the subscription path is a
/// benign skip for the caller to handle. When a view exists, each field
/// present in the event overwrites the matching usage field in a copy of
/// the view; absent fields and all plan descriptors are left as they were.
/// Last write wins per field, "last" being partition delivery order.
///
/// Overwrite rather than accumulate is what makes redelivery safe: applying
/// the same event twice yields the same view as applying it once.
pub fn merge(existing: Option<&UsageView>, event: &UsageUpdatedEvent) -> Option<UsageView> {
    let mut view = existing?.clone();
    if let Some(data_usage) = event.data_usage {
        view.data_usage = data_usage;
    }
    if let Some(call_usage) = event.call_usage {
        view.call_usage = call_usage;
    }
    if let Some(message_usage) = event.message_usage {
        view.message_usage = message_usage;
    }
    Some(view)
}
