use common::UserId;
use serde::{Deserialize, Serialize};

/// The materialized, queryable usage projection for one subscriber.
///
/// Plan descriptor fields are populated by the subscription path when the
/// record is established and must survive usage updates untouched; the
/// usage counters are the fields the projector overwrites as events
/// arrive. Records are keyed by `user_id` and never deleted by the
/// projector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageView {
    pub user_id: UserId,
    /// Display name of the subscribed plan.
    pub plan_name: String,
    /// Plan data allowance, in gigabytes.
    pub data_allowance: i64,
    /// Plan call-minute allowance.
    pub call_minutes: i64,
    /// Plan message allowance.
    pub message_count: i64,
    /// Monthly fee in the billing currency's smallest unit.
    pub monthly_fee: i64,
    /// Data consumed so far, in gigabytes.
    pub data_usage: f64,
    /// Call minutes consumed so far.
    pub call_usage: i64,
    /// Messages sent so far.
    pub message_usage: i64,
}
