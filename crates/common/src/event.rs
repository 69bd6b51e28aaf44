use serde::{Deserialize, Serialize};

use crate::UserId;

/// An immutable fact about a change in usage for one subscriber.
///
/// Produced upstream and carried as the payload of one stream record. Every
/// usage field is optional: an absent field means "no change communicated
/// for this attribute in this event", not "reset to zero". The wire form is
/// camelCase JSON (`userId`, `dataUsage`, `callUsage`, `messageUsage`);
/// unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageUpdatedEvent {
    pub user_id: UserId,
    /// Data consumed so far in the billing period, in gigabytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_usage: Option<f64>,
    /// Call minutes consumed so far in the billing period.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_usage: Option<i64>,
    /// Messages sent so far in the billing period.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_usage: Option<i64>,
}

impl UsageUpdatedEvent {
    /// Creates an event carrying no usage changes for the given user.
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            data_usage: None,
            call_usage: None,
            message_usage: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case_payload() {
        let json = r#"{"userId":"user42","dataUsage":12.5,"callUsage":20,"messageUsage":3}"#;
        let event: UsageUpdatedEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.user_id, UserId::new("user42"));
        assert_eq!(event.data_usage, Some(12.5));
        assert_eq!(event.call_usage, Some(20));
        assert_eq!(event.message_usage, Some(3));
    }

    #[test]
    fn missing_fields_deserialize_as_absent() {
        let json = r#"{"userId":"user42","dataUsage":5.0}"#;
        let event: UsageUpdatedEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.data_usage, Some(5.0));
        assert_eq!(event.call_usage, None);
        assert_eq!(event.message_usage, None);
    }

    #[test]
    fn null_fields_deserialize_as_absent() {
        let json = r#"{"userId":"user42","dataUsage":null,"callUsage":7}"#;
        let event: UsageUpdatedEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.data_usage, None);
        assert_eq!(event.call_usage, Some(7));
    }

    #[test]
    fn absent_fields_are_omitted_when_serializing() {
        let mut event = UsageUpdatedEvent::new("user42");
        event.call_usage = Some(9);
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"userId":"user42","callUsage":9}"#);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let json = r#"{"userId":"user42","planChange":"5G","dataUsage":1.0}"#;
        let event: UsageUpdatedEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.data_usage, Some(1.0));
    }
}
