//! Raw payload decoding.

use common::UsageUpdatedEvent;

use crate::error::DecodeError;

/// Decodes one raw stream payload into a typed usage event.
///
/// Unknown JSON keys are ignored and missing optional fields stay absent,
/// matching whatever subset the producer chose to send. A payload that is
/// not well-formed, or that carries no user id, is rejected; the caller
/// skips the record and the partition keeps flowing.
pub fn decode(payload: &[u8]) -> Result<UsageUpdatedEvent, DecodeError> {
    let event: UsageUpdatedEvent = serde_json::from_slice(payload)?;
    if event.user_id.as_str().is_empty() {
        return Err(DecodeError::MissingUserId);
    }
    Ok(event)
}
