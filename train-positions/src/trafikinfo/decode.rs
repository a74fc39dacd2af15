//! Decoding of raw reply bodies.

use tracing::debug;

use super::error::TrafikinfoError;
use super::types::ReplyEnvelope;

/// How much of an undecodable body to keep for diagnostics.
const BODY_EXCERPT_CHARS: usize = 500;

/// Decode a JSON reply body into an envelope.
///
/// A reply with no result groups, or groups with no positions, is valid
/// and means nothing matched. A group carrying a service `ERROR` object
/// is turned into [`TrafikinfoError::Service`].
pub fn decode_reply(body: &str) -> Result<ReplyEnvelope, TrafikinfoError> {
    let reply: ReplyEnvelope = serde_json::from_str(body).map_err(|e| TrafikinfoError::Json {
        message: e.to_string(),
        body: Some(body.chars().take(BODY_EXCERPT_CHARS).collect()),
    })?;

    if let Some(fault) = reply.fault() {
        return Err(TrafikinfoError::Service {
            origin: fault.source.clone().unwrap_or_else(|| "unknown".to_string()),
            message: fault.message.clone(),
        });
    }

    debug!(
        groups = reply.groups().len(),
        records = reply.records().count(),
        "decoded reply"
    );

    Ok(reply)
}
