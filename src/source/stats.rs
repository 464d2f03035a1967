//! Stats document parsing
//!
//! The SRT server publishes a JSON document of the form
//! `{"publishers": {"<key>": {"bitrate": <kbps>, "rtt": <ms>, ...}}}`.

use crate::error::SourceError;
use serde::Serialize;
use serde_json::Value;

/// Bitrate and RTT for one publisher
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PublisherStats {
    /// Incoming bitrate in kbps
    pub bitrate_kbps: f64,
    /// Round-trip time in milliseconds
    pub rtt_ms: f64,
}

/// Extract one publisher's stats from a stats document
///
/// Returns `Ok(None)` when the publisher is absent or has no bitrate yet,
/// which means no stream is being received. A missing RTT reads as 0.
pub fn parse_publisher(body: &str, publisher: &str) -> Result<Option<PublisherStats>, SourceError> {
    let document: Value =
        serde_json::from_str(body).map_err(|e| SourceError::Malformed(e.to_string()))?;

    if !document.is_object() {
        return Err(SourceError::Malformed(
            "expected a JSON object".to_string(),
        ));
    }

    let Some(entry) = document
        .get("publishers")
        .and_then(|p| p.get(publisher))
    else {
        return Ok(None);
    };

    let Some(bitrate_kbps) = entry.get("bitrate").and_then(Value::as_f64) else {
        return Ok(None);
    };
    let rtt_ms = entry.get("rtt").and_then(Value::as_f64).unwrap_or(0.0);

    Ok(Some(PublisherStats {
        bitrate_kbps,
        rtt_ms,
    }))
}
