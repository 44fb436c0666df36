//! SSE frame parsing and payload expansion
//!
//! A complete frame is scanned line by line for `event:` and `data:`
//! fields; the data payload is then decoded as JSON into bridge event
//! containers and expanded into one [`BridgeEvent`] per resource-change
//! record.

use hue_core::{BridgeEvent, ContainerPayload};

use super::types::StreamError;

/// Maximum length of payload text echoed into parse-failure messages
const PAYLOAD_PREVIEW_CHARS: usize = 300;

/// The textual fields extracted from one SSE frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// Value of the frame's `event:` line, if any
    pub event_name: Option<String>,
    /// All `data:` lines joined with newlines
    pub data: String,
}

/// Parse a frame's lines into an [`SseFrame`]
///
/// Comment lines (leading `:`) and blank lines are ignored. A frame with
/// no `data:` lines yields `None` and is silently dropped, which covers
/// pure keepalive frames.
pub fn parse_frame(frame: &str) -> Option<SseFrame> {
    let mut event_name = None;
    let mut data_lines: Vec<&str> = Vec::new();

    for line in frame.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        if let Some(value) = line.strip_prefix("event:") {
            event_name = Some(value.trim().to_string());
            continue;
        }
        if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(value.trim_start());
        }
    }

    if data_lines.is_empty() {
        return None;
    }

    Some(SseFrame {
        event_name,
        data: data_lines.join("\n"),
    })
}

/// Truncate payload text for log/error messages
fn payload_preview(payload: &str) -> &str {
    match payload.char_indices().nth(PAYLOAD_PREVIEW_CHARS) {
        Some((i, _)) => &payload[..i],
        None => payload,
    }
}

/// Decode a frame's data payload into zero or more [`BridgeEvent`]s
///
/// The payload may be a single container or an array of containers; each
/// resource-change record in a container's data list becomes one event,
/// tagged with the container's type (falling back to the frame's event
/// name) and creation time.
pub fn expand_payload(
    data: &str,
    event_name: Option<&str>,
) -> Result<Vec<BridgeEvent>, StreamError> {
    let payload: ContainerPayload = serde_json::from_str(data).map_err(|e| {
        StreamError::Parse(format!(
            "failed to decode event payload: {} (payload: {})",
            e,
            payload_preview(data)
        ))
    })?;

    let mut events = Vec::new();
    for container in payload.into_containers() {
        let event_type = container
            .container_type
            .as_deref()
            .or(event_name)
            .unwrap_or("unknown")
            .to_string();

        for resource in container.data {
            let resource_type = resource
                .get("type")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string();
            let resource_id = resource
                .get("id")
                .or_else(|| resource.get("id_v1"))
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string();

            events.push(BridgeEvent {
                event_type: event_type.clone(),
                resource_type,
                resource_id,
                creation_time: container.creationtime.clone(),
                payload: resource,
            });
        }
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_event_and_data_lines() {
        let frame = "event: update\ndata: {\"a\":1}";
        let parsed = parse_frame(frame).unwrap();
        assert_eq!(parsed.event_name.as_deref(), Some("update"));
        assert_eq!(parsed.data, "{\"a\":1}");
    }

    #[test]
    fn joins_multiple_data_lines_with_newlines() {
        let frame = "data: {\"a\":\ndata: 1}";
        let parsed = parse_frame(frame).unwrap();
        assert_eq!(parsed.data, "{\"a\":\n1}");
    }

    #[test]
    fn ignores_comments_and_blank_lines() {
        let frame = ": keepalive\n\ndata: x";
        let parsed = parse_frame(frame).unwrap();
        assert_eq!(parsed.data, "x");
        assert_eq!(parsed.event_name, None);
    }

    #[test]
    fn frame_without_data_yields_nothing() {
        assert_eq!(parse_frame(": keepalive"), None);
        assert_eq!(parse_frame("event: update"), None);
        assert_eq!(parse_frame(""), None);
    }

    #[test]
    fn handles_crlf_line_endings() {
        let frame = "event: update\r\ndata: {\"a\":1}\r";
        let parsed = parse_frame(frame).unwrap();
        assert_eq!(parsed.event_name.as_deref(), Some("update"));
        assert_eq!(parsed.data, "{\"a\":1}");
    }

    #[test]
    fn expands_container_resources_into_events() {
        let data = r#"[{
            "type": "update",
            "creationtime": "2024-06-01T12:00:00Z",
            "data": [
                {"type": "temperature", "id": "t1", "temperature": {"temperature": 21.5}},
                {"type": "motion", "id": "m1", "motion": {"motion": true}}
            ]
        }]"#;

        let events = expand_payload(data, Some("update")).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "update");
        assert_eq!(events[0].resource_type, "temperature");
        assert_eq!(events[0].resource_id, "t1");
        assert_eq!(
            events[0].creation_time.as_deref(),
            Some("2024-06-01T12:00:00Z")
        );
        assert_eq!(events[1].resource_type, "motion");
    }

    #[test]
    fn single_container_object_is_accepted() {
        let data = r#"{"type":"update","data":[{"type":"light","id":"l1"}]}"#;
        let events = expand_payload(data, None).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].resource_type, "light");
    }

    #[test]
    fn container_without_type_falls_back_to_event_name() {
        let data = r#"{"data":[{"id":"x"}]}"#;
        let events = expand_payload(data, Some("message")).unwrap();
        assert_eq!(events[0].event_type, "message");
        assert_eq!(events[0].resource_type, "unknown");

        let events = expand_payload(data, None).unwrap();
        assert_eq!(events[0].event_type, "unknown");
    }

    #[test]
    fn legacy_id_v1_is_used_when_id_is_absent() {
        let data = r#"{"type":"update","data":[{"type":"light","id_v1":"/lights/3"}]}"#;
        let events = expand_payload(data, None).unwrap();
        assert_eq!(events[0].resource_id, "/lights/3");
    }

    #[test]
    fn malformed_payload_reports_bounded_preview() {
        let garbage = format!("not json {}", "x".repeat(2000));
        let err = expand_payload(&garbage, None).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("not json"));
        assert!(message.len() < 500);
    }
}
