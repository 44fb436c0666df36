//! Bridge event-stream models
//!
//! The bridge pushes change notifications over its event stream as JSON
//! "containers": each container groups one or more resource-change records
//! sharing a type and creation time. A single frame may carry either one
//! container or an array of them; [`ContainerPayload`] decodes both shapes
//! explicitly.

use serde::{Deserialize, Serialize};

/// One decoded resource change delivered to event sinks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeEvent {
    /// Container event type (`update`, `add`, ...), falling back to the
    /// frame's SSE event name, then `"unknown"`
    pub event_type: String,
    /// Resource type of the changed record (`temperature`, `light`, ...)
    pub resource_type: String,
    /// Resource identifier (`id`, or legacy `id_v1` when absent)
    pub resource_id: String,
    /// Container creation time as reported by the bridge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
    /// The raw resource-change record
    pub payload: serde_json::Value,
}

/// A container grouping resource-change records
#[derive(Debug, Clone, Deserialize)]
pub struct EventContainer {
    /// Container event type
    #[serde(rename = "type")]
    pub container_type: Option<String>,
    /// When the bridge created the container
    pub creationtime: Option<String>,
    /// Resource-change records; an absent field decodes as empty
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
}

/// A frame payload: a single container or an array of containers
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ContainerPayload {
    Many(Vec<EventContainer>),
    Single(EventContainer),
}

impl ContainerPayload {
    /// Flatten into a list of containers regardless of the wire shape
    pub fn into_containers(self) -> Vec<EventContainer> {
        match self {
            ContainerPayload::Many(containers) => containers,
            ContainerPayload::Single(container) => vec![container],
        }
    }
}
