//! Capability channel protocol — correlation-id request/response
//!
//! Wire format (in-process today, serde-serializable so the same protocol
//! could ride an IPC pipe):
//!
//! Gateway → Host:
//!   { "id": "b3f1…", "payload": { "type": "catalog", "kind": "action" } }
//!   { "id": "77aa…", "payload": { "type": "invoke", "name": "read_doc", "kind": "action", "args": { "doc_id": "plan.md" } } }
//!   { "id": "09c2…", "payload": { "type": "resolve", "name": "summarize", "args": { "doc_id": "plan.md" } } }
//!
//! Host → Gateway (same id, exactly one response per request):
//!   { "id": "77aa…", "payload": { "type": "invocation", "result": { "type": "text", "text": "…" } } }
//!   { "id": "77aa…", "payload": { "type": "failure", "error": { "kind": "not_found", "detail": "plan.md" } } }

use crate::error::Error;
use crate::types::{CapabilityDescriptor, CapabilityKind, InvocationResult, SeedMessage};
use serde::{Deserialize, Serialize};

/// Request from the gateway, correlated by `id`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChannelRequest {
    pub id: String,
    pub payload: RequestPayload,
}

impl ChannelRequest {
    /// Wrap a payload with a fresh correlation id.
    pub fn new(payload: RequestPayload) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            payload,
        }
    }
}

/// The three request shapes the channel carries.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestPayload {
    /// List the catalog, filtered by kind.
    Catalog { kind: CapabilityKind },
    /// Invoke an action or fetch a data endpoint (`name` is the address).
    Invoke {
        name: String,
        kind: CapabilityKind,
        #[serde(default)]
        args: serde_json::Value,
    },
    /// Resolve a workflow template into seed messages.
    Resolve {
        name: String,
        #[serde(default)]
        args: serde_json::Value,
    },
}

/// Response from the host, carrying the request's id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChannelResponse {
    pub id: String,
    pub payload: ResponsePayload,
}

impl ChannelResponse {
    pub fn catalog(id: impl Into<String>, capabilities: Vec<CapabilityDescriptor>) -> Self {
        Self {
            id: id.into(),
            payload: ResponsePayload::Catalog { capabilities },
        }
    }

    pub fn invocation(id: impl Into<String>, result: InvocationResult) -> Self {
        Self {
            id: id.into(),
            payload: ResponsePayload::Invocation { result },
        }
    }

    pub fn seed(id: impl Into<String>, messages: Vec<SeedMessage>) -> Self {
        Self {
            id: id.into(),
            payload: ResponsePayload::Seed { messages },
        }
    }

    pub fn failure(id: impl Into<String>, error: Error) -> Self {
        Self {
            id: id.into(),
            payload: ResponsePayload::Failure { error },
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponsePayload {
    Catalog { capabilities: Vec<CapabilityDescriptor> },
    Invocation { result: InvocationResult },
    Seed { messages: Vec<SeedMessage> },
    Failure { error: Error },
}
