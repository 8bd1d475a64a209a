//! Model-invoked actions over the document store

use async_trait::async_trait;
use docchat_core::{Error, InvocationResult, Result};
use docchat_store::DocumentStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// A model-controlled capability. The model decides on its own to invoke
/// these, so failures must come back as values the loop can report.
#[async_trait]
pub trait Action: Send + Sync {
    /// Unique action name offered to the model.
    fn name(&self) -> &str;

    /// Human/model-readable description.
    fn description(&self) -> &str;

    /// JSON Schema for the arguments.
    fn input_schema(&self) -> Value;

    async fn execute(&self, args: Value) -> Result<InvocationResult>;
}

fn require_str<'a>(args: &'a Value, name: &str, param: &str) -> Result<&'a str> {
    args.get(param)
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::invalid_args(name, format!("parameter '{}' must be a string", param)))
}

/// `read_doc` — fetch a document's full content.
pub struct ReadDocAction {
    store: Arc<DocumentStore>,
}

impl ReadDocAction {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Action for ReadDocAction {
    fn name(&self) -> &str {
        "read_doc"
    }

    fn description(&self) -> &str {
        "Read the full contents of a document by its id."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "doc_id": {
                    "type": "string",
                    "description": "Id of the document to read"
                }
            },
            "required": ["doc_id"]
        })
    }

    async fn execute(&self, args: Value) -> Result<InvocationResult> {
        let doc_id = require_str(&args, self.name(), "doc_id")?;
        let content = self.store.read(doc_id).await?;
        debug!("read_doc: {} ({} bytes)", doc_id, content.len());
        Ok(InvocationResult::text(content))
    }
}

/// `edit_doc` — find/replace-first mutation of a document.
pub struct EditDocAction {
    store: Arc<DocumentStore>,
}

impl EditDocAction {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Action for EditDocAction {
    fn name(&self) -> &str {
        "edit_doc"
    }

    fn description(&self) -> &str {
        "Edit a document by replacing the first exact occurrence of a string."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "doc_id": {
                    "type": "string",
                    "description": "Id of the document to edit"
                },
                "old_string": {
                    "type": "string",
                    "description": "Exact text to find; only the first occurrence is replaced"
                },
                "new_string": {
                    "type": "string",
                    "description": "Replacement text"
                }
            },
            "required": ["doc_id", "old_string", "new_string"]
        })
    }

    async fn execute(&self, args: Value) -> Result<InvocationResult> {
        let doc_id = require_str(&args, self.name(), "doc_id")?;
        let old = require_str(&args, self.name(), "old_string")?;
        let new = require_str(&args, self.name(), "new_string")?;

        self.store.replace(doc_id, old, new).await?;
        debug!("edit_doc: {}", doc_id);
        Ok(InvocationResult::text(format!("Edited '{}'", doc_id)))
    }
}
