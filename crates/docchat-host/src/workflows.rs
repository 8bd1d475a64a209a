//! User-triggered workflows — templates that seed the model with instructions
//!
//! A workflow never performs work itself. Resolution validates its arguments
//! against the store and returns role-tagged instructions; the model later
//! does the actual reading and editing through actions.

use async_trait::async_trait;
use docchat_core::{Error, Result, SeedMessage};
use docchat_store::DocumentStore;
use serde_json::{json, Value};
use std::sync::Arc;

#[async_trait]
pub trait Workflow: Send + Sync {
    /// Workflow name as typed by the user.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema for the named arguments.
    fn input_schema(&self) -> Value;

    async fn resolve(&self, args: Value) -> Result<Vec<SeedMessage>>;
}

fn doc_id_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "doc_id": {
                "type": "string",
                "description": "Id of the target document"
            }
        },
        "required": ["doc_id"]
    })
}

fn require_doc_id(name: &str, args: &Value) -> Result<String> {
    args.get("doc_id")
        .and_then(|v| v.as_str())
        .map(String::from)
        .ok_or_else(|| Error::invalid_args(name, "parameter 'doc_id' must be a string"))
}

/// `format` — have the model rewrite a document with structural markup.
pub struct FormatWorkflow {
    store: Arc<DocumentStore>,
}

impl FormatWorkflow {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Workflow for FormatWorkflow {
    fn name(&self) -> &str {
        "format"
    }

    fn description(&self) -> &str {
        "Rewrite a document in well-structured markdown."
    }

    fn input_schema(&self) -> Value {
        doc_id_schema()
    }

    async fn resolve(&self, args: Value) -> Result<Vec<SeedMessage>> {
        let doc_id = require_doc_id(self.name(), &args)?;
        // Validates the id; an unknown document fails here, before the
        // model is ever seeded.
        self.store.read(&doc_id).await?;

        Ok(vec![SeedMessage::user(format!(
            "Rewrite the document '{doc_id}' in clean markdown.\n\n\
             1. Fetch the current content with the read_doc tool.\n\
             2. Restructure it with markdown headers, lists and emphasis, \
             keeping every piece of information.\n\
             3. Persist the rewrite with the edit_doc tool, replacing the \
             old content.\n\
             4. Confirm what changed."
        ))])
    }
}

/// `summarize` — have the model condense a document.
pub struct SummarizeWorkflow {
    store: Arc<DocumentStore>,
}

impl SummarizeWorkflow {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Workflow for SummarizeWorkflow {
    fn name(&self) -> &str {
        "summarize"
    }

    fn description(&self) -> &str {
        "Produce a concise summary of a document."
    }

    fn input_schema(&self) -> Value {
        doc_id_schema()
    }

    async fn resolve(&self, args: Value) -> Result<Vec<SeedMessage>> {
        let doc_id = require_doc_id(self.name(), &args)?;
        self.store.read(&doc_id).await?;

        Ok(vec![SeedMessage::user(format!(
            "Summarize the document '{doc_id}'.\n\n\
             1. Fetch its content with the read_doc tool.\n\
             2. Reply with two or three sentences covering the main points. \
             Do not edit the document."
        ))])
    }
}
