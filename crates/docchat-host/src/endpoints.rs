//! Application-fetched data endpoints
//!
//! Endpoints are addressed by a URI-like template. The model never sees
//! them; the context augmenter and application code fetch them directly.

use async_trait::async_trait;
use docchat_core::{Error, InvocationResult, Result};
use docchat_store::DocumentStore;
use serde_json::json;
use std::sync::Arc;

#[async_trait]
pub trait DataEndpoint: Send + Sync {
    /// Address template, e.g. `docs://documents/{doc_id}`. At most one
    /// `{param}` placeholder.
    fn address(&self) -> &str;

    fn description(&self) -> &str;

    /// Fetch a concrete `uri` already known to match the template.
    async fn fetch(&self, uri: &str) -> Result<InvocationResult>;

    fn matches(&self, uri: &str) -> bool {
        match_template(self.address(), uri).is_some()
    }
}

/// Match a concrete uri against a template, returning the value bound to
/// the `{param}` placeholder (empty when the template is a literal).
pub fn match_template(template: &str, uri: &str) -> Option<String> {
    match template.find('{') {
        None => (template == uri).then(String::new),
        Some(open) => {
            let close = template.find('}')?;
            let (prefix, suffix) = (&template[..open], &template[close + 1..]);
            let rest = uri.strip_prefix(prefix)?;
            let value = rest.strip_suffix(suffix)?;
            (!value.is_empty() && !value.contains('/')).then(|| value.to_string())
        }
    }
}

/// `docs://documents` — JSON array of every registered document id.
pub struct DocumentIndexEndpoint {
    store: Arc<DocumentStore>,
}

impl DocumentIndexEndpoint {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl DataEndpoint for DocumentIndexEndpoint {
    fn address(&self) -> &str {
        "docs://documents"
    }

    fn description(&self) -> &str {
        "List of all document ids in the store."
    }

    async fn fetch(&self, _uri: &str) -> Result<InvocationResult> {
        Ok(InvocationResult::json(json!(self.store.list_ids())))
    }
}

/// `docs://documents/{doc_id}` — content of a single document.
pub struct DocumentContentEndpoint {
    store: Arc<DocumentStore>,
}

impl DocumentContentEndpoint {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl DataEndpoint for DocumentContentEndpoint {
    fn address(&self) -> &str {
        "docs://documents/{doc_id}"
    }

    fn description(&self) -> &str {
        "Contents of a single document, by id."
    }

    async fn fetch(&self, uri: &str) -> Result<InvocationResult> {
        let doc_id = match_template(self.address(), uri)
            .ok_or_else(|| Error::UnknownCapability(uri.to_string()))?;
        let content = self.store.read(&doc_id).await?;
        Ok(InvocationResult::text(content))
    }
}
