//! Docchat Store - in-memory document store with atomic find/replace

use docchat_core::{Error, Result};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Key-value store of text documents.
///
/// The id set is fixed at construction. Each document sits behind its own
/// lock, so a `replace` is atomic with respect to interleaved reads and
/// writes on the same id while other ids proceed without blocking.
pub struct DocumentStore {
    ids: Vec<String>,
    docs: HashMap<String, RwLock<String>>,
}

impl DocumentStore {
    /// Build a store from `(id, content)` pairs. A duplicate id overwrites
    /// the earlier content but keeps its first position in `list_ids`.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let mut ids = Vec::new();
        let mut docs = HashMap::new();
        for (id, content) in entries {
            let id = id.into();
            if !docs.contains_key(&id) {
                ids.push(id.clone());
            }
            docs.insert(id, RwLock::new(content.into()));
        }
        Self { ids, docs }
    }

    /// The demo corpus.
    pub fn seeded() -> Self {
        Self::new([
            (
                "deposition.md",
                "This deposition covers the testimony of Angela Smith, P.E.",
            ),
            (
                "report.pdf",
                "The report details the state of a 20m condenser tower.",
            ),
            (
                "financials.docx",
                "These financials outline the project's budget and expenditures.",
            ),
            (
                "outlook.pdf",
                "This document presents the projected future performance of the system.",
            ),
            (
                "plan.md",
                "The plan outlines the steps for the project's implementation.",
            ),
            (
                "spec.txt",
                "These specifications define the technical requirements for the equipment.",
            ),
        ])
    }

    /// Registered ids, in insertion order. Stable for the store's lifetime.
    pub fn list_ids(&self) -> &[String] {
        &self.ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.docs.contains_key(id)
    }

    /// Full content of a document.
    pub async fn read(&self, id: &str) -> Result<String> {
        match self.docs.get(id) {
            Some(doc) => Ok(doc.read().await.clone()),
            None => Err(Error::NotFound(id.to_string())),
        }
    }

    /// Replace the first (leftmost) occurrence of `old` with `new`,
    /// returning the updated content. The document is untouched unless
    /// `old` occurs verbatim.
    pub async fn replace(&self, id: &str, old: &str, new: &str) -> Result<String> {
        let doc = self
            .docs
            .get(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let mut content = doc.write().await;
        if !content.contains(old) {
            return Err(Error::PatternNotFound {
                doc_id: id.to_string(),
                pattern: old.to_string(),
            });
        }
        *content = content.replacen(old, new, 1);
        debug!("replace: {} ({} bytes)", id, content.len());
        Ok(content.clone())
    }
}
