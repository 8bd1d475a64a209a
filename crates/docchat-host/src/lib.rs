//! Docchat Host — capability catalog and dispatch
//!
//! Each capability is a self-contained type implementing one of the three
//! kind traits. To add a capability: implement the trait in the matching
//! module, register it in create_default_host().

pub mod actions;
pub mod channel;
pub mod endpoints;
pub mod host;
pub mod workflows;

pub use actions::Action;
pub use endpoints::DataEndpoint;
pub use host::CapabilityHost;
pub use workflows::Workflow;

use docchat_store::DocumentStore;
use std::sync::Arc;

/// Build a host with the full built-in catalog over `store`.
pub fn create_default_host(store: Arc<DocumentStore>) -> CapabilityHost {
    let mut host = CapabilityHost::new(store.clone());

    // --- Model-invoked actions ---
    host.register_action(actions::ReadDocAction::new(store.clone()));
    host.register_action(actions::EditDocAction::new(store.clone()));

    // --- Application-fetched data endpoints ---
    host.register_endpoint(endpoints::DocumentIndexEndpoint::new(store.clone()));
    host.register_endpoint(endpoints::DocumentContentEndpoint::new(store.clone()));

    // --- User-triggered workflows ---
    host.register_workflow(workflows::FormatWorkflow::new(store.clone()));
    host.register_workflow(workflows::SummarizeWorkflow::new(store));

    host
}
