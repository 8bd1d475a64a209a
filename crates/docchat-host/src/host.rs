//! Capability catalog and kind-validated dispatch

use crate::actions::Action;
use crate::endpoints::DataEndpoint;
use crate::workflows::Workflow;
use docchat_core::{
    CapabilityDescriptor, CapabilityKind, Error, InvocationResult, Result, SeedMessage,
};
use docchat_store::DocumentStore;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Owns the fixed capability catalog and executes invocations against the
/// document store. The catalog is built at startup and immutable afterwards;
/// the host itself carries no other state.
pub struct CapabilityHost {
    store: Arc<DocumentStore>,
    actions: HashMap<String, Arc<dyn Action>>,
    endpoints: Vec<Arc<dyn DataEndpoint>>,
    workflows: HashMap<String, Arc<dyn Workflow>>,
}

impl CapabilityHost {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self {
            store,
            actions: HashMap::new(),
            endpoints: Vec::new(),
            workflows: HashMap::new(),
        }
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    /// Register an action. Replaces any existing action with the same name.
    pub fn register_action(&mut self, action: impl Action + 'static) {
        self.actions
            .insert(action.name().to_string(), Arc::new(action));
    }

    pub fn register_endpoint(&mut self, endpoint: impl DataEndpoint + 'static) {
        self.endpoints.push(Arc::new(endpoint));
    }

    pub fn register_workflow(&mut self, workflow: impl Workflow + 'static) {
        self.workflows
            .insert(workflow.name().to_string(), Arc::new(workflow));
    }

    /// Catalog entries of one kind, sorted by name so listings are stable.
    pub fn catalog(&self, kind: CapabilityKind) -> Vec<CapabilityDescriptor> {
        let mut entries: Vec<CapabilityDescriptor> = match kind {
            CapabilityKind::Action => self
                .actions
                .values()
                .map(|a| CapabilityDescriptor {
                    name: a.name().to_string(),
                    kind,
                    description: a.description().to_string(),
                    input_schema: a.input_schema(),
                })
                .collect(),
            CapabilityKind::DataEndpoint => self
                .endpoints
                .iter()
                .map(|e| CapabilityDescriptor {
                    name: e.address().to_string(),
                    kind,
                    description: e.description().to_string(),
                    input_schema: serde_json::json!({}),
                })
                .collect(),
            CapabilityKind::Workflow => self
                .workflows
                .values()
                .map(|w| CapabilityDescriptor {
                    name: w.name().to_string(),
                    kind,
                    description: w.description().to_string(),
                    input_schema: w.input_schema(),
                })
                .collect(),
        };
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    /// Which kind owns `name`, if any. For endpoints, `name` is a concrete
    /// address matched against the registered templates.
    fn kind_of(&self, name: &str) -> Option<CapabilityKind> {
        if self.actions.contains_key(name) {
            Some(CapabilityKind::Action)
        } else if self.workflows.contains_key(name) {
            Some(CapabilityKind::Workflow)
        } else if self.endpoints.iter().any(|e| e.matches(name)) {
            Some(CapabilityKind::DataEndpoint)
        } else {
            None
        }
    }

    /// Execute one invocation. Routing is strictly by kind: a name
    /// registered under a different kind fails `WrongKind` rather than
    /// being guessed at.
    pub async fn invoke(
        &self,
        name: &str,
        kind: CapabilityKind,
        args: Value,
    ) -> Result<InvocationResult> {
        match self.kind_of(name) {
            None => return Err(Error::UnknownCapability(name.to_string())),
            Some(registered) if registered != kind => {
                return Err(Error::WrongKind {
                    name: name.to_string(),
                    registered,
                    requested: kind,
                });
            }
            Some(_) => {}
        }

        match kind {
            CapabilityKind::Action => {
                let action = self
                    .actions
                    .get(name)
                    .ok_or_else(|| Error::UnknownCapability(name.to_string()))?;
                check_required_args(name, &action.input_schema(), &args)?;
                action.execute(args).await
            }
            CapabilityKind::DataEndpoint => {
                let endpoint = self
                    .endpoints
                    .iter()
                    .find(|e| e.matches(name))
                    .ok_or_else(|| Error::UnknownCapability(name.to_string()))?;
                endpoint.fetch(name).await
            }
            CapabilityKind::Workflow => {
                let messages = self.resolve_workflow(name, args).await?;
                Ok(InvocationResult::messages(messages))
            }
        }
    }

    /// Resolve a workflow template into its seed messages.
    pub async fn resolve_workflow(&self, name: &str, args: Value) -> Result<Vec<SeedMessage>> {
        let workflow = self
            .workflows
            .get(name)
            .ok_or_else(|| Error::UnknownCapability(name.to_string()))?;
        check_required_args(name, &workflow.input_schema(), &args)?;
        workflow.resolve(args).await
    }
}

/// Validate that every parameter in the schema's `required` array is
/// present in `args`.
fn check_required_args(name: &str, schema: &Value, args: &Value) -> Result<()> {
    let required = match schema.get("required").and_then(|r| r.as_array()) {
        Some(required) => required,
        None => return Ok(()),
    };
    for param in required.iter().filter_map(|p| p.as_str()) {
        if args.get(param).is_none() {
            return Err(Error::invalid_args(
                name,
                format!("missing required parameter: {}", param),
            ));
        }
    }
    Ok(())
}
