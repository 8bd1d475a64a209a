//! Docchat Client — the capability gateway
//!
//! A thin, cheaply cloneable façade over the capability channel. Exactly
//! five operations; no business logic, only marshaling. Host failure kinds
//! pass through unchanged; channel breakage surfaces as `Transport`.

use dashmap::DashMap;
use docchat_core::{
    CapabilityDescriptor, CapabilityKind, ChannelRequest, ChannelResponse, Error,
    InvocationResult, RequestPayload, ResponsePayload, Result, SeedMessage,
};
use docchat_host::CapabilityHost;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

const CHANNEL_CAPACITY: usize = 64;

type PendingMap = Arc<DashMap<String, oneshot::Sender<ResponsePayload>>>;

#[derive(Clone)]
pub struct CapabilityClient {
    tx: mpsc::Sender<ChannelRequest>,
    pending: PendingMap,
}

impl CapabilityClient {
    /// Wire a host to a fresh channel pair, spawning its serving task and
    /// the response demultiplexer. The usual entry point.
    pub fn connect(host: CapabilityHost) -> Self {
        let (req_tx, req_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (resp_tx, resp_rx) = mpsc::channel(CHANNEL_CAPACITY);
        docchat_host::channel::spawn(host, req_rx, resp_tx);
        Self::from_channels(req_tx, resp_rx)
    }

    /// Attach to an already-wired channel pair; the transport (and the host
    /// behind it) is owned by the caller.
    pub fn from_channels(
        tx: mpsc::Sender<ChannelRequest>,
        rx: mpsc::Receiver<ChannelResponse>,
    ) -> Self {
        let pending: PendingMap = Arc::new(DashMap::new());
        spawn_demux(rx, pending.clone());
        Self { tx, pending }
    }

    /// List every action the model may invoke.
    pub async fn list_actions(&self) -> Result<Vec<CapabilityDescriptor>> {
        match self
            .request(RequestPayload::Catalog {
                kind: CapabilityKind::Action,
            })
            .await?
        {
            ResponsePayload::Catalog { capabilities } => Ok(capabilities),
            other => Err(unexpected(other)),
        }
    }

    /// Invoke one action by name.
    pub async fn invoke_action(
        &self,
        name: &str,
        args: serde_json::Value,
    ) -> Result<InvocationResult> {
        match self
            .request(RequestPayload::Invoke {
                name: name.to_string(),
                kind: CapabilityKind::Action,
                args,
            })
            .await?
        {
            ResponsePayload::Invocation { result } => Ok(result),
            other => Err(unexpected(other)),
        }
    }

    /// List the user-triggerable workflows.
    pub async fn list_workflows(&self) -> Result<Vec<CapabilityDescriptor>> {
        match self
            .request(RequestPayload::Catalog {
                kind: CapabilityKind::Workflow,
            })
            .await?
        {
            ResponsePayload::Catalog { capabilities } => Ok(capabilities),
            other => Err(unexpected(other)),
        }
    }

    /// Resolve a workflow into its seed messages.
    pub async fn resolve_workflow(
        &self,
        name: &str,
        args: serde_json::Value,
    ) -> Result<Vec<SeedMessage>> {
        match self
            .request(RequestPayload::Resolve {
                name: name.to_string(),
                args,
            })
            .await?
        {
            ResponsePayload::Seed { messages } => Ok(messages),
            other => Err(unexpected(other)),
        }
    }

    /// Fetch a data endpoint by its address.
    pub async fn read_endpoint(&self, uri: &str) -> Result<InvocationResult> {
        match self
            .request(RequestPayload::Invoke {
                name: uri.to_string(),
                kind: CapabilityKind::DataEndpoint,
                args: serde_json::Value::Null,
            })
            .await?
        {
            ResponsePayload::Invocation { result } => Ok(result),
            other => Err(unexpected(other)),
        }
    }

    async fn request(&self, payload: RequestPayload) -> Result<ResponsePayload> {
        let request = ChannelRequest::new(payload);
        let id = request.id.clone();
        let (reply_tx, reply_rx) = oneshot::channel();
        self.pending.insert(id.clone(), reply_tx);

        if self.tx.send(request).await.is_err() {
            self.pending.remove(&id);
            return Err(Error::transport("capability host is gone"));
        }

        let payload = reply_rx
            .await
            .map_err(|_| Error::transport("capability channel closed before reply"))?;
        match payload {
            ResponsePayload::Failure { error } => Err(error),
            other => Ok(other),
        }
    }
}

fn unexpected(payload: ResponsePayload) -> Error {
    Error::transport(format!("unexpected response shape: {:?}", payload))
}

fn spawn_demux(mut rx: mpsc::Receiver<ChannelResponse>, pending: PendingMap) {
    tokio::spawn(async move {
        while let Some(response) = rx.recv().await {
            match pending.remove(&response.id) {
                Some((_, reply_tx)) => {
                    let _ = reply_tx.send(response.payload);
                }
                None => warn!("dropping uncorrelated response: {}", response.id),
            }
        }
        debug!("gateway demux stopped");
        // Drop every parked sender so in-flight callers see Transport
        // instead of hanging.
        pending.clear();
    });
}
