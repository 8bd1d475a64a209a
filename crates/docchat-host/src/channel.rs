//! Channel serving loop — dispatches gateway requests against the host

use crate::host::CapabilityHost;
use docchat_core::{ChannelRequest, ChannelResponse, RequestPayload};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Serve `host` over a request/response channel pair.
///
/// Each request is handled in its own task, so one slow invocation never
/// blocks the others; the caller pairs responses with requests by
/// correlation id, not arrival order. Exactly one response is sent per
/// request. The loop ends when the request channel closes.
pub fn spawn(
    host: CapabilityHost,
    mut rx: mpsc::Receiver<ChannelRequest>,
    tx: mpsc::Sender<ChannelResponse>,
) -> JoinHandle<()> {
    let host = Arc::new(host);
    tokio::spawn(async move {
        while let Some(ChannelRequest { id, payload }) = rx.recv().await {
            let host = host.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                debug!("channel request {}: {:?}", id, payload);
                let response = dispatch(&host, &id, payload).await;
                let _ = tx.send(response).await;
            });
        }
        debug!("capability channel closed");
    })
}

async fn dispatch(host: &CapabilityHost, id: &str, payload: RequestPayload) -> ChannelResponse {
    match payload {
        RequestPayload::Catalog { kind } => ChannelResponse::catalog(id, host.catalog(kind)),
        RequestPayload::Invoke { name, kind, args } => {
            match host.invoke(&name, kind, args).await {
                Ok(result) => ChannelResponse::invocation(id, result),
                Err(error) => ChannelResponse::failure(id, error),
            }
        }
        RequestPayload::Resolve { name, args } => {
            match host.resolve_workflow(&name, args).await {
                Ok(messages) => ChannelResponse::seed(id, messages),
                Err(error) => ChannelResponse::failure(id, error),
            }
        }
    }
}
