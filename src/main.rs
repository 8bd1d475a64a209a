//! docchat — chat with a small document store through a capability host
//!
//! Usage:
//!   docchat                       → interactive chat (needs ANTHROPIC_API_KEY)
//!   docchat --model <id>          → pick the model
//!   docchat --max-rounds <n>      → bound action rounds per turn
//!
//! Inside the chat: `@doc_id` attaches a document to the message,
//! `/format <doc_id>` and `/summarize <doc_id>` trigger workflows,
//! `/docs` lists the documents, `/quit` exits.

mod repl;

use anyhow::anyhow;
use clap::Parser;
use docchat_agent::{AgentConfig, AgentRuntime};
use docchat_client::CapabilityClient;
use docchat_host::create_default_host;
use docchat_llm::AnthropicProvider;
use docchat_store::DocumentStore;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "docchat",
    about = "Capability-mediated document chat",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    /// Model id for the conversation
    #[arg(short, long)]
    model: Option<String>,

    /// Maximum non-terminal action rounds per turn
    #[arg(long, default_value_t = 8)]
    max_rounds: usize,

    /// Custom system prompt
    #[arg(long)]
    system_prompt: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let api_key =
        std::env::var("ANTHROPIC_API_KEY").map_err(|_| anyhow!("ANTHROPIC_API_KEY not set"))?;

    let store = Arc::new(DocumentStore::seeded());
    tracing::info!("store ready: {} documents", store.list_ids().len());
    let host = create_default_host(store);
    let client = CapabilityClient::connect(host);

    let mut config = AgentConfig {
        max_rounds: cli.max_rounds,
        ..Default::default()
    };
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(prompt) = cli.system_prompt {
        config.system_prompt = Some(prompt);
    }

    let provider = Arc::new(AnthropicProvider::new(api_key));
    let runtime = AgentRuntime::new(provider, client, config);

    repl::run(runtime).await
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docchat=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
