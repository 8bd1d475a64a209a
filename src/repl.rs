//! Interactive chat loop — one line of input per turn

use docchat_agent::{AgentEvent, AgentRuntime, Session, TurnInput};
use serde_json::json;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// What one input line asks for.
#[derive(Debug, PartialEq)]
pub enum Command {
    Chat(String),
    Workflow {
        name: String,
        args: serde_json::Value,
    },
    ListDocs,
    Quit,
    Empty,
}

/// Parse one line. A leading `/` routes to the command path; anything else
/// is plain chat.
pub fn parse_line(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let rest = match line.strip_prefix('/') {
        Some(rest) => rest,
        None => return Command::Chat(line.to_string()),
    };

    let mut tokens = rest.split_whitespace();
    let name = match tokens.next() {
        Some(name) => name,
        None => return Command::Empty,
    };

    match name {
        "quit" | "exit" => Command::Quit,
        "docs" => Command::ListDocs,
        _ => {
            let mut args = serde_json::Map::new();
            for token in tokens {
                match token.split_once('=') {
                    Some((key, value)) => {
                        args.insert(key.to_string(), json!(value));
                    }
                    // A bare token names the target document.
                    None => {
                        args.insert("doc_id".to_string(), json!(token));
                    }
                }
            }
            Command::Workflow {
                name: name.to_string(),
                args: serde_json::Value::Object(args),
            }
        }
    }
}

pub async fn run(runtime: AgentRuntime) -> anyhow::Result<()> {
    let session = runtime.new_session();

    match runtime.client().read_endpoint("docs://documents").await {
        Ok(result) => println!("docchat — documents: {}", result.to_content_string()),
        Err(err) => eprintln!("warning: could not list documents: {}", err),
    }
    println!("Reference a document with @id. Commands: /format <id>, /summarize <id>, /docs, /quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };

        match parse_line(&line) {
            Command::Empty => continue,
            Command::Quit => break,
            Command::ListDocs => match runtime.client().read_endpoint("docs://documents").await {
                Ok(result) => println!("{}", result.to_content_string()),
                Err(err) => eprintln!("error: {}", err),
            },
            Command::Workflow { name, args } => {
                run_turn(&runtime, &session, TurnInput::Workflow { name, args }).await;
            }
            Command::Chat(text) => {
                run_turn(&runtime, &session, TurnInput::Chat(text)).await;
            }
        }
    }

    Ok(())
}

async fn run_turn(runtime: &AgentRuntime, session: &Session, input: TurnInput) {
    let (event_tx, mut event_rx) = mpsc::channel(64);

    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                AgentEvent::UnresolvedReference { id, reason } => {
                    eprintln!("  [ref] @{} unresolved: {}", id, reason);
                }
                AgentEvent::ToolCall { name, .. } => {
                    eprintln!("  [tool] {} ...", name);
                }
                AgentEvent::ToolResult { name, is_error, .. } => {
                    if is_error {
                        eprintln!("  [tool] {} failed", name);
                    } else {
                        eprintln!("  [tool] {} ok", name);
                    }
                }
                AgentEvent::Done { .. } => {}
            }
        }
    });

    match runtime.run_turn(session, input, event_tx).await {
        Ok(answer) => println!("{}", answer),
        // The session survives a failed turn; the next line starts fresh.
        Err(err) => eprintln!("turn failed: {}", err),
    }
    let _ = printer.await;
}
