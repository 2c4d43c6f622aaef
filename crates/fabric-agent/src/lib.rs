//! Fabric Agent
//!
//! Configuration-less fabric agent. Reads link-state and neighbor-discovery
//! notifications, keeps the fabric graph current, re-infers every node's role
//! after each change and emits configuration intents for the local node.
//!
//! # Pipeline
//!
//! ```text
//! input ──lines──▶ reader task ──mpsc──▶ processing loop ──▶ ConfigSink
//!                                              │
//!                                              └──▶ role report file
//! ```
//!
//! The processing loop is the only owner of [`FabricAgent`]; each
//! notification is fully applied before the next one is looked at.

pub mod agent;
pub mod config;
pub mod error;
pub mod notification;
pub mod report_file;
pub mod sink;

use std::io;
use std::path::Path;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use fabric_election::ConfigIntent;

pub use agent::{FabricAgent, Handled};
pub use config::AgentConfig;
pub use error::{AgentError, Result};
pub use notification::{decode, Inbound, Notification};
pub use report_file::{read_report, write_report};
pub use sink::{ConfigSink, JsonLinesSink, RecordingSink};

/// Lines buffered between the reader and the processing loop.
pub const QUEUE_DEPTH: usize = 1024;

/// Drive `agent` with the notifications in `input` until it is exhausted.
///
/// Intents go to `sink`; the report at `report_path` is rewritten whenever
/// the roles change. Sink and report failures are logged, not fatal. Returns
/// the agent so callers can inspect its final state.
///
/// A line that is not valid UTF-8 is logged and skipped like any other
/// malformed notification; only a read error on `input` ends the stream early.
pub async fn run<R, S>(
    mut agent: FabricAgent,
    input: R,
    sink: &mut S,
    report_path: Option<&Path>,
) -> Result<FabricAgent>
where
    R: AsyncRead + Unpin + Send + 'static,
    S: ConfigSink,
{
    for intent in agent.bootstrap() {
        deliver(sink, &intent);
    }
    if let Some(path) = report_path {
        persist(path, &agent);
    }

    let (tx, mut rx) = mpsc::channel::<String>(QUEUE_DEPTH);
    let reader = tokio::spawn(async move {
        let mut input = BufReader::new(input);
        let mut buf = Vec::new();
        let mut line_no = 0usize;
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            line_no += 1;
            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line.trim_end_matches(&['\r', '\n'][..]).to_string(),
                Err(e) => {
                    warn!(line = line_no, "Discarding notification: {}", e);
                    continue;
                }
            };
            if tx.send(line).await.is_err() {
                break;
            }
        }
        Ok::<_, io::Error>(())
    });

    while let Some(line) = rx.recv().await {
        let handled = agent.handle_line(&line);
        for intent in &handled.intents {
            deliver(sink, intent);
        }
        if handled.roles_changed {
            if let Some(path) = report_path {
                persist(path, &agent);
            }
        }
    }

    reader
        .await
        .map_err(|e| AgentError::Io(io::Error::new(io::ErrorKind::Other, e)))??;
    info!("Notification stream closed");
    Ok(agent)
}

fn deliver<S: ConfigSink>(sink: &mut S, intent: &ConfigIntent) {
    if let Err(e) = sink.apply(intent) {
        error!(intent = intent.kind(), "Failed to apply intent: {}", e);
    }
}

fn persist(path: &Path, agent: &FabricAgent) {
    if let Err(e) = write_report(path, &agent.report()) {
        error!(path = %path.display(), "Failed to write role report: {}", e);
    }
}
