//! Where configuration intents go.

use std::io::Write;

use fabric_election::ConfigIntent;

use crate::error::{AgentError, Result};

/// Configuration channel of the local device.
///
/// Implementations own retries; the agent logs a failure and moves on.
pub trait ConfigSink {
    fn apply(&mut self, intent: &ConfigIntent) -> Result<()>;
}

/// Writes each intent as one JSON line.
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl JsonLinesSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConfigSink for JsonLinesSink<W> {
    fn apply(&mut self, intent: &ConfigIntent) -> Result<()> {
        let line = serde_json::to_string(intent)?;
        writeln!(self.out, "{}", line).map_err(|e| AgentError::Sink(e.to_string()))?;
        self.out.flush().map_err(|e| AgentError::Sink(e.to_string()))
    }
}

/// Keeps intents in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub intents: Vec<ConfigIntent>,
}

impl ConfigSink for RecordingSink {
    fn apply(&mut self, intent: &ConfigIntent) -> Result<()> {
        self.intents.push(intent.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_lines_are_newline_terminated() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.apply(&ConfigIntent::WithdrawOverlay).unwrap();
        sink.apply(&ConfigIntent::WithdrawOverlay).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text, "{\"intent\":\"withdraw_overlay\"}\n{\"intent\":\"withdraw_overlay\"}\n");
    }

    #[test]
    fn recording_sink_keeps_order() {
        let mut sink = RecordingSink::default();
        sink.apply(&ConfigIntent::WithdrawOverlay).unwrap();
        assert_eq!(sink.intents, vec![ConfigIntent::WithdrawOverlay]);
    }
}
