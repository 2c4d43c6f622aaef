//! Inbound notifications: one JSON object per line.
//!
//! ```text
//! {"type":"link_state","kind":"create","node":"10.0.0.1","link_state_id":"49.0001.0000.0000.0001.00","neighbors":[...]}
//! {"type":"adjacency","kind":"create","interface":"ethernet-1/1","chassis":"1A:2B:3C:4D:5E:6F","port":"ethernet-1/49"}
//! ```

use serde::{Deserialize, Serialize};

use fabric_election::AdjacencyEvent;
use fabric_topology::{LinkStateEvent, RawLinkStateEvent};

use crate::error::Result;

/// Wire form of a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    LinkState(RawLinkStateEvent),
    Adjacency(AdjacencyEvent),
}

/// A validated notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    LinkState(LinkStateEvent),
    Adjacency(AdjacencyEvent),
}

impl TryFrom<Notification> for Inbound {
    type Error = crate::error::AgentError;

    fn try_from(notification: Notification) -> Result<Self> {
        Ok(match notification {
            Notification::LinkState(raw) => Inbound::LinkState(LinkStateEvent::try_from(raw)?),
            Notification::Adjacency(event) => Inbound::Adjacency(event),
        })
    }
}

/// Decode and validate one line. Blank lines yield `None`.
pub fn decode(line: &str) -> Result<Option<Inbound>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let notification: Notification = serde_json::from_str(line)?;
    Ok(Some(Inbound::try_from(notification)?))
}
