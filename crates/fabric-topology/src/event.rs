//! Link-state events as delivered by the notification stream.
//!
//! The wire form ([`RawLinkStateEvent`]) carries plain strings; converting it
//! into a [`LinkStateEvent`] validates every identity up front so that a
//! malformed event is rejected before it can touch the graph.

use crate::error::{Result, TopologyError};
use crate::{LinkStateId, NodeId};

/// Operation carried by a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EventKind {
    Create,
    Update,
    Delete,
}

/// One reachability entry: `link_state_id` advertises `neighbor` at `metric`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborRecord {
    pub link_state_id: LinkStateId,
    pub neighbor: LinkStateId,
    pub metric: u32,
}

impl NeighborRecord {
    pub fn new(link_state_id: LinkStateId, neighbor: LinkStateId, metric: u32) -> Self {
        Self {
            link_state_id,
            neighbor,
            metric,
        }
    }
}

/// A validated link-state event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkStateEvent {
    pub kind: EventKind,
    /// Loopback identity of the node the event is about
    pub node: NodeId,
    /// The node's own NET; required for create and update
    pub link_state_id: Option<LinkStateId>,
    /// Reachability entries from the link-state database
    pub records: Vec<NeighborRecord>,
}

impl LinkStateEvent {
    /// A node joined, advertising `records`.
    pub fn create(node: NodeId, link_state_id: LinkStateId, records: Vec<NeighborRecord>) -> Self {
        Self {
            kind: EventKind::Create,
            node,
            link_state_id: Some(link_state_id),
            records,
        }
    }

    /// A known node changed its advertisement.
    pub fn update(node: NodeId, link_state_id: LinkStateId, records: Vec<NeighborRecord>) -> Self {
        Self {
            kind: EventKind::Update,
            node,
            link_state_id: Some(link_state_id),
            records,
        }
    }

    /// A node left.
    pub fn delete(node: NodeId) -> Self {
        Self {
            kind: EventKind::Delete,
            node,
            link_state_id: None,
            records: Vec::new(),
        }
    }
}

/// Wire form of a neighbor record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawNeighborRecord {
    pub link_state_id: String,
    pub neighbor: String,
    pub metric: u32,
}

/// Wire form of a link-state event.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawLinkStateEvent {
    pub kind: EventKind,
    pub node: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub link_state_id: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub neighbors: Vec<RawNeighborRecord>,
}

impl TryFrom<RawLinkStateEvent> for LinkStateEvent {
    type Error = TopologyError;

    fn try_from(raw: RawLinkStateEvent) -> Result<Self> {
        let malformed = |reason: String| TopologyError::Malformed {
            node: raw.node.clone(),
            reason,
        };

        let node: NodeId = raw.node.parse().map_err(|e: TopologyError| malformed(e.to_string()))?;

        let link_state_id: Option<LinkStateId> = match &raw.link_state_id {
            Some(s) => Some(s.parse().map_err(|e: TopologyError| malformed(e.to_string()))?),
            None => None,
        };
        if link_state_id.is_none() && raw.kind != EventKind::Delete {
            return Err(malformed("missing link-state id".to_string()));
        }

        let records = raw
            .neighbors
            .iter()
            .map(|r| -> Result<NeighborRecord> {
                Ok(NeighborRecord {
                    link_state_id: r.link_state_id.parse()?,
                    neighbor: r.neighbor.parse()?,
                    metric: r.metric,
                })
            })
            .collect::<Result<Vec<_>>>()
            .map_err(|e| malformed(e.to_string()))?;

        Ok(Self {
            kind: raw.kind,
            node,
            link_state_id,
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(kind: EventKind, node: &str, lsid: Option<&str>) -> RawLinkStateEvent {
        RawLinkStateEvent {
            kind,
            node: node.to_string(),
            link_state_id: lsid.map(str::to_string),
            neighbors: vec![RawNeighborRecord {
                link_state_id: "49.0001.0000.0000.0001.00".to_string(),
                neighbor: "49.0001.0000.0000.0002.00".to_string(),
                metric: 10,
            }],
        }
    }

    #[test]
    fn valid_raw_event_converts() {
        let event = LinkStateEvent::try_from(raw(
            EventKind::Create,
            "10.0.0.1",
            Some("49.0001.0000.0000.0001.00"),
        ))
        .unwrap();
        assert_eq!(event.kind, EventKind::Create);
        assert_eq!(event.node.to_string(), "10.0.0.1");
        assert_eq!(event.records.len(), 1);
        assert_eq!(event.records[0].metric, 10);
    }

    #[test]
    fn create_without_link_state_id_is_malformed() {
        let err = LinkStateEvent::try_from(raw(EventKind::Create, "10.0.0.1", None)).unwrap_err();
        assert!(matches!(err, TopologyError::Malformed { .. }));
    }

    #[test]
    fn delete_needs_only_identity() {
        let event = LinkStateEvent::try_from(raw(EventKind::Delete, "10.0.0.1", None)).unwrap();
        assert_eq!(event.kind, EventKind::Delete);
    }

    #[test]
    fn bad_identity_is_malformed() {
        let event = raw(EventKind::Update, "0.0.0.0", Some("49.0001.00"));
        let err = LinkStateEvent::try_from(event).unwrap_err();
        assert!(matches!(err, TopologyError::Malformed { ref node, .. } if node == "0.0.0.0"));
    }

    #[test]
    fn bad_neighbor_record_is_malformed() {
        let mut r = raw(EventKind::Create, "10.0.0.1", Some("49.0001.0000.0000.0001.00"));
        r.neighbors[0].neighbor = "garbage".to_string();
        assert!(LinkStateEvent::try_from(r).is_err());
    }
}
