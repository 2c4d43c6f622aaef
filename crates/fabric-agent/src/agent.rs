//! The agent: owns all fabric state and turns notifications into intents.

use tracing::{debug, info, warn};

use fabric_election::{AdjacencyEvent, AdjacencyTracker, ConfigIntent, ElectionState, RoleReport};
use fabric_roles::classify_detailed;
use fabric_topology::{Applied, LinkStateEvent, TopologyState};

use crate::config::AgentConfig;
use crate::error::Result;
use crate::notification::{decode, Inbound};

/// Result of handling one notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Handled {
    pub intents: Vec<ConfigIntent>,
    /// The role sets (and with them the report) changed
    pub roles_changed: bool,
}

/// Topology, election and underlay state of the local node.
#[derive(Debug)]
pub struct FabricAgent {
    topology: TopologyState,
    election: ElectionState,
    underlay: Option<AdjacencyTracker>,
}

impl FabricAgent {
    pub fn new(config: &AgentConfig) -> Result<Self> {
        Ok(Self {
            topology: TopologyState::new(config.topology()),
            election: ElectionState::new(config.local, config.election()),
            underlay: config.underlay()?.map(AdjacencyTracker::new),
        })
    }

    /// Intents to apply once at startup.
    pub fn bootstrap(&self) -> Vec<ConfigIntent> {
        match &self.underlay {
            Some(tracker) => {
                info!(net = %tracker.config().net, "Underlay instance");
                vec![tracker.config().instance_intent()]
            }
            None => Vec::new(),
        }
    }

    pub fn topology(&self) -> &TopologyState {
        &self.topology
    }

    pub fn election(&self) -> &ElectionState {
        &self.election
    }

    pub fn underlay(&self) -> Option<&AdjacencyTracker> {
        self.underlay.as_ref()
    }

    pub fn report(&self) -> RoleReport {
        self.election.report()
    }

    /// Decode and handle one line. Malformed lines are logged and dropped.
    pub fn handle_line(&mut self, line: &str) -> Handled {
        match decode(line) {
            Ok(Some(inbound)) => self.handle(inbound),
            Ok(None) => Handled::default(),
            Err(e) => {
                warn!("Discarding notification: {}", e);
                Handled::default()
            }
        }
    }

    pub fn handle(&mut self, inbound: Inbound) -> Handled {
        match inbound {
            Inbound::LinkState(event) => self.on_link_state(event),
            Inbound::Adjacency(event) => self.on_adjacency(event),
        }
    }

    fn on_link_state(&mut self, event: LinkStateEvent) -> Handled {
        let applied = match self.topology.apply_event(event) {
            Ok(applied) => applied,
            Err(e) => {
                warn!("Discarding link-state event: {}", e);
                return Handled::default();
            }
        };
        match applied {
            Applied::Joined(node) => info!(%node, "Node joined"),
            Applied::Changed(node) => debug!(%node, "Node changed"),
            Applied::Left(node) => info!(%node, "Node left"),
            Applied::Unknown(node) => {
                debug!(%node, "Delete for unknown node");
                return Handled::default();
            }
        }

        let classification = classify_detailed(self.topology.graph());
        debug!(
            shape = ?classification.shape,
            classes = classification.classes.len(),
            max_hops = ?classification.max_hops,
            pending = self.topology.graph().pending_count(),
            "Classified fabric"
        );

        let outcome = self.election.reconcile(classification.roles);
        if outcome.changed {
            for line in self.election.report().to_string().lines() {
                info!("{}", line);
            }
        }
        Handled {
            intents: outcome.intents,
            roles_changed: outcome.changed,
        }
    }

    fn on_adjacency(&mut self, event: AdjacencyEvent) -> Handled {
        let Some(tracker) = self.underlay.as_mut() else {
            debug!(interface = %event.interface, "No system id configured, ignoring adjacency");
            return Handled::default();
        };
        Handled {
            intents: tracker.apply(event).into_iter().collect(),
            roles_changed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabric_election::UnderlayIntent;

    fn agent(local: &str, mac: Option<&str>) -> FabricAgent {
        let mut config = AgentConfig::new(local.parse().unwrap());
        config.system_id = mac.map(|m| fabric_topology::SystemId::from_mac(m).unwrap());
        FabricAgent::new(&config).unwrap()
    }

    #[test]
    fn bootstrap_needs_a_system_id() {
        assert!(agent("10.0.0.1", None).bootstrap().is_empty());

        let intents = agent("10.0.0.1", Some("1a:0d:00:ff:00:00")).bootstrap();
        assert!(matches!(
            intents.as_slice(),
            [ConfigIntent::Underlay(UnderlayIntent::Instance { .. })]
        ));
    }

    #[test]
    fn adjacency_without_underlay_is_ignored() {
        let mut a = agent("10.0.0.1", None);
        let line = r#"{"type":"adjacency","kind":"create","interface":"ethernet-1/1","chassis":"aa"}"#;
        assert_eq!(a.handle_line(line), Handled::default());
    }

    #[test]
    fn adjacency_enables_interface() {
        let mut a = agent("10.0.0.1", Some("1a:0d:00:ff:00:00"));
        let line = r#"{"type":"adjacency","kind":"create","interface":"ethernet-1/1","chassis":"aa"}"#;
        let handled = a.handle_line(line);
        assert_eq!(handled.intents.len(), 1);
        assert!(!handled.roles_changed);
        assert_eq!(a.underlay().map(|t| t.interfaces().len()), Some(1));
    }

    #[test]
    fn malformed_lines_leave_state_alone() {
        let mut a = agent("10.0.0.1", None);
        assert_eq!(a.handle_line("{oops"), Handled::default());
        let bad_node =
            r#"{"type":"link_state","kind":"create","node":"300.0.0.1","link_state_id":"49.00"}"#;
        assert_eq!(a.handle_line(bad_node), Handled::default());
        assert!(a.topology().graph().is_empty());
    }

    #[test]
    fn delete_of_unknown_node_is_quiet() {
        let mut a = agent("10.0.0.1", None);
        let handled = a.handle_line(r#"{"type":"link_state","kind":"delete","node":"10.0.0.9"}"#);
        assert_eq!(handled, Handled::default());
    }
}
