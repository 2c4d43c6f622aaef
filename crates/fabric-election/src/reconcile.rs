//! Election state and reconciliation.
//!
//! [`ElectionState::reconcile`] is called with the role sets of every fresh
//! classification. It only acts when the roles actually changed, so
//! re-classifying an unchanged fabric never touches the device.

use tracing::{debug, info};

use fabric_roles::RoleSets;
use fabric_topology::NodeId;

use crate::election::{elect_route_reflectors, DEFAULT_RR_COUNT};
use crate::intent::{ConfigIntent, OverlayConfig, OverlayPeer, PeerRole};
use crate::report::RoleReport;

/// Autonomous system used for overlay sessions.
pub const DEFAULT_OVERLAY_ASN: u32 = 100;

/// Overlay peer group name.
pub const DEFAULT_PEER_GROUP: &str = "overlay";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectionConfig {
    /// Route reflectors to elect
    pub rr_count: usize,
    pub local_as: u32,
    pub peer_group: String,
}

impl Default for ElectionConfig {
    fn default() -> Self {
        Self {
            rr_count: DEFAULT_RR_COUNT,
            local_as: DEFAULT_OVERLAY_ASN,
            peer_group: DEFAULT_PEER_GROUP.to_string(),
        }
    }
}

/// Outcome of one reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub route_reflectors: Vec<NodeId>,
    pub intents: Vec<ConfigIntent>,
    /// False when the roles matched the stored ones and nothing was done
    pub changed: bool,
}

/// What the local node knows about the last election.
#[derive(Debug)]
pub struct ElectionState {
    local: NodeId,
    config: ElectionConfig,
    route_reflectors: Vec<NodeId>,
    roles: RoleSets,
    applied: Option<OverlayConfig>,
}

impl ElectionState {
    pub fn new(local: NodeId, config: ElectionConfig) -> Self {
        Self {
            local,
            config,
            route_reflectors: Vec::new(),
            roles: RoleSets::default(),
            applied: None,
        }
    }

    pub fn local(&self) -> NodeId {
        self.local
    }

    pub fn config(&self) -> &ElectionConfig {
        &self.config
    }

    pub fn route_reflectors(&self) -> &[NodeId] {
        &self.route_reflectors
    }

    pub fn roles(&self) -> &RoleSets {
        &self.roles
    }

    /// Overlay configuration last handed out, if the overlay is enabled.
    pub fn applied(&self) -> Option<&OverlayConfig> {
        self.applied.as_ref()
    }

    pub fn overlay_enabled(&self) -> bool {
        self.applied.is_some()
    }

    pub fn report(&self) -> RoleReport {
        RoleReport::new(self.roles.clone(), self.route_reflectors.clone())
    }

    /// Compare fresh roles with the stored ones and derive intents for the
    /// local node.
    pub fn reconcile(&mut self, new_roles: RoleSets) -> Reconciliation {
        if new_roles == self.roles {
            return Reconciliation {
                route_reflectors: self.route_reflectors.clone(),
                intents: Vec::new(),
                changed: false,
            };
        }

        let mut intents = Vec::new();

        if new_roles.is_empty() {
            info!("Fabric shape undefined, clearing roles");
            if self.applied.take().is_some() {
                intents.push(ConfigIntent::WithdrawOverlay);
            }
            self.roles = RoleSets::default();
            self.route_reflectors.clear();
            return Reconciliation {
                route_reflectors: Vec::new(),
                intents,
                changed: true,
            };
        }

        let elected = elect_route_reflectors(&new_roles, self.config.rr_count);
        let added: Vec<_> =
            elected.iter().filter(|n| !self.route_reflectors.contains(n)).collect();
        let removed: Vec<_> =
            self.route_reflectors.iter().filter(|n| !elected.contains(n)).collect();
        if !added.is_empty() || !removed.is_empty() {
            info!(
                elected = ?elected,
                added = ?added,
                removed = ?removed,
                "Route reflectors changed"
            );
        }
        debug!(
            leaves = new_roles.leaves.len(),
            spines = new_roles.spines.len(),
            super_spines = new_roles.super_spines.len(),
            borders = new_roles.borders.len(),
            "Roles updated"
        );

        match self.desired_overlay(&new_roles, &elected) {
            Some(desired) => {
                if self.applied.as_ref() != Some(&desired) {
                    info!(
                        reflector = desired.is_reflector(),
                        peers = desired.peers.len(),
                        "Enabling overlay"
                    );
                    intents.push(ConfigIntent::EnableOverlay(desired.clone()));
                    self.applied = Some(desired);
                }
            }
            None => {
                if self.applied.take().is_some() {
                    info!("Local node is neither leaf nor route reflector, withdrawing overlay");
                    intents.push(ConfigIntent::WithdrawOverlay);
                }
            }
        }

        self.roles = new_roles;
        self.route_reflectors = elected.clone();

        Reconciliation {
            route_reflectors: elected,
            intents,
            changed: true,
        }
    }

    /// Overlay the local node should run, or `None` when it has no part in it.
    fn desired_overlay(&self, roles: &RoleSets, elected: &[NodeId]) -> Option<OverlayConfig> {
        let peers: Vec<OverlayPeer> = if elected.contains(&self.local) {
            let reflectors = elected.iter().filter(|n| **n != self.local).map(|n| OverlayPeer {
                address: *n,
                role: PeerRole::Reflector,
            });
            let clients = roles
                .leaves
                .iter()
                .filter(|n| **n != self.local && !elected.contains(n))
                .map(|n| OverlayPeer {
                    address: *n,
                    role: PeerRole::Client,
                });
            reflectors.chain(clients).collect()
        } else if roles.leaves.contains(&self.local) {
            elected
                .iter()
                .map(|n| OverlayPeer {
                    address: *n,
                    role: PeerRole::Reflector,
                })
                .collect()
        } else {
            return None;
        };

        let cluster_id = if elected.contains(&self.local) {
            elected.first().copied()
        } else {
            None
        };

        Some(OverlayConfig {
            local_as: self.config.local_as,
            router_id: self.local,
            peer_group: self.config.peer_group.clone(),
            cluster_id,
            peers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(n: u8) -> NodeId {
        format!("10.0.0.{}", n).parse().unwrap()
    }

    fn nodes(ns: &[u8]) -> Vec<NodeId> {
        ns.iter().map(|n| node(*n)).collect()
    }

    fn single_pod() -> RoleSets {
        RoleSets {
            leaves: nodes(&[11, 12, 13, 14]),
            spines: nodes(&[1, 2]),
            ..Default::default()
        }
    }

    fn multi_pod() -> RoleSets {
        RoleSets {
            leaves: nodes(&[11, 12, 13, 14]),
            spines: nodes(&[1, 2, 3, 4]),
            super_spines: nodes(&[21, 22]),
            borders: vec![],
        }
    }

    fn state(local: u8) -> ElectionState {
        ElectionState::new(node(local), ElectionConfig::default())
    }

    fn overlay(r: &Reconciliation) -> &OverlayConfig {
        match r.intents.as_slice() {
            [ConfigIntent::EnableOverlay(cfg)] => cfg,
            other => panic!("expected one enable intent, got {:?}", other),
        }
    }

    #[test]
    fn leaf_peers_with_every_reflector() {
        let mut s = state(11);
        let r = s.reconcile(single_pod());

        assert!(r.changed);
        assert_eq!(r.route_reflectors, nodes(&[1, 2]));
        let cfg = overlay(&r);
        assert_eq!(cfg.router_id, node(11));
        assert_eq!(cfg.local_as, DEFAULT_OVERLAY_ASN);
        assert_eq!(cfg.cluster_id, None);
        assert_eq!(
            cfg.peers,
            vec![
                OverlayPeer { address: node(1), role: PeerRole::Reflector },
                OverlayPeer { address: node(2), role: PeerRole::Reflector },
            ]
        );
        assert!(s.overlay_enabled());
    }

    #[test]
    fn reflector_serves_leaves_and_peers_with_other_reflectors() {
        let mut s = state(2);
        let r = s.reconcile(single_pod());
        let cfg = overlay(&r);

        assert_eq!(cfg.cluster_id, Some(node(1)));
        assert_eq!(cfg.peers[0], OverlayPeer { address: node(1), role: PeerRole::Reflector });
        let clients: Vec<_> = cfg.peers[1..].iter().map(|p| p.address).collect();
        assert_eq!(clients, nodes(&[11, 12, 13, 14]));
        assert!(cfg.peers[1..].iter().all(|p| p.role == PeerRole::Client));
    }

    #[test]
    fn spine_without_reflector_duty_stays_out() {
        let mut s = state(3);
        let r = s.reconcile(multi_pod());
        assert_eq!(r.route_reflectors, nodes(&[21, 22]));
        assert!(r.intents.is_empty());
        assert!(!s.overlay_enabled());
    }

    #[test]
    fn unchanged_roles_are_a_no_op() {
        let mut s = state(11);
        s.reconcile(single_pod());
        let again = s.reconcile(single_pod());

        assert!(!again.changed);
        assert!(again.intents.is_empty());
        assert_eq!(again.route_reflectors, nodes(&[1, 2]));
    }

    #[test]
    fn first_empty_classification_does_nothing() {
        let mut s = state(11);
        let r = s.reconcile(RoleSets::default());
        assert!(!r.changed);
        assert!(r.intents.is_empty());
    }

    #[test]
    fn undefined_topology_withdraws_and_clears() {
        let mut s = state(11);
        s.reconcile(single_pod());
        let r = s.reconcile(RoleSets::default());

        assert!(r.changed);
        assert_eq!(r.intents, vec![ConfigIntent::WithdrawOverlay]);
        assert!(r.route_reflectors.is_empty());
        assert!(s.roles().is_empty());
        assert!(s.route_reflectors().is_empty());
        assert!(!s.overlay_enabled());
    }

    #[test]
    fn losing_reflector_duty_withdraws() {
        // Spine 1 is a reflector in a single pod, then super-spines appear.
        let mut s = state(1);
        assert_eq!(s.reconcile(single_pod()).intents.len(), 1);

        let r = s.reconcile(multi_pod());
        assert_eq!(r.intents, vec![ConfigIntent::WithdrawOverlay]);
        assert_eq!(s.route_reflectors(), nodes(&[21, 22]).as_slice());
    }

    #[test]
    fn role_change_with_same_overlay_emits_nothing() {
        // Leaf 11 keeps the same reflectors while another pod's leaves change.
        let mut s = state(11);
        s.reconcile(multi_pod());
        let mut grown = multi_pod();
        grown.leaves.push(node(15));
        let r = s.reconcile(grown);

        assert!(r.changed);
        assert!(r.intents.is_empty());
        assert_eq!(s.roles().leaves.len(), 5);
    }

    #[test]
    fn reflector_replaces_its_overlay_when_leaves_change() {
        let mut s = state(21);
        s.reconcile(multi_pod());
        let mut grown = multi_pod();
        grown.leaves.push(node(15));
        let r = s.reconcile(grown);

        let cfg = overlay(&r);
        assert!(cfg.peers.iter().any(|p| p.address == node(15)));
        assert_eq!(s.applied(), Some(cfg));
    }

    #[test]
    fn reflector_precedence_over_leaf() {
        // Leaves only: the two lowest leaves are elected.
        let roles = RoleSets {
            leaves: nodes(&[11, 12, 13]),
            ..Default::default()
        };
        let mut s = state(12);
        let r = s.reconcile(roles);
        let cfg = overlay(&r);

        assert_eq!(cfg.cluster_id, Some(node(11)));
        assert_eq!(
            cfg.peers,
            vec![
                OverlayPeer { address: node(11), role: PeerRole::Reflector },
                OverlayPeer { address: node(13), role: PeerRole::Client },
            ]
        );
    }

    #[test]
    fn report_reflects_state() {
        let mut s = state(11);
        s.reconcile(single_pod());
        let report = s.report();
        assert_eq!(report.roles, single_pod());
        assert_eq!(report.route_reflectors, nodes(&[1, 2]));
    }
}
