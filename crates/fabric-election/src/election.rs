//! Route-reflector election.
//!
//! # Priority
//!
//! ```text
//! super-spines > border-leaves > spines > leaves
//! ```
//!
//! Within a tier, nodes are taken in identity order. The result is a pure
//! function of the role sets, so every node in the fabric elects the same
//! reflectors without talking to each other.

use fabric_roles::{Role, RoleSets};
use fabric_topology::NodeId;

/// Reflectors elected when nothing else is configured.
pub const DEFAULT_RR_COUNT: usize = 2;

/// Tiers in election order.
pub const ELECTION_PRIORITY: [Role; 4] =
    [Role::SuperSpine, Role::BorderLeaf, Role::Spine, Role::Leaf];

/// Elect up to `count` route reflectors.
///
/// Returns fewer than `count` when the fabric has fewer nodes.
pub fn elect_route_reflectors(roles: &RoleSets, count: usize) -> Vec<NodeId> {
    ELECTION_PRIORITY
        .iter()
        .flat_map(|role| tier(roles, *role).iter().copied())
        .take(count)
        .collect()
}

fn tier(roles: &RoleSets, role: Role) -> &[NodeId] {
    match role {
        Role::SuperSpine => &roles.super_spines,
        Role::BorderLeaf => &roles.borders,
        Role::Spine => &roles.spines,
        Role::Leaf => &roles.leaves,
    }
}
