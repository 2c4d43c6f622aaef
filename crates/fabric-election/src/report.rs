//! Role report: the last classification and election in plain text.
//!
//! ```text
//! Leaves: [10.0.0.11, 10.0.0.12]
//! Spines: [10.0.0.1, 10.0.0.2]
//! Super-Spines: []
//! Border-Leaves: []
//! Route-Reflectors: [10.0.0.1, 10.0.0.2]
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use fabric_roles::{Role, RoleSets};
use fabric_topology::{NodeId, TopologyError};

const LABELS: [&str; 5] = ["Leaves", "Spines", "Super-Spines", "Border-Leaves", "Route-Reflectors"];

/// Errors reading a role report back.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportParseError {
    #[error("missing `{0}` line")]
    MissingLine(&'static str),

    #[error("line {line}: expected `{expected}:`")]
    UnexpectedLabel { line: usize, expected: &'static str },

    #[error("line {line}: node list must be enclosed in brackets")]
    MalformedList { line: usize },

    #[error("line {line}: {source}")]
    InvalidNode { line: usize, source: TopologyError },

    #[error("line {line}: unexpected trailing content")]
    TrailingLine { line: usize },
}

/// Role sets plus the elected reflectors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleReport {
    pub roles: RoleSets,
    pub route_reflectors: Vec<NodeId>,
}

/// One node in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRow {
    pub node: NodeId,
    pub role: Role,
    pub route_reflector: bool,
}

impl RoleReport {
    pub fn new(roles: RoleSets, route_reflectors: Vec<NodeId>) -> Self {
        Self { roles, route_reflectors }
    }

    /// Every classified node in identity order.
    pub fn rows(&self) -> Vec<ReportRow> {
        self.roles
            .assignment()
            .into_iter()
            .map(|(node, role)| ReportRow {
                node,
                role,
                route_reflector: self.route_reflectors.contains(&node),
            })
            .collect()
    }

    fn lists(&self) -> [&[NodeId]; 5] {
        [
            &self.roles.leaves,
            &self.roles.spines,
            &self.roles.super_spines,
            &self.roles.borders,
            &self.route_reflectors,
        ]
    }
}

struct NodeList<'a>(&'a [NodeId]);

impl fmt::Display for NodeList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, node) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", node)?;
        }
        f.write_str("]")
    }
}

impl fmt::Display for RoleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, list) in LABELS.iter().zip(self.lists()) {
            writeln!(f, "{}: {}", label, NodeList(list))?;
        }
        Ok(())
    }
}

fn parse_list(line: usize, body: &str) -> Result<Vec<NodeId>, ReportParseError> {
    let inner = body
        .trim()
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or(ReportParseError::MalformedList { line })?;
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    inner
        .split(',')
        .map(|item| {
            item.parse::<NodeId>()
                .map_err(|source| ReportParseError::InvalidNode { line, source })
        })
        .collect()
}

impl FromStr for RoleReport {
    type Err = ReportParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty());

        let mut lists: Vec<Vec<NodeId>> = Vec::with_capacity(LABELS.len());
        for expected in LABELS {
            let (line, text) = lines.next().ok_or(ReportParseError::MissingLine(expected))?;
            let body = text
                .strip_prefix(expected)
                .and_then(|rest| rest.strip_prefix(':'))
                .ok_or(ReportParseError::UnexpectedLabel { line, expected })?;
            lists.push(parse_list(line, body)?);
        }
        if let Some((line, _)) = lines.next() {
            return Err(ReportParseError::TrailingLine { line });
        }

        let mut lists = lists.into_iter();
        let mut next = || lists.next().unwrap_or_default();
        Ok(Self {
            roles: RoleSets {
                leaves: next(),
                spines: next(),
                super_spines: next(),
                borders: next(),
            },
            route_reflectors: next(),
        })
    }
}
