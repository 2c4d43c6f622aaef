//! Agent configuration from `FABRIC_*` environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use fabric_election::{
    ElectionConfig, Level, UnderlayConfig, DEFAULT_INSTANCE, DEFAULT_OVERLAY_ASN,
    DEFAULT_PEER_GROUP, DEFAULT_RR_COUNT,
};
use fabric_topology::{
    LinkStateId, NodeId, SystemId, TopologyConfig, DEFAULT_AREA, DIRECT_LINK_METRIC,
};

use crate::error::{AgentError, Result};

/// Report file used when `FABRIC_REPORT_PATH` is unset.
pub const DEFAULT_REPORT_PATH: &str = "./fabric-roles.txt";

/// Configuration for a fabric agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// Loopback identity of this node
    pub local: NodeId,
    pub rr_count: usize,
    pub local_as: u32,
    pub peer_group: String,
    /// Underlay area prefix of the local NET
    pub area: String,
    pub instance: String,
    pub level: Level,
    /// Chassis system id; without it the underlay is left alone
    pub system_id: Option<SystemId>,
    pub direct_metric: u32,
    pub report_path: PathBuf,
    /// Read notifications from this file instead of stdin
    pub events: Option<PathBuf>,
}

impl AgentConfig {
    /// Defaults for everything but the local identity.
    pub fn new(local: NodeId) -> Self {
        Self {
            local,
            rr_count: DEFAULT_RR_COUNT,
            local_as: DEFAULT_OVERLAY_ASN,
            peer_group: DEFAULT_PEER_GROUP.to_string(),
            area: DEFAULT_AREA.to_string(),
            instance: DEFAULT_INSTANCE.to_string(),
            level: Level::default(),
            system_id: None,
            direct_metric: DIRECT_LINK_METRIC,
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
            events: None,
        }
    }

    /// Load configuration from environment variables.
    pub fn try_from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let local_raw = lookup("FABRIC_LOCAL_ADDR")
            .ok_or_else(|| AgentError::config("FABRIC_LOCAL_ADDR", "not set"))?;
        let local = local_raw
            .parse::<NodeId>()
            .map_err(|e| AgentError::config("FABRIC_LOCAL_ADDR", e.to_string()))?;

        let mut config = Self::new(local);

        if let Some(v) = lookup("FABRIC_RR_COUNT") {
            config.rr_count = parse_var("FABRIC_RR_COUNT", &v)?;
            if config.rr_count == 0 {
                return Err(AgentError::config("FABRIC_RR_COUNT", "must be at least 1"));
            }
        }
        if let Some(v) = lookup("FABRIC_OVERLAY_ASN") {
            config.local_as = parse_var("FABRIC_OVERLAY_ASN", &v)?;
        }
        if let Some(v) = lookup("FABRIC_PEER_GROUP") {
            config.peer_group = v;
        }
        if let Some(v) = lookup("FABRIC_AREA_ID") {
            config.area = v;
        }
        if let Some(v) = lookup("FABRIC_ISIS_INSTANCE") {
            config.instance = v;
        }
        if let Some(v) = lookup("FABRIC_LEVEL") {
            config.level = parse_var("FABRIC_LEVEL", &v)?;
        }
        if let Some(v) = lookup("FABRIC_SYSTEM_MAC") {
            let system = SystemId::from_mac(&v)
                .map_err(|e| AgentError::config("FABRIC_SYSTEM_MAC", e.to_string()))?;
            config.system_id = Some(system);
        }
        if let Some(v) = lookup("FABRIC_DIRECT_METRIC") {
            config.direct_metric = parse_var("FABRIC_DIRECT_METRIC", &v)?;
        }
        if let Some(v) = lookup("FABRIC_REPORT_PATH") {
            config.report_path = PathBuf::from(v);
        }
        config.events = lookup("FABRIC_EVENTS").filter(|v| !v.is_empty()).map(PathBuf::from);

        // Surface a bad area now rather than on the first adjacency.
        config.net()?;

        Ok(config)
    }

    /// The local NET, when a system id is configured.
    pub fn net(&self) -> Result<Option<LinkStateId>> {
        self.system_id
            .as_ref()
            .map(|system| {
                LinkStateId::from_parts(&self.area, system)
                    .map_err(|e| AgentError::config("FABRIC_AREA_ID", e.to_string()))
            })
            .transpose()
    }

    pub fn topology(&self) -> TopologyConfig {
        TopologyConfig {
            direct_metric: self.direct_metric,
        }
    }

    pub fn election(&self) -> ElectionConfig {
        ElectionConfig {
            rr_count: self.rr_count,
            local_as: self.local_as,
            peer_group: self.peer_group.clone(),
        }
    }

    pub fn underlay(&self) -> Result<Option<UnderlayConfig>> {
        Ok(self.net()?.map(|net| UnderlayConfig {
            instance: self.instance.clone(),
            level: self.level,
            ..UnderlayConfig::new(net)
        }))
    }
}

fn parse_var<T>(key: &'static str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| AgentError::config(key, format!("{:?}: {}", value, e)))
}
