/// Snapshot values produced by one collection cycle

use serde::Serialize;

use crate::core::health::is_running_status;
use crate::core::state::MonitorMode;

/// Sentinel name for containers the host reports without any alias
pub const UNNAMED_CONTAINER: &str = "none";

/// One container as seen during a single cycle
///
/// Nodes are never updated in place: every cycle builds a fresh set.
/// Entries of `deps` referenced names present in the snapshot the node
/// came from; a later snapshot may no longer contain them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceNode {
    pub id: String,
    pub name: String,
    pub status: String,
    pub ip: String,
    pub deps: Vec<String>,
    pub exit_code: i64,
    pub cpu_percent: f64,
    pub mem_usage_bytes: u64,
    pub mem_limit_bytes: u64,
}

impl ServiceNode {
    /// Node carrying only what the container listing reports
    pub fn from_listing(id: impl Into<String>, name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: status.into(),
            ip: String::new(),
            deps: Vec::new(),
            exit_code: 0,
            cpu_percent: 0.0,
            mem_usage_bytes: 0,
            mem_limit_bytes: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        is_running_status(&self.status)
    }

    /// Memory usage as a share of the limit, 0 when no limit is known
    pub fn mem_percent(&self) -> f64 {
        if self.mem_limit_bytes == 0 {
            return 0.0;
        }
        (self.mem_usage_bytes as f64 / self.mem_limit_bytes as f64) * 100.0
    }
}

/// First host alias without its leading separator ("/web" -> "web")
pub fn primary_alias(names: &[String]) -> Option<String> {
    names
        .first()
        .map(|n| n.trim_start_matches('/').to_string())
        .filter(|n| !n.is_empty())
}

/// Name shown for a container, `UNNAMED_CONTAINER` when it has no alias
pub fn display_name(names: &[String]) -> String {
    primary_alias(names).unwrap_or_else(|| UNNAMED_CONTAINER.to_string())
}

/// Totals shown when the root of the tree is selected
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemSummary {
    pub total: usize,
    pub running: usize,
    pub total_cpu_percent: f64,
    pub total_mem_bytes: u64,
    pub mode: MonitorMode,
}

impl SystemSummary {
    pub fn from_nodes(nodes: &[ServiceNode], mode: MonitorMode) -> Self {
        let running: Vec<&ServiceNode> = nodes.iter().filter(|n| n.is_running()).collect();

        Self {
            total: nodes.len(),
            running: running.len(),
            total_cpu_percent: running.iter().map(|n| n.cpu_percent).sum(),
            total_mem_bytes: running.iter().map(|n| n.mem_usage_bytes).sum(),
            mode,
        }
    }
}
