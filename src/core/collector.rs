/// Snapshot collection
///
/// One cycle lists every container, then enriches all of them concurrently
/// (inspect, optional stats, dependency inference) and joins the results.
/// Only the listing can fail the cycle; every per-container failure degrades
/// that node alone.

use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::core::deps::infer_dependencies;
use crate::core::docker::{ContainerEntry, ContainerHost};
use crate::core::error::{HostError, MonitorError};
use crate::core::node::{display_name, primary_alias, ServiceNode};
use crate::core::state::MonitorMode;
use crate::utils::{DEFAULT_INSPECT_TIMEOUT, DEFAULT_STATS_TIMEOUT};

#[derive(Clone)]
pub struct Collector {
    host: Arc<dyn ContainerHost>,
    inspect_timeout: Duration,
    stats_timeout: Duration,
}

impl Collector {
    pub fn new(host: Arc<dyn ContainerHost>) -> Self {
        Self::with_timeouts(host, DEFAULT_INSPECT_TIMEOUT, DEFAULT_STATS_TIMEOUT)
    }

    pub fn with_timeouts(host: Arc<dyn ContainerHost>, inspect_timeout: Duration, stats_timeout: Duration) -> Self {
        Self {
            host,
            inspect_timeout,
            stats_timeout,
        }
    }

    pub fn host(&self) -> &Arc<dyn ContainerHost> {
        &self.host
    }

    /// Collect one snapshot; the result is unsorted
    pub async fn collect(&self, mode: MonitorMode) -> Result<Vec<ServiceNode>, MonitorError> {
        let started = Instant::now();

        let containers = self
            .host
            .list_containers(true)
            .await
            .map_err(MonitorError::HostConnection)?;

        // Unnamed containers share the placeholder name and are never dependency targets
        let known_names: Vec<String> = containers.iter().filter_map(|c| primary_alias(&c.names)).collect();
        let entries: Vec<(ContainerEntry, String)> = containers
            .into_iter()
            .map(|c| {
                let name = display_name(&c.names);
                (c, name)
            })
            .collect();

        let tasks = entries
            .into_iter()
            .map(|(entry, name)| self.enrich(entry, name, mode, &known_names));
        let nodes = join_all(tasks).await;

        debug!(
            count = nodes.len(),
            mode = mode.label(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "collection cycle finished"
        );

        Ok(nodes)
    }

    async fn enrich(&self, entry: ContainerEntry, name: String, mode: MonitorMode, known_names: &[String]) -> ServiceNode {
        let mut node = ServiceNode::from_listing(entry.id, name, entry.state);

        let detail = match bounded(self.inspect_timeout, self.host.inspect(&node.id)).await {
            Ok(detail) => detail,
            Err(source) => {
                log_degraded(MonitorError::PerContainer {
                    name: node.name.clone(),
                    source,
                });
                return node;
            }
        };

        if let Some(status) = detail.status.clone() {
            node.status = status;
        }
        node.exit_code = detail.exit_code;
        node.ip = detail.primary_ip();

        if mode.wants_stats() && node.is_running() {
            match bounded(self.stats_timeout, self.host.stats(&node.id)).await {
                Ok(sample) => {
                    node.cpu_percent = sample.cpu_percent();
                    node.mem_usage_bytes = sample.mem_usage;
                    node.mem_limit_bytes = sample.mem_limit;
                }
                Err(source) => log_degraded(MonitorError::PerContainer {
                    name: node.name.clone(),
                    source,
                }),
            }
        }

        node.deps = infer_dependencies(&node.name, &detail.env, known_names);
        node
    }
}

/// Run a host call with its own deadline
async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, HostError>
where
    F: Future<Output = Result<T, HostError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(HostError::Timeout(limit)),
    }
}

fn log_degraded(err: MonitorError) {
    match &err {
        MonitorError::PerContainer { source: HostError::Timeout(_), .. } => {
            debug!(error = %err, "container enrichment timed out")
        }
        _ => warn!(error = %err, "container enrichment failed"),
    }
}
