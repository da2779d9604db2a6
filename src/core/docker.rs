/// Container host integration
///
/// `ContainerHost` is the seam between the collector and the Docker daemon.
/// `DockerHost` implements it on top of bollard; tests script it with mocks.

use async_trait::async_trait;
use bollard::container::{
    InspectContainerOptions, ListContainersOptions, LogOutput, LogsOptions, RestartContainerOptions,
    Stats, StatsOptions,
};
use bollard::models::{ContainerInspectResponse, ContainerSummary};
use bollard::Docker;
use futures::StreamExt;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::core::error::HostError;
use crate::core::log_parser::encode_frame;
use crate::core::metrics::StatsSample;

/// One row of the container listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerEntry {
    pub id: String,
    /// Host aliases, each prefixed with a path separator ("/web")
    pub names: Vec<String>,
    /// Coarse state from the listing ("running", "exited", ...)
    pub state: String,
}

/// Inspect result reduced to what the monitor needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerDetail {
    pub status: Option<String>,
    pub exit_code: i64,
    pub ip_address: String,
    /// Attached networks by name, with the IP on each (possibly empty)
    pub networks: BTreeMap<String, String>,
    pub env: Vec<String>,
}

impl ContainerDetail {
    /// Primary IP, falling back to the first non-empty network IP
    ///
    /// The daemon reports networks as an unordered map; scanning in network
    /// name order keeps the fallback stable between cycles.
    pub fn primary_ip(&self) -> String {
        if !self.ip_address.is_empty() {
            return self.ip_address.clone();
        }
        self.networks
            .values()
            .find(|ip| !ip.is_empty())
            .cloned()
            .unwrap_or_default()
    }
}

/// Parameters of a log fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRequest {
    pub stdout: bool,
    pub stderr: bool,
    pub timestamps: bool,
    pub tail: usize,
}

impl LogRequest {
    /// Combined stdout+stderr with timestamps, last `tail` lines
    pub fn combined(tail: usize) -> Self {
        Self {
            stdout: true,
            stderr: true,
            timestamps: true,
            tail,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContainerHost: Send + Sync {
    async fn list_containers(&self, include_stopped: bool) -> Result<Vec<ContainerEntry>, HostError>;

    async fn inspect(&self, id: &str) -> Result<ContainerDetail, HostError>;

    /// One point-in-time stats sample (current and previous CPU counters)
    async fn stats(&self, id: &str) -> Result<StatsSample, HostError>;

    /// Raw multiplexed log bytes, see `log_parser`
    async fn logs(&self, id: &str, request: LogRequest) -> Result<Vec<u8>, HostError>;

    async fn restart(&self, id: &str, grace: Duration) -> Result<(), HostError>;
}

#[derive(Clone)]
pub struct DockerHost {
    docker: Docker,
}

impl DockerHost {
    /// Connect using DOCKER_HOST or the platform default socket
    pub fn connect() -> Result<Self, HostError> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self { docker })
    }
}

#[async_trait]
impl ContainerHost for DockerHost {
    async fn list_containers(&self, include_stopped: bool) -> Result<Vec<ContainerEntry>, HostError> {
        let options = Some(ListContainersOptions::<String> {
            all: include_stopped,
            ..Default::default()
        });

        let containers = self.docker.list_containers(options).await?;
        Ok(containers.into_iter().map(entry_from_summary).collect())
    }

    async fn inspect(&self, id: &str) -> Result<ContainerDetail, HostError> {
        let inspect = self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await?;
        Ok(detail_from_inspect(inspect))
    }

    async fn stats(&self, id: &str) -> Result<StatsSample, HostError> {
        // one_shot=false makes the daemon wait for a second sample so the
        // precpu counters are populated
        let mut stats_stream = self.docker.stats(
            id,
            Some(StatsOptions {
                stream: false,
                one_shot: false,
            }),
        );

        match stats_stream.next().await {
            Some(Ok(stats)) => Ok(sample_from_stats(&stats)),
            Some(Err(e)) => Err(e.into()),
            None => Err(HostError::Other(format!("no stats sample for {}", id))),
        }
    }

    async fn logs(&self, id: &str, request: LogRequest) -> Result<Vec<u8>, HostError> {
        let options = Some(LogsOptions::<String> {
            stdout: request.stdout,
            stderr: request.stderr,
            timestamps: request.timestamps,
            tail: request.tail.to_string(),
            ..Default::default()
        });

        // bollard splits the stream into typed chunks; rebuild the wire frames
        // so decoding stays in one place. TTY output has no framing.
        let mut log_stream = self.docker.logs(id, options);
        let mut raw = Vec::new();
        while let Some(chunk) = log_stream.next().await {
            match chunk? {
                LogOutput::StdIn { message } => raw.extend(encode_frame(0, &message)),
                LogOutput::StdOut { message } => raw.extend(encode_frame(1, &message)),
                LogOutput::StdErr { message } => raw.extend(encode_frame(2, &message)),
                LogOutput::Console { message } => raw.extend_from_slice(&message),
            }
        }

        Ok(raw)
    }

    async fn restart(&self, id: &str, grace: Duration) -> Result<(), HostError> {
        let options = Some(RestartContainerOptions {
            t: grace.as_secs() as isize,
        });
        self.docker.restart_container(id, options).await?;
        Ok(())
    }
}

fn entry_from_summary(summary: ContainerSummary) -> ContainerEntry {
    ContainerEntry {
        id: summary.id.unwrap_or_default(),
        names: summary.names.unwrap_or_default(),
        state: summary.state.unwrap_or_default(),
    }
}

fn detail_from_inspect(inspect: ContainerInspectResponse) -> ContainerDetail {
    let (status, exit_code) = inspect
        .state
        .map(|s| (s.status.map(|st| st.to_string()), s.exit_code.unwrap_or(0)))
        .unwrap_or((None, 0));

    let (ip_address, networks) = inspect
        .network_settings
        .map(|ns| {
            let networks = ns
                .networks
                .unwrap_or_default()
                .into_iter()
                .map(|(name, endpoint)| (name, endpoint.ip_address.unwrap_or_default()))
                .collect();
            (ns.ip_address.unwrap_or_default(), networks)
        })
        .unwrap_or_default();

    let env = inspect.config.and_then(|c| c.env).unwrap_or_default();

    ContainerDetail {
        status: status.filter(|s| !s.is_empty()),
        exit_code,
        ip_address,
        networks,
        env,
    }
}

fn sample_from_stats(stats: &Stats) -> StatsSample {
    // cgroup v2 hosts leave percpu_usage empty; online_cpus carries the count there
    let cpu_count = stats
        .cpu_stats
        .cpu_usage
        .percpu_usage
        .as_ref()
        .map(|per_cpu| per_cpu.len())
        .filter(|n| *n > 0)
        .or_else(|| stats.cpu_stats.online_cpus.map(|n| n as usize))
        .unwrap_or(0);

    StatsSample {
        cpu_total: stats.cpu_stats.cpu_usage.total_usage,
        precpu_total: stats.precpu_stats.cpu_usage.total_usage,
        system_cpu: stats.cpu_stats.system_cpu_usage.unwrap_or(0),
        presystem_cpu: stats.precpu_stats.system_cpu_usage.unwrap_or(0),
        cpu_count,
        mem_usage: stats.memory_stats.usage.unwrap_or(0),
        mem_limit: stats.memory_stats.limit.unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::models::{
        ContainerConfig, ContainerState, ContainerStateStatusEnum, EndpointSettings, NetworkSettings,
    };
    use std::collections::HashMap;

    #[test]
    fn test_primary_ip_fallback_is_ordered() {
        let mut detail = ContainerDetail::default();
        detail.networks.insert("zeta".to_string(), "10.0.9.2".to_string());
        detail.networks.insert("alpha".to_string(), String::new());
        detail.networks.insert("beta".to_string(), "10.0.1.2".to_string());
        assert_eq!(detail.primary_ip(), "10.0.1.2");

        detail.ip_address = "172.17.0.2".to_string();
        assert_eq!(detail.primary_ip(), "172.17.0.2");

        assert_eq!(ContainerDetail::default().primary_ip(), "");
    }

    #[test]
    fn test_detail_from_inspect() {
        let mut networks = HashMap::new();
        networks.insert(
            "backend".to_string(),
            EndpointSettings {
                ip_address: Some("10.1.0.5".to_string()),
                ..Default::default()
            },
        );

        let inspect = ContainerInspectResponse {
            state: Some(ContainerState {
                status: Some(ContainerStateStatusEnum::EXITED),
                exit_code: Some(137),
                ..Default::default()
            }),
            network_settings: Some(NetworkSettings {
                ip_address: Some(String::new()),
                networks: Some(networks),
                ..Default::default()
            }),
            config: Some(ContainerConfig {
                env: Some(vec!["DB_HOST=db".to_string()]),
                ..Default::default()
            }),
            ..Default::default()
        };

        let detail = detail_from_inspect(inspect);
        assert_eq!(detail.status.as_deref(), Some("exited"));
        assert_eq!(detail.exit_code, 137);
        assert_eq!(detail.primary_ip(), "10.1.0.5");
        assert_eq!(detail.env, vec!["DB_HOST=db"]);
    }

    #[test]
    fn test_detail_from_empty_inspect() {
        let detail = detail_from_inspect(ContainerInspectResponse::default());
        assert_eq!(detail, ContainerDetail::default());
    }

    #[test]
    fn test_entry_from_summary() {
        let entry = entry_from_summary(ContainerSummary {
            id: Some("abc".to_string()),
            names: Some(vec!["/web".to_string()]),
            state: Some("running".to_string()),
            ..Default::default()
        });
        assert_eq!(entry.id, "abc");
        assert_eq!(entry.names, vec!["/web"]);
        assert_eq!(entry.state, "running");
    }
}
