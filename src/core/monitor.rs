/// Poll loop and background actions
///
/// The loop and the one-off tasks (restart, log fetch) never touch UI state.
/// They report through an unbounded channel that the dashboard drains
/// between redraws.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::core::collector::Collector;
use crate::core::docker::{ContainerHost, LogRequest};
use crate::core::error::MonitorError;
use crate::core::health::sort_nodes;
use crate::core::log_parser::decode_logs;
use crate::core::node::{ServiceNode, SystemSummary};
use crate::core::state::{MonitorMode, PollIntervals, SharedState};

/// Content of the side panel
#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    Details(ServiceNode),
    Summary(SystemSummary),
}

/// Everything the background side can ask the dashboard to redraw
#[derive(Debug)]
pub enum UiUpdate {
    /// A ranked snapshot, the panel matching the active selection and the
    /// mode the snapshot was collected in
    Snapshot { nodes: Vec<ServiceNode>, panel: Panel, mode: MonitorMode },
    /// Decoded log text, most recent line first
    Logs { name: String, result: Result<String, MonitorError> },
    Restart { name: String, result: Result<(), MonitorError> },
}

pub type UpdateSender = UnboundedSender<UiUpdate>;

/// Details for `active_id` if it is in the snapshot, the system summary otherwise
pub fn build_panel(nodes: &[ServiceNode], active_id: Option<&str>, mode: MonitorMode) -> Panel {
    active_id
        .and_then(|id| nodes.iter().find(|n| n.id == id))
        .map(|node| Panel::Details(node.clone()))
        .unwrap_or_else(|| Panel::Summary(SystemSummary::from_nodes(nodes, mode)))
}

pub struct PollLoop {
    collector: Collector,
    state: SharedState,
    intervals: PollIntervals,
    updates: UpdateSender,
}

impl PollLoop {
    pub fn new(collector: Collector, state: SharedState, intervals: PollIntervals, updates: UpdateSender) -> Self {
        Self {
            collector,
            state,
            intervals,
            updates,
        }
    }

    /// Run one cycle; `None` when the listing failed
    pub async fn poll_once(&self) -> (MonitorMode, Option<UiUpdate>) {
        let (mode, active_id) = {
            let s = self.state.read().await;
            (s.mode, s.active_id.clone())
        };

        match self.collector.collect(mode).await {
            Ok(mut nodes) => {
                sort_nodes(&mut nodes);
                let panel = build_panel(&nodes, active_id.as_deref(), mode);
                (mode, Some(UiUpdate::Snapshot { nodes, panel, mode }))
            }
            Err(e) => {
                warn!(error = %e, "skipping poll cycle");
                (mode, None)
            }
        }
    }

    /// Poll until the dashboard side of the channel is gone
    pub async fn run(self) {
        loop {
            let (mode, update) = self.poll_once().await;

            if let Some(update) = update {
                if self.updates.send(update).is_err() {
                    debug!("update receiver dropped, stopping poll loop");
                    return;
                }
            }

            tokio::time::sleep(self.intervals.for_mode(mode)).await;
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

/// Restart a container off the input path and report the outcome
pub fn spawn_restart(
    host: Arc<dyn ContainerHost>,
    id: String,
    name: String,
    grace: Duration,
    updates: UpdateSender,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(container = %name, "restarting container");
        let result = host
            .restart(&id, grace)
            .await
            .map_err(|source| MonitorError::Restart {
                name: name.clone(),
                source,
            });

        match &result {
            Ok(()) => info!(container = %name, "container restarted"),
            Err(e) => warn!(error = %e, "restart failed"),
        }
        let _ = updates.send(UiUpdate::Restart { name, result });
    })
}

/// Fetch and decode the log tail of a container off the input path
pub fn spawn_log_fetch(
    host: Arc<dyn ContainerHost>,
    id: String,
    name: String,
    tail: usize,
    updates: UpdateSender,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = host
            .logs(&id, LogRequest::combined(tail))
            .await
            .map(|raw| decode_logs(&raw))
            .map_err(|source| MonitorError::LogFetch {
                name: name.clone(),
                source,
            });

        if let Err(e) = &result {
            warn!(error = %e, "log fetch failed");
        }
        let _ = updates.send(UiUpdate::Logs { name, result });
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::docker::{ContainerDetail, ContainerEntry, MockContainerHost};
    use crate::core::error::HostError;
    use crate::core::log_parser::encode_frame;
    use crate::core::state::{shared, MonitorState};
    use tokio::sync::mpsc::unbounded_channel;

    fn entry(id: &str, name: &str) -> ContainerEntry {
        ContainerEntry {
            id: id.to_string(),
            names: vec![format!("/{}", name)],
            state: "running".to_string(),
        }
    }

    fn host_with_three() -> MockContainerHost {
        let mut host = MockContainerHost::new();
        host.expect_list_containers()
            .returning(|_| Ok(vec![entry("1", "web"), entry("2", "crashed"), entry("3", "api")]));
        host.expect_inspect().returning(|id| {
            let (status, code) = if id == "2" { ("exited", 1) } else { ("running", 0) };
            Ok(ContainerDetail {
                status: Some(status.to_string()),
                exit_code: code,
                ..Default::default()
            })
        });
        host
    }

    fn fast_intervals() -> PollIntervals {
        PollIntervals {
            lite: Duration::from_millis(10),
            full: Duration::from_millis(10),
        }
    }

    #[tokio::test]
    async fn test_poll_once_sorts_and_builds_summary() {
        let (tx, _rx) = unbounded_channel();
        let state = shared(MonitorState::default());
        let poll = PollLoop::new(Collector::new(Arc::new(host_with_three())), state, fast_intervals(), tx);

        let (mode, update) = poll.poll_once().await;
        assert_eq!(mode, MonitorMode::Lite);

        match update {
            Some(UiUpdate::Snapshot { nodes, panel, mode }) => {
                assert_eq!(mode, MonitorMode::Lite);
                let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
                assert_eq!(names, ["crashed", "api", "web"]);
                match panel {
                    Panel::Summary(summary) => {
                        assert_eq!(summary.total, 3);
                        assert_eq!(summary.running, 2);
                    }
                    other => panic!("expected summary, got {:?}", other),
                }
            }
            other => panic!("expected snapshot, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_poll_once_details_for_active_id() {
        let (tx, _rx) = unbounded_channel();
        let state = shared(MonitorState {
            active_id: Some("3".to_string()),
            ..Default::default()
        });
        let poll = PollLoop::new(Collector::new(Arc::new(host_with_three())), state, fast_intervals(), tx);

        match poll.poll_once().await.1 {
            Some(UiUpdate::Snapshot { panel: Panel::Details(node), .. }) => assert_eq!(node.name, "api"),
            other => panic!("expected details, got {:?}", other),
        }
    }

    #[test]
    fn test_vanished_active_id_falls_back_to_summary() {
        let nodes = vec![ServiceNode::from_listing("1", "web", "running")];
        let panel = build_panel(&nodes, Some("gone"), MonitorMode::Full);
        assert!(matches!(panel, Panel::Summary(s) if s.total == 1 && s.mode == MonitorMode::Full));
    }

    #[tokio::test]
    async fn test_listing_error_is_swallowed_and_loop_continues() {
        let mut host = MockContainerHost::new();
        let mut calls = 0;
        host.expect_list_containers().returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(HostError::Other("daemon restarting".to_string()))
            } else {
                Ok(vec![entry("1", "web")])
            }
        });
        host.expect_inspect().returning(|_| Ok(ContainerDetail::default()));

        let (tx, mut rx) = unbounded_channel();
        let state = shared(MonitorState::default());
        let handle = PollLoop::new(Collector::new(Arc::new(host)), state, fast_intervals(), tx).spawn();

        let update = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
        assert!(matches!(update, Some(UiUpdate::Snapshot { ref nodes, .. }) if nodes.len() == 1));

        drop(rx);
        tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_restart_reports_failure() {
        let mut host = MockContainerHost::new();
        host.expect_restart()
            .withf(|id, grace| id.to_string() == "abc" && *grace == Duration::from_secs(10))
            .returning(|_, _| Err(HostError::Other("permission denied".to_string())));

        let (tx, mut rx) = unbounded_channel();
        spawn_restart(Arc::new(host), "abc".into(), "web".into(), Duration::from_secs(10), tx)
            .await
            .unwrap();

        match rx.recv().await {
            Some(UiUpdate::Restart { name, result: Err(e) }) => {
                assert_eq!(name, "web");
                assert!(e.to_string().contains("permission denied"));
            }
            other => panic!("unexpected update {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_log_fetch_decodes() {
        let mut host = MockContainerHost::new();
        host.expect_logs()
            .withf(|_, request| *request == LogRequest::combined(100))
            .returning(|_, _| {
                let mut raw = encode_frame(1, b"one\n");
                raw.extend(encode_frame(2, b"two"));
                Ok(raw)
            });

        let (tx, mut rx) = unbounded_channel();
        spawn_log_fetch(Arc::new(host), "abc".into(), "web".into(), 100, tx)
            .await
            .unwrap();

        match rx.recv().await {
            Some(UiUpdate::Logs { result: Ok(text), .. }) => assert_eq!(text, "two\none"),
            other => panic!("unexpected update {:?}", other),
        }
    }
}
