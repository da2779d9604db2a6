/// Shared monitor state
///
/// One instance is created at startup and handed by reference to both the
/// poll loop (reader, every cycle) and the input handlers (writer, on
/// keypress). All access goes through a single `RwLock`.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Polling profile: interval length against enrichment depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorMode {
    /// Short interval, no resource stats
    #[default]
    Lite,
    /// Longer interval, CPU/memory stats for running containers
    Full,
}

impl MonitorMode {
    pub fn toggled(self) -> Self {
        match self {
            MonitorMode::Lite => MonitorMode::Full,
            MonitorMode::Full => MonitorMode::Lite,
        }
    }

    pub fn wants_stats(self) -> bool {
        matches!(self, MonitorMode::Full)
    }

    pub fn label(self) -> &'static str {
        match self {
            MonitorMode::Lite => "Lite",
            MonitorMode::Full => "Full",
        }
    }
}

/// Poll intervals per mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIntervals {
    pub lite: Duration,
    pub full: Duration,
}

impl PollIntervals {
    pub fn for_mode(&self, mode: MonitorMode) -> Duration {
        match mode {
            MonitorMode::Lite => self.lite,
            MonitorMode::Full => self.full,
        }
    }
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            lite: Duration::from_secs(1),
            full: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorState {
    pub mode: MonitorMode,
    /// Name of the node the cursor was last on, restored after every redraw
    pub last_selected_name: Option<String>,
    /// Container whose details the side panel shows; `None` means the root summary
    pub active_id: Option<String>,
}

impl MonitorState {
    pub fn new(mode: MonitorMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }
}

pub type SharedState = Arc<RwLock<MonitorState>>;

pub fn shared(state: MonitorState) -> SharedState {
    Arc::new(RwLock::new(state))
}
