pub mod collector;
pub mod deps;
pub mod docker;
pub mod error;
pub mod health;
pub mod log_parser;
pub mod metrics;
pub mod monitor;
pub mod node;
pub mod state;

pub use collector::Collector;
pub use docker::{ContainerHost, DockerHost};
pub use error::{HostError, MonitorError};
pub use monitor::{Panel, PollLoop, UiUpdate};
pub use node::{ServiceNode, SystemSummary};
pub use state::{MonitorMode, MonitorState, SharedState};
