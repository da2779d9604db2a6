/// Contract constants for host calls and polling

use std::time::Duration;

/// Deadline for one container inspect call
pub const DEFAULT_INSPECT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Deadline for one stats sample (the daemon waits for two readings)
pub const DEFAULT_STATS_TIMEOUT: Duration = Duration::from_millis(1500);

/// Poll interval in Lite mode
pub const DEFAULT_LITE_INTERVAL: Duration = Duration::from_secs(1);

/// Poll interval in Full mode
pub const DEFAULT_FULL_INTERVAL: Duration = Duration::from_secs(3);

/// Lines requested from the host when showing logs
pub const DEFAULT_LOG_TAIL: usize = 100;

/// Seconds the host waits for a graceful stop before killing on restart
pub const DEFAULT_RESTART_GRACE: Duration = Duration::from_secs(10);

/// Environment variable holding the tracing filter
pub const LOG_FILTER_ENV: &str = "DHM_LOG";

pub const APP_DIR_NAME: &str = "dhm";
