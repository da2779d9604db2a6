/// Health classification and ranking of service nodes
///
/// Status strings come straight from the host and are compared after
/// trimming and lowercasing. Exit codes 0, 137 (SIGKILL) and 143 (SIGTERM)
/// count as intentional stops.

use crate::core::node::ServiceNode;

/// Exit codes that mean the container was stopped on purpose
pub const CLEAN_EXIT_CODES: [i64; 3] = [0, 137, 143];

/// Urgency bucket used to order the rendered list; lower sorts first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Critical = 0,
    Stopped = 1,
    Normal = 2,
}

/// Colour class consumed by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthColor {
    Green,
    Gray,
    Red,
}

fn normalize(status: &str) -> String {
    status.trim().to_lowercase()
}

pub fn is_clean_exit(exit_code: i64) -> bool {
    CLEAN_EXIT_CODES.contains(&exit_code)
}

/// "running" or any "Up ..." variant
pub fn is_running_status(status: &str) -> bool {
    let status = normalize(status);
    status == "running" || status.starts_with("up")
}

pub fn priority(status: &str, exit_code: i64) -> Priority {
    match normalize(status).as_str() {
        "dead" => Priority::Critical,
        "exited" if is_clean_exit(exit_code) => Priority::Stopped,
        "exited" => Priority::Critical,
        _ => Priority::Normal,
    }
}

pub fn health_color(status: &str, exit_code: i64) -> HealthColor {
    let normalized = normalize(status);
    if is_running_status(&normalized) {
        HealthColor::Green
    } else if normalized == "exited" && is_clean_exit(exit_code) {
        HealthColor::Gray
    } else {
        HealthColor::Red
    }
}

impl ServiceNode {
    pub fn priority(&self) -> Priority {
        priority(&self.status, self.exit_code)
    }

    pub fn health_color(&self) -> HealthColor {
        health_color(&self.status, self.exit_code)
    }
}

/// Order nodes by (priority, name); ties never depend on arrival order
pub fn sort_nodes(nodes: &mut [ServiceNode]) {
    nodes.sort_by(|a, b| {
        a.priority()
            .cmp(&b.priority())
            .then_with(|| a.name.cmp(&b.name))
    });
}

pub fn exit_code_description(code: i64) -> &'static str {
    match code {
        0 => "Clean Exit",
        137 => "Manual Stop (SIGKILL)",
        143 => "Graceful Stop (SIGTERM)",
        _ => "Error",
    }
}
