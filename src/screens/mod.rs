pub mod dashboard;

// The dashboard is the only screen:
// - container tree ranked by health, dependency leaves under each container
// - details / system summary panel
// - logs and help overlays

pub use dashboard::{Dashboard, LogsView};
