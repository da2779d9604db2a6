/// Main dashboard screen
///
/// Left: the container tree. Right: details of the active container or the
/// system summary. Logs and help are drawn as centered overlays.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::collections::HashMap;

use crate::core::health::{exit_code_description, HealthColor};
use crate::core::log_parser::{segments, Severity};
use crate::core::monitor::Panel;
use crate::core::node::{ServiceNode, SystemSummary};
use crate::core::state::MonitorMode;
use crate::utils::helpers::{bytes_to_mb, short_id};
use crate::widgets::{TreeNode, TreeView};

pub const ROOT_LABEL: &str = "⬢ DHM";

/// xterm-256 dark red, for dependencies missing from the snapshot
pub const DARK_RED: Color = Color::Indexed(88);

/// Decoded log text for one container
#[derive(Debug, Clone, PartialEq)]
pub struct LogsView {
    pub name: String,
    pub text: String,
    pub scroll: u16,
}

pub struct Dashboard {
    tree: TreeView<ServiceNode>,
    nodes: Vec<ServiceNode>,
    panel: Panel,
    mode: MonitorMode,
}

impl Dashboard {
    pub fn new(mode: MonitorMode) -> Self {
        Self {
            tree: TreeView::new(build_tree(&[], mode)),
            nodes: Vec::new(),
            panel: Panel::Summary(SystemSummary::from_nodes(&[], mode)),
            mode,
        }
    }

    /// Apply a fresh snapshot and put the cursor back on `last_selected`
    pub fn update(&mut self, nodes: Vec<ServiceNode>, panel: Panel, mode: MonitorMode, last_selected: Option<&str>) {
        self.tree.set_root(build_tree(&nodes, mode));
        if let Some(name) = last_selected {
            self.tree.select_where(|node| node.name == name);
        }
        self.nodes = nodes;
        self.panel = panel;
        self.mode = mode;
    }

    pub fn nodes(&self) -> &[ServiceNode] {
        &self.nodes
    }

    pub fn set_panel(&mut self, panel: Panel) {
        self.panel = panel;
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn set_mode(&mut self, mode: MonitorMode) {
        self.mode = mode;
    }

    pub fn select_next(&mut self) {
        self.tree.select_next();
    }

    pub fn select_prev(&mut self) {
        self.tree.select_prev();
    }

    /// `None` while the root row is selected
    pub fn selected_node(&self) -> Option<&ServiceNode> {
        self.tree.selected_payload()
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        status_message: Option<&str>,
        logs: Option<&LogsView>,
        show_help: bool,
    ) {
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(frame.size());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(outer[0]);

        let tree_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" Containers ({}) ", self.nodes.len()));
        self.tree.render(frame, columns[0], tree_block);

        self.render_panel(frame, columns[1], status_message);
        frame.render_widget(footer(self.mode), outer[1]);

        if let Some(logs) = logs {
            render_logs(frame, logs);
        }
        if show_help {
            render_help(frame);
        }
    }

    fn render_panel(&self, frame: &mut Frame, area: Rect, status_message: Option<&str>) {
        let (title, mut lines) = match &self.panel {
            Panel::Details(node) => (" Details ", details_lines(node)),
            Panel::Summary(summary) => (" System ", summary_lines(summary)),
        };

        if let Some(message) = status_message {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!(" {}", message),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
        }

        let panel = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan))
                    .title(title),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(panel, area);
    }
}

pub fn health_to_color(color: HealthColor) -> Color {
    match color {
        HealthColor::Green => Color::Green,
        HealthColor::Gray => Color::Gray,
        HealthColor::Red => Color::Red,
    }
}

fn cpu_color(cpu_percent: f64) -> Color {
    if cpu_percent > 80.0 {
        Color::Red
    } else if cpu_percent > 40.0 {
        Color::Yellow
    } else {
        Color::White
    }
}

fn mem_color(mem_percent: f64) -> Color {
    if mem_percent > 90.0 {
        Color::Red
    } else if mem_percent > 70.0 {
        Color::Yellow
    } else {
        Color::White
    }
}

/// Colour of a dependency leaf, looked up in the snapshot the tree is built from
pub fn dependency_color(dep: &str, by_name: &HashMap<&str, &ServiceNode>) -> Color {
    match by_name.get(dep) {
        Some(target) if target.is_running() => Color::Blue,
        Some(_) => Color::Gray,
        None => DARK_RED,
    }
}

fn node_label(node: &ServiceNode, mode: MonitorMode) -> Line<'static> {
    let mut spans = vec![Span::raw(node.name.clone())];

    if mode.wants_stats() && node.is_running() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("{:.1}%", node.cpu_percent),
            Style::default().fg(cpu_color(node.cpu_percent)),
        ));
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!("{:.1}MB", bytes_to_mb(node.mem_usage_bytes)),
            Style::default().fg(mem_color(node.mem_percent())),
        ));
    }

    Line::from(spans)
}

/// Tree for one ranked snapshot: root, one row per node, dependency leaves
pub fn build_tree(nodes: &[ServiceNode], mode: MonitorMode) -> TreeNode<ServiceNode> {
    let by_name: HashMap<&str, &ServiceNode> = nodes.iter().map(|n| (n.name.as_str(), n)).collect();

    let mut root = TreeNode::new(Span::styled(
        ROOT_LABEL,
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .color(Color::Cyan);

    for node in nodes {
        let mut row = TreeNode::new(node_label(node, mode))
            .color(health_to_color(node.health_color()))
            .payload(node.clone());

        for dep in &node.deps {
            row.add_child(
                TreeNode::new(format!("🔗 {}", dep))
                    .color(dependency_color(dep, &by_name))
                    .selectable(false),
            );
        }
        root.add_child(row);
    }

    root
}

fn field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {}: ", label), Style::default().fg(Color::Green)),
        Span::raw(value),
    ])
}

pub fn details_lines(node: &ServiceNode) -> Vec<Line<'static>> {
    let ip = if node.ip.is_empty() { "-".to_string() } else { node.ip.clone() };
    let mut lines = vec![
        field("NAME", node.name.clone()),
        field("STATUS", node.status.clone()),
        field("IP ADDR", ip),
        field("ID", short_id(&node.id).to_string()),
    ];

    if node.status.trim().eq_ignore_ascii_case("exited") {
        lines.push(field(
            "EXIT CODE",
            format!("{} ({})", node.exit_code, exit_code_description(node.exit_code)),
        ));
    }

    if node.is_running() {
        lines.push(field("CPU USAGE", format!("{:.2}%", node.cpu_percent)));
        lines.push(field(
            "MEM USAGE",
            format!(
                "{:.1} MB / {:.1} MB",
                bytes_to_mb(node.mem_usage_bytes),
                bytes_to_mb(node.mem_limit_bytes)
            ),
        ));
    }

    if !node.deps.is_empty() {
        lines.push(field("DEPENDS ON", node.deps.join(", ")));
    }

    lines
}

pub fn summary_lines(summary: &SystemSummary) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            " SYSTEM OVERVIEW",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw(format!(" Containers: {} total, ", summary.total)),
            Span::styled(format!("{} running", summary.running), Style::default().fg(Color::Green)),
        ]),
        Line::from(vec![
            Span::raw(" Total CPU: "),
            Span::styled(format!("{:.2}%", summary.total_cpu_percent), Style::default().fg(Color::Blue)),
        ]),
        Line::from(vec![
            Span::raw(" Total RAM: "),
            Span::styled(
                format!("{:.1} MB", bytes_to_mb(summary.total_mem_bytes)),
                Style::default().fg(Color::Blue),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Mode: {} (press 'i' to toggle)", summary.mode.label()),
            Style::default().fg(Color::Gray),
        )),
    ]
}

fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        Severity::Fail => Style::default().fg(Color::Red),
        Severity::Warn => Style::default().fg(Color::Yellow),
        Severity::Info => Style::default().fg(Color::Cyan),
        Severity::Zone => Style::default().fg(Color::DarkGray),
    }
}

/// Highlight severity tokens; the text itself is left untouched
pub fn log_lines(text: &str) -> Vec<Line<'static>> {
    text.split('\n')
        .map(|line| {
            let spans: Vec<Span<'static>> = segments(line)
                .into_iter()
                .map(|seg| match seg.severity {
                    Some(severity) => Span::styled(seg.text.to_string(), severity_style(severity)),
                    None => Span::raw(seg.text.to_string()),
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = area.width.min(width);
    let height = area.height.min(height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

fn render_logs(frame: &mut Frame, logs: &LogsView) {
    let area = frame.size();
    let popup_area = centered(area, area.width.saturating_sub(6), area.height.saturating_sub(4));

    let widget = Paragraph::new(log_lines(&logs.text))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(Span::styled(
                    format!(" Logs: {} (newest first, Esc to close) ", logs.name),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
        )
        .wrap(Wrap { trim: false })
        .scroll((logs.scroll, 0));

    frame.render_widget(Clear, popup_area);
    frame.render_widget(widget, popup_area);
}

fn render_help(frame: &mut Frame) {
    let popup_area = centered(frame.size(), 48, 20);

    let heading = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let help_text = vec![
        Line::from(Span::styled(
            "Docker Health Monitor",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("Version {}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(Span::styled("Hotkeys", heading)),
        Line::from("  [↑ ↓]          Tree navigation"),
        Line::from("  [Enter]        Container info / system summary"),
        Line::from("  [l]            Container logs"),
        Line::from("  [r]            Restart container"),
        Line::from("  [i]            Toggle Lite / Full mode"),
        Line::from("  [h] / [F1]     Show this help"),
        Line::from("  [Esc]          Close overlay / quit"),
        Line::from("  [q] / [Ctrl+C] Quit"),
        Line::from(""),
        Line::from(Span::styled("Container status", heading)),
        Line::from(vec![Span::styled("  Green", Style::default().fg(Color::Green)), Span::raw("  running")]),
        Line::from(vec![Span::styled("  Gray ", Style::default().fg(Color::Gray)), Span::raw("  stopped on purpose")]),
        Line::from(vec![Span::styled("  Red  ", Style::default().fg(Color::Red)), Span::raw("  crashed / dead")]),
        Line::from(vec![Span::styled("  Blue ", Style::default().fg(Color::Blue)), Span::raw("  dependency")]),
    ];

    let widget = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(Span::styled(" Help (Esc to close) ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))),
    );

    frame.render_widget(Clear, popup_area);
    frame.render_widget(widget, popup_area);
}

fn footer(mode: MonitorMode) -> Paragraph<'static> {
    Paragraph::new(Line::from(vec![
        Span::styled(format!(" [{}] ", mode.label()), Style::default().fg(Color::Black).bg(Color::Cyan)),
        Span::styled(
            " ↑↓ navigate  Enter info  l logs  r restart  i mode  h help  q quit",
            Style::default().fg(Color::Gray),
        ),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, status: &str, deps: &[&str]) -> ServiceNode {
        let mut n = ServiceNode::from_listing(format!("id-{}", name), name, status);
        n.deps = deps.iter().map(|d| d.to_string()).collect();
        n
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_build_tree_rows_and_dependency_colors() {
        let mut stopped = node("cache", "exited", &[]);
        stopped.exit_code = 0;
        let nodes = vec![stopped, node("db", "running", &[]), node("web", "running", &["cache", "db", "queue"])];

        let view = TreeView::new(build_tree(&nodes, MonitorMode::Lite));
        let rows = view.rows();
        let labels: Vec<String> = rows.iter().map(|r| r.text()).collect();
        assert_eq!(labels, [ROOT_LABEL, "cache", "db", "web", "🔗 cache", "🔗 db", "🔗 queue"]);

        assert_eq!(rows[1].color, Color::Gray);
        assert_eq!(rows[2].color, Color::Green);
        assert_eq!(rows[4].color, Color::Gray);
        assert_eq!(rows[5].color, Color::Blue);
        assert_eq!(rows[6].color, DARK_RED);
        assert!(!rows[6].selectable);
    }

    #[test]
    fn test_full_mode_label_has_stats() {
        let mut web = node("web", "running", &[]);
        web.cpu_percent = 85.0;
        web.mem_usage_bytes = 80 * 1024 * 1024;
        web.mem_limit_bytes = 100 * 1024 * 1024;

        let label = node_label(&web, MonitorMode::Full);
        assert_eq!(line_text(&label), "web  85.0% | 80.0MB");
        let style_of = |text: &str| label.spans.iter().find(|s| s.content == text).map(|s| s.style.fg);
        assert_eq!(style_of("85.0%"), Some(Some(Color::Red)));
        assert_eq!(style_of("80.0MB"), Some(Some(Color::Yellow)));
        assert_eq!(style_of(" | "), Some(None));

        assert_eq!(line_text(&node_label(&web, MonitorMode::Lite)), "web");
    }

    #[test]
    fn test_update_restores_selection_by_name() {
        let mut dashboard = Dashboard::new(MonitorMode::Lite);
        let nodes = vec![node("api", "running", &[]), node("web", "running", &[])];
        dashboard.update(nodes.clone(), Panel::Summary(SystemSummary::from_nodes(&nodes, MonitorMode::Lite)), MonitorMode::Lite, None);
        assert!(dashboard.selected_node().is_none());

        // A crashed container now ranks first; the cursor follows "web"
        let reordered = vec![node("crashed", "dead", &[]), node("api", "running", &[]), node("web", "running", &[])];
        dashboard.update(reordered, Panel::Summary(SystemSummary::from_nodes(&nodes, MonitorMode::Lite)), MonitorMode::Lite, Some("web"));
        assert_eq!(dashboard.selected_node().map(|n| n.name.as_str()), Some("web"));
    }

    #[test]
    fn test_details_lines_for_exited_node() {
        let mut n = node("worker", "exited", &["db"]);
        n.exit_code = 137;
        let text: Vec<String> = details_lines(&n).iter().map(line_text).collect();
        assert!(text.contains(&" EXIT CODE: 137 (Manual Stop (SIGKILL))".to_string()));
        assert!(text.contains(&" DEPENDS ON: db".to_string()));
        assert!(!text.iter().any(|l| l.contains("CPU USAGE")));
    }

    #[test]
    fn test_details_lines_for_running_node() {
        let mut n = node("web", "running", &[]);
        n.cpu_percent = 12.5;
        n.mem_usage_bytes = 64 * 1024 * 1024;
        n.mem_limit_bytes = 512 * 1024 * 1024;
        let text: Vec<String> = details_lines(&n).iter().map(line_text).collect();
        assert!(text.contains(&" CPU USAGE: 12.50%".to_string()));
        assert!(text.contains(&" MEM USAGE: 64.0 MB / 512.0 MB".to_string()));
        assert!(text.contains(&" IP ADDR: -".to_string()));
    }

    #[test]
    fn test_summary_lines() {
        let summary = SystemSummary {
            total: 3,
            running: 2,
            total_cpu_percent: 12.5,
            total_mem_bytes: 3 * 1024 * 1024,
            mode: MonitorMode::Full,
        };
        let text: Vec<String> = summary_lines(&summary).iter().map(line_text).collect();
        assert_eq!(text[2], " Containers: 3 total, 2 running");
        assert_eq!(text[3], " Total CPU: 12.50%");
        assert_eq!(text[4], " Total RAM: 3.0 MB");
        assert!(text[6].contains("Full"));
    }

    #[test]
    fn test_log_lines_keep_text_and_highlight() {
        let lines = log_lines("2024 ERROR fail\n2024 INFO start");
        assert_eq!(lines.len(), 2);
        assert_eq!(line_text(&lines[0]), "2024 ERROR fail");
        let error = lines[0].spans.iter().find(|s| s.content == "ERROR").unwrap();
        assert_eq!(error.style.fg, Some(Color::Red));
    }

    #[test]
    fn test_centered_is_clamped() {
        let area = Rect::new(0, 0, 40, 10);
        let popup = centered(area, 48, 20);
        assert_eq!(popup, Rect::new(0, 0, 40, 10));
        assert_eq!(centered(area, 20, 4), Rect::new(10, 3, 20, 4));
    }
}
