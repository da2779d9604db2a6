/// Main TUI application

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::core::monitor::{build_panel, spawn_log_fetch, spawn_restart, UpdateSender};
use crate::core::{Collector, PollLoop, ServiceNode, SharedState, UiUpdate};
use crate::screens::{Dashboard, LogsView};
use crate::utils::AppConfig;

const LOGS_LOADING: &str = "Loading logs...";

pub struct App {
    dashboard: Dashboard,
    state: SharedState,
    collector: Collector,
    config: AppConfig,
    updates_tx: UpdateSender,
    updates_rx: UnboundedReceiver<UiUpdate>,
    poll_handle: Option<JoinHandle<()>>,
    status_message: Option<String>,
    logs: Option<LogsView>,
    show_help: bool,
    should_quit: bool,
}

impl App {
    pub async fn new(collector: Collector, state: SharedState, config: AppConfig) -> Self {
        let mode = state.read().await.mode;
        let (updates_tx, updates_rx) = unbounded_channel();

        Self {
            dashboard: Dashboard::new(mode),
            state,
            collector,
            config,
            updates_tx,
            updates_rx,
            poll_handle: None,
            status_message: None,
            logs: None,
            show_help: false,
            should_quit: false,
        }
    }

    /// Apply a snapshot taken before the terminal was set up
    pub async fn seed(&mut self, nodes: Vec<ServiceNode>) {
        let (mode, active_id) = {
            let s = self.state.read().await;
            (s.mode, s.active_id.clone())
        };
        let panel = build_panel(&nodes, active_id.as_deref(), mode);
        self.apply_update(UiUpdate::Snapshot { nodes, panel, mode }).await;
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        self.start_polling();

        let result = self.run_loop(&mut terminal).await;

        if let Some(handle) = self.poll_handle.take() {
            handle.abort();
        }

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn start_polling(&mut self) {
        let poll = PollLoop::new(
            self.collector.clone(),
            self.state.clone(),
            self.config.poll_intervals(),
            self.updates_tx.clone(),
        );
        self.poll_handle = Some(poll.spawn());
    }

    async fn run_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            // Drain background results (non-blocking)
            while let Ok(update) = self.updates_rx.try_recv() {
                self.apply_update(update).await;
            }

            terminal.draw(|f| {
                self.dashboard.render(f, self.status_message.as_deref(), self.logs.as_ref(), self.show_help)
            })?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key_event) = event::read()? {
                    if key_event.kind == KeyEventKind::Press {
                        self.handle_key(key_event).await;
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    async fn apply_update(&mut self, update: UiUpdate) {
        match update {
            UiUpdate::Snapshot { nodes, panel, mode } => {
                // Render with the collection mode; a toggle mid-cycle applies from the next snapshot
                let last_selected = self.state.read().await.last_selected_name.clone();
                self.dashboard.update(nodes, panel, mode, last_selected.as_deref());
            }
            UiUpdate::Logs { name, result } => {
                // Ignore results for an overlay the user already closed
                let Some(logs) = self.logs.as_mut().filter(|l| l.name == name) else {
                    debug!(container = %name, "dropping logs for closed overlay");
                    return;
                };
                logs.text = match result {
                    Ok(text) => text,
                    Err(e) => format!("Error: {}", e),
                };
                logs.scroll = 0;
            }
            UiUpdate::Restart { name, result } => {
                self.status_message = Some(match result {
                    Ok(()) => format!("{} restarted", name),
                    Err(e) => format!("Error: {}", e),
                });
            }
        }
    }

    async fn handle_key(&mut self, key_event: KeyEvent) {
        let key = key_event.code;

        if key == KeyCode::Char('c') && key_event.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.show_help {
            if matches!(key, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::F(1)) {
                self.show_help = false;
            }
            return;
        }

        if let Some(logs) = self.logs.as_mut() {
            match key {
                KeyCode::Esc | KeyCode::Char('l') | KeyCode::Char('L') => self.logs = None,
                KeyCode::Down => logs.scroll = logs.scroll.saturating_add(1),
                KeyCode::Up => logs.scroll = logs.scroll.saturating_sub(1),
                KeyCode::PageDown => logs.scroll = logs.scroll.saturating_add(20),
                KeyCode::PageUp => logs.scroll = logs.scroll.saturating_sub(20),
                _ => {}
            }
            return;
        }

        match key {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::F(1) => {
                self.show_help = true;
            }
            KeyCode::Up => {
                self.dashboard.select_prev();
                self.remember_selection().await;
            }
            KeyCode::Down => {
                self.dashboard.select_next();
                self.remember_selection().await;
            }
            KeyCode::Enter => {
                self.activate_selection().await;
            }
            KeyCode::Char('l') | KeyCode::Char('L') => {
                self.open_logs();
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.restart_selected();
            }
            KeyCode::Char('i') | KeyCode::Char('I') => {
                self.toggle_mode().await;
            }
            _ => {}
        }
    }

    async fn remember_selection(&mut self) {
        let name = self.dashboard.selected_node().map(|n| n.name.clone());
        self.state.write().await.last_selected_name = name;
    }

    /// Show the selected node's details, or the summary when the root is selected
    async fn activate_selection(&mut self) {
        let active_id = self.dashboard.selected_node().map(|n| n.id.clone());
        let mode = {
            let mut s = self.state.write().await;
            s.active_id = active_id.clone();
            s.mode
        };
        let panel = build_panel(self.dashboard.nodes(), active_id.as_deref(), mode);
        self.dashboard.set_panel(panel);
        self.status_message = None;
    }

    fn open_logs(&mut self) {
        let Some(node) = self.dashboard.selected_node() else {
            return;
        };

        self.logs = Some(LogsView {
            name: node.name.clone(),
            text: LOGS_LOADING.to_string(),
            scroll: 0,
        });
        spawn_log_fetch(
            self.collector.host().clone(),
            node.id.clone(),
            node.name.clone(),
            self.config.log_tail,
            self.updates_tx.clone(),
        );
    }

    fn restart_selected(&mut self) {
        let Some(node) = self.dashboard.selected_node() else {
            return;
        };

        self.status_message = Some(format!("Restarting {}...", node.name));
        spawn_restart(
            self.collector.host().clone(),
            node.id.clone(),
            node.name.clone(),
            self.config.restart_grace(),
            self.updates_tx.clone(),
        );
    }

    async fn toggle_mode(&mut self) {
        let mode = {
            let mut s = self.state.write().await;
            s.mode = s.mode.toggled();
            s.mode
        };
        info!(mode = mode.label(), "monitor mode changed");
        self.dashboard.set_mode(mode);
        self.status_message = Some(format!("Mode: {}", mode.label()));
    }
}
