use std::io;
use std::time::{Duration, Instant};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{DefaultTerminal, Frame};
use tracing::debug;

use crate::core::actions::{self, ProcessTerminator, SysinfoTerminator};
use crate::core::connection::Column;
use crate::core::filters::FilterToggle;
use crate::core::monitor::ConnectionMonitor;
use crate::widgets::{ConnectionTableWidget, FilterBarWidget, LookupPopupWidget, SearchEdit};

use ratatui::layout::{Layout, Direction, Constraint};
use ratatui::widgets::Paragraph;
use ratatui::style::{Style, Color};
use ratatui::text::{Span, Line};

pub struct App {
    pub connection_table_widget: ConnectionTableWidget,
    pub filter_bar_widget: FilterBarWidget,
    pub lookup_popup_widget: LookupPopupWidget,
    pub monitor: ConnectionMonitor,
    pub terminator: Box<dyn ProcessTerminator>,
    pub status_message: Option<String>,
    pub exit: bool,
    pub last_refresh: Instant,
    pub refresh_interval: Duration,
    pub tick_rate: Duration,
}

impl App {
    pub fn new(monitor: ConnectionMonitor) -> Self {
        App {
            connection_table_widget: ConnectionTableWidget::new(),
            filter_bar_widget: FilterBarWidget::new(),
            lookup_popup_widget: LookupPopupWidget::new(),
            monitor,
            terminator: Box::new(SysinfoTerminator::new()),
            status_message: None,
            exit: false,
            last_refresh: Instant::now(),
            refresh_interval: Duration::from_secs(5),
            tick_rate: Duration::from_millis(250),
        }
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        self.refresh();

        while !self.exit {
            let timeout = self.refresh_interval
                .checked_sub(self.last_refresh.elapsed())
                .unwrap_or(Duration::ZERO)
                .min(self.tick_rate);

            if event::poll(timeout)? {
                self.handle_events()?;
            }

            if self.last_refresh.elapsed() >= self.refresh_interval {
                self.refresh();
            }

            terminal.draw(|frame| self.draw(frame))?;
        }
        Ok(())
    }

    /// Re-runs the whole pipeline and hands the result to the widgets.
    fn refresh(&mut self) {
        self.monitor.refresh();
        self.connection_table_widget.set_rows(self.monitor.rows());
        self.connection_table_widget.set_sort(self.monitor.sort_state());
        self.filter_bar_widget.set_filter(self.monitor.filter().clone());
        self.last_refresh = Instant::now();
        debug!(rows = self.connection_table_widget.len(), "refreshed");
    }

    fn draw(&mut self, frame: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),   // Filter bar
                Constraint::Min(5),      // Connection table
                Constraint::Length(1),   // Action result
                Constraint::Length(1),   // Key bindings
            ])
            .split(frame.area());

        let table_rows = ConnectionTableWidget::rows_for_height(main_chunks[1].height);
        self.connection_table_widget.set_visible_rows(table_rows);

        frame.render_widget(&self.filter_bar_widget, main_chunks[0]);
        frame.render_widget(&self.connection_table_widget, main_chunks[1]);

        let message = self.status_message.clone().unwrap_or_else(|| {
            format!("Filter: {}", self.monitor.filter().to_string())
        });
        let message_bar = Paragraph::new(Span::styled(message, Style::default().fg(Color::Yellow)));
        frame.render_widget(message_bar, main_chunks[2]);

        let mut status_text = Vec::new();
        let bindings = [
            ("a/t/u/4/6", ": Toggle "),
            ("/", ": Search "),
            ("F1-F7", ": Sort "),
            ("k", ": Kill "),
            ("w", ": Whois "),
            ("y", ": Copy "),
            ("r", ": Refresh "),
            ("q", ": Quit"),
        ];
        for (keys, label) in bindings {
            status_text.push(Span::styled(keys, Style::default().fg(Color::Green)));
            status_text.push(Span::raw(label));
        }
        frame.render_widget(Paragraph::new(Line::from(status_text)), main_chunks[3]);

        if self.lookup_popup_widget.is_active() {
            frame.render_widget(&self.lookup_popup_widget, frame.area());
        }
    }

    fn handle_events(&mut self) -> io::Result<()> {
        match event::read()? {
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                self.handle_key_event(key_event)
            }
            _ => {}
        };
        Ok(())
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent) {
        if self.lookup_popup_widget.is_active() {
            self.lookup_popup_widget.handle_key_event(key_event);
            return;
        }

        if self.filter_bar_widget.is_editing() {
            if let SearchEdit::Changed(text) = self.filter_bar_widget.handle_key_event(key_event) {
                self.monitor.set_search(&text);
                self.refresh();
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('q') => self.exit(),
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('a') => self.toggle(FilterToggle::ActiveOnly),
            KeyCode::Char('t') => self.toggle(FilterToggle::Tcp),
            KeyCode::Char('u') => self.toggle(FilterToggle::Udp),
            KeyCode::Char('4') => self.toggle(FilterToggle::Ipv4),
            KeyCode::Char('6') => self.toggle(FilterToggle::Ipv6),
            KeyCode::Char('/') => self.filter_bar_widget.start_editing(),
            KeyCode::F(n @ 1..=7) => self.sort_by(n),
            KeyCode::Char('k') => self.kill_selected(),
            KeyCode::Char('w') => self.whois_selected(),
            KeyCode::Char('y') => self.copy_selected(),
            KeyCode::Up => self.connection_table_widget.select_up(1),
            KeyCode::Down => self.connection_table_widget.select_down(1),
            KeyCode::PageUp => self.connection_table_widget.select_up(10),
            KeyCode::PageDown => self.connection_table_widget.select_down(10),
            KeyCode::Home => self.connection_table_widget.select_first(),
            KeyCode::End => self.connection_table_widget.select_last(),
            _ => {}
        }
    }

    fn toggle(&mut self, toggle: FilterToggle) {
        self.monitor.toggle_filter(toggle);
        self.status_message = None;
        self.refresh();
    }

    fn sort_by(&mut self, function_key: u8) {
        if let Some(column) = Column::from_index(usize::from(function_key) - 1) {
            self.monitor.set_sort(column);
            self.refresh();
        }
    }

    fn kill_selected(&mut self) {
        let result = actions::terminate(
            self.connection_table_widget.selected_row(),
            self.terminator.as_mut(),
        );
        self.status_message = Some(actions::report("Kill", &result, |pid| {
            format!("Killed process with PID {}", pid)
        }));
        if result.is_ok() {
            self.refresh();
        }
    }

    fn whois_selected(&mut self) {
        let result = actions::reverse_lookup(self.connection_table_widget.selected_row());
        self.status_message = Some(actions::report("Whois", &result, |report| {
            format!("Whois results for {}", report.ip)
        }));
        if let Ok(report) = result {
            self.lookup_popup_widget.show(&report);
        }
    }

    fn copy_selected(&mut self) {
        let result = actions::export_row(self.connection_table_widget.selected_row());
        self.status_message = Some(actions::report("Copy", &result, |line| line.clone()));
    }

    fn exit(&mut self) {
        self.exit = true
    }
}
