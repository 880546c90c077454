use ratatui::{
    buffer::Buffer,
    layout::{Rect, Layout, Direction, Constraint, Alignment},
    style::{Stylize, Style, Color},
    text::{Line, Text},
    widgets::{Block, BorderType, Paragraph, Widget, Clear},
};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::core::actions::LookupReport;

pub struct LookupPopupWidget {
    title: String,
    lines: Vec<String>,
    scroll: u16,
    active: bool,
}

impl LookupPopupWidget {
    pub fn new() -> Self {
        Self {
            title: String::new(),
            lines: Vec::new(),
            scroll: 0,
            active: false,
        }
    }

    pub fn show(&mut self, report: &LookupReport) {
        self.title = format!("Whois {}", report.ip);
        self.lines = report.lines();
        self.scroll = 0;
        self.active = true;
    }

    pub fn hide(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent) {
        if !self.active || key_event.kind != KeyEventKind::Press {
            return;
        }

        let max_scroll = self.lines.len().saturating_sub(1) as u16;
        match key_event.code {
            KeyCode::Esc | KeyCode::Char('q') => self.hide(),
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down => self.scroll = (self.scroll + 1).min(max_scroll),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(10),
            KeyCode::PageDown => self.scroll = (self.scroll.saturating_add(10)).min(max_scroll),
            KeyCode::Home => self.scroll = 0,
            _ => {}
        }
    }
}

impl Default for LookupPopupWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for &LookupPopupWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if !self.active {
            return;
        }

        let popup_width = area.width.saturating_sub(8).min(100);
        let popup_height = area.height.saturating_sub(4);

        let hmargin = (area.width.saturating_sub(popup_width)) / 2;
        let vmargin = (area.height.saturating_sub(popup_height)) / 2;

        let popup_area = Rect {
            x: area.x + hmargin,
            y: area.y + vmargin,
            width: popup_width,
            height: popup_height,
        };

        Clear.render(popup_area, buf);

        let block = Block::bordered()
            .title(self.title.as_str())
            .title_style(Style::new().bold().fg(Color::Yellow))
            .border_type(BorderType::Rounded)
            .border_style(Style::new().fg(Color::Yellow));

        let inner_area = block.inner(popup_area);
        block.render(popup_area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),     // Output
                Constraint::Length(1),  // Instructions
            ])
            .split(inner_area);

        let text = Text::from(self.lines.iter().map(|l| Line::raw(l.as_str())).collect::<Vec<_>>());
        Paragraph::new(text)
            .scroll((self.scroll, 0))
            .render(layout[0], buf);

        Paragraph::new("↑↓/PgUp/PgDn: Scroll  |  Esc: Close")
            .style(Style::new().fg(Color::Gray))
            .alignment(Alignment::Center)
            .render(layout[1], buf);
    }
}
