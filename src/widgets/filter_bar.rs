use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Stylize, Style, Color},
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph, Widget},
};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::core::filters::{FilterState, FilterToggle};

/// What a key press did to the search text.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEdit {
    Changed(String),
    Done,
    Ignored,
}

pub struct FilterBarWidget {
    filter: FilterState,
    editing: bool,
    input: String,
}

impl FilterBarWidget {
    pub fn new() -> Self {
        Self {
            filter: FilterState::default(),
            editing: false,
            input: String::new(),
        }
    }

    pub fn set_filter(&mut self, filter: FilterState) {
        if !self.editing {
            self.input = filter.search_text.clone();
        }
        self.filter = filter;
    }

    pub fn start_editing(&mut self) {
        self.editing = true;
        self.input = self.filter.search_text.clone();
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Every edit is reported so the table can follow as the user types.
    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> SearchEdit {
        if !self.editing || key_event.kind != KeyEventKind::Press {
            return SearchEdit::Ignored;
        }

        match key_event.code {
            KeyCode::Esc | KeyCode::Enter => {
                self.editing = false;
                SearchEdit::Done
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                SearchEdit::Changed(self.input.clone())
            }
            KeyCode::Backspace => {
                if self.input.pop().is_some() {
                    SearchEdit::Changed(self.input.clone())
                } else {
                    SearchEdit::Ignored
                }
            }
            _ => SearchEdit::Ignored,
        }
    }
}

impl Default for FilterBarWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for &FilterBarWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = Vec::new();

        for toggle in FilterToggle::ALL {
            let style = if self.filter.get(toggle) {
                Style::new().bold().fg(Color::White).bg(Color::Blue)
            } else {
                Style::new().fg(Color::Gray)
            };
            spans.push(Span::styled(format!(" {} ", toggle.as_str()), style));
            spans.push(Span::raw(" "));
        }

        spans.push(Span::raw(" Search: "));
        let search_text = if self.editing {
            format!("{}_", self.input)
        } else {
            self.input.clone()
        };
        let search_style = if self.editing {
            Style::new().fg(Color::Yellow)
        } else {
            Style::new().fg(Color::Gray)
        };
        spans.push(Span::styled(search_text, search_style));

        let paragraph = Paragraph::new(Line::from(spans))
            .block(
                Block::bordered()
                    .title("Filters")
                    .title_style(Style::new().bold().fg(Color::Cyan))
                    .border_type(BorderType::Plain)
                    .border_style(Style::new().fg(Color::Blue))
            );

        paragraph.render(area, buf);
    }
}
