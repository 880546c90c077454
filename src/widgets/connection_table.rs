use ratatui::{
    buffer::Buffer,
    layout::{Rect, Constraint},
    style::{Stylize, Style, Color, Modifier},
    widgets::{Block, Table, Row, Cell, Widget, BorderType},
};

use crate::core::color::Rgb;
use crate::core::connection::{Column, DisplayRow};
use crate::core::sort::SortState;

/// Lines the table spends outside its body: two borders, header and header margin.
pub const TABLE_CHROME: u16 = 4;

pub struct ConnectionTableWidget {
    rows: Vec<DisplayRow>,
    sort: SortState,
    selected: usize,
    scroll_offset: usize,
    visible_rows: usize,
}

impl ConnectionTableWidget {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            sort: SortState::default(),
            selected: 0,
            scroll_offset: 0,
            visible_rows: 15,
        }
    }

    /// Replaces all rows. The selection stays on the same index, clamped.
    pub fn set_rows(&mut self, rows: Vec<DisplayRow>) {
        self.rows = rows;
        self.selected = self.selected.min(self.rows.len().saturating_sub(1));
        self.keep_selection_visible();
    }

    /// Body rows that fit in a table area of the given height.
    pub fn rows_for_height(height: u16) -> usize {
        height.saturating_sub(TABLE_CHROME) as usize
    }

    pub fn set_sort(&mut self, sort: SortState) {
        self.sort = sort;
    }

    /// Rendering height is only known at draw time; the app passes it back in.
    pub fn set_visible_rows(&mut self, visible_rows: usize) {
        self.visible_rows = visible_rows.max(1);
        self.keep_selection_visible();
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn selected_row(&self) -> Option<&DisplayRow> {
        self.rows.get(self.selected)
    }

    pub fn select_up(&mut self, amount: usize) {
        self.selected = self.selected.saturating_sub(amount);
        self.keep_selection_visible();
    }

    pub fn select_down(&mut self, amount: usize) {
        let last = self.rows.len().saturating_sub(1);
        self.selected = (self.selected + amount).min(last);
        self.keep_selection_visible();
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
        self.keep_selection_visible();
    }

    pub fn select_last(&mut self) {
        self.selected = self.rows.len().saturating_sub(1);
        self.keep_selection_visible();
    }

    fn keep_selection_visible(&mut self) {
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + self.visible_rows {
            self.scroll_offset = self.selected + 1 - self.visible_rows;
        }
        let max_scroll = self.rows.len().saturating_sub(self.visible_rows);
        self.scroll_offset = self.scroll_offset.min(max_scroll);
    }

    fn header_cells(&self) -> Vec<String> {
        Column::ALL
            .iter()
            .map(|column| {
                if *column == self.sort.column {
                    format!("{} {}", column.title(), self.sort.direction.arrow())
                } else {
                    column.title().to_string()
                }
            })
            .collect()
    }
}

impl Default for ConnectionTableWidget {
    fn default() -> Self {
        Self::new()
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

impl Widget for &ConnectionTableWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let visible_rows = ConnectionTableWidget::rows_for_height(area.height);
        let total_rows = self.rows.len();

        let start_idx = self.scroll_offset.min(total_rows);
        let end_idx = (start_idx + visible_rows).min(total_rows);

        let rows: Vec<Row> = self.rows[start_idx..end_idx]
            .iter()
            .enumerate()
            .map(|(offset, row)| {
                let mut style = Style::new().bg(to_color(row.color)).fg(Color::Black);
                if start_idx + offset == self.selected {
                    style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
                }
                Row::new(row.cells().iter().map(|cell| Cell::from(cell.to_string())).collect::<Vec<_>>())
                    .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(6),       // Proto
            Constraint::Length(7),       // IP Ver
            Constraint::Percentage(22),  // Local
            Constraint::Percentage(22),  // Remote
            Constraint::Length(12),      // Status
            Constraint::Length(8),       // PID
            Constraint::Fill(1),         // Process
        ];

        let title = format!("Connections ({})", total_rows);
        let table = Table::new(rows, widths)
            .header(
                Row::new(self.header_cells())
                    .style(Style::new().bold().fg(Color::White))
                    .bottom_margin(1)
            )
            .block(
                Block::bordered()
                    .title(title)
                    .title_style(Style::new().bold().fg(Color::Cyan))
                    .border_type(BorderType::Plain)
                    .border_style(Style::new().fg(Color::Blue))
            );

        table.render(area, buf);
    }
}
