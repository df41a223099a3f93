use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block as BlockWidget, Clear, Widget},
};
use stackfall_engine::SaveEntry;

use crate::ui::widgets::style;

/// Popup listing saved games with one of them selected.
#[derive(Debug)]
pub struct SaveListDisplay<'a> {
    entries: &'a [SaveEntry],
    selected: usize,
}

impl<'a> SaveListDisplay<'a> {
    pub fn new(entries: &'a [SaveEntry], selected: usize) -> Self {
        Self { entries, selected }
    }
}

const WIDTH: u16 = 44;
const MAX_VISIBLE: usize = 10;

impl Widget for SaveListDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let visible = self.entries.len().min(MAX_VISIBLE);
        // Scroll so that the selected entry stays in view.
        let first = self.selected.saturating_sub(visible.saturating_sub(1));
        let height = super::len_u16(visible).saturating_add(2);
        let area = area.centered(Constraint::Length(WIDTH), Constraint::Length(height));

        let block = BlockWidget::bordered()
            .title(Line::from("LOAD GAME").centered())
            .title_bottom(Line::from("Enter: load | Esc: cancel").centered())
            .style(style::DEFAULT);
        let inner = block.inner(area);
        Clear.render(area, buf);
        block.render(area, buf);

        let rows = self.entries.iter().enumerate().skip(first).take(visible);
        for (row, (index, entry)) in rows.enumerate() {
            let line_area = Rect {
                y: inner.y.saturating_add(super::len_u16(row)),
                height: 1,
                ..inner
            };
            let saved_at = entry.saved_at.format("%Y-%m-%d %H:%M").to_string();
            let line = Line::from(vec![
                Span::from(format!(" {:<20}", entry.name)),
                Span::from(format!("{saved_at:>18} ")),
            ]);
            let line = if index == self.selected {
                line.style(style::SELECTED)
            } else {
                line.style(style::DEFAULT)
            };
            line.render(line_area, buf);
        }
    }
}
