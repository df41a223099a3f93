use ratatui::{
    prelude::{Buffer, Rect},
    style::Style,
    widgets::{Paragraph, Widget},
};
use stackfall_engine::{Cell, CellState, ShapeKind};

use crate::ui::widgets::{color, style};

/// One board cell, two terminal columns wide.
#[derive(Debug)]
pub struct CellDisplay {
    style: Style,
    symbol: &'static str,
}

impl CellDisplay {
    pub const fn new(style: Style, symbol: &'static str) -> Self {
        Self { style, symbol }
    }

    pub fn width() -> u16 {
        2
    }

    pub fn height() -> u16 {
        1
    }

    /// Empty cells show a dot (in the spawn row style when `spawn_row`); locked
    /// and falling cells are filled with their shape's colour. Falling cells are
    /// marked so the active shape stands out.
    pub fn from_cell(cell: Cell, spawn_row: bool) -> Self {
        let kind_style = match cell.kind {
            Some(ShapeKind::I) => style::I_BLOCK,
            Some(ShapeKind::O) => style::O_BLOCK,
            Some(ShapeKind::S) => style::S_BLOCK,
            Some(ShapeKind::Z) => style::Z_BLOCK,
            Some(ShapeKind::J) => style::J_BLOCK,
            Some(ShapeKind::L) => style::L_BLOCK,
            Some(ShapeKind::T) => style::T_BLOCK,
            None => style::UNKNOWN_BLOCK,
        };
        match cell.state {
            CellState::Empty if spawn_row => Self::new(style::SPAWN_ROW, "."),
            CellState::Empty => Self::new(style::EMPTY_DOT, "."),
            CellState::Locked => Self::new(kind_style, ""),
            CellState::Falling => Self::new(kind_style.fg(color::BLACK), "[]"),
        }
    }
}

impl Widget for CellDisplay {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &CellDisplay {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        // Use a Paragraph to fill the whole area, not just the cells with the symbol
        Paragraph::new(self.symbol)
            .style(self.style)
            .centered()
            .render(area, buf);
    }
}
