use std::iter;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};
use stackfall_engine::{BoardSize, GameModel};

use crate::ui::widgets::style;

/// Label/value rows describing the current session.
pub struct StatsDisplay<'a> {
    model: &'a GameModel,
    block: Option<BlockWidget<'a>>,
}

impl<'a> StatsDisplay<'a> {
    pub fn new(model: &'a GameModel) -> Self {
        Self { model, block: None }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        20 + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        super::len_u16(ROWS.len()).saturating_add(super::block_vertical_margin(self.block.as_ref()))
    }
}

#[derive(Clone, Copy)]
enum Row {
    Empty,
    FullLabel(&'static str),
    FullValue(&'static dyn Fn(&GameModel) -> String),
    LabelValue(&'static str, &'static dyn Fn(&GameModel) -> String),
}

fn size_name(size: BoardSize) -> &'static str {
    match size {
        BoardSize::Small => "SMALL",
        BoardSize::Medium => "MEDIUM",
        BoardSize::Large => "LARGE",
    }
}

const ROWS: &[Row] = &[
    Row::FullLabel("TIME:"),
    Row::FullValue(&|model| model.game().elapsed_ticks().to_string()),
    Row::Empty,
    Row::LabelValue("ROWS:", &|model| model.game().board().size().to_string()),
    Row::LabelValue("SHAPE:", &|model| {
        model
            .game()
            .active_shape_kind()
            .map_or_else(|| "-".to_owned(), |kind| kind.as_char().to_string())
    }),
    Row::Empty,
    Row::FullLabel("NEXT GAME:"),
    Row::FullValue(&|model| size_name(model.board_size()).to_owned()),
];

impl Widget for StatsDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let style = style::DEFAULT;

        let rows_areas =
            Layout::vertical((0..ROWS.len()).map(|_| Constraint::Length(1))).split(area);

        for (row, area) in iter::zip(ROWS.iter().copied(), rows_areas[..].iter().copied()) {
            match row {
                Row::Empty => {}
                Row::FullLabel(label) => {
                    Line::styled(label, style).left_aligned().render(area, buf);
                }
                Row::FullValue(value) => {
                    Line::styled(value(self.model), style)
                        .right_aligned()
                        .render(area, buf);
                }
                Row::LabelValue(label, value) => {
                    let [label_area, value_area] = area.layout(&Layout::horizontal([
                        Constraint::Fill(1),
                        Constraint::Fill(1),
                    ]));
                    Line::styled(label, style)
                        .left_aligned()
                        .render(label_area, buf);
                    Line::styled(value(self.model), style)
                        .right_aligned()
                        .render(value_area, buf);
                }
            }
        }
    }
}
