use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};
use stackfall_engine::GameModel;

use crate::ui::widgets::{BoardDisplay, StatsDisplay, color, style};

/// Board and stats panel side by side, with a popup when the game is paused or
/// over.
pub struct GameDisplay<'a> {
    model: &'a GameModel,
    paused: bool,
}

impl<'a> GameDisplay<'a> {
    pub fn new(model: &'a GameModel, paused: bool) -> Self {
        Self { model, paused }
    }
}

impl Widget for GameDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let lost = self.model.game().is_lost();
        let border_style = if lost {
            color::RED
        } else if self.paused {
            color::YELLOW
        } else {
            color::WHITE
        };

        let board = BoardDisplay::new(self.model.game().board())
            .block(Block::bordered().border_style(border_style).style(style::DEFAULT));
        let stats = StatsDisplay::new(self.model).block(
            Block::bordered()
                .title(Line::from("STATS").centered())
                .padding(Padding::symmetric(1, 0))
                .border_style(border_style)
                .style(style::DEFAULT),
        );

        let [board_column, stats_column] = Layout::horizontal([
            Constraint::Length(board.width()),
            Constraint::Length(stats.width()),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);
        let [board_area] =
            Layout::vertical([Constraint::Length(board.height())]).areas(board_column);
        let [stats_area] =
            Layout::vertical([Constraint::Length(stats.height())]).areas(stats_column);

        let board_width = board.width();
        board.render(board_area, buf);
        stats.render(stats_area, buf);

        let popup = if lost {
            Some(("GAME OVER!!", Style::new().fg(color::WHITE).bg(color::RED)))
        } else if self.paused {
            Some(("PAUSED", Style::new().fg(color::BLACK).bg(color::YELLOW)))
        } else {
            None
        };

        if let Some((text, style)) = popup {
            let block = Block::new().style(style);
            let text = Text::styled(text, style).centered();
            let area = board_area.centered(Constraint::Length(board_width), Constraint::Length(3));
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(inner.centered_vertically(Constraint::Length(1)), buf);
        }
    }
}
