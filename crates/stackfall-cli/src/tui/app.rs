use crossterm::event::Event;
use ratatui::Frame;

use crate::tui::Tui;

/// Trait for terminal applications run by [`Tui::run`].
pub trait App {
    /// Called once before the first event. Use this to start the tick timer.
    fn init(&mut self, tui: &mut Tui);

    /// Returns whether the application should exit.
    fn should_exit(&self) -> bool;

    /// Handles terminal events (key input, resize, etc.).
    fn handle_event(&mut self, tui: &mut Tui, event: Event);

    /// Draws the screen.
    fn draw(&self, frame: &mut Frame);

    /// Advances the application by one timer tick.
    fn update(&mut self, tui: &mut Tui);
}
