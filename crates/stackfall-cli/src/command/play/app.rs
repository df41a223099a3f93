use std::time::Duration;

use crossterm::event::Event;
use ratatui::Frame;
use stackfall_engine::GameModel;

use crate::{
    command::play::screen::PlayScreen,
    tui::{App, Tui},
};

pub struct PlayApp {
    screen: PlayScreen,
    tick_interval: Duration,
}

impl PlayApp {
    pub fn new(model: GameModel, tick_interval: Duration, save_name: String) -> Self {
        Self {
            screen: PlayScreen::new(model, save_name),
            tick_interval,
        }
    }

    /// Starts or stops the tick timer to match the screen.
    ///
    /// The interval is only touched when ticking actually changes, so that an
    /// unrelated key press does not restart the timer.
    fn sync_timer(&self, tui: &mut Tui) {
        let wants_ticks = self.screen.is_playing();
        if wants_ticks != tui.is_ticking() {
            tui.set_tick_interval(wants_ticks.then_some(self.tick_interval));
        }
    }
}

impl App for PlayApp {
    fn init(&mut self, tui: &mut Tui) {
        self.sync_timer(tui);
    }

    fn should_exit(&self) -> bool {
        self.screen.is_exiting()
    }

    fn handle_event(&mut self, tui: &mut Tui, event: Event) {
        if self.screen.handle_event(&event) {
            // Restart from a full interval, e.g. after a new game.
            tui.set_tick_interval(None);
        }
        self.sync_timer(tui);
    }

    fn draw(&self, frame: &mut Frame) {
        self.screen.draw(frame);
    }

    fn update(&mut self, tui: &mut Tui) {
        if self.screen.is_playing() {
            self.screen.update();
        }
        self.sync_timer(tui);
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use stackfall_engine::{BoardSize, ShapeSeed};

    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn app(size: BoardSize) -> PlayApp {
        let model = GameModel::new(size, Some(ShapeSeed::from_bytes([3; 16])));
        PlayApp::new(model, Duration::from_millis(500), "quicksave".to_owned())
    }

    #[test]
    fn test_init_starts_timer() {
        let mut app = app(BoardSize::Medium);
        let mut tui = Tui::new();
        assert!(!tui.is_ticking());
        app.init(&mut tui);
        assert!(tui.is_ticking());
    }

    #[test]
    fn test_pause_stops_timer() {
        let mut app = app(BoardSize::Medium);
        let mut tui = Tui::new();
        app.init(&mut tui);
        app.handle_event(&mut tui, key(KeyCode::Char('p')));
        assert!(!tui.is_ticking());
        app.handle_event(&mut tui, key(KeyCode::Char('p')));
        assert!(tui.is_ticking());
    }

    #[test]
    fn test_game_over_stops_timer() {
        let mut app = app(BoardSize::Small);
        let mut tui = Tui::new();
        app.init(&mut tui);
        for _ in 0..1000 {
            if !tui.is_ticking() {
                break;
            }
            app.update(&mut tui);
        }
        assert!(!tui.is_ticking());
        assert!(!app.should_exit());

        app.handle_event(&mut tui, key(KeyCode::Char('n')));
        assert!(tui.is_ticking());
    }

    #[test]
    fn test_quit() {
        let mut app = app(BoardSize::Medium);
        let mut tui = Tui::new();
        app.init(&mut tui);
        app.handle_event(&mut tui, key(KeyCode::Char('q')));
        assert!(app.should_exit());
    }
}
