use crossterm::event::{Event, KeyCode, KeyEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    text::Text,
};
use stackfall_engine::{BoardSize, GameModel, SaveEntry};

use crate::ui::widgets::{GameDisplay, KeyBinding, KeyBindingDisplay, SaveListDisplay, style};

const PLAYING_KEYS: &[KeyBinding] = &[
    (&["←", "→"], "Move"),
    (&["↓"], "Drop"),
    (&["↑"], "Rotate"),
    (&["P"], "Pause"),
    (&["S"], "Save"),
    (&["L"], "Load"),
    (&["N"], "New"),
    (&["1", "2", "3"], "Size"),
    (&["Q"], "Quit"),
];
const PAUSED_KEYS: &[KeyBinding] = &[
    (&["P"], "Resume"),
    (&["S"], "Save"),
    (&["L"], "Load"),
    (&["N"], "New"),
    (&["1", "2", "3"], "Size"),
    (&["Q"], "Quit"),
];
const GAME_OVER_KEYS: &[KeyBinding] = &[
    (&["L"], "Load"),
    (&["N"], "New"),
    (&["1", "2", "3"], "Size"),
    (&["Q"], "Quit"),
];
const LOAD_MENU_KEYS: &[KeyBinding] = &[
    (&["↑", "↓"], "Select"),
    (&["Enter"], "Load"),
    (&["Esc"], "Cancel"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Status {
    Info(String),
    Error(String),
}

#[derive(Debug)]
struct LoadMenu {
    entries: Vec<SaveEntry>,
    selected: usize,
}

/// Interactive play: one game, the save and load keys, and the load menu.
pub struct PlayScreen {
    model: GameModel,
    save_name: String,
    paused: bool,
    load_menu: Option<LoadMenu>,
    status: Option<Status>,
    is_exiting: bool,
}

impl PlayScreen {
    pub fn new(model: GameModel, save_name: String) -> Self {
        Self {
            model,
            save_name,
            paused: false,
            load_menu: None,
            status: None,
            is_exiting: false,
        }
    }

    /// Whether the game should advance on timer ticks.
    pub fn is_playing(&self) -> bool {
        !self.is_exiting && !self.paused && self.load_menu.is_none() && !self.model.game().is_lost()
    }

    pub fn is_exiting(&self) -> bool {
        self.is_exiting
    }

    pub fn update(&mut self) {
        if self.model.advance_tick().is_game_over() {
            self.status = Some(Status::Error("Game over".to_owned()));
        }
    }

    /// Handles a key press. Returns `true` when a different game was started
    /// or loaded.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        let Some(key) = event.as_key_event() else {
            return false;
        };
        if key.kind != KeyEventKind::Press {
            return false;
        }
        if self.load_menu.is_some() {
            return self.handle_load_menu_key(key.code);
        }

        let is_playing = self.is_playing();
        let is_lost = self.model.game().is_lost();
        match key.code {
            KeyCode::Left if is_playing => _ = self.model.move_left(),
            KeyCode::Right if is_playing => _ = self.model.move_right(),
            KeyCode::Up if is_playing => _ = self.model.rotate(),
            KeyCode::Down if is_playing => {
                if self.model.soft_drop().is_game_over() {
                    self.status = Some(Status::Error("Game over".to_owned()));
                }
            }
            KeyCode::Char('p') if !is_lost => self.paused = !self.paused,
            KeyCode::Char('s') if !is_lost => self.save(),
            KeyCode::Char('l') => self.open_load_menu(),
            KeyCode::Char('n') => {
                self.model.new_game();
                self.paused = false;
                self.status = Some(Status::Info(format!(
                    "New {} game",
                    size_name(self.model.board_size())
                )));
                return true;
            }
            KeyCode::Char(c @ '1'..='3') => {
                let size = match c {
                    '1' => BoardSize::Small,
                    '2' => BoardSize::Medium,
                    _ => BoardSize::Large,
                };
                self.model.set_board_size(size);
                self.status = Some(Status::Info(format!(
                    "Next game will be {}",
                    size_name(size)
                )));
            }
            KeyCode::Char('q') => self.is_exiting = true,
            _ => {}
        }
        false
    }

    fn handle_load_menu_key(&mut self, code: KeyCode) -> bool {
        let Some(menu) = &mut self.load_menu else {
            return false;
        };
        match code {
            KeyCode::Up => menu.selected = menu.selected.saturating_sub(1),
            KeyCode::Down => menu.selected = (menu.selected + 1).min(menu.entries.len() - 1),
            KeyCode::Esc | KeyCode::Char('q') => self.load_menu = None,
            KeyCode::Enter => {
                let name = menu.entries[menu.selected].name.clone();
                self.load_menu = None;
                return self.load(&name);
            }
            _ => {}
        }
        false
    }

    fn save(&mut self) {
        self.status = Some(match self.model.save_game(&self.save_name) {
            Ok(()) => Status::Info(format!("Saved as {:?}", self.save_name)),
            Err(err) => {
                log::warn!("save failed: {err}");
                Status::Error(format!("Save failed: {err}"))
            }
        });
    }

    fn open_load_menu(&mut self) {
        match self.model.list_games() {
            Ok(entries) if entries.is_empty() => {
                self.status = Some(Status::Info("No saved games".to_owned()));
            }
            Ok(entries) => {
                self.load_menu = Some(LoadMenu {
                    entries,
                    selected: 0,
                });
            }
            Err(err) => {
                log::warn!("listing saved games failed: {err}");
                self.status = Some(Status::Error(format!("Cannot list saved games: {err}")));
            }
        }
    }

    fn load(&mut self, name: &str) -> bool {
        match self.model.load_game(name) {
            Ok(()) => {
                self.paused = false;
                self.status = Some(Status::Info(format!("Loaded {name:?}")));
                true
            }
            Err(err) => {
                log::warn!("load failed: {err}");
                self.status = Some(Status::Error(format!("Load failed: {err}")));
                false
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame<'_>) {
        let game_display = GameDisplay::new(&self.model, self.paused);
        let bindings = if self.load_menu.is_some() {
            LOAD_MENU_KEYS
        } else if self.model.game().is_lost() {
            GAME_OVER_KEYS
        } else if self.paused {
            PAUSED_KEYS
        } else {
            PLAYING_KEYS
        };
        let status = match &self.status {
            Some(Status::Info(text)) => Text::styled(text.as_str(), style::INFO),
            Some(Status::Error(text)) => Text::styled(text.as_str(), style::ERROR),
            None => Text::default(),
        }
        .centered();

        let [main_area, status_area, help_area] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas::<3>(frame.area());
        frame.render_widget(game_display, main_area);
        frame.render_widget(status, status_area);
        frame.render_widget(KeyBindingDisplay::new(bindings), help_area);

        if let Some(menu) = &self.load_menu {
            frame.render_widget(SaveListDisplay::new(&menu.entries, menu.selected), main_area);
        }
    }
}

fn size_name(size: BoardSize) -> &'static str {
    match size {
        BoardSize::Small => "small",
        BoardSize::Medium => "medium",
        BoardSize::Large => "large",
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEvent, KeyModifiers};
    use stackfall_engine::ShapeSeed;
    use stackfall_store::RecordStore;

    use super::*;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn screen() -> PlayScreen {
        let model = GameModel::new(BoardSize::Medium, Some(ShapeSeed::from_bytes([9; 16])))
            .with_store(Box::new(RecordStore::in_memory()));
        PlayScreen::new(model, "quicksave".to_owned())
    }

    fn active_cols(screen: &PlayScreen) -> Vec<i32> {
        let shape = screen.model.game().active_shape().unwrap();
        let mut cols: Vec<_> = shape.cells().iter().map(|pos| pos.col).collect();
        cols.sort_unstable();
        cols
    }

    #[test]
    fn test_arrow_keys_move_shape() {
        let mut screen = screen();
        let before = active_cols(&screen);
        screen.handle_event(&key(KeyCode::Left));
        let after: Vec<_> = active_cols(&screen).iter().map(|y| y + 1).collect();
        assert_eq!(after, before);
    }

    #[test]
    fn test_paused_game_ignores_moves() {
        let mut screen = screen();
        screen.handle_event(&key(KeyCode::Char('p')));
        assert!(!screen.is_playing());
        let before = screen.model.game().snapshot();
        screen.handle_event(&key(KeyCode::Left));
        screen.handle_event(&key(KeyCode::Down));
        assert_eq!(screen.model.game().snapshot(), before);
    }

    #[test]
    fn test_save_and_load_through_menu() {
        let mut screen = screen();
        screen.handle_event(&key(KeyCode::Right));
        screen.update();
        let saved = screen.model.game().snapshot();
        screen.handle_event(&key(KeyCode::Char('s')));
        assert_eq!(
            screen.status,
            Some(Status::Info("Saved as \"quicksave\"".to_owned()))
        );

        assert!(screen.handle_event(&key(KeyCode::Char('n'))));
        assert_ne!(screen.model.game().snapshot(), saved);

        screen.handle_event(&key(KeyCode::Char('l')));
        assert!(screen.load_menu.is_some());
        assert!(!screen.is_playing());
        screen.handle_event(&key(KeyCode::Down));
        assert!(screen.handle_event(&key(KeyCode::Enter)));
        assert!(screen.load_menu.is_none());
        assert_eq!(screen.model.game().snapshot(), saved);
    }

    #[test]
    fn test_load_menu_without_saves() {
        let mut screen = screen();
        screen.handle_event(&key(KeyCode::Char('l')));
        assert!(screen.load_menu.is_none());
        assert_eq!(screen.status, Some(Status::Info("No saved games".to_owned())));
    }

    #[test]
    fn test_escape_closes_load_menu() {
        let mut screen = screen();
        screen.handle_event(&key(KeyCode::Char('s')));
        screen.handle_event(&key(KeyCode::Char('l')));
        screen.handle_event(&key(KeyCode::Char('q')));
        assert!(screen.load_menu.is_none());
        assert!(!screen.is_exiting());
    }

    #[test]
    fn test_size_keys_apply_to_next_game() {
        let mut screen = screen();
        screen.handle_event(&key(KeyCode::Char('3')));
        assert_eq!(screen.model.game().board().size(), 8);
        screen.handle_event(&key(KeyCode::Char('n')));
        assert_eq!(screen.model.game().board().size(), 12);
    }

    #[test]
    fn test_save_without_store_reports_error() {
        let model = GameModel::new(BoardSize::Medium, Some(ShapeSeed::from_bytes([9; 16])));
        let mut screen = PlayScreen::new(model, "quicksave".to_owned());
        screen.handle_event(&key(KeyCode::Char('s')));
        assert!(matches!(screen.status, Some(Status::Error(_))));
    }
}
