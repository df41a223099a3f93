use crossterm::event::Event as CrosstermEvent;

/// Events processed by terminal applications.
#[derive(Debug, Clone, derive_more::IsVariant, derive_more::From)]
pub(super) enum TuiEvent {
    /// The tick timer fired.
    Tick,
    /// Something changed since the last frame.
    Render,
    /// Key input, resize and other terminal events.
    Crossterm(CrosstermEvent),
}
