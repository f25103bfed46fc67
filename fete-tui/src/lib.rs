//! Terminal UI for FETE
//!
//! Widgets, themes, and application state for the celebration screen.

pub mod app;
pub mod theme;
pub mod widgets;

pub use app::{App, AppState, CardVisual, MessageType, PlaybackInfo, ScreenFade};
pub use theme::{Theme, CANDLELIGHT, FIESTA, MIDNIGHT};
pub use widgets::{
    apply_fade, render_confetti, CardListState, CardsWidget, HelpWidget, StatusBarWidget,
    WelcomeWidget, PX_PER_COL, PX_PER_ROW,
};
