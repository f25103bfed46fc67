//! UI widgets for FETE

mod cards;
mod fx;
mod status_bar;
mod welcome;

pub use cards::{CardListState, CardsWidget};
pub use fx::{apply_fade, render_confetti, PX_PER_COL, PX_PER_ROW};
pub use status_bar::{HelpWidget, StatusBarWidget};
pub use welcome::WelcomeWidget;
