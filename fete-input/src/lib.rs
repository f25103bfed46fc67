//! Input handling for FETE
//!
//! Modal keyboard handling: keys become [`Command`] values, the app
//! decides what they mean. The welcome screen accepts only the start
//! keys; everything else opens up once the show is on.

mod commands;
mod modal;

pub use commands::{Command, Mode, Screen};
pub use modal::InputHandler;
