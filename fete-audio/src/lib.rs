//! Playback engine for FETE
//!
//! One clip plays at a time. The engine owns a single slot; playing a new
//! clip replaces whatever occupied it. Commands and events flow over
//! bounded channels between the UI thread and the audio thread.

mod engine;

pub use engine::{AudioCommand, AudioEngine, AudioEvent, ClipKind, EngineState};
