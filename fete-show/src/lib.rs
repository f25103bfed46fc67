//! Show sequencing for FETE
//!
//! Drives the autoplay run: card by card, greeting before song, with
//! short breaths between steps. The sequencer is pure state; it consumes
//! clock instants and clip lifecycle reports and emits effects for the
//! caller to act on. It never touches audio or the terminal itself.

mod sequencer;

pub use sequencer::{CardMedia, Effect, Phase, Sequencer, SequencerConfig};
