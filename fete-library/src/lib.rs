//! Dedication data for FETE - records, loading, and clip decoding

mod clip;
mod config;
mod dedication;
mod loader;

pub use clip::{ClipError, ClipLoader, LoadedClip};
pub use config::Config;
pub use dedication::{initials, sample_dedications, Dedication, Song};
pub use loader::{load_dedications, load_or_fallback, DataError};
