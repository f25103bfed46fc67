//! Dedication file loading

use crate::dedication::{sample_dedications, Dedication};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur while loading a dedication file
#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Top-level shape of the JSON data file
#[derive(Debug, Deserialize)]
struct DedicationFile {
    dedications: Vec<Dedication>,
}

/// Load dedications from a JSON file.
pub fn load_dedications(path: &Path) -> Result<Vec<Dedication>, DataError> {
    let content = std::fs::read_to_string(path)?;
    let file: DedicationFile = serde_json::from_str(&content)?;
    Ok(file.dedications)
}

/// Load dedications, falling back to the built-in samples if the file is
/// missing or malformed. Never fails; a bad file on every launch yields
/// the same samples on every launch.
pub fn load_or_fallback(path: &Path) -> Vec<Dedication> {
    match load_dedications(path) {
        Ok(dedications) => {
            info!(
                "loaded {} dedications from {}",
                dedications.len(),
                path.display()
            );
            dedications
        }
        Err(e) => {
            warn!("could not load {}: {e}, using samples", path.display());
            sample_dedications()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_valid_file() {
        let path = write_temp(
            "fete_valid.json",
            r#"{"dedications": [
                {"id": 1, "name": "Grandma", "voice_message": "gran.mp3",
                 "song": {"title": "What a Wonderful World", "artist": "Louis Armstrong",
                          "local_file": "wonderful.mp3"}},
                {"id": 2, "name": "Uncle Bob"}
            ]}"#,
        );
        let dedications = load_dedications(&path).unwrap();
        assert_eq!(dedications.len(), 2);
        assert_eq!(dedications[0].name, "Grandma");
        assert!(dedications[0].has_greeting());
        assert!(dedications[0].has_local_song());
        assert!(dedications[1].song.is_none());
        assert!(!dedications[1].has_greeting());
    }

    #[test]
    fn test_load_missing_file_errors() {
        let path = std::path::Path::new("/nonexistent/fete_data.json");
        assert!(matches!(load_dedications(path), Err(DataError::Io(_))));
    }

    #[test]
    fn test_load_malformed_file_errors() {
        let path = write_temp("fete_malformed.json", "{ not json");
        assert!(matches!(load_dedications(&path), Err(DataError::Parse(_))));
    }

    #[test]
    fn test_fallback_is_idempotent() {
        let path = std::path::Path::new("/nonexistent/fete_data.json");
        let first = load_or_fallback(path);
        let second = load_or_fallback(path);
        assert_eq!(first, second);
        assert_eq!(first, sample_dedications());
    }

    #[test]
    fn test_fallback_on_malformed() {
        let path = write_temp("fete_bad.json", "[1, 2, 3]");
        assert_eq!(load_or_fallback(&path), sample_dedications());
    }
}
