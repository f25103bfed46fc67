//! Simple configuration persistence for FETE
//!
//! Stores user preferences like the dedication data file and theme.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug)]
pub struct Config {
    /// Dedication data file to load on startup
    pub data_file: Option<PathBuf>,
    /// Color theme name
    pub theme: String,
    /// Whether the show advances through cards on its own
    pub autoplay: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: None,
            theme: "fiesta".to_string(),
            autoplay: true,
        }
    }
}

impl Config {
    /// Load config from the default location
    ///
    /// Returns default config if file doesn't exist or can't be parsed.
    pub fn load() -> Self {
        let path = Self::config_path();
        Self::load_from(&path).unwrap_or_default()
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Save config to the default location
    pub fn save(&self) -> io::Result<()> {
        let path = Self::config_path();
        self.save_to(&path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = self.serialize();
        fs::write(path, content)
    }

    /// Get the default config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fete")
            .join("config.txt")
    }

    /// Parse config from simple key=value format
    fn parse(content: &str) -> Self {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim();

                match key {
                    "data_file" => {
                        if !value.is_empty() {
                            config.data_file = Some(PathBuf::from(value));
                        }
                    }
                    "theme" => {
                        if !value.is_empty() {
                            config.theme = value.to_string();
                        }
                    }
                    "autoplay" => {
                        config.autoplay = value != "false" && value != "0";
                    }
                    _ => {} // Ignore unknown keys
                }
            }
        }

        config
    }

    /// Serialize config to simple key=value format
    fn serialize(&self) -> String {
        let mut lines = Vec::new();
        lines.push("# FETE Configuration".to_string());

        if let Some(ref file) = self.data_file {
            lines.push(format!("data_file={}", file.display()));
        }
        lines.push(format!("theme={}", self.theme));
        lines.push(format!("autoplay={}", self.autoplay));

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        let config = Config::parse("");
        assert!(config.data_file.is_none());
        assert_eq!(config.theme, "fiesta");
        assert!(config.autoplay);
    }

    #[test]
    fn test_parse_full() {
        let content = "data_file=/home/user/dedications.json\ntheme=midnight\nautoplay=false";
        let config = Config::parse(content);
        assert_eq!(
            config.data_file,
            Some(PathBuf::from("/home/user/dedications.json"))
        );
        assert_eq!(config.theme, "midnight");
        assert!(!config.autoplay);
    }

    #[test]
    fn test_parse_with_comments() {
        let content = "# Comment\ntheme=candlelight\n# Another comment";
        let config = Config::parse(content);
        assert_eq!(config.theme, "candlelight");
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = Config {
            data_file: Some(PathBuf::from("/test/data.json")),
            theme: "midnight".to_string(),
            autoplay: false,
        };

        let serialized = config.serialize();
        let parsed = Config::parse(&serialized);

        assert_eq!(parsed.data_file, config.data_file);
        assert_eq!(parsed.theme, config.theme);
        assert_eq!(parsed.autoplay, config.autoplay);
    }
}
