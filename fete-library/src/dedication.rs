//! Dedication records and derived display data

use serde::Deserialize;

/// A song attached to a dedication. May point at a streaming page, a
/// local audio file, or both; playable only when a local file is set.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Song {
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub spotify_url: Option<String>,
    #[serde(default)]
    pub local_file: Option<String>,
}

/// One dedication entry: a name, optional portrait, optional recorded
/// greeting (voice or video) and optional song.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Dedication {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub voice_message: Option<String>,
    #[serde(default)]
    pub video_message: Option<String>,
    #[serde(default)]
    pub song: Option<Song>,
}

impl Dedication {
    /// Path of the greeting clip to play, if any. A video greeting takes
    /// priority over a voice one when both are present.
    pub fn greeting_path(&self) -> Option<&str> {
        self.video_message
            .as_deref()
            .or(self.voice_message.as_deref())
    }

    pub fn has_greeting(&self) -> bool {
        self.greeting_path().is_some()
    }

    /// Path of the locally playable song file, if any. A song with only a
    /// streaming link is displayed but never played.
    pub fn local_song_path(&self) -> Option<&str> {
        self.song.as_ref().and_then(|s| s.local_file.as_deref())
    }

    pub fn has_local_song(&self) -> bool {
        self.local_song_path().is_some()
    }
}

/// Derive an initials badge from a display name: first letter of each
/// whitespace-separated word, uppercased, capped at two. Words opening
/// with a symbol ("&", "-") contribute nothing.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .filter(|c| c.is_alphanumeric())
        .take(2)
        .flat_map(|c| c.to_uppercase())
        .collect()
}

/// Built-in dedications shown when no data file is available.
pub fn sample_dedications() -> Vec<Dedication> {
    vec![
        Dedication {
            id: 1,
            name: "Mom & Dad".to_string(),
            photo: None,
            voice_message: None,
            video_message: None,
            song: Some(Song {
                title: "You Are the Sunshine of My Life".to_string(),
                artist: "Stevie Wonder".to_string(),
                spotify_url: Some(
                    "https://open.spotify.com/track/2jXETnkWV6aX1Qp2V4gTfg".to_string(),
                ),
                local_file: None,
            }),
        },
        Dedication {
            id: 2,
            name: "Sarah".to_string(),
            photo: None,
            voice_message: None,
            video_message: None,
            song: Some(Song {
                title: "Dancing Queen".to_string(),
                artist: "ABBA".to_string(),
                spotify_url: Some(
                    "https://open.spotify.com/track/0GjEhVFGZW8afUYGChu3Rr".to_string(),
                ),
                local_file: None,
            }),
        },
        Dedication {
            id: 3,
            name: "David".to_string(),
            photo: None,
            voice_message: None,
            video_message: None,
            song: Some(Song {
                title: "Happy Birthday".to_string(),
                artist: "Stevie Wonder".to_string(),
                spotify_url: Some(
                    "https://open.spotify.com/track/4xrIdPlDtvlJCR21p77Qj9".to_string(),
                ),
                local_file: None,
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initials_two_words() {
        assert_eq!(initials("Mom & Dad"), "MD");
        assert_eq!(initials("John Smith"), "JS");
    }

    #[test]
    fn test_initials_single_word() {
        assert_eq!(initials("Sarah"), "S");
    }

    #[test]
    fn test_initials_lowercase_input() {
        assert_eq!(initials("aunt carol"), "AC");
    }

    #[test]
    fn test_initials_caps_at_two() {
        assert_eq!(initials("Anna Maria Luisa"), "AM");
    }

    #[test]
    fn test_initials_empty() {
        assert_eq!(initials(""), "");
        assert_eq!(initials("   "), "");
    }

    #[test]
    fn test_video_priority_over_voice() {
        let d = Dedication {
            id: 1,
            name: "Test".to_string(),
            photo: None,
            voice_message: Some("voice.mp3".to_string()),
            video_message: Some("video.mp4".to_string()),
            song: None,
        };
        assert_eq!(d.greeting_path(), Some("video.mp4"));
    }

    #[test]
    fn test_voice_when_no_video() {
        let d = Dedication {
            id: 1,
            name: "Test".to_string(),
            photo: None,
            voice_message: Some("voice.mp3".to_string()),
            video_message: None,
            song: None,
        };
        assert_eq!(d.greeting_path(), Some("voice.mp3"));
        assert!(d.has_greeting());
    }

    #[test]
    fn test_streaming_only_song_not_local() {
        let samples = sample_dedications();
        // Sample songs link to streaming pages only.
        for d in &samples {
            assert!(!d.has_local_song(), "{} has a local file", d.name);
        }
    }

    #[test]
    fn test_samples_each_have_song_and_link() {
        for d in sample_dedications() {
            let song = d.song.as_ref().unwrap_or_else(|| panic!("{} has no song", d.name));
            assert!(
                song.spotify_url.as_deref().is_some_and(|u| u.starts_with("https://")),
                "{} has no streaming link",
                d.name
            );
        }
    }

    #[test]
    fn test_samples_stable() {
        assert_eq!(sample_dedications(), sample_dedications());
        assert_eq!(sample_dedications().len(), 3);
    }
}
