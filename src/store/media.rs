// Reference media for a project - a YouTube video or a local audio file
// Only the descriptor lives here; nothing is downloaded or played

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const YOUTUBE_ID_LEN: usize = 11;

fn youtube_link_regex() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^.*(youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*").ok())
        .as_ref()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaError {
    #[error("not a valid YouTube link: {0}")]
    InvalidYoutubeLink(String),
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("unsupported audio format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaState {
    #[default]
    None,
    #[serde(rename = "youtube")]
    YouTube { video_id: String },
    Local { path: PathBuf, file_name: String },
}

impl MediaState {
    /// Accepts the usual link shapes (watch?v=, youtu.be/, embed/, ...) and
    /// keeps just the 11 character video id.
    pub fn from_youtube_link(link: &str) -> Result<Self, MediaError> {
        let invalid = || MediaError::InvalidYoutubeLink(link.to_string());

        let captures = youtube_link_regex()
            .and_then(|re| re.captures(link.trim()))
            .ok_or_else(invalid)?;
        let video_id = captures.get(2).map(|m| m.as_str()).unwrap_or_default();

        if video_id.chars().count() != YOUTUBE_ID_LEN {
            return Err(invalid());
        }

        Ok(MediaState::YouTube {
            video_id: video_id.to_string(),
        })
    }

    pub fn from_local_file(path: impl AsRef<Path>) -> Result<Self, MediaError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }

        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(AudioFormat::from_extension)
            .unwrap_or(AudioFormat::Unknown);
        if !format.is_supported() {
            return Err(MediaError::UnsupportedFormat(path.to_path_buf()));
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(MediaState::Local {
            path: path.to_path_buf(),
            file_name,
        })
    }

    pub fn is_none(&self) -> bool {
        matches!(self, MediaState::None)
    }

    pub fn watch_url(&self) -> Option<String> {
        match self {
            MediaState::YouTube { video_id } => Some(format!("https://www.youtube.com/watch?v={}", video_id)),
            _ => None,
        }
    }

    /// One-line description for the media bar.
    pub fn label(&self) -> String {
        match self {
            MediaState::None => "No reference track".to_string(),
            MediaState::YouTube { video_id } => format!("YouTube {}", video_id),
            MediaState::Local { file_name, .. } => format!("Local audio: {}", file_name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioFormat {
    Mp3,
    Flac,
    Ogg,
    Mp4,
    Wav,
    Unknown,
}

impl AudioFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "mp3" => AudioFormat::Mp3,
            "flac" => AudioFormat::Flac,
            "ogg" | "oga" => AudioFormat::Ogg,
            "mp4" | "m4a" | "aac" => AudioFormat::Mp4,
            "wav" => AudioFormat::Wav,
            _ => AudioFormat::Unknown,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, AudioFormat::Unknown)
    }
}
