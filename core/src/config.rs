use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Color used for matched words in search output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HighlightStyle {
    Cyan,
    Blue,
    Green,
    #[default]
    Default,
}

impl HighlightStyle {
    /// ANSI SGR foreground code.
    pub fn sgr(self) -> u8 {
        match self {
            HighlightStyle::Cyan => 36,
            HighlightStyle::Blue => 34,
            HighlightStyle::Green => 92,
            HighlightStyle::Default => 91,
        }
    }
}

impl From<String> for HighlightStyle {
    fn from(s: String) -> Self { HighlightStyle::from(s.as_str()) }
}

impl From<&str> for HighlightStyle {
    fn from(s: &str) -> Self {
        match s {
            "Cyan" => HighlightStyle::Cyan,
            "Blue" => HighlightStyle::Blue,
            "Green" => HighlightStyle::Green,
            _ => HighlightStyle::Default,
        }
    }
}

impl From<HighlightStyle> for String {
    fn from(s: HighlightStyle) -> Self {
        match s {
            HighlightStyle::Cyan => "Cyan",
            HighlightStyle::Blue => "Blue",
            HighlightStyle::Green => "Green",
            HighlightStyle::Default => "Default",
        }
        .to_string()
    }
}

/// Output tuning for search rendering, e.g. `{"OutputColor": "Cyan"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(rename = "OutputColor", default)]
    pub output_color: HighlightStyle,
    /// Emit ANSI escapes around matches. Not read from the file.
    #[serde(skip, default = "default_color")]
    pub color: bool,
}
fn default_color() -> bool { true }

impl Default for SearchConfig {
    fn default() -> Self {
        Self { output_color: HighlightStyle::Default, color: true }
    }
}

impl SearchConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_json(path.as_ref())
    }

    /// Plain output with no escape codes.
    pub fn plain() -> Self {
        Self { color: false, ..Self::default() }
    }
}

/// A list of documents to index in one batch: `{"Index_Files": ["a.txt", ...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchFile {
    #[serde(rename = "Index_Files")]
    pub index_files: Vec<String>,
}

impl BatchFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_json(path.as_ref())
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).map_err(|e| Error::Config { path: path.to_path_buf(), reason: e.to_string() })?;
    serde_json::from_str(&raw).map_err(|e| Error::Config { path: path.to_path_buf(), reason: e.to_string() })
}
