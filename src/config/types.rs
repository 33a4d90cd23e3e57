use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Language and attachment filters plus keep flags, fixed for the whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionOptions {
    /// Audio languages to keep
    pub audio_languages: Option<BTreeSet<String>>,
    /// Subtitle languages to keep inside the container
    pub subtitle_languages: Option<BTreeSet<String>>,
    /// Subtitle languages to extract to standalone files
    pub extract_languages: Option<BTreeSet<String>>,
    pub extract_all: bool,
    pub keep_all_subtitles: bool,
    /// Keep only the first matching track per category
    pub no_dupe: bool,
    /// Content-type tokens of attachments to keep
    pub keep_attachment_types: Option<BTreeSet<String>>,
    pub keep_all_attachments: bool,
    pub keep_chapters: bool,
    pub keep_title: bool,
    pub keep_track_titles: bool,
}

impl SelectionOptions {
    /// Whether any subtitle extraction was asked for
    pub fn wants_extraction(&self) -> bool {
        self.extract_all || self.extract_languages.is_some()
    }
}

/// Build a language/type set from a comma-separated CLI list
pub fn to_set(values: &[String]) -> Option<BTreeSet<String>> {
    let set: BTreeSet<String> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    if set.is_empty() { None } else { Some(set) }
}

/// Where remuxed files and extracted subtitles are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub directory: PathBuf,
    /// Nest each file's outputs in a folder named after the input stem
    pub folder_per_file: bool,
}

impl OutputLayout {
    /// Directory receiving every output of `input`
    pub fn directory_for(&self, input: &Path) -> PathBuf {
        if self.folder_per_file {
            self.directory.join(file_stem(input))
        } else {
            self.directory.clone()
        }
    }
}

pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// External MKVToolNix binaries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolsConfig {
    pub mkvmerge: String,
    pub mkvextract: String,
    /// Upper bound for a single identify call
    pub identify_timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            mkvmerge: "mkvmerge".to_string(),
            mkvextract: "mkvextract".to_string(),
            identify_timeout_secs: 30,
        }
    }
}

impl ToolsConfig {
    pub fn identify_timeout(&self) -> Duration {
        Duration::from_secs(self.identify_timeout_secs)
    }
}

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileConfig {
    pub tools: ToolsConfig,
}
