pub mod attachments;
pub mod selection;

use attachments::select_attachments;
pub use selection::{SelectionResult, select_tracks};

use std::fmt;

/// Track category as reported by mkvmerge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Video,
    Audio,
    Subtitle,
}

impl TrackKind {
    /// Parse the `type` field of an identify report
    pub fn from_identify(value: &str) -> Option<Self> {
        match value {
            "video" => Some(TrackKind::Video),
            "audio" => Some(TrackKind::Audio),
            "subtitles" => Some(TrackKind::Subtitle),
            _ => None,
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrackKind::Video => "video",
            TrackKind::Audio => "audio",
            TrackKind::Subtitle => "subtitles",
        };
        f.write_str(name)
    }
}

/// A single stream inside a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackDescriptor {
    /// Opaque id, used verbatim in every command that references the track
    pub id: String,
    pub kind: TrackKind,
    /// Matroska codec id, e.g. `S_TEXT/UTF8`
    pub codec: String,
    pub is_default: bool,
    /// ISO 639-2 code or `und`
    pub language: String,
    /// Track name, empty when the container has none
    pub name: String,
}

impl TrackDescriptor {
    pub fn display_name(&self) -> String {
        format!(
            "{} - {}: {} [{}]",
            self.id, self.kind, self.codec, self.language
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentDescriptor {
    pub id: String,
    /// MIME-like content type, e.g. `application/x-truetype-font`
    pub content_type: String,
    pub file_name: String,
}

impl AttachmentDescriptor {
    pub fn display_name(&self) -> String {
        format!("{} - {}: {}", self.id, self.content_type, self.file_name)
    }
}

/// Everything the selection engine needs to know about one input file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerDescription {
    /// Tracks in the container's native order
    pub tracks: Vec<TrackDescriptor>,
    pub attachments: Vec<AttachmentDescriptor>,
    pub has_chapters: bool,
    /// Segment title, empty when unset
    pub title: String,
}

impl ContainerDescription {
    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }
}

#[cfg(test)]
impl ContainerDescription {
    pub fn track(&self, id: &str) -> Option<&TrackDescriptor> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn tracks_of(&self, kind: TrackKind) -> impl Iterator<Item = &TrackDescriptor> {
        self.tracks.iter().filter(move |t| t.kind == kind)
    }
}
