use super::{ContainerDescription, TrackDescriptor, TrackKind, select_attachments};
use crate::config::SelectionOptions;
use std::collections::BTreeSet;

/// Outcome of running the decision tables over one container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionResult {
    /// Zero or one track
    pub kept_video: Vec<TrackDescriptor>,
    pub kept_audio: Vec<TrackDescriptor>,
    pub kept_subtitles: Vec<TrackDescriptor>,
    /// Subtitles written to standalone files instead of the container
    pub extract_subtitles: Vec<TrackDescriptor>,
    /// Attachment ids in container order
    pub kept_attachment_ids: Vec<String>,
}

impl SelectionResult {
    /// Every track kept in the remuxed file, video first
    pub fn kept_tracks(&self) -> impl Iterator<Item = &TrackDescriptor> {
        self.kept_video
            .iter()
            .chain(&self.kept_audio)
            .chain(&self.kept_subtitles)
    }

    pub fn kept(&self, kind: TrackKind) -> &[TrackDescriptor] {
        match kind {
            TrackKind::Video => &self.kept_video,
            TrackKind::Audio => &self.kept_audio,
            TrackKind::Subtitle => &self.kept_subtitles,
        }
    }
}

/// Which language list of the options an action reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LanguageList {
    Audio,
    Subtitle,
    Extract,
}

impl LanguageList {
    fn get(self, options: &SelectionOptions) -> Option<&BTreeSet<String>> {
        match self {
            LanguageList::Audio => options.audio_languages.as_ref(),
            LanguageList::Subtitle => options.subtitle_languages.as_ref(),
            LanguageList::Extract => options.extract_languages.as_ref(),
        }
    }

    fn contains(self, options: &SelectionOptions, language: &str) -> bool {
        self.get(options).is_some_and(|set| set.contains(language))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    /// Keep the track if nothing of its category was kept yet
    KeepFirst,
    /// Keep the first track whose language is listed
    KeepFirstMatching(LanguageList),
    KeepMatching(LanguageList),
    KeepAll,
    ExtractAll,
    ExtractMatching(LanguageList),
    Drop,
}

/// One row of a decision table: when `applies` holds for the options, `action` decides
struct Rule {
    applies: fn(&SelectionOptions) -> bool,
    action: Action,
}

const VIDEO_RULES: &[Rule] = &[Rule {
    applies: |_| true,
    action: Action::KeepFirst,
}];

const AUDIO_RULES: &[Rule] = &[
    Rule {
        applies: |o| !o.no_dupe && o.audio_languages.is_none(),
        action: Action::KeepFirst,
    },
    Rule {
        applies: |o| o.no_dupe && o.audio_languages.is_some(),
        action: Action::KeepFirstMatching(LanguageList::Audio),
    },
    Rule {
        applies: |o| o.no_dupe && o.audio_languages.is_none(),
        action: Action::KeepFirst,
    },
    Rule {
        applies: |o| o.audio_languages.is_some(),
        action: Action::KeepMatching(LanguageList::Audio),
    },
];

const SUBTITLE_RULES: &[Rule] = &[
    Rule {
        applies: |o| o.extract_all,
        action: Action::ExtractAll,
    },
    Rule {
        applies: |o| o.extract_languages.is_some(),
        action: Action::ExtractMatching(LanguageList::Extract),
    },
    Rule {
        applies: |o| o.keep_all_subtitles,
        action: Action::KeepAll,
    },
    Rule {
        applies: |o| !o.no_dupe && o.subtitle_languages.is_none(),
        action: Action::Drop,
    },
    Rule {
        applies: |o| o.no_dupe && o.subtitle_languages.is_none(),
        action: Action::Drop,
    },
    Rule {
        applies: |o| o.no_dupe && o.subtitle_languages.is_some(),
        action: Action::KeepFirstMatching(LanguageList::Subtitle),
    },
    Rule {
        applies: |o| o.subtitle_languages.is_some(),
        action: Action::KeepMatching(LanguageList::Subtitle),
    },
];

fn rules_for(kind: TrackKind) -> &'static [Rule] {
    match kind {
        TrackKind::Video => VIDEO_RULES,
        TrackKind::Audio => AUDIO_RULES,
        TrackKind::Subtitle => SUBTITLE_RULES,
    }
}

/// First rule whose condition holds; no match drops the track
fn decide(kind: TrackKind, options: &SelectionOptions) -> Action {
    rules_for(kind)
        .iter()
        .find(|rule| (rule.applies)(options))
        .map(|rule| rule.action)
        .unwrap_or(Action::Drop)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Keep,
    Extract,
    Drop,
}

fn judge(
    action: Action,
    track: &TrackDescriptor,
    kept_so_far: usize,
    options: &SelectionOptions,
) -> Verdict {
    let keep_if = |cond: bool| if cond { Verdict::Keep } else { Verdict::Drop };
    match action {
        Action::KeepFirst => keep_if(kept_so_far == 0),
        Action::KeepFirstMatching(list) => {
            keep_if(kept_so_far == 0 && list.contains(options, &track.language))
        }
        Action::KeepMatching(list) => keep_if(list.contains(options, &track.language)),
        Action::KeepAll => Verdict::Keep,
        Action::ExtractAll => Verdict::Extract,
        Action::ExtractMatching(list) => {
            if list.contains(options, &track.language) {
                Verdict::Extract
            } else {
                Verdict::Drop
            }
        }
        Action::Drop => Verdict::Drop,
    }
}

/// Decide which tracks survive the remux, which get extracted and which attachments stay
pub fn select_tracks(
    description: &ContainerDescription,
    options: &SelectionOptions,
) -> SelectionResult {
    let mut result = SelectionResult::default();

    for track in &description.tracks {
        let action = decide(track.kind, options);
        let kept = match track.kind {
            TrackKind::Video => &mut result.kept_video,
            TrackKind::Audio => &mut result.kept_audio,
            TrackKind::Subtitle => &mut result.kept_subtitles,
        };

        match judge(action, track, kept.len(), options) {
            Verdict::Keep => kept.push(track.clone()),
            Verdict::Extract => result.extract_subtitles.push(track.clone()),
            Verdict::Drop => {}
        }
    }

    result.kept_attachment_ids = select_attachments(&description.attachments, options)
        .into_iter()
        .map(|a| a.id.clone())
        .collect();

    result
}
