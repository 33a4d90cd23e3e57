use crate::config::{
    OutputLayout, RunConfig, SelectionOptions, ToolsConfig, file_stem, passes_title,
};
use crate::tracks::{ContainerDescription, SelectionResult, TrackDescriptor, TrackKind};
use std::fmt;
use std::path::{Path, PathBuf};

/// A flag with an optional value; bare arguments carry no value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandArg {
    pub flag: String,
    pub value: Option<String>,
}

impl CommandArg {
    pub fn bare(flag: impl Into<String>) -> Self {
        Self {
            flag: flag.into(),
            value: None,
        }
    }

    pub fn with_value(flag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            flag: flag.into(),
            value: Some(value.into()),
        }
    }
}

/// Program plus ordered arguments, turned into an argv only when executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<CommandArg>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    fn bare(&mut self, flag: impl Into<String>) -> &mut Self {
        self.args.push(CommandArg::bare(flag));
        self
    }

    fn option(&mut self, flag: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.args.push(CommandArg::with_value(flag, value));
        self
    }

    /// Arguments as passed to the process, without the program
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() * 2);
        for arg in &self.args {
            argv.push(arg.flag.clone());
            if let Some(value) = &arg.value {
                argv.push(value.clone());
            }
        }
        argv
    }
}

#[cfg(test)]
impl CommandSpec {
    pub fn has_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a.flag == flag)
    }

    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|a| a.flag == flag)
            .and_then(|a| a.value.as_deref())
    }
}

impl fmt::Display for CommandSpec {
    /// Shell-quoted rendering, for display only
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quote = |s: &str| {
            shlex::try_quote(s)
                .map(|q| q.into_owned())
                .unwrap_or_else(|_| s.to_string())
        };
        write!(f, "{}", quote(&self.program))?;
        for arg in self.argv() {
            write!(f, " {}", quote(&arg))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemuxCommand {
    pub output: PathBuf,
    pub spec: CommandSpec,
}

impl RemuxCommand {
    /// Folder the remuxed file and any extracted subtitles are written to
    pub fn directory(&self) -> &Path {
        self.output.parent().unwrap_or(Path::new("."))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractTarget {
    pub track_id: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractCommand {
    pub targets: Vec<ExtractTarget>,
    pub spec: CommandSpec,
}

/// A subtitle requested for extraction whose codec has no known file extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedCodec {
    pub track_id: String,
    pub codec: String,
}

impl fmt::Display for UnsupportedCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown subtitle codec ({}) on track {}, or it is not supported by mkvextract",
            self.codec, self.track_id
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltCommands {
    pub remux: RemuxCommand,
    pub extract: Option<ExtractCommand>,
    /// Extraction targets that were skipped
    pub unsupported: Vec<UnsupportedCodec>,
}

/// File extension for an extracted subtitle codec
pub fn subtitle_extension(codec: &str) -> Option<&'static str> {
    match codec {
        "S_TEXT/UTF8" => Some(".srt"),
        "S_TEXT/SSA" => Some(".ssa"),
        "S_TEXT/ASS" => Some(".ass"),
        "S_TEXT/USF" => Some(".usf"),
        "S_TEXT/WEBVTT" => Some(".vtt"),
        "S_VOBSUB" => Some(".idx"),
        "S_HDMV/PGS" => Some(".sup"),
        _ => None,
    }
}

/// Turns a selection into mkvmerge and mkvextract invocations
#[derive(Debug, Clone)]
pub struct CommandBuilder<'a> {
    tools: &'a ToolsConfig,
    layout: &'a OutputLayout,
    pass_along: &'a [String],
    /// `--title` already comes from the pass-along flags
    title_passed: bool,
}

impl<'a> CommandBuilder<'a> {
    pub fn new(tools: &'a ToolsConfig, layout: &'a OutputLayout, pass_along: &'a [String]) -> Self {
        Self {
            tools,
            layout,
            pass_along,
            title_passed: passes_title(pass_along),
        }
    }

    pub fn from_config(config: &'a RunConfig) -> Self {
        Self::new(&config.tools, &config.layout, &config.pass_along)
    }

    pub fn build(
        &self,
        file: &Path,
        selection: &SelectionResult,
        description: &ContainerDescription,
        options: &SelectionOptions,
    ) -> BuiltCommands {
        let remux = self.build_remux(file, selection, description, options);
        let (extract, unsupported) = self.build_extract(file, &selection.extract_subtitles);
        BuiltCommands {
            remux,
            extract,
            unsupported,
        }
    }

    fn build_remux(
        &self,
        file: &Path,
        selection: &SelectionResult,
        description: &ContainerDescription,
        options: &SelectionOptions,
    ) -> RemuxCommand {
        let mut spec = CommandSpec::new(&self.tools.mkvmerge);

        for arg in self.pass_along {
            spec.bare(arg);
        }

        let file_name = file.file_name().unwrap_or(file.as_os_str());
        let output = self.layout.directory_for(file).join(file_name);
        spec.option("-o", output.to_string_lossy());

        for kind in [TrackKind::Video, TrackKind::Audio, TrackKind::Subtitle] {
            add_category(&mut spec, kind, selection.kept(kind), options);
        }

        if !options.keep_chapters {
            spec.bare("--no-chapters");
        }

        // No flag at all means mkvmerge keeps every attachment
        if !options.keep_all_attachments {
            if selection.kept_attachment_ids.is_empty() {
                spec.bare("--no-attachments");
            } else {
                spec.option("--attachments", selection.kept_attachment_ids.join(","));
            }
        }

        if options.keep_title {
            spec.option("--title", description.title.as_str());
        } else if !self.title_passed {
            spec.option("--title", "");
        }

        spec.bare(file.to_string_lossy());

        RemuxCommand { output, spec }
    }

    fn build_extract(
        &self,
        file: &Path,
        tracks: &[TrackDescriptor],
    ) -> (Option<ExtractCommand>, Vec<UnsupportedCodec>) {
        let stem = file_stem(file);
        let directory = self.layout.directory_for(file);
        let mut targets = Vec::new();
        let mut unsupported = Vec::new();

        for track in tracks {
            match subtitle_extension(&track.codec) {
                Some(ext) => targets.push(ExtractTarget {
                    track_id: track.id.clone(),
                    path: directory.join(format!("{}.{}_{}{}", stem, track.id, track.language, ext)),
                }),
                None => unsupported.push(UnsupportedCodec {
                    track_id: track.id.clone(),
                    codec: track.codec.clone(),
                }),
            }
        }

        if targets.is_empty() {
            return (None, unsupported);
        }

        let mut spec = CommandSpec::new(&self.tools.mkvextract);
        spec.bare(file.to_string_lossy()).bare("tracks");
        for target in &targets {
            spec.bare(format!("{}:{}", target.track_id, target.path.to_string_lossy()));
        }

        (Some(ExtractCommand { targets, spec }), unsupported)
    }
}

/// Track list plus per-track overrides, or an explicit exclusion when empty
fn add_category(
    spec: &mut CommandSpec,
    kind: TrackKind,
    kept: &[TrackDescriptor],
    options: &SelectionOptions,
) {
    let (select_flag, exclude_flag) = match kind {
        TrackKind::Video => ("--video-tracks", "--no-video"),
        TrackKind::Audio => ("--audio-tracks", "--no-audio"),
        TrackKind::Subtitle => ("--subtitle-tracks", "--no-subtitles"),
    };

    if kept.is_empty() {
        spec.bare(exclude_flag);
        return;
    }

    let ids: Vec<&str> = kept.iter().map(|t| t.id.as_str()).collect();
    spec.option(select_flag, ids.join(","));

    for track in kept {
        let name = if options.keep_track_titles {
            track.name.as_str()
        } else {
            ""
        };
        let default = if track.is_default { "yes" } else { "no" };
        spec.option("--language", format!("{}:{}", track.id, track.language))
            .option("--track-name", format!("{}:{}", track.id, name))
            .option("--default-track", format!("{}:{}", track.id, default));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracks::fixtures::{anime_episode, attachment, track};
    use crate::tracks::select_tracks;
    use std::collections::BTreeSet;

    fn langs(values: &[&str]) -> Option<BTreeSet<String>> {
        Some(values.iter().map(|v| v.to_string()).collect())
    }

    fn layout(folder_per_file: bool) -> OutputLayout {
        OutputLayout {
            directory: PathBuf::from("/media/out"),
            folder_per_file,
        }
    }

    fn build_with(
        description: &ContainerDescription,
        options: &SelectionOptions,
        layout: &OutputLayout,
        pass_along: &[String],
    ) -> BuiltCommands {
        let tools = ToolsConfig::default();
        let selection = select_tracks(description, options);
        CommandBuilder::new(&tools, layout, pass_along).build(
            Path::new("/media/in/Show 01.mkv"),
            &selection,
            description,
            options,
        )
    }

    fn build(description: &ContainerDescription, options: &SelectionOptions) -> BuiltCommands {
        build_with(description, options, &layout(false), &[])
    }

    #[test]
    fn default_remux_command() {
        let built = build(&anime_episode(), &SelectionOptions::default());
        let argv = built.remux.spec.argv();

        assert_eq!(built.remux.spec.program, "mkvmerge");
        assert_eq!(
            argv,
            vec![
                "-o",
                "/media/out/Show 01.mkv",
                "--video-tracks",
                "0",
                "--language",
                "0:und",
                "--track-name",
                "0:",
                "--default-track",
                "0:no",
                "--audio-tracks",
                "1",
                "--language",
                "1:jpn",
                "--track-name",
                "1:",
                "--default-track",
                "1:yes",
                "--no-subtitles",
                "--no-chapters",
                "--no-attachments",
                "--title",
                "",
                "/media/in/Show 01.mkv",
            ]
        );
        assert!(built.extract.is_none());
    }

    #[test]
    fn empty_categories_are_excluded_explicitly() {
        let description = ContainerDescription {
            tracks: vec![track("0", TrackKind::Audio, "eng")],
            ..Default::default()
        };
        let built = build(&description, &SelectionOptions::default());
        let spec = &built.remux.spec;
        assert!(spec.has_flag("--no-video"));
        assert!(spec.has_flag("--no-subtitles"));
        assert_eq!(spec.value_of("--audio-tracks"), Some("0"));
    }

    #[test]
    fn track_lists_keep_container_order() {
        let options = SelectionOptions {
            audio_languages: langs(&["jpn", "eng"]),
            subtitle_languages: langs(&["eng"]),
            ..Default::default()
        };
        let built = build(&anime_episode(), &options);
        assert_eq!(built.remux.spec.value_of("--audio-tracks"), Some("1,2"));
        assert_eq!(built.remux.spec.value_of("--subtitle-tracks"), Some("3"));
    }

    #[test]
    fn track_names_only_with_keep_track_titles() {
        let mut description = anime_episode();
        description.tracks[1].name = "Japanese 2.0".to_string();

        let built = build(&description, &SelectionOptions::default());
        assert!(built.remux.spec.argv().contains(&"1:".to_string()));

        let options = SelectionOptions {
            keep_track_titles: true,
            ..Default::default()
        };
        let built = build(&description, &options);
        assert!(built.remux.spec.argv().contains(&"1:Japanese 2.0".to_string()));
    }

    #[test]
    fn chapters_and_title_kept_on_request() {
        let options = SelectionOptions {
            keep_chapters: true,
            keep_title: true,
            ..Default::default()
        };
        let built = build(&anime_episode(), &options);
        assert!(!built.remux.spec.has_flag("--no-chapters"));
        assert_eq!(built.remux.spec.value_of("--title"), Some("Episode 01"));
    }

    #[test]
    fn pass_along_title_suppresses_title_flag() {
        let pass_along = vec!["--title".to_string(), "Custom".to_string()];
        let built = build_with(
            &anime_episode(),
            &SelectionOptions::default(),
            &layout(false),
            &pass_along,
        );
        let argv = built.remux.spec.argv();
        assert_eq!(&argv[..2], &["--title", "Custom"]);
        assert_eq!(argv.iter().filter(|a| *a == "--title").count(), 1);
    }

    #[test]
    fn attachment_flags() {
        let mut description = anime_episode();
        description.attachments = vec![
            attachment("1", "application/x-truetype-font", "a.ttf"),
            attachment("2", "application/vnd.ms-opentype", "b.otf"),
            attachment("3", "image/jpeg", "cover.jpg"),
        ];

        let fonts = SelectionOptions {
            keep_attachment_types: langs(&["font", "opentype"]),
            ..Default::default()
        };
        let built = build(&description, &fonts);
        assert_eq!(built.remux.spec.value_of("--attachments"), Some("1,2"));

        let nothing_matches = SelectionOptions {
            keep_attachment_types: langs(&["audio"]),
            ..Default::default()
        };
        let built = build(&description, &nothing_matches);
        assert!(built.remux.spec.has_flag("--no-attachments"));

        let keep_all = SelectionOptions {
            keep_all_attachments: true,
            keep_attachment_types: langs(&["audio"]),
            ..Default::default()
        };
        let built = build(&description, &keep_all);
        assert!(!built.remux.spec.has_flag("--no-attachments"));
        assert!(!built.remux.spec.has_flag("--attachments"));
    }

    #[test]
    fn folder_per_file_nests_outputs() {
        let options = SelectionOptions {
            extract_all: true,
            ..Default::default()
        };
        let built = build_with(&anime_episode(), &options, &layout(true), &[]);
        assert_eq!(
            built.remux.output,
            PathBuf::from("/media/out/Show 01/Show 01.mkv")
        );
        assert_eq!(built.remux.directory(), Path::new("/media/out/Show 01"));
        let extract = built.extract.unwrap();
        assert_eq!(
            extract.targets[0].path,
            PathBuf::from("/media/out/Show 01/Show 01.3_eng.ass")
        );
    }

    #[test]
    fn extract_command_maps_tracks_to_files() {
        let mut description = anime_episode();
        let mut srt = track("4", TrackKind::Subtitle, "jpn");
        srt.codec = "S_TEXT/UTF8".to_string();
        description.tracks.push(srt);

        let options = SelectionOptions {
            extract_all: true,
            ..Default::default()
        };
        let built = build(&description, &options);
        let extract = built.extract.unwrap();

        assert_eq!(extract.spec.program, "mkvextract");
        assert_eq!(
            extract.spec.argv(),
            vec![
                "/media/in/Show 01.mkv",
                "tracks",
                "3:/media/out/Show 01.3_eng.ass",
                "4:/media/out/Show 01.4_jpn.srt",
            ]
        );
        assert!(built.remux.spec.has_flag("--no-subtitles"));
        assert!(built.unsupported.is_empty());
    }

    #[test]
    fn unsupported_codec_is_skipped_not_fatal() {
        let mut description = anime_episode();
        let mut odd = track("4", TrackKind::Subtitle, "eng");
        odd.codec = "S_KATE".to_string();
        description.tracks.insert(3, odd);

        let options = SelectionOptions {
            extract_all: true,
            ..Default::default()
        };
        let built = build(&description, &options);

        assert_eq!(
            built.unsupported,
            vec![UnsupportedCodec {
                track_id: "4".to_string(),
                codec: "S_KATE".to_string(),
            }]
        );
        let extract = built.extract.unwrap();
        assert_eq!(extract.targets.len(), 1);
        assert_eq!(extract.targets[0].track_id, "3");
    }

    #[test]
    fn only_unsupported_codecs_yield_no_extract_command() {
        let mut description = anime_episode();
        description.tracks[3].codec = "S_DVBSUB".to_string();
        let options = SelectionOptions {
            extract_all: true,
            ..Default::default()
        };
        let built = build(&description, &options);
        assert!(built.extract.is_none());
        assert_eq!(built.unsupported.len(), 1);
    }

    #[test]
    fn codec_extension_table() {
        assert_eq!(subtitle_extension("S_TEXT/WEBVTT"), Some(".vtt"));
        assert_eq!(subtitle_extension("S_VOBSUB"), Some(".idx"));
        assert_eq!(subtitle_extension("S_HDMV/PGS"), Some(".sup"));
        assert_eq!(subtitle_extension("S_TEXT/USF"), Some(".usf"));
        assert_eq!(subtitle_extension("S_TEXT/SSA"), Some(".ssa"));
        assert_eq!(subtitle_extension("A_AAC"), None);
    }

    #[test]
    fn display_survives_shell_splitting() {
        let built = build(&anime_episode(), &SelectionOptions::default());
        let spec = &built.remux.spec;
        let mut expected = vec![spec.program.clone()];
        expected.extend(spec.argv());

        assert_eq!(shlex::split(&spec.to_string()), Some(expected));
    }
}
