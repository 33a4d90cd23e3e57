use std::path::PathBuf;

use clap::Parser;

/// Batch remux .mkv files with MKVToolNix.
///
/// By default everything but the first video and audio track and their
/// flags is discarded.
#[derive(Parser, Clone, Debug, Default)]
#[command(name = "mkvbatch", version, about)]
pub struct Args {
    /// Input folder [default: current working directory]
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub in_path: Option<PathBuf>,

    /// Output folder, may be a new folder inside --in-path but not the same folder
    /// [default: <IN_PATH>/REMUXED]
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub out_path: Option<PathBuf>,

    #[command(flatten)]
    pub tracks: TrackOptions,

    #[command(flatten)]
    pub run: RunOptions,

    /// Global options passed along to mkvmerge, wrapped in quotes
    /// (example: --pass-along "--default-language eng")
    #[arg(long, allow_hyphen_values = true, value_name = "FLAGS")]
    pub pass_along: Option<String>,

    /// Use this config file instead of the default location
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Clone, Debug, Default)]
#[command(next_help_heading = "TRACK OPTIONS")]
pub struct TrackOptions {
    /// Keep audio of these languages (example: -a jpn,eng)
    #[arg(short, long = "audio-lang", value_delimiter = ',', value_name = "LANGS")]
    pub audio_lang: Vec<String>,

    /// Keep subtitles of these languages (example: -s eng)
    #[arg(short, long = "sub-lang", value_delimiter = ',', value_name = "LANGS")]
    pub sub_lang: Vec<String>,

    /// Keep all subtitles (overrides --no-dupe)
    #[arg(short = 'S', long = "keep-all-sub")]
    pub keep_all_sub: bool,

    /// Extract subtitles of these languages (overrides -s/-S)
    #[arg(short = 'x', long = "extract-sub", value_delimiter = ',', value_name = "LANGS")]
    pub extract_sub: Vec<String>,

    /// Extract all subtitles (overrides -s/-S)
    #[arg(short = 'X', long = "extract-all-sub")]
    pub extract_all_sub: bool,

    /// Only keep attachments whose type contains one of these (example: -k font)
    #[arg(short = 'k', long = "keepatt-type", value_delimiter = ',', value_name = "TYPES")]
    pub keepatt_type: Vec<String>,

    /// Keep all attachments
    #[arg(short = 'K', long = "keep-att")]
    pub keep_att: bool,

    /// Keep track titles
    #[arg(short = 't', long = "keep-track-titles")]
    pub keep_track_titles: bool,

    /// Keep file title
    #[arg(short = 'T', long = "keep-title")]
    pub keep_title: bool,

    /// Keep chapters
    #[arg(short = 'c', long = "keep-chapt")]
    pub keep_chapt: bool,

    /// Only keep the first track of the requested languages per category
    #[arg(long = "no-dupe")]
    pub no_dupe: bool,
}

#[derive(Parser, Clone, Debug, Default)]
#[command(next_help_heading = "RUN OPTIONS")]
pub struct RunOptions {
    /// Create a folder in --out-path for each processed file (uses file name)
    #[arg(long = "new-folder")]
    pub new_folder: bool,

    /// Also look in subfolders of --in-path for mkv files
    #[arg(long = "sub-folders")]
    pub sub_folders: bool,

    /// Move original files to the trash once their remux is finished
    #[arg(long = "trash-files")]
    pub trash_files: bool,

    /// Print extra information during the process
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long = "nc")]
    pub no_color: bool,

    /// Only print what would be done, no files are processed (implies --verbose)
    #[arg(long)]
    pub simulate: bool,

    /// Stop the whole batch at the first file that fails
    #[arg(long = "fail-fast")]
    pub fail_fast: bool,
}
