pub mod types;

pub use types::*;

use crate::cli::Args;
use crate::error::AppError;
use crate::utils::paths::{normalize, same_path};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Name of the default output folder created inside the input folder
pub const DEFAULT_OUTPUT_DIR: &str = "REMUXED";

/// Everything a run needs, validated once before any file is touched
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub layout: OutputLayout,
    pub selection: SelectionOptions,
    /// Extra mkvmerge flags, already split into arguments
    pub pass_along: Vec<String>,
    pub recurse: bool,
    pub trash_files: bool,
    pub verbose: bool,
    pub simulate: bool,
    pub fail_fast: bool,
    pub tools: ToolsConfig,
}

impl RunConfig {
    /// Resolve CLI arguments against the working directory and config file
    pub fn from_args(args: &Args, file: FileConfig) -> Result<Self, AppError> {
        let cwd = std::env::current_dir()?;
        Self::resolve(args, file, &cwd)
    }

    fn resolve(args: &Args, file: FileConfig, cwd: &Path) -> Result<Self, AppError> {
        let input = match &args.in_path {
            Some(path) => {
                let path = cwd.join(path);
                if !path.exists() {
                    return Err(AppError::config(format!(
                        "Given path \"{}\" doesn't exist.",
                        path.display()
                    )));
                }
                normalize(&path)
            }
            None => normalize(cwd),
        };

        let output = match &args.out_path {
            Some(path) => normalize(&cwd.join(path)),
            None => input.join(DEFAULT_OUTPUT_DIR),
        };

        // The new file would overwrite the original while it is being read
        if same_path(&input, &output) {
            return Err(AppError::config(
                "--in-path and --out-path can not be the same folder",
            ));
        }

        let pass_along = match &args.pass_along {
            Some(raw) => shlex::split(raw).ok_or_else(|| {
                AppError::config(format!("Could not parse --pass-along \"{}\"", raw))
            })?,
            None => Vec::new(),
        };

        let tracks = &args.tracks;
        if tracks.keep_title && passes_title(&pass_along) {
            return Err(AppError::config(
                "Two title options set (--keep-title and --title in --pass-along), \
                 one would overwrite the other",
            ));
        }

        let selection = SelectionOptions {
            audio_languages: to_set(&tracks.audio_lang),
            subtitle_languages: to_set(&tracks.sub_lang),
            extract_languages: to_set(&tracks.extract_sub),
            extract_all: tracks.extract_all_sub,
            keep_all_subtitles: tracks.keep_all_sub,
            no_dupe: tracks.no_dupe,
            keep_attachment_types: to_set(&tracks.keepatt_type),
            keep_all_attachments: tracks.keep_att,
            keep_chapters: tracks.keep_chapt,
            keep_title: tracks.keep_title,
            keep_track_titles: tracks.keep_track_titles,
        };

        file.tools.validate()?;

        let run = &args.run;
        Ok(Self {
            input,
            layout: OutputLayout {
                directory: output,
                folder_per_file: run.new_folder,
            },
            selection,
            pass_along,
            recurse: run.sub_folders,
            trash_files: run.trash_files,
            verbose: run.verbose || run.simulate,
            simulate: run.simulate,
            fail_fast: run.fail_fast,
            tools: file.tools,
        })
    }
}

/// Whether the pass-along flags already set the segment title
pub fn passes_title(pass_along: &[String]) -> bool {
    pass_along
        .iter()
        .any(|arg| arg == "--title" || arg.starts_with("--title="))
}

impl ToolsConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.mkvmerge.trim().is_empty() || self.mkvextract.trim().is_empty() {
            return Err(AppError::config("Tool paths in the config file can not be empty"));
        }
        if self.identify_timeout_secs == 0 {
            return Err(AppError::config(
                "identify_timeout_secs must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl FileConfig {
    /// Load an explicit config file, or the default one if it exists
    pub fn load(explicit: Option<&Path>) -> Result<Self, AppError> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        let Some(path) = Self::config_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        match Self::load_from_file(&path) {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!("{}. Using defaults.", e);
                Ok(Self::default())
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: FileConfig = toml::from_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Default configuration file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mkvbatch").join("config.toml"))
    }
}
