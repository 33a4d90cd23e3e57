use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Bad or contradictory options, reported before any file is touched
    #[error("{0}")]
    Config(String),

    #[error("could not inspect \"{}\": {message}", path.display())]
    Inspection { path: PathBuf, message: String },

    /// An external tool exited non-zero or could not be started
    #[error("[{tool}] {message}")]
    Process { tool: String, message: String },

    #[error("could not trash \"{}\": {message}", path.display())]
    Trash { path: PathBuf, message: String },

    #[error("required tool `{0}` was not found, is MKVToolNix installed and on PATH?")]
    MissingTool(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn config(message: impl Into<String>) -> Self {
        AppError::Config(message.into())
    }

    pub fn inspection(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        AppError::Inspection {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn process(tool: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Process {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Whether this error invalidates the whole run rather than a single file
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Config(_) | AppError::MissingTool(_))
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(format!("Failed to parse config file: {}", err))
    }
}
