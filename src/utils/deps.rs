use crate::config::ToolsConfig;
use crate::error::AppError;
use std::process::Command;
use tracing::debug;

/// Make sure the MKVToolNix binaries this run needs can be started.
///
/// mkvextract is only required when subtitles are to be extracted.
pub fn check_tools(tools: &ToolsConfig, needs_extract: bool) -> Result<(), AppError> {
    let mut required = vec![tools.mkvmerge.as_str()];
    if needs_extract {
        required.push(tools.mkvextract.as_str());
    }

    for tool in required {
        if !check_command(tool, &["--version"]) {
            return Err(AppError::MissingTool(tool.to_string()));
        }
        debug!("Found {}", tool);
    }
    Ok(())
}

/// Check if a command is available
fn check_command(cmd: &str, args: &[&str]) -> bool {
    Command::new(cmd)
        .args(args)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}
