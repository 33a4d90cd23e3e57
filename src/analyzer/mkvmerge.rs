use crate::config::ToolsConfig;
use crate::error::AppError;
use crate::tracks::{AttachmentDescriptor, ContainerDescription, TrackDescriptor, TrackKind};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Identify a container with mkvmerge and describe its tracks
pub async fn inspect(path: &Path, tools: &ToolsConfig) -> Result<ContainerDescription, AppError> {
    info!("Identifying {}", path.display());
    let stdout = run_identify(path, tools).await?;
    parse_identify(&stdout).map_err(|message| AppError::inspection(path, message))
}

/// Run `mkvmerge --identify` with the configured timeout
async fn run_identify(path: &Path, tools: &ToolsConfig) -> Result<String, AppError> {
    let mut cmd = Command::new(&tools.mkvmerge);
    cmd.args(["--identification-format", "json", "--identify"])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    debug!("{:?}", cmd);

    let timeout = tools.identify_timeout();
    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(AppError::inspection(
                path,
                format!("Failed to execute {}: {}", tools.mkvmerge, e),
            ));
        }
        Err(_) => {
            return Err(AppError::inspection(
                path,
                format!("{} timed out after {}s", tools.mkvmerge, timeout.as_secs()),
            ));
        }
    };

    // mkvmerge exits 1 on warnings and 2 on errors but still prints the report
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    if stdout.trim().is_empty() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AppError::inspection(
            path,
            format!(
                "{} returned no identification ({}): {}",
                tools.mkvmerge,
                output.status,
                stderr.trim()
            ),
        ));
    }
    Ok(stdout)
}

/// Turn mkvmerge's JSON identification into a container description
pub fn parse_identify(json: &str) -> Result<ContainerDescription, String> {
    let report: IdentifyReport = serde_json::from_str(json)
        .map_err(|e| format!("Failed to parse mkvmerge output: {}", e))?;

    if !report.errors.is_empty() {
        return Err(report.errors.join("; "));
    }

    let container = report.container.unwrap_or_default();
    if container.recognized == Some(false) {
        return Err("Container format not recognized".to_string());
    }

    let tracks = report
        .tracks
        .into_iter()
        .filter_map(|raw| {
            let kind = TrackKind::from_identify(&raw.kind)?;
            let props = raw.properties;
            Some(TrackDescriptor {
                id: id_to_string(&raw.id),
                kind,
                codec: props.codec_id.or(raw.codec).unwrap_or_default(),
                is_default: props.default_track.unwrap_or(false),
                language: props
                    .language
                    .filter(|l| !l.is_empty())
                    .unwrap_or_else(|| "und".to_string()),
                name: props.track_name.unwrap_or_default(),
            })
        })
        .collect();

    let attachments = report
        .attachments
        .into_iter()
        .map(|raw| AttachmentDescriptor {
            id: id_to_string(&raw.id),
            content_type: raw.content_type.unwrap_or_default(),
            file_name: raw.file_name.unwrap_or_default(),
        })
        .collect();

    Ok(ContainerDescription {
        tracks,
        attachments,
        has_chapters: !report.chapters.is_empty(),
        title: container.properties.title.unwrap_or_default(),
    })
}

/// Ids are opaque: numbers are rendered in decimal, strings kept as-is
fn id_to_string(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// JSON deserialization structures

#[derive(Debug, Deserialize)]
struct IdentifyReport {
    container: Option<RawContainer>,
    #[serde(default)]
    tracks: Vec<RawTrack>,
    #[serde(default)]
    attachments: Vec<RawAttachment>,
    #[serde(default)]
    chapters: Vec<Value>,
    #[serde(default)]
    errors: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawContainer {
    recognized: Option<bool>,
    #[serde(default)]
    properties: ContainerProperties,
}

#[derive(Debug, Default, Deserialize)]
struct ContainerProperties {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTrack {
    id: Value,
    #[serde(rename = "type")]
    kind: String,
    codec: Option<String>,
    #[serde(default)]
    properties: TrackProperties,
}

#[derive(Debug, Default, Deserialize)]
struct TrackProperties {
    codec_id: Option<String>,
    default_track: Option<bool>,
    language: Option<String>,
    track_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAttachment {
    id: Value,
    content_type: Option<String>,
    file_name: Option<String>,
}
