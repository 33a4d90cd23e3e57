use crate::error::AppError;
use crate::muxer::CommandSpec;
use crate::ui::Reporter;
use regex::Regex;
use std::process::Stdio;
use std::sync::LazyLock;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::debug;

static PROGRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Progress:\s*(\d{1,3})%").expect("valid progress regex"));

/// A line of tool output, classified for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolLine {
    Progress(u8),
    Error(String),
    Blank,
    Text(String),
}

impl ToolLine {
    pub fn parse(raw: &str) -> Self {
        // Progress redraws arrive as `\r`-separated updates on one line
        let raw = raw.trim_end_matches(['\r', '\n']);
        let line = raw
            .rsplit('\r')
            .find(|segment| !segment.trim().is_empty())
            .unwrap_or(raw)
            .trim_end();

        if let Some(caps) = PROGRESS.captures(line)
            && let Ok(percent) = caps[1].parse::<u8>()
        {
            return ToolLine::Progress(percent.min(100));
        }
        if line.trim().is_empty() {
            return ToolLine::Blank;
        }
        if line.starts_with("Error") {
            return ToolLine::Error(error_message(line));
        }
        ToolLine::Text(line.to_string())
    }
}

/// Splits tool output on both `\r` and `\n`, so in-place progress redraws
/// surface as they are written instead of when the line finally ends
struct SegmentReader<R> {
    reader: R,
    buf: Vec<u8>,
    after_cr: bool,
}

impl<R: AsyncBufRead + Unpin> SegmentReader<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            after_cr: false,
        }
    }

    /// Next segment, decoded lossily; `None` at end of stream
    async fn next_segment(&mut self) -> std::io::Result<Option<String>> {
        loop {
            self.buf.clear();
            let terminator = loop {
                let available = self.reader.fill_buf().await?;
                if available.is_empty() {
                    break None;
                }
                if let Some(pos) = available.iter().position(|b| *b == b'\r' || *b == b'\n') {
                    let terminator = available[pos];
                    self.buf.extend_from_slice(&available[..pos]);
                    self.reader.consume(pos + 1);
                    break Some(terminator);
                }
                let len = available.len();
                self.buf.extend_from_slice(available);
                self.reader.consume(len);
            };

            let crlf = self.after_cr && terminator == Some(b'\n') && self.buf.is_empty();
            self.after_cr = terminator == Some(b'\r');
            if terminator.is_none() && self.buf.is_empty() {
                return Ok(None);
            }
            // `\r\n` ends one segment, not two
            if crlf {
                continue;
            }
            return Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()));
        }
    }
}

/// Strip the `Error:` prefix mkvtoolnix puts in front of its last words
fn error_message(line: &str) -> String {
    line.trim_start_matches("Error:").trim().to_string()
}

/// Run a remux or extract command to completion, streaming its progress.
///
/// `label` names the tool in progress lines. With `verbose`, every other
/// line the tool prints is echoed as well. A non-zero exit becomes an
/// [`AppError::Process`] carrying the last thing the tool said.
pub async fn run_tool(
    spec: &CommandSpec,
    label: &str,
    verbose: bool,
    reporter: &dyn Reporter,
) -> Result<(), AppError> {
    let mut cmd = Command::new(&spec.program);
    cmd.args(spec.argv())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    debug!("{:?}", cmd);

    let mut child = cmd
        .spawn()
        .map_err(|e| AppError::process(label, format!("Failed to start {}: {}", spec.program, e)))?;

    let stderr = child.stderr.take().map(|mut pipe| {
        tokio::spawn(async move {
            let mut buf = String::new();
            let _ = pipe.read_to_string(&mut buf).await;
            buf
        })
    });

    let mut last_line = String::new();
    let mut in_progress = false;

    if let Some(stdout) = child.stdout.take() {
        let mut segments = SegmentReader::new(BufReader::new(stdout));
        while let Some(raw) = segments.next_segment().await? {
            match ToolLine::parse(&raw) {
                ToolLine::Progress(percent) => {
                    reporter.progress(label, percent);
                    in_progress = true;
                }
                ToolLine::Error(message) => last_line = message,
                ToolLine::Blank => {
                    if verbose {
                        reporter.plain("");
                    }
                }
                ToolLine::Text(text) => {
                    if verbose {
                        if in_progress {
                            reporter.end_progress();
                            in_progress = false;
                        }
                        reporter.tool_output(label, &text);
                    }
                    last_line = text;
                }
            }
        }
    }
    if in_progress {
        reporter.end_progress();
    }

    let status = child.wait().await?;
    let stderr = match stderr {
        Some(handle) => handle.await.unwrap_or_default(),
        None => String::new(),
    };

    if status.success() {
        return Ok(());
    }

    let message = if !last_line.is_empty() {
        last_line
    } else if let Some(line) = stderr.lines().rev().find(|l| !l.trim().is_empty()) {
        error_message(line)
    } else {
        format!("{} failed with status: {}", spec.program, status)
    };
    Err(AppError::process(label, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::recorder::Recorder;

    #[test]
    fn classifies_progress_lines() {
        assert_eq!(ToolLine::parse("Progress: 42%"), ToolLine::Progress(42));
        assert_eq!(ToolLine::parse("Progress: 100%\r\n"), ToolLine::Progress(100));
        assert_eq!(
            ToolLine::parse("Progress: 10%\rProgress: 11%"),
            ToolLine::Progress(11)
        );
    }

    #[test]
    fn classifies_other_lines() {
        assert_eq!(ToolLine::parse("   "), ToolLine::Blank);
        assert_eq!(
            ToolLine::parse("Error: The file 'x.mkv' could not be opened for reading."),
            ToolLine::Error("The file 'x.mkv' could not be opened for reading.".to_string())
        );
        assert_eq!(
            ToolLine::parse("The file is being analyzed."),
            ToolLine::Text("The file is being analyzed.".to_string())
        );
    }

    #[test]
    fn keeps_last_redraw_before_line_end() {
        assert_eq!(
            ToolLine::parse("Progress: 99%\rProgress: 100%\r"),
            ToolLine::Progress(100)
        );
        assert_eq!(ToolLine::parse("\r\n"), ToolLine::Blank);
    }

    async fn segments(bytes: &[u8]) -> Vec<String> {
        let mut reader = SegmentReader::new(bytes);
        let mut out = Vec::new();
        while let Some(segment) = reader.next_segment().await.unwrap() {
            out.push(segment);
        }
        out
    }

    #[tokio::test]
    async fn splits_output_on_carriage_returns() {
        assert_eq!(
            segments(b"Progress: 10%\rProgress: 50%\rProgress: 100%\r\nDone.\n").await,
            vec!["Progress: 10%", "Progress: 50%", "Progress: 100%", "Done."]
        );
        assert_eq!(segments(b"a\n\nb").await, vec!["a", "", "b"]);
        assert!(segments(b"").await.is_empty());
    }

    #[tokio::test]
    async fn invalid_utf8_is_decoded_lossily() {
        assert_eq!(
            segments(b"Writing caf\xe9.mkv\n").await,
            vec!["Writing caf\u{fffd}.mkv"]
        );
    }

    fn shell(script: &str) -> CommandSpec {
        CommandSpec {
            program: "sh".to_string(),
            args: vec![
                crate::muxer::command_builder::CommandArg::with_value("-c", script),
            ],
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn streams_progress_and_succeeds() {
        let recorder = Recorder::default();
        let spec = shell("echo 'Progress: 50%'; echo 'Progress: 100%'; echo 'Multiplexing took 1 second.'");

        run_tool(&spec, "mkvmerge", true, &recorder).await.unwrap();

        assert!(recorder.contains("progress: mkvmerge 50%"));
        assert!(recorder.contains("progress: mkvmerge 100%"));
        assert!(recorder.contains("output: mkvmerge Multiplexing took 1 second."));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn progress_redraws_surface_while_running() {
        let recorder = Recorder::default();
        let spec = shell(
            "printf 'Progress: 10%%\\r'; sleep 1; printf 'Progress: 50%%\\r'; sleep 1; printf 'Progress: 100%%\\r\\n'",
        );

        run_tool(&spec, "mkvmerge", false, &recorder).await.unwrap();

        let lines = recorder.lines.borrow();
        assert_eq!(
            *lines,
            vec![
                "progress: mkvmerge 10%",
                "progress: mkvmerge 50%",
                "progress: mkvmerge 100%",
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_utf8_output_does_not_fail_the_run() {
        let recorder = Recorder::default();
        let spec = shell("printf 'Writing caf\\351.mkv\\n'; echo 'Progress: 100%'");

        run_tool(&spec, "mkvmerge", true, &recorder).await.unwrap();

        assert!(recorder.contains("progress: mkvmerge 100%"));
        assert!(recorder.contains("Writing caf"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn quiet_mode_only_shows_progress() {
        let recorder = Recorder::default();
        let spec = shell("echo 'Progress: 100%'; echo 'Done.'");

        run_tool(&spec, "mkvmerge", false, &recorder).await.unwrap();

        assert!(recorder.contains("progress: mkvmerge 100%"));
        assert!(!recorder.contains("Done."));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failure_reports_last_error_line() {
        let recorder = Recorder::default();
        let spec = shell("echo 'Progress: 3%'; echo 'Error: no space left on device'; exit 2");

        let err = run_tool(&spec, "mkvmerge", false, &recorder)
            .await
            .unwrap_err();

        match err {
            AppError::Process { tool, message } => {
                assert_eq!(tool, "mkvmerge");
                assert_eq!(message, "no space left on device");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_a_process_error() {
        let recorder = Recorder::default();
        let spec = CommandSpec::new("mkvextract-does-not-exist-xyz");
        let err = run_tool(&spec, "mkvextract", false, &recorder)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Process { .. }));
    }
}
