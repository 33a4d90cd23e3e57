use super::job::{JobStatus, RemuxJob, discover};
use super::state::QueueState;
use crate::analyzer;
use crate::config::RunConfig;
use crate::error::AppError;
use crate::muxer::{BuiltCommands, CommandBuilder, CommandSpec, run_tool};
use crate::tracks::{ContainerDescription, SelectionResult, select_tracks};
use crate::ui::Reporter;
use std::path::Path;
use tracing::info;

const MERGE_LABEL: &str = "mkvmerge";
const EXTRACT_LABEL: &str = "mkvextract";

/// Runs inspect, select, build and execute for each file, one file at a time
pub struct Worker<'a> {
    config: &'a RunConfig,
    reporter: &'a dyn Reporter,
}

impl<'a> Worker<'a> {
    pub fn new(config: &'a RunConfig, reporter: &'a dyn Reporter) -> Self {
        Self { config, reporter }
    }

    /// Process every file found under the input folder.
    ///
    /// A failing file is reported and the batch moves on, unless
    /// `--fail-fast` was given. Errors that invalidate the whole run are
    /// returned immediately.
    pub async fn run(&self) -> Result<QueueState, AppError> {
        let config = self.config;
        if config.simulate {
            self.reporter
                .info("'--simulate' was passed, no actual files will be processed");
        }

        let input = config.input.display();
        if config.recurse {
            self.reporter.plain(&format!(
                "Searching in \"{}\" and subfolders for compatible files",
                input
            ));
        } else {
            self.reporter
                .plain(&format!("Searching in \"{}\" for compatible files", input));
        }

        let jobs = discover(&config.input, config.recurse, &config.layout.directory)?;
        info!("Found {} file(s) in {}", jobs.len(), input);
        let mut state = QueueState::new(jobs);

        for index in 0..state.jobs.len() {
            match self.process(&state.jobs[index]).await {
                Ok(()) => state.jobs[index].status = JobStatus::Done,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    self.reporter.error(&e.to_string());
                    state.jobs[index].status = JobStatus::Failed {
                        message: e.to_string(),
                    };
                    if config.fail_fast {
                        state.aborted = true;
                        break;
                    }
                }
            }
        }

        state.finish();
        self.summarize(&state);
        Ok(state)
    }

    async fn process(&self, job: &RemuxJob) -> Result<(), AppError> {
        let config = self.config;
        self.reporter.plain("");
        self.reporter.file(&format!(
            "Found file: \"{}\" ({})",
            job.filename(),
            job.size_string()
        ));
        self.reporter
            .file(&format!("in \"{}\"", job.folder().display()));

        let description = analyzer::inspect(&job.path, &config.tools).await?;
        if config.verbose {
            self.reporter.plain("Processing track info");
        }

        let selection = select_tracks(&description, &config.selection);
        self.report_selection(&description, &selection);

        let built = CommandBuilder::from_config(config).build(
            &job.path,
            &selection,
            &description,
            &config.selection,
        );
        self.report_extraction(&built);

        let output_dir = built.remux.directory();
        self.execute(&built.remux.spec, MERGE_LABEL, output_dir).await?;

        match &built.extract {
            Some(extract) => self.execute(&extract.spec, EXTRACT_LABEL, output_dir).await?,
            None if config.selection.wants_extraction() => self.reporter.plain(&format!(
                "[{}] No matching subtitles found, skipping the call to {}",
                EXTRACT_LABEL, EXTRACT_LABEL
            )),
            None => {}
        }

        if config.trash_files {
            self.trash(&job.path)?;
        }
        Ok(())
    }

    fn report_selection(&self, description: &ContainerDescription, selection: &SelectionResult) {
        for track in selection.kept_tracks() {
            self.reporter
                .plain(&format!("  Keeping track \"{}\"", track.display_name()));
        }

        if !self.config.verbose {
            return;
        }

        let options = &self.config.selection;
        match (options.keep_chapters, description.has_chapters) {
            (true, true) => self.reporter.plain("  Keeping chapters"),
            (true, false) => self.reporter.plain("  No chapters found"),
            (false, true) => self.reporter.plain("  Dropping chapters"),
            (false, false) => {}
        }

        if options.keep_all_attachments {
            if description.has_attachments() {
                self.reporter.plain(&format!(
                    "  Keeping all {} attachment(s)",
                    description.attachments.len()
                ));
            } else {
                self.reporter.plain("  No attachments found");
            }
            return;
        }
        let Some(types) = &options.keep_attachment_types else {
            return;
        };

        self.reporter.plain("Checking attachments");
        let matched: Vec<_> = description
            .attachments
            .iter()
            .filter(|a| selection.kept_attachment_ids.contains(&a.id))
            .collect();
        if matched.is_empty() {
            let noun = if types.len() > 1 { "types" } else { "type" };
            let joined: Vec<&str> = types.iter().map(String::as_str).collect();
            self.reporter.plain(&format!(
                "  No attachments found which match {} \"{}\"",
                noun,
                joined.join("/")
            ));
        }
        for attachment in matched {
            self.reporter
                .plain(&format!("  Found match \"{}\"", attachment.display_name()));
        }
    }

    fn report_extraction(&self, built: &BuiltCommands) {
        for unsupported in &built.unsupported {
            self.reporter.warn(&unsupported.to_string());
        }
        if let Some(extract) = &built.extract {
            for target in &extract.targets {
                let name = target
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                self.reporter.plain(&format!(
                    "  Adding subtitle \"{}\" to {} call",
                    name, EXTRACT_LABEL
                ));
            }
        }
    }

    async fn execute(
        &self,
        spec: &CommandSpec,
        label: &str,
        output_dir: &Path,
    ) -> Result<(), AppError> {
        if self.config.verbose {
            self.reporter.command(&spec.to_string());
        }
        if self.config.simulate {
            return Ok(());
        }

        tokio::fs::create_dir_all(output_dir).await?;
        run_tool(spec, label, self.config.verbose, self.reporter).await
    }

    fn trash(&self, path: &Path) -> Result<(), AppError> {
        if self.config.simulate {
            self.reporter
                .file(&format!("Would trash file \"{}\"", path.display()));
            return Ok(());
        }

        self.reporter
            .file(&format!("Trashing file \"{}\"", path.display()));
        trash::delete(path).map_err(|e| AppError::Trash {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn summarize(&self, state: &QueueState) {
        self.reporter.plain("");
        if state.jobs.is_empty() {
            self.reporter.error("No compatible files found");
            return;
        }

        self.reporter.success(&format!(
            "{} file(s) processed in {:.1}s",
            state.done_count(),
            state.elapsed_time().as_secs_f64()
        ));
        for (job, message) in state.failed() {
            self.reporter
                .warn(&format!("\"{}\" failed: {}", job.filename(), message));
        }
        if state.aborted {
            self.reporter.warn(&format!(
                "Stopped after the first failure, {} file(s) not processed",
                state.skipped_count()
            ));
        }
    }
}
