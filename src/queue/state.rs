use super::job::{JobStatus, RemuxJob};
use std::time::{Duration, Instant};

/// Overall batch state
pub struct QueueState {
    pub jobs: Vec<RemuxJob>,
    pub start_time: Instant,
    pub end_time: Option<Instant>,
    /// Set when a failure stopped the batch early
    pub aborted: bool,
}

impl QueueState {
    pub fn new(jobs: Vec<RemuxJob>) -> Self {
        Self {
            jobs,
            start_time: Instant::now(),
            end_time: None,
            aborted: false,
        }
    }

    pub fn finish(&mut self) {
        self.end_time = Some(Instant::now());
    }

    pub fn elapsed_time(&self) -> Duration {
        self.end_time
            .map(|end| end.duration_since(self.start_time))
            .unwrap_or_else(|| self.start_time.elapsed())
    }

    pub fn done_count(&self) -> usize {
        self.jobs
            .iter()
            .filter(|j| j.status == JobStatus::Done)
            .count()
    }

    pub fn failed(&self) -> impl Iterator<Item = (&RemuxJob, &str)> {
        self.jobs.iter().filter_map(|j| match &j.status {
            JobStatus::Failed { message } => Some((j, message.as_str())),
            _ => None,
        })
    }

    pub fn error_count(&self) -> usize {
        self.failed().count()
    }

    pub fn skipped_count(&self) -> usize {
        self.jobs
            .iter()
            .filter(|j| j.status == JobStatus::Pending)
            .count()
    }

    pub fn is_success(&self) -> bool {
        self.error_count() == 0 && !self.aborted
    }
}
