pub mod console;

pub use console::Console;

/// User-facing status output, kept apart from the remux logic
pub trait Reporter {
    /// A file being looked at or acted upon
    fn file(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
    fn success(&self, message: &str);
    /// An external command about to run
    fn command(&self, message: &str);
    /// Uncolored detail line
    fn plain(&self, message: &str);
    /// Progress reported by an external tool, redrawn in place
    fn progress(&self, tool: &str, percent: u8);
    /// Terminate a run of progress updates
    fn end_progress(&self);
    /// A non-progress line printed by an external tool
    fn tool_output(&self, tool: &str, line: &str);
}
