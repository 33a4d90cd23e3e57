use super::Reporter;
use crossterm::style::Stylize;
use std::io::Write;

/// Terminal reporter, colored unless `--nc` was given
#[derive(Debug, Clone, Copy)]
pub struct Console {
    color: bool,
}

impl Console {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn tagged(&self, tag: &str, message: &str, paint: fn(String) -> String) -> String {
        let line = format!("{}{}", tag, message);
        if self.color { paint(line) } else { line }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Reporter for Console {
    fn file(&self, message: &str) {
        println!("{}", self.tagged("", message, |s| s.yellow().to_string()));
    }

    fn info(&self, message: &str) {
        println!("{}", self.tagged("[INFO] ", message, |s| s.cyan().to_string()));
    }

    fn warn(&self, message: &str) {
        eprintln!("{}", self.tagged("[WARNING] ", message, |s| s.red().to_string()));
    }

    fn error(&self, message: &str) {
        eprintln!("{}", self.tagged("[ERROR] ", message, |s| s.red().to_string()));
    }

    fn success(&self, message: &str) {
        if self.color {
            println!("{} {}", "[SUCCESS]".green(), message);
        } else {
            println!("[SUCCESS] {}", message);
        }
    }

    fn command(&self, message: &str) {
        println!("{}", self.tagged("", message, |s| s.cyan().to_string()));
    }

    fn plain(&self, message: &str) {
        println!("{}", message);
    }

    fn progress(&self, tool: &str, percent: u8) {
        let text = format!("Progress: {}%", percent);
        let text = if self.color && percent >= 100 {
            text.green().to_string()
        } else {
            text
        };
        print!("\r[{}] {}", tool, text);
        let _ = std::io::stdout().flush();
    }

    fn end_progress(&self) {
        println!();
    }

    fn tool_output(&self, tool: &str, line: &str) {
        println!("[{}] {}", tool, line);
    }
}
