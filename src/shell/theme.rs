//! Terminal colors for the interactive shell

// --- ANSI palette ---

pub const CYAN: &str = "36"; // Prompts and headings
pub const GREEN: &str = "32"; // Success state
pub const YELLOW: &str = "33"; // Warnings and hints
pub const RED: &str = "31"; // Danger state
pub const MAGENTA: &str = "35"; // Accent
pub const BOLD: &str = "1";

/// Styling switch. A plain theme returns text untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    color: bool,
}

impl Theme {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn is_colored(self) -> bool {
        self.color
    }

    pub fn paint(self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    }

    pub fn heading(self, text: &str) -> String {
        self.paint(&format!("{};{}", BOLD, CYAN), text)
    }

    pub fn accent(self, text: &str) -> String {
        self.paint(MAGENTA, text)
    }

    pub fn success(self, text: &str) -> String {
        self.paint(GREEN, &format!("✓ {}", text))
    }

    pub fn warning(self, text: &str) -> String {
        self.paint(YELLOW, &format!("! {}", text))
    }

    pub fn error(self, text: &str) -> String {
        self.paint(RED, &format!("✗ {}", text))
    }

    pub fn hint(self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    /// Two-line prompt, `╭─ label` then `╰─> `
    pub fn prompt(self, label: &str) -> String {
        format!(
            "{} {}\n{} ",
            self.paint(&format!("{};{}", BOLD, CYAN), "╭─"),
            label,
            self.paint(&format!("{};{}", BOLD, CYAN), "╰─>")
        )
    }
}
