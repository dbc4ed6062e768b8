//! Terminal output for the server binary
//!
//! Startup status and the `config` listing go to stdout; errors go to stderr.
//! Every helper has a plain fallback for `--no-color`.

use owo_colors::OwoColorize;

pub struct Output {
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self { colored: true }
    }

    pub fn no_color() -> Self {
        Self { colored: false }
    }

    pub fn banner(&self) {
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!("\n   {} {}\n", "shopkeep".bright_cyan().bold(), version.dimmed());
        } else {
            println!("\n   shopkeep {}\n", version);
        }
    }

    /// Server is up and accepting connections.
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("\n  [OK] {}", message);
        }
    }

    /// Degraded-but-running conditions, such as a missing credential.
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "!".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    /// One served route, method padded so paths line up.
    pub fn endpoint(&self, method: &str, path: &str) {
        if self.colored {
            println!("    {:<5} {}", method.blue().bold(), path);
        } else {
            println!("    {:<5} {}", method, path);
        }
    }

    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {}", message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_switch() {
        assert!(Output::new().colored);
        assert!(Output::default().colored);
        assert!(!Output::no_color().colored);
    }

    #[test]
    fn test_startup_lines_print_in_both_modes() {
        for output in [Output::no_color(), Output::new()] {
            output.banner();
            output.warning("OPENAI_API_KEY is not set");
            output.kv("Model", "gpt-4o-mini");
            output.endpoint("POST", "/api/agent/chat");
            output.success("Listening on http://127.0.0.1:3001");
            output.header("Configuration");
            output.hint("No config file found");
            output.error("bind failed");
        }
    }
}
