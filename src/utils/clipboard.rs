//! Clipboard access for the copy action.
//!
//! There is no clipboard API on the command line, so text is piped into the
//! platform's copy tool (`pbcopy`, `wl-copy`, `xclip`, `xsel` or `clip`).

use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

/// Errors from a clipboard write
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    /// No clipboard tool could be started (headless session, nothing installed)
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),

    /// The clipboard tool refused the write
    #[error("Clipboard write denied: {0}")]
    Denied(String),
}

/// Something text can be copied into
pub trait Clipboard {
    /// Replace the clipboard contents with `text`
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Pipes text into one external program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandClipboard {
    program: String,
    args: Vec<String>,
}

impl CommandClipboard {
    /// Create a clipboard writing to `program args..` on stdin
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Program this clipboard runs
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Clipboard for CommandClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ClipboardError::Unavailable(format!("{}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(text.as_bytes()) {
                if e.kind() != ErrorKind::BrokenPipe {
                    return Err(ClipboardError::Denied(e.to_string()));
                }
            }
        }

        let status = child
            .wait()
            .map_err(|e| ClipboardError::Denied(e.to_string()))?;
        if !status.success() {
            return Err(ClipboardError::Denied(format!("{} exited with {}", self.program, status)));
        }
        Ok(())
    }
}

fn platform_candidates() -> Vec<CommandClipboard> {
    if cfg!(target_os = "macos") {
        vec![CommandClipboard::new("pbcopy", &[])]
    } else if cfg!(windows) {
        vec![CommandClipboard::new("clip", &[])]
    } else {
        vec![
            CommandClipboard::new("wl-copy", &[]),
            CommandClipboard::new("xclip", &["-selection", "clipboard"]),
            CommandClipboard::new("xsel", &["--clipboard", "--input"]),
        ]
    }
}

/// The desktop clipboard, resolved to a copy tool on first use.
#[derive(Debug, Default)]
pub struct SystemClipboard {
    resolved: Option<CommandClipboard>,
}

impl SystemClipboard {
    /// Create a handle; no tool is run until the first write
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if let Some(tool) = self.resolved.as_mut() {
            return tool.write_text(text);
        }

        let mut last_error = None;
        for mut tool in platform_candidates() {
            match tool.write_text(text) {
                Ok(()) => {
                    tracing::debug!("Using {} for the clipboard", tool.program());
                    self.resolved = Some(tool);
                    return Ok(());
                }
                // Tool missing: try the next one.
                Err(ClipboardError::Unavailable(e)) => last_error = Some(e),
                Err(e) => return Err(e),
            }
        }

        Err(ClipboardError::Unavailable(
            last_error.unwrap_or_else(|| "no clipboard tool found".to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ClipboardError::Unavailable("no display".to_string());
        assert_eq!(err.to_string(), "Clipboard unavailable: no display");
    }

    #[test]
    fn test_missing_tool_is_unavailable() {
        let mut clipboard = CommandClipboard::new("definitely-not-a-clipboard-tool", &[]);
        assert!(matches!(
            clipboard.write_text("x"),
            Err(ClipboardError::Unavailable(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_clipboard_exit_status() {
        let mut ok = CommandClipboard::new("cat", &[]);
        assert!(ok.write_text("@article{a}").is_ok());

        let mut failing = CommandClipboard::new("false", &[]);
        assert!(matches!(failing.write_text("x"), Err(ClipboardError::Denied(_))));
    }

    #[test]
    fn test_system_clipboard_is_lazy() {
        let clipboard = SystemClipboard::new();
        assert!(clipboard.resolved.is_none());
    }
}
