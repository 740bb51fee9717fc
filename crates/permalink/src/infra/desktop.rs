//! Clipboard and browser integration.

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow};

/// Destination for a finished link.
pub trait LinkSink {
    /// Place `text` on the clipboard.
    fn copy(&mut self, text: &str) -> Result<()>;

    /// Open `url` in the default browser.
    fn open(&mut self, url: &str) -> Result<()>;
}

/// X11 and Wayland selections are served by the owning process and are lost when it exits.
/// There the forking helpers (`xclip`, `wl-copy`) must own the clipboard instead.
const CLIPBOARD_OUTLIVES_PROCESS: bool = !cfg!(all(unix, not(target_os = "macos")));

/// The user's desktop: system clipboard plus the platform URL opener.
pub struct SystemSink {
    clipboard: Option<arboard::Clipboard>,
}

impl SystemSink {
    /// Connect to the system clipboard where its contents survive this process. Otherwise, or
    /// when it is unavailable, shell utilities are used instead.
    pub fn new() -> Self {
        let clipboard = if CLIPBOARD_OUTLIVES_PROCESS {
            arboard::Clipboard::new()
                .map_err(|err| tracing::debug!(%err, "system clipboard unavailable"))
                .ok()
        } else {
            None
        };
        Self { clipboard }
    }
}

impl Default for SystemSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkSink for SystemSink {
    fn copy(&mut self, text: &str) -> Result<()> {
        if let Some(clipboard) = self.clipboard.as_mut()
            && clipboard.set_text(text.to_owned()).is_ok()
        {
            return Ok(());
        }

        self.clipboard = None;
        for command in clipboard_commands() {
            match pipe_to_command(command, text) {
                Ok(()) => return Ok(()),
                Err(err) => tracing::debug!(command = command[0], "{err:#}"),
            }
        }
        Err(anyhow!("no clipboard backend accepted the link"))
    }

    fn open(&mut self, url: &str) -> Result<()> {
        let (program, args) = opener_command()
            .split_first()
            .context("no URL opener known for this platform")?;
        Command::new(program)
            .args(args)
            .arg(url)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to launch {program}"))?;
        Ok(())
    }
}

fn pipe_to_command(command: &[&str], text: &str) -> Result<()> {
    let (program, args) = command
        .split_first()
        .context("clipboard command missing program")?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to spawn clipboard command: {program}"))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .context("failed to write clipboard contents")?;
    }

    let status = child
        .wait()
        .with_context(|| format!("clipboard command did not exit cleanly: {program}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(anyhow!("{program} exited with status {status}"))
    }
}

#[cfg(target_os = "macos")]
fn clipboard_commands() -> Vec<&'static [&'static str]> {
    vec![&["pbcopy"]]
}

#[cfg(all(unix, not(target_os = "macos")))]
fn clipboard_commands() -> Vec<&'static [&'static str]> {
    vec![&["xclip", "-selection", "clipboard"], &["wl-copy"]]
}

#[cfg(target_os = "windows")]
fn clipboard_commands() -> Vec<&'static [&'static str]> {
    vec![&["powershell.exe", "-NoProfile", "-Command", "Set-Clipboard"]]
}

#[cfg(not(any(unix, target_os = "windows")))]
fn clipboard_commands() -> Vec<&'static [&'static str]> {
    Vec::new()
}

#[cfg(target_os = "macos")]
fn opener_command() -> &'static [&'static str] {
    &["open"]
}

#[cfg(all(unix, not(target_os = "macos")))]
fn opener_command() -> &'static [&'static str] {
    &["xdg-open"]
}

// `start` treats its first quoted argument as a window title.
#[cfg(target_os = "windows")]
fn opener_command() -> &'static [&'static str] {
    &["cmd", "/C", "start", ""]
}

#[cfg(not(any(unix, target_os = "windows")))]
fn opener_command() -> &'static [&'static str] {
    &[]
}
