//! Livemark - a live-preview markdown editor for the terminal.
//!
//! # Usage
//!
//! ```bash
//! livemark
//! livemark notes.md
//! livemark --theme light
//! livemark --store /tmp/scratch-store.json
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use livemark::app::App;
use livemark::ui::style::Theme;

/// A live-preview markdown editor for the terminal
#[derive(Parser, Debug)]
#[command(name = "livemark", version, about, long_about = None)]
struct Cli {
    /// Markdown file to open instead of the stored document
    file: Option<PathBuf>,

    /// Color theme; auto detects from the terminal background
    #[arg(long, value_enum, default_value = "auto")]
    theme: ThemeMode,

    /// Use a specific store file instead of the default location
    #[arg(long, value_name = "PATH")]
    store: Option<PathBuf>,

    /// View without editing; nothing is written to the store
    #[arg(long)]
    read_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ThemeMode {
    Auto,
    Light,
    Dark,
}

// Query the terminal background using OSC 11.
// We talk to /dev/tty so the terminal responds even when stdout is piped.
// On non-Unix platforms we skip the query entirely because the fallback
// (stdin/stdout) leaves an orphaned reader thread that blocks the console
// input buffer, preventing crossterm from receiving any keyboard events.
#[cfg(not(unix))]
fn query_terminal_background() -> std::io::Result<Option<(u8, u8, u8)>> {
    Ok(None)
}

#[cfg(unix)]
fn query_terminal_background() -> std::io::Result<Option<(u8, u8, u8)>> {
    use std::io::{Read, Write};
    use std::sync::mpsc;

    let (tx, rx) = mpsc::channel();

    let mut io = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open("/dev/tty")?;
    let reader = io.try_clone()?;

    // OSC 11 query: ESC ] 11 ; ? BEL
    io.write_all(b"\x1b]11;?\x07")?;
    io.flush()?;

    std::thread::spawn(move || {
        let mut reader = reader;
        let mut buf = [0u8; 256];
        let mut collected: Vec<u8> = Vec::new();
        loop {
            match reader.read(&mut buf) {
                Ok(0) => continue,
                Ok(n) => {
                    collected.extend_from_slice(&buf[..n]);
                    if collected.contains(&b'\x07') || collected.windows(2).any(|w| w == b"\x1b\\")
                    {
                        let _ = tx.send(collected);
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    let mut collected = Vec::new();
    if let Ok(bytes) = rx.recv_timeout(Duration::from_millis(75)) {
        collected = bytes;
    }

    let mut found: Option<(u8, u8, u8)> = None;
    if !collected.is_empty() {
        let text = String::from_utf8_lossy(&collected);
        if text.contains("rgb:") {
            found = parse_osc11_reply(&text);
        }
    }

    Ok(found)
}

fn theme_from_rgb(r: u8, g: u8, b: u8) -> Theme {
    let luma = (0.2126 * f32::from(r)) + (0.7152 * f32::from(g)) + (0.0722 * f32::from(b));
    if luma >= 140.0 { Theme::Light } else { Theme::Dark }
}

fn theme_from_colorfgbg(colorfgbg: Option<&str>) -> Option<Theme> {
    let value = colorfgbg?;
    let bg = value.rsplit(';').next()?.parse::<u8>().ok()?;
    Some(if bg >= 7 { Theme::Light } else { Theme::Dark })
}

fn detect_theme() -> Theme {
    let _raw = enable_raw_mode();
    let result = query_terminal_background();
    let _ = disable_raw_mode();
    result
        .ok()
        .flatten()
        .map(|(r, g, b)| theme_from_rgb(r, g, b))
        .or_else(|| theme_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref()))
        .unwrap_or(Theme::Dark)
}

fn parse_osc11_reply(reply: &str) -> Option<(u8, u8, u8)> {
    // Expect: ESC ] 11 ; rgb:RRRR/GGGG/BBBB BEL or ST
    let start = reply.find("rgb:")?;
    let data = &reply[start + 4..];
    let mut parts = data.split(|c| c == '/' || c == '\x07' || c == '\x1b');
    let r = parts.next()?;
    let g = parts.next()?;
    let b = parts.next()?;
    Some((
        parse_osc_component(r)?,
        parse_osc_component(g)?,
        parse_osc_component(b)?,
    ))
}

fn parse_osc_component(s: &str) -> Option<u8> {
    let hex = s.trim();
    if hex.len() >= 4 {
        let v = u16::from_str_radix(&hex[..4], 16).ok()?;
        #[allow(clippy::cast_possible_truncation)]
        Some((v >> 8) as u8)
    } else if hex.len() == 2 {
        u8::from_str_radix(hex, 16).ok()
    } else {
        None
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // The OSC query must run before ratatui takes over the terminal.
    let (theme_override, default_theme) = match cli.theme {
        ThemeMode::Auto => (None, detect_theme()),
        ThemeMode::Light => (Some(Theme::Light), Theme::Light),
        ThemeMode::Dark => (Some(Theme::Dark), Theme::Dark),
    };

    let mut app = App::new()
        .with_initial_file(cli.file)
        .with_store_path(cli.store)
        .with_theme(theme_override)
        .with_default_theme(default_theme)
        .with_read_only(cli.read_only);

    app.run().context("application error")
}
