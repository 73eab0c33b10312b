//! Rendering primitives for CLI output.

use chrono::{DateTime, Local, Utc};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::{ASCII_MARKDOWN, UTF8_FULL};
use comfy_table::{ContentArrangement, Table as ComfyTable};
use owo_colors::OwoColorize;

use super::context::UiContext;
use super::theme::Badge;

const METER_WIDTH: usize = 20;

/// Render a badge with optional message.
pub fn badge(ctx: &UiContext, kind: Badge, message: &str) -> String {
    let painted = kind.paint(ctx.unicode, ctx.color);
    if message.is_empty() {
        painted
    } else {
        format!("{} {}", painted, message)
    }
}

/// Render a key-value pair.
///
/// Pretty mode: "Key: value" with dim key
/// Plain mode: "key=value"
pub fn kv(ctx: &UiContext, key: &str, value: &str) -> String {
    if ctx.mode.is_pretty() {
        let label = format!("{}:", key);
        if ctx.color {
            format!("{} {}", label.dimmed(), value)
        } else {
            format!("{} {}", label, value)
        }
    } else {
        format!("{}={}", key.to_lowercase().replace(' ', "_"), value)
    }
}

/// Render a hint line.
pub fn hint(ctx: &UiContext, text: &str) -> String {
    if ctx.mode.is_pretty() {
        if ctx.color {
            format!("{} {}", "Hint:".dimmed(), text)
        } else {
            format!("Hint: {}", text)
        }
    } else {
        format!("hint={}", text)
    }
}

/// Column definition for table rendering.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub header: &'static str,
}

impl Column {
    pub const fn new(header: &'static str) -> Self {
        Self { header }
    }
}

/// Render a table.
///
/// Pretty mode: bordered table with headers
/// Plain mode: tab-separated rows, no header
pub fn table(ctx: &UiContext, columns: &[Column], rows: &[Vec<String>]) -> String {
    if !ctx.mode.is_pretty() {
        return rows
            .iter()
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n");
    }

    let mut table = ComfyTable::new();
    if ctx.unicode {
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS);
    } else {
        table.load_preset(ASCII_MARKDOWN);
    }
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(columns.iter().map(|c| c.header).collect::<Vec<_>>());
    for row in rows {
        table.add_row(row);
    }
    table.to_string()
}

/// Word for a 0-100 strength score.
pub fn strength_label(score: u8) -> &'static str {
    match score {
        0..=29 => "weak",
        30..=59 => "fair",
        60..=79 => "good",
        _ => "strong",
    }
}

/// Render a strength score as a bar.
///
/// Pretty mode: `[#######-------------] 35/100 fair`
/// Plain mode: `strength=35 label=fair`
pub fn strength_meter(ctx: &UiContext, score: u8) -> String {
    let label = strength_label(score);
    if !ctx.mode.is_pretty() {
        return format!("strength={} label={}", score, label);
    }

    let filled = usize::from(score.min(100)) * METER_WIDTH / 100;
    let (full, empty) = if ctx.unicode {
        ("\u{2588}", "\u{2591}")
    } else {
        ("#", "-")
    };
    let bar = format!("{}{}", full.repeat(filled), empty.repeat(METER_WIDTH - filled));
    let bar = if !ctx.color {
        bar
    } else if score < 30 {
        bar.red().to_string()
    } else if score < 60 {
        bar.yellow().to_string()
    } else {
        bar.green().to_string()
    };
    format!("[{}] {}/100 {}", bar, score, label)
}

/// Human-readable byte count.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Local time for pretty output, RFC 3339 otherwise.
pub fn format_datetime(ctx: &UiContext, at: &DateTime<Utc>) -> String {
    if ctx.mode.is_pretty() {
        at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
    } else {
        at.to_rfc3339()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::OutputMode;

    fn pretty() -> UiContext {
        UiContext {
            mode: OutputMode::Pretty,
            ..UiContext::plain()
        }
    }

    #[test]
    fn test_kv_modes() {
        assert_eq!(kv(&UiContext::plain(), "Vault Path", "/v"), "vault_path=/v");
        assert_eq!(kv(&pretty(), "Vault Path", "/v"), "Vault Path: /v");
    }

    #[test]
    fn test_plain_table_has_no_header() {
        let rows = vec![vec!["a.md".to_string(), "12 B".to_string()]];
        let out = table(&UiContext::plain(), &[Column::new("Path"), Column::new("Size")], &rows);
        assert_eq!(out, "a.md\t12 B");
    }

    #[test]
    fn test_pretty_table_has_header() {
        let rows = vec![vec!["a.md".to_string()]];
        let out = table(&pretty(), &[Column::new("Path")], &rows);
        assert!(out.contains("Path"));
        assert!(out.contains("a.md"));
    }

    #[test]
    fn test_strength_meter() {
        assert_eq!(
            strength_meter(&UiContext::plain(), 35),
            "strength=35 label=fair"
        );
        assert_eq!(
            strength_meter(&pretty(), 50),
            "[##########----------] 50/100 fair"
        );
        assert!(strength_meter(&pretty(), 100).ends_with("100/100 strong"));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
