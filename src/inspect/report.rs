//! Inspect report types and terminal formatting.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Inner width of the report boxes, in characters.
const BOX_WIDTH: usize = 59;

/// The result of inspecting a directory of shards.
#[derive(Clone, Debug, Serialize)]
pub struct InspectReport {
    /// Directory that was inspected.
    pub directory: PathBuf,
    /// Per-shard record counts, in file-name order.
    pub shards: Vec<ShardStats>,
    /// Total bounding boxes across all records.
    pub boxes: usize,
    /// Records with at least one bounding box.
    pub images_with_boxes: usize,
    /// Top label entries (sorted by count descending).
    pub labels: Vec<LabelCount>,
    /// Sum of counts for labels not in the top N.
    pub other_count: usize,
    /// Total distinct class texts.
    pub distinct_labels: usize,
    #[serde(skip)]
    pub(crate) bar_width: usize,
}

/// Records found in one shard file.
#[derive(Clone, Debug, Serialize)]
pub struct ShardStats {
    pub path: PathBuf,
    pub records: usize,
}

/// A single class text with its record count.
#[derive(Clone, Debug, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

impl InspectReport {
    /// Total records across every shard.
    pub fn records(&self) -> usize {
        self.shards.iter().map(|s| s.records).sum()
    }

    /// Shards holding no records at all.
    pub fn empty_shards(&self) -> usize {
        self.shards.iter().filter(|s| s.records == 0).count()
    }

    fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let records = self.records();

        open_box(f, "Summary")?;
        blank_row(f)?;
        row(f, &format!("  Shards:        {:>8}", format_number(self.shards.len())))?;
        row(f, &format!("  Records:       {:>8}", format_number(records)))?;
        row(f, &format!("  Boxes:         {:>8}", format_number(self.boxes)))?;
        blank_row(f)?;
        row(
            f,
            &format!(
                "  With boxes:    {:>8} of {} ({})",
                format_number(self.images_with_boxes),
                format_number(records),
                fmt_percent(self.images_with_boxes, records)
            ),
        )?;
        if self.empty_shards() > 0 {
            row(
                f,
                &format!("  ⚠ Empty shards: {}", format_number(self.empty_shards())),
            )?;
        }
        blank_row(f)?;
        close_box(f)
    }

    fn fmt_shards(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        open_box(f, "Shards")?;
        blank_row(f)?;
        if self.shards.is_empty() {
            row(f, "  No shard files found.")?;
        }
        for shard in &self.shards {
            let name = shard
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            row(
                f,
                &format!(
                    "  {:<40} {:>8}",
                    truncate_label(&name, 40),
                    format_number(shard.records)
                ),
            )?;
        }
        blank_row(f)?;
        close_box(f)
    }

    fn fmt_labels(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = if self.distinct_labels > self.labels.len() {
            format!("Labels (top {} of {})", self.labels.len(), self.distinct_labels)
        } else {
            format!("Labels ({})", self.distinct_labels)
        };

        open_box(f, &header)?;
        blank_row(f)?;

        if self.labels.is_empty() {
            row(f, "  No records found.")?;
        } else {
            let total = self.records();
            let max_count = self.labels.iter().map(|e| e.count).max().unwrap_or(1);

            let mut entries: Vec<(&str, usize)> = self
                .labels
                .iter()
                .map(|e| (e.label.as_str(), e.count))
                .collect();
            if self.other_count > 0 {
                entries.push(("(other)", self.other_count));
            }

            for (label, count) in entries {
                row(
                    f,
                    &format!(
                        "  {:<16} {:>7} {:>6}  {}",
                        truncate_label(label, 16),
                        format_number(count),
                        fmt_percent(count, total),
                        render_bar(count, max_count, self.bar_width)
                    ),
                )?;
            }
        }

        blank_row(f)?;
        close_box(f)
    }
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "Shard inspection: {}", self.directory.display())?;
        writeln!(f)?;

        self.fmt_summary(f)?;
        writeln!(f)?;
        self.fmt_shards(f)?;
        writeln!(f)?;
        self.fmt_labels(f)
    }
}

fn open_box(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    let used = title.chars().count() + 3;
    writeln!(f, "┌─ {} {}┐", title, "─".repeat(BOX_WIDTH.saturating_sub(used)))
}

fn close_box(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "└{}┘", "─".repeat(BOX_WIDTH))
}

fn blank_row(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    row(f, "")
}

/// Writes `content` padded to the box width.
fn row(f: &mut fmt::Formatter<'_>, content: &str) -> fmt::Result {
    let padding = BOX_WIDTH.saturating_sub(content.chars().count());
    writeln!(f, "│{}{}│", content, " ".repeat(padding))
}

/// Format a number with thousands separators.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a percentage, handling zero denominators.
fn fmt_percent(numerator: usize, denominator: usize) -> String {
    if denominator == 0 {
        "n/a".to_string()
    } else {
        format!("{:.1}%", (numerator as f64 / denominator as f64) * 100.0)
    }
}

/// Render a horizontal bar using Unicode block characters.
fn render_bar(count: usize, max_count: usize, width: usize) -> String {
    if max_count == 0 || width == 0 {
        return String::new();
    }

    let filled = ((count * width) / max_count).min(width);
    "█".repeat(filled) + &"░".repeat(width - filled)
}

/// Truncate a label to `max_len` characters.
fn truncate_label(label: &str, max_len: usize) -> String {
    if label.chars().count() <= max_len {
        label.to_string()
    } else {
        let kept: String = label.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}
