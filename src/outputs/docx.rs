//! Word-document export of an analyst summary.
//!
//! Summaries arrive as lightweight markdown: `- **Section**` section
//! headings, `**Subsection**` lines, `-`/`•` bullets, and `**bold**`
//! spans inside running text. Each line is classified and mapped onto
//! docx paragraphs; an optional source-URL trailer closes the document.

use std::io::Cursor;

use anyhow::{Result, anyhow};
use chrono::Local;
use docx_rs::{
    AbstractNumbering, Docx, IndentLevel, Level, LevelJc, LevelText, NumberFormat, Numbering,
    NumberingId, Paragraph, Run, Start, Style, StyleType,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument};

/// Numbering definition id used for bullet lists.
const BULLET_NUMBERING: usize = 2;

/// URLs longer than this are truncated for display and repeated in full
/// on a follow-up line.
const URL_DISPLAY_LIMIT: usize = 80;

static SECTION_HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-\s*\*\*(.*)\*\*$").unwrap());
static BULLET_DETECT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[-•]\s").unwrap());
static BULLET_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[-•]\s*").unwrap());
static BOLD_SPAN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());

/// One classified line of a summary.
#[derive(Debug, PartialEq, Eq)]
enum SummaryLine {
    /// `- **Key Announcements**` — a top-level section.
    SectionHeading(String),
    /// `**Background**` — a nested heading.
    SubHeading(String),
    /// `- point` or `• point`.
    Bullet(String),
    /// Anything else: running text.
    Text(String),
}

fn classify_line(line: &str) -> SummaryLine {
    if let Some(captures) = SECTION_HEADING_RE.captures(line) {
        return SummaryLine::SectionHeading(captures[1].to_string());
    }
    if line.starts_with("**") && line.ends_with("**") && line.len() >= 4 {
        return SummaryLine::SubHeading(line[2..line.len() - 2].to_string());
    }
    if BULLET_DETECT_RE.is_match(line) {
        let stripped = BULLET_PREFIX_RE.replace(line, "").to_string();
        return SummaryLine::Bullet(stripped);
    }
    SummaryLine::Text(line.to_string())
}

/// Split text into `(segment, is_bold)` pieces around `**bold**` spans.
/// Non-bold segments that are pure whitespace are dropped.
fn bold_segments(text: &str) -> Vec<(String, bool)> {
    let mut segments = Vec::new();
    let mut last = 0;

    for span in BOLD_SPAN_RE.find_iter(text) {
        let before = &text[last..span.start()];
        if !before.trim().is_empty() {
            segments.push((before.to_string(), false));
        }
        let inner = &span.as_str()[2..span.as_str().len() - 2];
        segments.push((inner.to_string(), true));
        last = span.end();
    }

    let rest = &text[last..];
    if !rest.trim().is_empty() {
        segments.push((rest.to_string(), false));
    }
    segments
}

fn inline_runs(text: &str) -> Vec<Run> {
    bold_segments(text)
        .into_iter()
        .map(|(segment, bold)| {
            let run = Run::new().add_text(segment);
            if bold { run.bold() } else { run }
        })
        .collect()
}

fn heading_style(id: &str, name: &str, size: usize) -> Style {
    Style::new(id, StyleType::Paragraph).name(name).size(size).bold()
}

/// Render a summary (and optional source URL) into `.docx` bytes.
///
/// # Errors
///
/// Fails only if the document cannot be packaged into its zip container.
#[instrument(level = "info", skip_all, fields(summary_bytes = summary.len()))]
pub fn summary_to_docx(summary: &str, source_url: Option<&str>) -> Result<Vec<u8>> {
    let generated = Local::now().format("%B %-d, %Y").to_string();

    let mut docx = Docx::new()
        .add_style(heading_style("Heading1", "Heading 1", 36))
        .add_style(heading_style("Heading2", "Heading 2", 30))
        .add_style(heading_style("Heading3", "Heading 3", 26))
        .add_abstract_numbering(AbstractNumbering::new(BULLET_NUMBERING).add_level(Level::new(
            0,
            Start::new(1),
            NumberFormat::new("bullet"),
            LevelText::new("•"),
            LevelJc::new("left"),
        )))
        .add_numbering(Numbering::new(BULLET_NUMBERING, BULLET_NUMBERING))
        .add_paragraph(
            Paragraph::new()
                .style("Heading1")
                .add_run(Run::new().add_text("Press Release Summary")),
        )
        .add_paragraph(
            Paragraph::new()
                .add_run(Run::new().add_text("Generated on: ").bold())
                .add_run(Run::new().add_text(generated)),
        );

    for line in summary.lines().map(str::trim).filter(|line| !line.is_empty()) {
        docx = match classify_line(line) {
            SummaryLine::SectionHeading(text) => docx.add_paragraph(
                Paragraph::new()
                    .style("Heading2")
                    .add_run(Run::new().add_text(text)),
            ),
            SummaryLine::SubHeading(text) => docx.add_paragraph(
                Paragraph::new()
                    .style("Heading3")
                    .add_run(Run::new().add_text(text)),
            ),
            SummaryLine::Bullet(text) => {
                let mut paragraph = Paragraph::new()
                    .numbering(NumberingId::new(BULLET_NUMBERING), IndentLevel::new(0));
                for run in inline_runs(&text) {
                    paragraph = paragraph.add_run(run);
                }
                docx.add_paragraph(paragraph)
            }
            SummaryLine::Text(text) => {
                let mut paragraph = Paragraph::new();
                for run in inline_runs(&text) {
                    paragraph = paragraph.add_run(run);
                }
                docx.add_paragraph(paragraph)
            }
        };
    }

    if let Some(url) = source_url {
        docx = add_source_trailer(docx, url);
    }

    let mut cursor = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| anyhow!("failed to package document: {e}"))?;

    let bytes = cursor.into_inner();
    debug!(bytes = bytes.len(), "Built docx document");
    Ok(bytes)
}

/// Separator rule, "Source" heading, and the (possibly truncated) URL.
fn add_source_trailer(docx: Docx, url: &str) -> Docx {
    let display = if url.len() > URL_DISPLAY_LIMIT {
        format!("{}...", &url[..URL_DISPLAY_LIMIT])
    } else {
        url.to_string()
    };

    let mut docx = docx
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("─".repeat(50))))
        .add_paragraph(
            Paragraph::new()
                .style("Heading3")
                .add_run(Run::new().add_text("Source")),
        )
        .add_paragraph(
            Paragraph::new().add_run(
                Run::new()
                    .add_text(display)
                    .color("0066CC")
                    .underline("single"),
            ),
        );

    if url.len() > URL_DISPLAY_LIMIT {
        docx = docx.add_paragraph(
            Paragraph::new()
                .add_run(Run::new().add_text("Full URL: ").bold().size(20))
                .add_run(Run::new().add_text(url).size(20).color("666666")),
        );
    }
    docx
}
