//! Bar chart rendering for audit reports
//!
//! Renders ordered (identifier, passed) pairs as a horizontal SVG bar chart,
//! one bar per rule. Passing rules get a full bar, failing rules an empty one.

use crate::domain::outcomes::{AuditError, AuditResult, UxReport};
use crate::report::escape_xml;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Backend turning a report into a chart document
pub trait ChartRenderer {
    /// File extension of produced charts, without the dot
    fn extension(&self) -> &'static str;

    /// Render ordered (identifier, passed) pairs for `url`
    fn render(&self, url: &str, entries: &[(&str, bool)]) -> AuditResult<String>;
}

/// Horizontal bar chart in SVG
#[derive(Debug, Clone)]
pub struct SvgBarChart {
    /// Width reserved for rule labels
    pub label_width: u32,
    /// Length of a full (passing) bar
    pub bar_length: u32,
    pub bar_height: u32,
    pub bar_gap: u32,
}

impl Default for SvgBarChart {
    fn default() -> Self {
        Self { label_width: 340, bar_length: 300, bar_height: 22, bar_gap: 8 }
    }
}

const PASS_COLOR: &str = "#2e9d4f";
const FAIL_COLOR: &str = "#d64541";
const TOP_MARGIN: u32 = 50;
const BOTTOM_MARGIN: u32 = 40;
const RIGHT_MARGIN: u32 = 60;

impl ChartRenderer for SvgBarChart {
    fn extension(&self) -> &'static str {
        "svg"
    }

    fn render(&self, url: &str, entries: &[(&str, bool)]) -> AuditResult<String> {
        if entries.is_empty() {
            return Err(AuditError::render("cannot chart a report without outcomes"));
        }

        let rows = entries.len() as u32;
        let width = self.label_width + self.bar_length + RIGHT_MARGIN;
        let plot_height = rows * (self.bar_height + self.bar_gap);
        let height = TOP_MARGIN + plot_height + BOTTOM_MARGIN;
        let axis_x = self.label_width;

        let mut svg = String::new();
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
             viewBox=\"0 0 {width} {height}\" font-family=\"sans-serif\" font-size=\"12\">\n"
        ));
        svg.push_str(&format!("  <rect width=\"{width}\" height=\"{height}\" fill=\"#ffffff\"/>\n"));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"28\" font-size=\"16\" text-anchor=\"middle\">UX Analysis for {}</text>\n",
            width / 2,
            escape_xml(url)
        ));

        for (index, (rule_id, passed)) in entries.iter().enumerate() {
            let y = TOP_MARGIN + index as u32 * (self.bar_height + self.bar_gap);
            let text_y = y + self.bar_height / 2 + 4;
            let (length, color) = if *passed { (self.bar_length, PASS_COLOR) } else { (0, FAIL_COLOR) };

            svg.push_str(&format!(
                "  <text x=\"{}\" y=\"{text_y}\" text-anchor=\"end\">{}</text>\n",
                axis_x - 8,
                escape_xml(rule_id)
            ));
            svg.push_str(&format!(
                "  <rect x=\"{axis_x}\" y=\"{y}\" width=\"{length}\" height=\"{}\" fill=\"{color}\"/>\n",
                self.bar_height
            ));
            // Zero-length bars get a marker so failures stay visible
            if !*passed {
                svg.push_str(&format!(
                    "  <rect x=\"{axis_x}\" y=\"{y}\" width=\"3\" height=\"{}\" fill=\"{FAIL_COLOR}\"/>\n",
                    self.bar_height
                ));
            }
        }

        let axis_y = TOP_MARGIN + plot_height;
        svg.push_str(&format!(
            "  <line x1=\"{axis_x}\" y1=\"{TOP_MARGIN}\" x2=\"{axis_x}\" y2=\"{axis_y}\" stroke=\"#333\"/>\n"
        ));
        svg.push_str(&format!(
            "  <line x1=\"{axis_x}\" y1=\"{axis_y}\" x2=\"{}\" y2=\"{axis_y}\" stroke=\"#333\"/>\n",
            axis_x + self.bar_length
        ));
        svg.push_str(&format!(
            "  <text x=\"{axis_x}\" y=\"{}\" text-anchor=\"middle\">0 (Fail)</text>\n",
            axis_y + 18
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\">1 (Pass)</text>\n",
            axis_x + self.bar_length,
            axis_y + 18
        ));
        svg.push_str("</svg>\n");

        Ok(svg)
    }
}

/// Render `report` with `renderer` into `dir`, creating it if needed.
///
/// The file is named after the URL host: `<host>_ux_report.<ext>`.
pub fn write_chart<R: ChartRenderer>(
    renderer: &R,
    report: &UxReport,
    dir: impl AsRef<Path>,
) -> AuditResult<PathBuf> {
    let dir = dir.as_ref();
    let entries: Vec<(&str, bool)> = report.entries().collect();
    let chart = renderer.render(&report.url, &entries)?;

    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}_ux_report.{}", host_slug(&report.url), renderer.extension()));
    fs::write(&path, chart)?;

    tracing::info!("Chart written to {}", path.display());
    Ok(path)
}

/// File-name-safe host of `url`
fn host_slug(url: &str) -> String {
    let host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "unknown-host".to_string());

    host.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect()
}
